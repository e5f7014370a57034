//! `stacked`: a tiny stack language whose programs steer a character around
//! a grid. Programs are flat term streams rewritten in place; DEF macros and
//! IF branches are spliced back onto the front of the stream, and every
//! movement hands control back to the host.

pub mod blocks;
pub mod config;
pub mod diagnostic;
pub mod engine;
pub mod env;
pub mod error;
pub mod lexer;
pub mod opcode;
pub mod stream;
pub mod table;

pub use engine::{Engine, Step};
pub use env::{CellKind, Direction, Environment};
pub use error::EngineError;
pub use table::InstructionSet;
