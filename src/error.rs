/// Everything that can end a program run. None of these are retried; the host
/// restarts from a fresh stack and stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("unknown instruction: {name}")]
    UnknownInstruction { name: String },
    #[error("tried to call {name} on a stack of size {actual} < {required}")]
    StackUnderflow {
        name: String,
        required: usize,
        actual: usize,
    },
    #[error("tried to PUSH {literal}, but values must be in the range {min}-{max}")]
    RangeError { literal: String, min: i64, max: i64 },
    #[error("tried to call {name} with zero divisor")]
    DivideByZero { name: &'static str },
    #[error("tried to call RAND with max <= min (min {min}, max {max})")]
    InvalidRange { min: i64, max: i64 },
    #[error("could not find closing END term for {opener}")]
    UnterminatedBlock { opener: &'static str },
    #[error("maximum program length exceeded ({limit} steps)")]
    ProgramTooLong { limit: u64 },
    #[error("{context} expected another term, but the program ended")]
    EmptyStreamUnderflow { context: &'static str },
    #[error("{name} failed: {message}")]
    HostFailure { name: String, message: String },
}

impl EngineError {
    /// Stable diagnostic code, see `diagnostic::registry`.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::UnknownInstruction { .. } => "STK-R001",
            EngineError::StackUnderflow { .. } => "STK-R002",
            EngineError::RangeError { .. } => "STK-R003",
            EngineError::DivideByZero { .. } => "STK-R004",
            EngineError::InvalidRange { .. } => "STK-R005",
            EngineError::UnterminatedBlock { .. } => "STK-R006",
            EngineError::ProgramTooLong { .. } => "STK-R007",
            EngineError::EmptyStreamUnderflow { .. } => "STK-R008",
            EngineError::HostFailure { .. } => "STK-R009",
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
