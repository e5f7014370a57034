//! The active instruction set: one flat name → behaviour map holding the
//! whitelisted built-ins, host operations and user macros.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::env::Environment;
use crate::error::Result;
use crate::opcode::{Category, Opcode};
use crate::stream::TokenStream;

/// Effect of a host operation. It may splice terms onto the front of the
/// stream so that, for instance, each move it asks for becomes its own step.
pub type HostEffect = dyn Fn(&mut Vec<i64>, &mut TokenStream, &mut dyn Environment) -> Result<()>;

/// An operation supplied by the host for a particular program (a level's
/// extra commands).
pub struct HostOp {
    pub name: String,
    pub category: Category,
    pub min_depth: usize,
    pub description: String,
    pub effect: Box<HostEffect>,
}

impl fmt::Debug for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostOp")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("min_depth", &self.min_depth)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Entry {
    Builtin(Opcode),
    Host(Rc<HostOp>),
    /// Captured DEF body, re-spliced on every call.
    Macro(Rc<[String]>),
}

impl Entry {
    pub fn category(&self) -> Category {
        match self {
            Entry::Builtin(op) => op.category(),
            Entry::Host(op) => op.category,
            Entry::Macro(_) => Category::Custom,
        }
    }

    pub fn min_depth(&self) -> usize {
        match self {
            Entry::Builtin(op) => op.min_depth(),
            Entry::Host(op) => op.min_depth,
            Entry::Macro(_) => 0,
        }
    }
}

/// One row of the reference listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Doc {
    pub name: String,
    pub category: Category,
    pub syntax: String,
    pub description: String,
}

#[derive(Debug, thiserror::Error)]
#[error("'{name}' is not a built-in instruction")]
pub struct UnknownOpcodeName {
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct InstructionSet {
    entries: HashMap<String, Entry>,
}

impl InstructionSet {
    /// Every built-in enabled.
    pub fn all() -> Self {
        InstructionSet::from_opcodes(Opcode::ALL)
    }

    pub fn from_opcodes(ops: impl IntoIterator<Item = Opcode>) -> Self {
        let entries = ops
            .into_iter()
            .map(|op| (op.name().to_string(), Entry::Builtin(op)))
            .collect();
        InstructionSet { entries }
    }

    /// Only the named built-ins, e.g. a level's `available` list.
    pub fn only<S: AsRef<str>>(names: &[S]) -> std::result::Result<Self, UnknownOpcodeName> {
        let ops = names
            .iter()
            .map(|n| {
                Opcode::from_name(n.as_ref())
                    .ok_or_else(|| UnknownOpcodeName { name: n.as_ref().to_string() })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(InstructionSet::from_opcodes(ops))
    }

    pub fn with_host_op(mut self, op: HostOp) -> Self {
        self.entries.insert(op.name.clone(), Entry::Host(Rc::new(op)));
        self
    }

    /// Bind `name` to `body`, replacing whatever had that name.
    pub fn define_macro(&mut self, name: impl Into<String>, body: Vec<String>) {
        self.entries.insert(name.into(), Entry::Macro(body.into()));
    }

    pub fn resolve(&self, name: &str) -> Option<Entry> {
        self.entries.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reference rows grouped by category (alphabetical), then by name.
    pub fn docs(&self) -> Vec<Doc> {
        let mut docs: Vec<Doc> = self
            .entries
            .iter()
            .map(|(name, entry)| match entry {
                Entry::Builtin(op) => {
                    let info = op.info();
                    Doc {
                        name: name.clone(),
                        category: info.category,
                        syntax: info.syntax.to_string(),
                        description: info.description.to_string(),
                    }
                }
                Entry::Host(op) => Doc {
                    name: name.clone(),
                    category: op.category,
                    syntax: op.name.clone(),
                    description: op.description.clone(),
                },
                Entry::Macro(_) => Doc {
                    name: name.clone(),
                    category: Category::Custom,
                    syntax: name.clone(),
                    description: format!("Function {name} defined by user."),
                },
            })
            .collect();
        docs.sort_by(|a, b| {
            a.category
                .as_str()
                .cmp(b.category.as_str())
                .then_with(|| a.name.cmp(&b.name))
        });
        docs
    }
}
