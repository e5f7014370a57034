use std::path::Path;

use serde::Deserialize;

use crate::env::{CellKind, Recorder};
use crate::table::{InstructionSet, UnknownOpcodeName};

/// Hard ceiling on dispatched steps before a run is declared runaway.
pub const DEFAULT_MAX_STEPS: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_steps: u64,
    /// Seed for RAND; unseeded runs draw from the thread RNG.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig { max_steps: DEFAULT_MAX_STEPS, seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellSpec {
    pub x: i64,
    pub y: i64,
    pub kind: CellKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    pub start: (i64, i64),
    /// `(width, height)`; unbounded when absent.
    pub size: Option<(i64, i64)>,
    pub cells: Vec<CellSpec>,
}

impl WorldConfig {
    pub fn recorder(&self) -> Recorder {
        let mut env = Recorder::new(self.start);
        if let Some((w, h)) = self.size {
            env = env.with_bounds(w, h);
        }
        for cell in &self.cells {
            env = env.with_cell(cell.x, cell.y, cell.kind.clone());
        }
        env
    }
}

/// Everything needed to run one program from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Whitelisted built-ins; all of them when absent.
    pub available: Option<Vec<String>>,
    pub max_steps: Option<u64>,
    pub seed: Option<u64>,
    /// Pause between visible actions.
    pub delay_ms: u64,
    pub stack: Vec<i64>,
    pub world: WorldConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Opcode(#[from] UnknownOpcodeName),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Io { .. } => "STK-C001",
            ConfigError::Json { .. } => "STK-C002",
            ConfigError::Opcode(_) => "STK-C003",
        }
    }
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            max_steps: self.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
            seed: self.seed,
        }
    }

    pub fn instruction_set(&self) -> Result<InstructionSet, ConfigError> {
        match &self.available {
            Some(names) => Ok(InstructionSet::only(names.as_slice())?),
            None => Ok(InstructionSet::all()),
        }
    }
}
