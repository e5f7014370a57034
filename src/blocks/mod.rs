//! Nested block matching over pending terms.
//!
//! Both scans are single pass with a depth counter seeded at 1 (the opener
//! has already been consumed). `IF` and `DEF` open a level, `END` closes one.

use crate::error::{EngineError, Result};
use crate::opcode::{ELSE, END, opens_block};

/// Positions of an IF's own delimiters, relative to the first term after IF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfClause {
    pub else_at: Option<usize>,
    pub end: usize,
}

impl IfClause {
    /// Split the region `terms[..=end]` (delimiters included) into the then
    /// and else branches, dropping the delimiters.
    pub fn split(&self, mut region: Vec<String>) -> (Vec<String>, Vec<String>) {
        region.truncate(self.end);
        match self.else_at {
            Some(at) => {
                let otherwise = region.split_off(at + 1);
                region.truncate(at);
                (region, otherwise)
            }
            None => (region, Vec::new()),
        }
    }
}

/// Index of the `END` that closes the current block.
pub fn find_block_end<'a>(terms: impl IntoIterator<Item = &'a str>, opener: &'static str) -> Result<usize> {
    let mut depth = 1usize;
    for (pos, term) in terms.into_iter().enumerate() {
        if opens_block(term) {
            depth += 1;
        } else if term == END {
            depth -= 1;
            if depth == 0 {
                return Ok(pos);
            }
        }
    }
    Err(EngineError::UnterminatedBlock { opener })
}

/// Like [`find_block_end`], also recording an `ELSE` that belongs to this IF
/// (one seen at depth 1, not inside a nested block).
pub fn split_if_clause<'a>(terms: impl IntoIterator<Item = &'a str>) -> Result<IfClause> {
    let mut depth = 1usize;
    let mut else_at = None;
    for (pos, term) in terms.into_iter().enumerate() {
        if opens_block(term) {
            depth += 1;
        } else if term == ELSE {
            if depth == 1 {
                else_at = Some(pos);
            }
        } else if term == END {
            depth -= 1;
            if depth == 0 {
                return Ok(IfClause { else_at, end: pos });
            }
        }
    }
    Err(EngineError::UnterminatedBlock { opener: "IF" })
}
