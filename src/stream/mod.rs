use std::collections::VecDeque;

use crate::error::{EngineError, Result};

/// Pending program terms. Consumed from the front; macro bodies and IF
/// branches are spliced back in at the front so they run next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    terms: VecDeque<String>,
}

impl TokenStream {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TokenStream { terms: terms.into_iter().map(Into::into).collect() }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn front(&self) -> Option<&str> {
        self.terms.front().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    pub fn pop_front(&mut self) -> Option<String> {
        self.terms.pop_front()
    }

    /// Consume the next term on behalf of `context` (e.g. PUSH's literal).
    pub fn next_term(&mut self, context: &'static str) -> Result<String> {
        self.terms
            .pop_front()
            .ok_or(EngineError::EmptyStreamUnderflow { context })
    }

    /// Remove and return the first `n` terms (fewer if the stream is shorter).
    pub fn take(&mut self, n: usize) -> Vec<String> {
        let n = n.min(self.terms.len());
        self.terms.drain(..n).collect()
    }

    /// Insert `terms` at the front, preserving their order.
    pub fn splice_front<I>(&mut self, terms: I)
    where
        I: IntoIterator<Item = String>,
        I::IntoIter: DoubleEndedIterator,
    {
        for term in terms.into_iter().rev() {
            self.terms.push_front(term);
        }
    }
}
