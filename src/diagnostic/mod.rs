pub mod ansi;
pub mod json;
pub mod registry;
pub mod source_map;

pub use source_map::{SourceMap, Span};

use crate::config::ConfigError;
use crate::error::EngineError;
use crate::lexer::LexError;
use crate::opcode::{Opcode, is_delimiter};

#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub code: Option<&'static str>,
    pub message: String,
    pub label: Option<Label>,
    pub notes: Vec<String>,
    pub suggestion: Option<String>,
    pub source: Option<String>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            code: None,
            message: message.into(),
            label: None,
            notes: Vec::new(),
            suggestion: None,
            source: None,
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_span(mut self, span: Span, label: impl Into<String>) -> Self {
        self.label = Some(Label { span, message: label.into() });
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl From<&LexError> for Diagnostic {
    fn from(e: &LexError) -> Self {
        let span = Span {
            start: e.position,
            end: e.position + e.snippet.len().max(1),
        };
        let mut d = Diagnostic::error(format!("unexpected character(s) '{}'", e.snippet.escape_debug()))
            .with_code("STK-L001")
            .with_span(span, "here");
        if !e.suggestion.is_empty() {
            d = d.with_suggestion(e.suggestion.clone());
        }
        d
    }
}

impl From<&EngineError> for Diagnostic {
    fn from(e: &EngineError) -> Self {
        let d = Diagnostic::error(e.to_string()).with_code(e.code());
        match e {
            EngineError::UnknownInstruction { name } if is_delimiter(name) => {
                d.with_note("ELSE and END are only valid inside an IF or DEF block")
            }
            EngineError::UnknownInstruction { name } => {
                match Opcode::from_name(&name.to_uppercase()) {
                    Some(op) => d.with_suggestion(format!("did you mean `{}`?", op.name())),
                    None => d.with_note("names are case-sensitive; define new ones with DEF"),
                }
            }
            EngineError::ProgramTooLong { .. } => {
                d.with_note("a macro that calls itself unconditionally never finishes")
            }
            _ => d,
        }
    }
}

impl From<&ConfigError> for Diagnostic {
    fn from(e: &ConfigError) -> Self {
        Diagnostic::error(e.to_string()).with_code(e.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_builder() {
        let d = Diagnostic::error("something went wrong");
        assert_eq!(d.message, "something went wrong");
        assert!(d.code.is_none());
        assert!(d.label.is_none());
        assert!(d.notes.is_empty());
    }

    #[test]
    fn stray_end_is_explained() {
        let e = EngineError::UnknownInstruction { name: "END".into() };
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("STK-R001"));
        assert!(d.suggestion.is_none());
        assert!(d.notes[0].contains("only valid inside an IF or DEF"));
    }

    #[test]
    fn from_lex_error() {
        let e = LexError {
            position: 7,
            snippet: "$$".to_string(),
            suggestion: "remove it".to_string(),
        };
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("STK-L001"));
        assert!(d.message.contains("$$"));
        let label = d.label.unwrap();
        assert_eq!(label.span, Span { start: 7, end: 9 });
        assert_eq!(d.suggestion.as_deref(), Some("remove it"));
    }

    #[test]
    fn lowercase_builtin_gets_a_suggestion() {
        let e = EngineError::UnknownInstruction { name: "push".into() };
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("STK-R001"));
        assert_eq!(d.suggestion.as_deref(), Some("did you mean `PUSH`?"));
    }

    #[test]
    fn unknown_name_gets_a_note() {
        let e = EngineError::UnknownInstruction { name: "JUMP".into() };
        let d = Diagnostic::from(&e);
        assert!(d.suggestion.is_none());
        assert_eq!(d.notes.len(), 1);
    }

    #[test]
    fn underflow_keeps_engine_message() {
        let e = EngineError::StackUnderflow { name: "ADD".into(), required: 2, actual: 0 };
        let d = Diagnostic::from(&e);
        assert_eq!(d.message, "tried to call ADD on a stack of size 0 < 2");
        assert_eq!(d.code, Some("STK-R002"));
    }

    #[test]
    fn from_config_error() {
        let e = ConfigError::Opcode(crate::table::UnknownOpcodeName { name: "FLY".into() });
        let d = Diagnostic::from(&e);
        assert_eq!(d.code, Some("STK-C003"));
        assert!(d.message.contains("FLY"));
    }
}
