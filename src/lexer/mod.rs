use logos::Logos;

/// Host-side tokenizer. The engine only ever sees plain terms; this strips
/// `# ... #` comments and splits the editor text on whitespace.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"\s+")]
// A comment runs to the next '#' or to the end of the line.
#[logos(skip r"#[^#\n]*#?")]
pub enum Token {
    // Any run of printable non-whitespace. Numbers, opcodes and macro names
    // alike; what a term means is decided at run time.
    #[regex(r"[^\s#\p{Cc}]+", |lex| lex.slice().to_string())]
    Term(String),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Term(s) => s,
        }
    }
}

/// Lex source code into a stream of tokens with positions.
pub fn lex(source: &str) -> Result<Vec<(Token, std::ops::Range<usize>)>, LexError> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) => tokens.push((token, lexer.span())),
            Err(()) => {
                let span = lexer.span();
                return Err(LexError {
                    position: span.start,
                    snippet: source[span.clone()].to_string(),
                    suggestion: suggest_fix(&source[span]),
                });
            }
        }
    }

    Ok(tokens)
}

/// The program as the engine wants it: just the terms, in order.
pub fn terms(source: &str) -> Result<Vec<String>, LexError> {
    Ok(lex(source)?
        .into_iter()
        .map(|(token, _)| token.text().to_string())
        .collect())
}

fn suggest_fix(bad_token: &str) -> String {
    if bad_token.contains('\0') {
        "The program contains a NUL byte; is this a binary file?".to_string()
    } else {
        format!(
            "Remove the control character '{}'. Terms are separated by spaces, tabs or newlines.",
            bad_token.escape_debug()
        )
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Lex error at position {position}: '{}'. {suggestion}", .snippet.escape_debug())]
pub struct LexError {
    pub position: usize,
    pub snippet: String,
    pub suggestion: String,
}
