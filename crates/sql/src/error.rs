use thiserror::Error;

/// Errors produced by the lexer and parser. The `Display` text of these is
/// exactly what the server sends back to the client after `Error: `.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Unexpected character '{c}'")]
    InvalidCharacter { c: char, at: usize },
    #[error("Unterminated string literal")]
    UnterminatedString { at: usize },
    #[error("{0}")]
    Syntax(&'static str),
}
