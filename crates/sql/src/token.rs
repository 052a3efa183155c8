use std::fmt::Display;

/// A lexed token: its kind plus the byte offset where it started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub offset: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TokenKind<'a> {
    /// A `'...'`-quoted string literal (quotes stripped, no escapes).
    String(&'a str),
    /// An unquoted identifier (table, column or index name).
    Identifier(&'a str),
    /// A reserved word, matched case-insensitively.
    Keyword(Keyword),
    /// An integer literal, kept as its raw digit text. The executor parses
    /// it against the column type, so the lexer does not commit to a width.
    Number(&'a str),
    LeftParen,
    RightParen,
    Comma,
    Semicolon,
    Asterisk,
    Dot,
    Equals,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    Create,
    Table,
    Index,
    On,
    Insert,
    Into,
    Values,
    Select,
    From,
    Join,
    Where,
    Update,
    Set,
    Delete,
    Primary,
    Key,
    Unique,
    Int,
    Text,
}

impl Keyword {
    /// Maps an identifier-shaped word to a keyword, case-insensitively.
    pub fn from_word(word: &str) -> Option<Self> {
        const KEYWORDS: &[(&str, Keyword)] = &[
            ("CREATE", Keyword::Create),
            ("TABLE", Keyword::Table),
            ("INDEX", Keyword::Index),
            ("ON", Keyword::On),
            ("INSERT", Keyword::Insert),
            ("INTO", Keyword::Into),
            ("VALUES", Keyword::Values),
            ("SELECT", Keyword::Select),
            ("FROM", Keyword::From),
            ("JOIN", Keyword::Join),
            ("WHERE", Keyword::Where),
            ("UPDATE", Keyword::Update),
            ("SET", Keyword::Set),
            ("DELETE", Keyword::Delete),
            ("PRIMARY", Keyword::Primary),
            ("KEY", Keyword::Key),
            ("UNIQUE", Keyword::Unique),
            ("INT", Keyword::Int),
            ("TEXT", Keyword::Text),
        ];

        KEYWORDS
            .iter()
            .find(|(text, _)| word.eq_ignore_ascii_case(text))
            .map(|(_, kw)| *kw)
    }
}

impl Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Keyword::Create => "CREATE",
            Keyword::Table => "TABLE",
            Keyword::Index => "INDEX",
            Keyword::On => "ON",
            Keyword::Insert => "INSERT",
            Keyword::Into => "INTO",
            Keyword::Values => "VALUES",
            Keyword::Select => "SELECT",
            Keyword::From => "FROM",
            Keyword::Join => "JOIN",
            Keyword::Where => "WHERE",
            Keyword::Update => "UPDATE",
            Keyword::Set => "SET",
            Keyword::Delete => "DELETE",
            Keyword::Primary => "PRIMARY",
            Keyword::Key => "KEY",
            Keyword::Unique => "UNIQUE",
            Keyword::Int => "INT",
            Keyword::Text => "TEXT",
        };
        f.write_str(text)
    }
}

impl Display for TokenKind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::String(s) => write!(f, "STRING ('{s}')"),
            TokenKind::Identifier(id) => write!(f, "IDENT ('{id}')"),
            TokenKind::Keyword(keyword) => keyword.fmt(f),
            TokenKind::Number(n) => write!(f, "NUMBER ({n})"),
            TokenKind::LeftParen => write!(f, "LP"),
            TokenKind::RightParen => write!(f, "RP"),
            TokenKind::Comma => write!(f, "COMMA"),
            TokenKind::Semicolon => write!(f, "SEMICOLON"),
            TokenKind::Asterisk => write!(f, "ASTERISK"),
            TokenKind::Dot => write!(f, "DOT"),
            TokenKind::Equals => write!(f, "EQ"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_match_case_insensitively() {
        assert_eq!(Keyword::from_word("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_word("SeLeCt"), Some(Keyword::Select));
        assert_eq!(Keyword::from_word("PRIMARY"), Some(Keyword::Primary));
        assert_eq!(Keyword::from_word("users"), None);
    }
}
