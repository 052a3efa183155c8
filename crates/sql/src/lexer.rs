use crate::error::ParseError;
use crate::token::{Keyword, Token, TokenKind};

/// A peekable lexer over one statement line. Borrows the input; every token
/// that carries text carries a slice of the original line.
#[derive(Debug)]
pub struct Lexer<'a> {
    rest: &'a str,
    position: usize,
    peeked: Option<Result<Token<'a>, ParseError>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            rest: source,
            position: 0,
            peeked: None,
        }
    }

    pub fn peek(&mut self) -> Option<&Result<Token<'a>, ParseError>> {
        if self.peeked.is_none() {
            self.peeked = self.next();
        }
        self.peeked.as_ref()
    }

    fn skip_whitespace(&mut self) {
        let trimmed = self.rest.trim_start();
        self.position += self.rest.len() - trimmed.len();
        self.rest = trimmed;
    }

    /// Consumes `len` bytes of the input and returns the consumed slice.
    fn bump(&mut self, len: usize) -> &'a str {
        let (taken, rest) = self.rest.split_at(len);
        self.position += len;
        self.rest = rest;
        taken
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token<'a>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(next) = self.peeked.take() {
            return Some(next);
        }

        self.skip_whitespace();

        let c = self.rest.chars().next()?;
        let offset = self.position;

        let punct = |kind| Some(Ok(Token { kind, offset }));

        match c {
            '(' => {
                self.bump(1);
                punct(TokenKind::LeftParen)
            }
            ')' => {
                self.bump(1);
                punct(TokenKind::RightParen)
            }
            ',' => {
                self.bump(1);
                punct(TokenKind::Comma)
            }
            ';' => {
                self.bump(1);
                punct(TokenKind::Semicolon)
            }
            '*' => {
                self.bump(1);
                punct(TokenKind::Asterisk)
            }
            '.' => {
                self.bump(1);
                punct(TokenKind::Dot)
            }
            '=' => {
                self.bump(1);
                punct(TokenKind::Equals)
            }

            '\'' => {
                // Single-quoted string, no escaping.
                match self.rest[1..].find('\'') {
                    Some(end) => {
                        let literal = &self.rest[1..1 + end];
                        self.bump(end + 2);
                        Some(Ok(Token {
                            kind: TokenKind::String(literal),
                            offset,
                        }))
                    }
                    None => {
                        self.bump(self.rest.len());
                        Some(Err(ParseError::UnterminatedString { at: offset }))
                    }
                }
            }

            '0'..='9' | '-' => {
                let digits_from = usize::from(c == '-');
                let len = self.rest[digits_from..]
                    .find(|ch: char| !ch.is_ascii_digit())
                    .map_or(self.rest.len(), |i| i + digits_from);
                let literal = self.bump(len);
                Some(Ok(Token {
                    kind: TokenKind::Number(literal),
                    offset,
                }))
            }

            c if c.is_ascii_alphabetic() || c == '_' => {
                let len = self
                    .rest
                    .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_'))
                    .unwrap_or(self.rest.len());
                let word = self.bump(len);
                let kind = match Keyword::from_word(word) {
                    Some(keyword) => TokenKind::Keyword(keyword),
                    None => TokenKind::Identifier(word),
                };
                Some(Ok(Token { kind, offset }))
            }

            c => {
                self.bump(c.len_utf8());
                Some(Err(ParseError::InvalidCharacter { c, at: offset }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(input).map(|t| t.unwrap().kind).collect()
    }

    #[test]
    fn lexes_punctuation_and_words() {
        assert_eq!(
            kinds("SELECT * FROM users;"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Asterisk,
                TokenKind::Keyword(Keyword::From),
                TokenKind::Identifier("users"),
                TokenKind::Semicolon,
            ]
        );
    }

    #[test]
    fn keywords_are_case_insensitive_but_identifiers_keep_case() {
        assert_eq!(
            kinds("select Users"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Identifier("Users"),
            ]
        );
    }

    #[test]
    fn lexes_string_and_number_literals() {
        assert_eq!(
            kinds("VALUES (1, 'alice', -7)"),
            vec![
                TokenKind::Keyword(Keyword::Values),
                TokenKind::LeftParen,
                TokenKind::Number("1"),
                TokenKind::Comma,
                TokenKind::String("alice"),
                TokenKind::Comma,
                TokenKind::Number("-7"),
                TokenKind::RightParen,
            ]
        );
    }

    #[test]
    fn lexes_qualified_column_refs() {
        assert_eq!(
            kinds("users.id = posts.uid"),
            vec![
                TokenKind::Identifier("users"),
                TokenKind::Dot,
                TokenKind::Identifier("id"),
                TokenKind::Equals,
                TokenKind::Identifier("posts"),
                TokenKind::Dot,
                TokenKind::Identifier("uid"),
            ]
        );
    }

    #[test]
    fn unterminated_string_is_an_error() {
        let mut lexer = Lexer::new("'oops");
        assert_eq!(
            lexer.next(),
            Some(Err(ParseError::UnterminatedString { at: 0 }))
        );
    }

    #[test]
    fn peek_does_not_consume() {
        let mut lexer = Lexer::new("users;");
        assert!(matches!(
            lexer.peek(),
            Some(Ok(Token {
                kind: TokenKind::Identifier("users"),
                ..
            }))
        ));
        assert_eq!(
            lexer.next().unwrap().unwrap().kind,
            TokenKind::Identifier("users")
        );
        assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::Semicolon);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn trailing_whitespace_is_tolerated() {
        let mut lexer = Lexer::new("  ;   \r\n");
        assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::Semicolon);
        assert!(lexer.next().is_none());
    }
}
