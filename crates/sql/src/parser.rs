//! Recursive-descent parser over the token stream.
//!
//! One public entry point, [`parse_statement`], consumes a whole statement
//! line (anything after the terminating `;` is ignored). Error messages are
//! client-facing; the server prefixes them with `Error: `.

use crate::ast::{
    Assignment, ColumnDef, ColumnRef, CreateIndexStmt, CreateTableStmt, DataType, DeleteStmt,
    InsertStmt, Join, MAX_COLUMNS, Predicate, SelectStmt, Statement, UpdateStmt,
};
use crate::error::ParseError;
use crate::lexer::Lexer;
use crate::token::{Keyword, Token, TokenKind};

/// Parses one statement from `input`.
pub fn parse_statement(input: &str) -> Result<Statement<'_>, ParseError> {
    Parser::new(input).parse()
}

#[derive(Debug)]
struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    fn parse(&mut self) -> Result<Statement<'a>, ParseError> {
        match self.next_token()? {
            Some(Token {
                kind: TokenKind::Keyword(Keyword::Create),
                ..
            }) => match self.next_token()? {
                Some(Token {
                    kind: TokenKind::Keyword(Keyword::Table),
                    ..
                }) => self.parse_create_table(),
                Some(Token {
                    kind: TokenKind::Keyword(Keyword::Index),
                    ..
                }) => self.parse_create_index(),
                _ => Err(ParseError::Syntax("Expected 'TABLE' or 'INDEX' after CREATE")),
            },
            Some(Token {
                kind: TokenKind::Keyword(Keyword::Insert),
                ..
            }) => self.parse_insert(),
            Some(Token {
                kind: TokenKind::Keyword(Keyword::Select),
                ..
            }) => self.parse_select(),
            Some(Token {
                kind: TokenKind::Keyword(Keyword::Update),
                ..
            }) => self.parse_update(),
            Some(Token {
                kind: TokenKind::Keyword(Keyword::Delete),
                ..
            }) => self.parse_delete(),
            _ => Err(ParseError::Syntax("Unexpected token")),
        }
    }

    // Syntax: CREATE TABLE <name> ( <col> <type> [PRIMARY KEY] [UNIQUE], ... );
    fn parse_create_table(&mut self) -> Result<Statement<'a>, ParseError> {
        let table = self.expect_ident("Expected table name")?;
        self.expect_kind(TokenKind::LeftParen, "Expected '(' after table name")?;

        let mut columns = Vec::new();
        loop {
            if !columns.is_empty() {
                match self.next_token()? {
                    Some(Token {
                        kind: TokenKind::Comma,
                        ..
                    }) => {}
                    Some(Token {
                        kind: TokenKind::RightParen,
                        ..
                    }) => break,
                    _ => return Err(ParseError::Syntax("Expected ',' or ')' after column")),
                }
            }

            if columns.len() >= MAX_COLUMNS {
                return Err(ParseError::Syntax("Too many columns"));
            }

            let name = self.expect_ident("Expected column name")?;

            let ty = match self.next_token()? {
                Some(Token {
                    kind: TokenKind::Keyword(Keyword::Int),
                    ..
                }) => DataType::Int,
                Some(Token {
                    kind: TokenKind::Keyword(Keyword::Text),
                    ..
                }) => DataType::Text,
                _ => return Err(ParseError::Syntax("Expected type 'int' or type 'text'")),
            };

            let mut is_primary_key = false;
            if self.peek_is_keyword(Keyword::Primary) {
                self.next_token()?;
                self.expect_keyword(Keyword::Key, "Expected 'KEY' after 'PRIMARY'")?;
                is_primary_key = true;
            }

            let mut is_unique = false;
            if self.peek_is_keyword(Keyword::Unique) {
                self.next_token()?;
                is_unique = true;
            }

            columns.push(ColumnDef {
                name,
                ty,
                is_primary_key,
                is_unique,
            });
        }

        self.expect_kind(TokenKind::Semicolon, "Expected ';' at end")?;

        Ok(Statement::CreateTable(CreateTableStmt { table, columns }))
    }

    // Syntax: CREATE INDEX <name> ON <table> ( <col> );
    fn parse_create_index(&mut self) -> Result<Statement<'a>, ParseError> {
        let index = self.expect_ident("Expected index name")?;
        self.expect_keyword(Keyword::On, "Expected 'ON' after index name")?;
        let table = self.expect_ident("Expected table name")?;
        self.expect_kind(TokenKind::LeftParen, "Expected '('")?;
        let column = self.expect_ident("Expected column name")?;
        self.expect_kind(TokenKind::RightParen, "Expected ')'")?;
        self.expect_kind(TokenKind::Semicolon, "Expected ';' at end")?;

        Ok(Statement::CreateIndex(CreateIndexStmt {
            index,
            table,
            column,
        }))
    }

    // Syntax: INSERT INTO <table> VALUES ( <value>, ... );
    fn parse_insert(&mut self) -> Result<Statement<'a>, ParseError> {
        self.expect_keyword(Keyword::Into, "Expected 'INTO' after INSERT")?;
        let table = self.expect_ident("Expected table name after INTO")?;
        self.expect_keyword(Keyword::Values, "Expected 'VALUES' after table name")?;
        self.expect_kind(TokenKind::LeftParen, "Expected '(' after VALUES")?;

        let mut values = Vec::new();
        loop {
            if !values.is_empty() {
                match self.next_token()? {
                    Some(Token {
                        kind: TokenKind::Comma,
                        ..
                    }) => {}
                    Some(Token {
                        kind: TokenKind::RightParen,
                        ..
                    }) => break,
                    _ => {
                        return Err(ParseError::Syntax(
                            "Trailing comma or unexpected end in VALUE list",
                        ));
                    }
                }
            }

            if values.len() >= MAX_COLUMNS {
                return Err(ParseError::Syntax("Too many values"));
            }

            values.push(self.expect_literal("Expected integer or string literal")?);
        }

        self.expect_kind(TokenKind::Semicolon, "Expected ';' at end")?;

        Ok(Statement::Insert(InsertStmt { table, values }))
    }

    // Syntax: SELECT <* | col, ...> FROM <table>
    //         [JOIN <table> ON <col> = <col>] [WHERE <col> = <val>];
    fn parse_select(&mut self) -> Result<Statement<'a>, ParseError> {
        let mut fields = Vec::new();

        if self.peek_is(TokenKind::Asterisk) {
            self.next_token()?;
        } else {
            loop {
                if !fields.is_empty() {
                    if !self.peek_is(TokenKind::Comma) {
                        break;
                    }
                    self.next_token()?;
                }

                if fields.len() >= MAX_COLUMNS {
                    return Err(ParseError::Syntax("Too many columns in SELECT"));
                }

                let field = self
                    .parse_column_ref()?
                    .ok_or(ParseError::Syntax("Expected column name or '*' in SELECT"))?;
                fields.push(field);
            }
        }

        self.expect_keyword(Keyword::From, "Expected 'FROM' after field list")?;
        let table = self.expect_ident("Expected table name")?;

        let mut join = None;
        if self.peek_is_keyword(Keyword::Join) {
            self.next_token()?;
            let join_table = self.expect_ident("Expected table name after JOIN")?;
            self.expect_keyword(Keyword::On, "Expected 'ON' after JOIN table")?;
            let left = self
                .parse_column_ref()?
                .ok_or(ParseError::Syntax("Expected left join column in ON"))?;
            self.expect_kind(TokenKind::Equals, "Expected '=' in ON")?;
            let right = self
                .parse_column_ref()?
                .ok_or(ParseError::Syntax("Expected right join column in ON"))?;
            join = Some(Join {
                table: join_table,
                left,
                right,
            });
        }

        let predicate = self.parse_optional_where()?;

        self.expect_kind(TokenKind::Semicolon, "Expected ';' at end of SELECT")?;

        Ok(Statement::Select(SelectStmt {
            table,
            fields,
            join,
            predicate,
        }))
    }

    // Syntax: UPDATE <table> SET <col> = <val>, ... [WHERE <col> = <val>];
    fn parse_update(&mut self) -> Result<Statement<'a>, ParseError> {
        let table = self.expect_ident("Expected table name")?;
        self.expect_keyword(Keyword::Set, "Expected 'SET' after table name")?;

        let mut assignments = Vec::new();
        loop {
            if !assignments.is_empty() {
                if !self.peek_is(TokenKind::Comma) {
                    break;
                }
                self.next_token()?;
            }

            if assignments.len() >= MAX_COLUMNS {
                return Err(ParseError::Syntax("Too many assignments"));
            }

            let column = self.expect_ident("Expected column name in SET")?;
            self.expect_kind(TokenKind::Equals, "Expected '=' in SET")?;
            let value = self.expect_literal("Expected value in SET")?;
            assignments.push(Assignment { column, value });
        }

        let predicate = self.parse_optional_where()?;

        self.expect_kind(TokenKind::Semicolon, "Expected ';' at end")?;

        Ok(Statement::Update(UpdateStmt {
            table,
            assignments,
            predicate,
        }))
    }

    // Syntax: DELETE FROM <table> [WHERE <col> = <val>];
    fn parse_delete(&mut self) -> Result<Statement<'a>, ParseError> {
        self.expect_keyword(Keyword::From, "Expected 'FROM' after DELETE")?;
        let table = self.expect_ident("Expected table name")?;

        let predicate = self.parse_optional_where()?;

        self.expect_kind(TokenKind::Semicolon, "Expected ';'")?;

        Ok(Statement::Delete(DeleteStmt { table, predicate }))
    }

    /// Parses `[table.]column`, or returns `None` when the next token is not
    /// an identifier (nothing is consumed in that case).
    fn parse_column_ref(&mut self) -> Result<Option<ColumnRef<'a>>, ParseError> {
        let first = match self.peek()? {
            Some(TokenKind::Identifier(name)) => name,
            _ => return Ok(None),
        };
        self.next_token()?;

        if self.peek_is(TokenKind::Dot) {
            self.next_token()?;
            let column = self.expect_ident("Expected column name after '.'")?;
            Ok(Some(ColumnRef {
                table: Some(first),
                column,
            }))
        } else {
            Ok(Some(ColumnRef {
                table: None,
                column: first,
            }))
        }
    }

    /// Parses `WHERE <col> = <literal>` when a WHERE keyword is next.
    fn parse_optional_where(&mut self) -> Result<Option<Predicate<'a>>, ParseError> {
        if !self.peek_is_keyword(Keyword::Where) {
            return Ok(None);
        }
        self.next_token()?;

        let column = self
            .parse_column_ref()?
            .ok_or(ParseError::Syntax("Expected column in WHERE"))?;
        self.expect_kind(TokenKind::Equals, "Expected '=' in WHERE")?;
        let value = self.expect_literal("Expected value in WHERE")?;

        Ok(Some(Predicate { column, value }))
    }

    fn next_token(&mut self) -> Result<Option<Token<'a>>, ParseError> {
        self.lexer.next().transpose()
    }

    fn peek(&mut self) -> Result<Option<TokenKind<'a>>, ParseError> {
        match self.lexer.peek() {
            Some(Ok(token)) => Ok(Some(token.kind)),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(None),
        }
    }

    fn peek_is(&mut self, kind: TokenKind<'_>) -> bool {
        matches!(self.lexer.peek(), Some(Ok(token)) if token.kind == kind)
    }

    fn peek_is_keyword(&mut self, keyword: Keyword) -> bool {
        self.peek_is(TokenKind::Keyword(keyword))
    }

    fn expect_kind(
        &mut self,
        kind: TokenKind<'_>,
        message: &'static str,
    ) -> Result<(), ParseError> {
        match self.next_token()? {
            Some(token) if token.kind == kind => Ok(()),
            _ => Err(ParseError::Syntax(message)),
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword, message: &'static str) -> Result<(), ParseError> {
        self.expect_kind(TokenKind::Keyword(keyword), message)
    }

    fn expect_ident(&mut self, message: &'static str) -> Result<&'a str, ParseError> {
        match self.next_token()? {
            Some(Token {
                kind: TokenKind::Identifier(name),
                ..
            }) => Ok(name),
            _ => Err(ParseError::Syntax(message)),
        }
    }

    /// An integer or string literal, as raw text.
    fn expect_literal(&mut self, message: &'static str) -> Result<&'a str, ParseError> {
        match self.next_token()? {
            Some(Token {
                kind: TokenKind::Number(text) | TokenKind::String(text),
                ..
            }) => Ok(text),
            _ => Err(ParseError::Syntax(message)),
        }
    }
}
