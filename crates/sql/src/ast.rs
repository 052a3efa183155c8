//! The statement AST the parser hands to the executor.
//!
//! Everything borrows from the statement text. Literal values stay as the
//! raw text the client sent (integer literals included); the executor
//! interprets them against the column type at execution time.

/// Upper bound on columns per table, values per INSERT, fields per SELECT
/// and assignments per UPDATE.
pub const MAX_COLUMNS: usize = 16;

/// The two column types the storage format knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Int,
    Text,
}

/// One column declaration in a CREATE TABLE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef<'a> {
    pub name: &'a str,
    pub ty: DataType,
    pub is_primary_key: bool,
    pub is_unique: bool,
}

/// A `[table.]column` reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef<'a> {
    pub table: Option<&'a str>,
    pub column: &'a str,
}

/// A single `column = literal` WHERE term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicate<'a> {
    pub column: ColumnRef<'a>,
    pub value: &'a str,
}

/// `JOIN table ON left = right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Join<'a> {
    pub table: &'a str,
    pub left: ColumnRef<'a>,
    pub right: ColumnRef<'a>,
}

/// One `column = literal` assignment in an UPDATE SET list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub column: &'a str,
    pub value: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableStmt<'a> {
    pub table: &'a str,
    pub columns: Vec<ColumnDef<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateIndexStmt<'a> {
    pub index: &'a str,
    pub table: &'a str,
    pub column: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStmt<'a> {
    pub table: &'a str,
    pub values: Vec<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectStmt<'a> {
    pub table: &'a str,
    /// Projected fields; empty means `*` (all columns, join table's after
    /// the main table's).
    pub fields: Vec<ColumnRef<'a>>,
    pub join: Option<Join<'a>>,
    pub predicate: Option<Predicate<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStmt<'a> {
    pub table: &'a str,
    pub assignments: Vec<Assignment<'a>>,
    pub predicate: Option<Predicate<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteStmt<'a> {
    pub table: &'a str,
    pub predicate: Option<Predicate<'a>>,
}

/// A parsed statement. Dispatch in the executor is structural on this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    CreateTable(CreateTableStmt<'a>),
    CreateIndex(CreateIndexStmt<'a>),
    Insert(InsertStmt<'a>),
    Select(SelectStmt<'a>),
    Update(UpdateStmt<'a>),
    Delete(DeleteStmt<'a>),
}
