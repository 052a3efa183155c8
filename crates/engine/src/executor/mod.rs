//! Statement execution.
//!
//! One public operation, [`execute`]: structural dispatch over the parsed
//! statement. Every mutation path follows the write-through rule — the
//! touched page is flushed before the outcome is returned — and index
//! maintenance happens before the owning row's slot is modified.

use crate::database::Database;
use crate::error::EngineError;
use crate::outcome::ExecOutcome;
use sql::ast::Statement;
use std::io::Write;

mod create_index;
mod create_table;
mod delete;
mod insert;
mod select;
mod update;

/// Executes one statement against the database, streaming any result rows
/// to `out`. The caller holds whatever exclusion the deployment requires;
/// the executor itself assumes it is alone with the database.
pub fn execute(
    db: &mut Database,
    statement: &Statement<'_>,
    out: &mut dyn Write,
) -> Result<ExecOutcome, EngineError> {
    match statement {
        Statement::CreateTable(stmt) => create_table::execute_create_table(db, stmt),
        Statement::CreateIndex(stmt) => create_index::execute_create_index(db, stmt),
        Statement::Insert(stmt) => insert::execute_insert(db, stmt),
        Statement::Select(stmt) => select::execute_select(db, stmt, out),
        Statement::Update(stmt) => update::execute_update(db, stmt),
        Statement::Delete(stmt) => delete::execute_delete(db, stmt),
    }
}
