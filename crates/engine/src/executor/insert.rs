use crate::database::Database;
use crate::error::EngineError;
use crate::outcome::ExecOutcome;
use crate::row;
use sql::ast::InsertStmt;

pub(super) fn execute_insert(
    db: &mut Database,
    stmt: &InsertStmt<'_>,
) -> Result<ExecOutcome, EngineError> {
    let Some(t_idx) = db.find_table_index(stmt.table) else {
        return Ok(ExecOutcome::TableNotExists);
    };
    let table = &db.tables[t_idx];

    if stmt.values.len() != table.columns.len() {
        return Ok(ExecOutcome::ColumnCountMismatch);
    }

    let pk_idx = table.primary_key_index();
    let pk_key = row::encode_key(table.columns[pk_idx].ty, stmt.values[pk_idx]);

    // PK uniqueness check over the live cells.
    // TODO replace the linear scan with an ordered search once the leaf
    // grows into a B-tree.
    {
        let page = db.pager.page(table.root_page)?;
        for i in 0..page.num_cells()? {
            if !page.is_live(i)? {
                continue;
            }
            if page.cell(i)?.key == pk_key.as_slice() {
                return Ok(ExecOutcome::DuplicateKey);
            }
        }
    }

    let row_bytes = row::serialize_row(&table.columns, &stmt.values);
    {
        let page = db.pager.page(table.root_page)?;
        match page.insert(&pk_key, &row_bytes) {
            Ok(()) => {}
            Err(e) if e.is_page_full() => return Ok(ExecOutcome::TableFull),
            Err(e) => return Err(e.into()),
        }
    }
    db.pager.flush(table.root_page)?;

    // Index maintenance is best-effort once the row itself is durable.
    for index in &db.indexes {
        if !index.table.eq_ignore_ascii_case(&table.name) {
            continue;
        }
        let Some(col_idx) = table.col_index(&index.column) else {
            continue;
        };

        let key = row::encode_key(table.columns[col_idx].ty, stmt.values[col_idx]);
        {
            let page = db.pager.page(index.root_page)?;
            if let Err(e) = page.insert(&key, &pk_key) {
                if e.is_page_full() {
                    tracing::warn!(index = %index.name, "index page full; entry dropped");
                } else {
                    return Err(e.into());
                }
            }
        }
        db.pager.flush(index.root_page)?;
    }

    Ok(ExecOutcome::Success)
}
