use crate::database::Database;
use crate::error::EngineError;
use crate::outcome::ExecOutcome;
use crate::row::{self, PredicateValue};
use sql::ast::DeleteStmt;

pub(super) fn execute_delete(
    db: &mut Database,
    stmt: &DeleteStmt<'_>,
) -> Result<ExecOutcome, EngineError> {
    let Some(t_idx) = db.find_table_index(stmt.table) else {
        return Ok(ExecOutcome::TableNotExists);
    };
    let table = &db.tables[t_idx];

    // No WHERE deletes every row.
    let mut target: Option<(usize, PredicateValue<'_>)> = None;
    if let Some(pred) = &stmt.predicate {
        let Some(col) = table.col_index(pred.column.column) else {
            return Ok(ExecOutcome::ColumnNotFound);
        };
        target = Some((col, PredicateValue::new(table.columns[col].ty, pred.value)));
    }

    let pk_idx = table.primary_key_index();
    let pk_ty = table.columns[pk_idx].ty;

    let num_cells = db.pager.page(table.root_page)?.num_cells()?;
    let mut row_vals: Vec<String> = Vec::new();
    let mut deleted = 0usize;

    for i in 0..num_cells {
        {
            let page = db.pager.page(table.root_page)?;
            if !page.is_live(i)? {
                continue;
            }
            let cell = page.cell(i)?;
            if let Some((col, value)) = target {
                if !row::row_matches_predicate(&table.columns, cell.value, col, value)? {
                    continue;
                }
            }
            row::decode_into(&table.columns, cell.value, &mut row_vals)?;
        }

        // Every index loses its entry for this row before the row's own
        // slot is tombstoned.
        let pk_key = row::encode_key(pk_ty, &row_vals[pk_idx]);
        for index in &db.indexes {
            if !index.table.eq_ignore_ascii_case(&table.name) {
                continue;
            }
            let Some(col_idx) = table.col_index(&index.column) else {
                continue;
            };
            let entry_key = row::encode_key(table.columns[col_idx].ty, &row_vals[col_idx]);

            let mut found = None;
            {
                let page = db.pager.page(index.root_page)?;
                for k in 0..page.num_cells()? {
                    if !page.is_live(k)? {
                        continue;
                    }
                    let cell = page.cell(k)?;
                    if cell.key == entry_key.as_slice() && cell.value == pk_key.as_slice() {
                        found = Some(k);
                        break;
                    }
                }
                if let Some(k) = found {
                    page.tombstone(k)?;
                }
            }
            if found.is_some() {
                db.pager.flush(index.root_page)?;
            }
        }

        db.pager.page(table.root_page)?.tombstone(i)?;
        deleted += 1;
    }

    if deleted > 0 {
        db.pager.flush(table.root_page)?;
    }

    Ok(ExecOutcome::Success)
}
