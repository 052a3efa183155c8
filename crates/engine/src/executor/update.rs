use crate::database::Database;
use crate::error::EngineError;
use crate::outcome::ExecOutcome;
use crate::row::{self, PredicateValue};
use sql::ast::UpdateStmt;

/// Cap on rows that can grow out of their slot in one UPDATE; matches the
/// bounded scratch area the re-insert queue lives in.
const MAX_PENDING_INSERTS: usize = 100;

pub(super) fn execute_update(
    db: &mut Database,
    stmt: &UpdateStmt<'_>,
) -> Result<ExecOutcome, EngineError> {
    let Some(t_idx) = db.find_table_index(stmt.table) else {
        return Ok(ExecOutcome::TableNotExists);
    };
    let table = &db.tables[t_idx];

    let mut target: Option<(usize, PredicateValue<'_>)> = None;
    if let Some(pred) = &stmt.predicate {
        let Some(col) = table.col_index(pred.column.column) else {
            return Ok(ExecOutcome::ColumnNotFound);
        };
        target = Some((col, PredicateValue::new(table.columns[col].ty, pred.value)));
    }

    let mut assign_cols = Vec::with_capacity(stmt.assignments.len());
    for assignment in &stmt.assignments {
        let Some(col) = table.col_index(assignment.column) else {
            return Ok(ExecOutcome::ColumnNotFound);
        };
        assign_cols.push(col);
    }

    let pk_idx = table.primary_key_index();
    let pk_ty = table.columns[pk_idx].ty;

    let num_cells = db.pager.page(table.root_page)?.num_cells()?;
    let mut row_vals: Vec<String> = Vec::new();
    // Rows that outgrow their slot wait here as (pk key, row bytes) and are
    // re-inserted after the in-place pass.
    let mut pending: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    let mut updated = 0usize;

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

        // Indexes over assigned columns swap old entry for new before the
        // row's own slot is touched.
        let pk_key = row::encode_key(pk_ty, &row_vals[pk_idx]);
        for index in &db.indexes {
            if !index.table.eq_ignore_ascii_case(&table.name) {
                continue;
            }
            let Some(idx_col) = table.col_index(&index.column) else {
                continue;
            };
            let Some(assign_pos) = assign_cols.iter().position(|&c| c == idx_col) else {
                continue;
            };

            let col_ty = table.columns[idx_col].ty;
            let old_key = row::encode_key(col_ty, &row_vals[idx_col]);
            let new_key = row::encode_key(col_ty, stmt.assignments[assign_pos].value);

            {
                let page = db.pager.page(index.root_page)?;
                let mut found = None;
                for k in 0..page.num_cells()? {
                    if !page.is_live(k)? {
                        continue;
                    }
                    let cell = page.cell(k)?;
                    if cell.key == old_key.as_slice() && cell.value == pk_key.as_slice() {
                        found = Some(k);
                        break;
                    }
                }
                if let Some(k) = found {
                    page.tombstone(k)?;
                }
                if let Err(e) = page.insert(&new_key, &pk_key) {
                    if e.is_page_full() {
                        tracing::warn!(index = %index.name, "index page full; entry dropped");
                    } else {
                        return Err(e.into());
                    }
                }
            }
            db.pager.flush(index.root_page)?;
        }

        for (pos, &col) in assign_cols.iter().enumerate() {
            row_vals[col] = stmt.assignments[pos].value.to_string();
        }

        let new_row = row::serialize_row(&table.columns, &row_vals);
        let new_pk_key = row::encode_key(pk_ty, &row_vals[pk_idx]);

        {
            let page = db.pager.page(table.root_page)?;
            if !page.replace_value(i, &new_row)? {
                // Doesn't fit in place: tombstone now, re-insert later.
                page.tombstone(i)?;
                if pending.len() < MAX_PENDING_INSERTS {
                    pending.push((new_pk_key, new_row));
                } else {
                    tracing::warn!("pending re-insert queue full; updated row dropped");
                }
            }
        }
        updated += 1;
    }

    if updated > 0 {
        db.pager.flush(table.root_page)?;
    }

    let had_pending = !pending.is_empty();
    {
        let page = db.pager.page(table.root_page)?;
        for (key, row_bytes) in &pending {
            if let Err(e) = page.insert(key, row_bytes) {
                if e.is_page_full() {
                    tracing::warn!("table page full while re-inserting grown row; row dropped");
                } else {
                    return Err(e.into());
                }
            }
        }
    }
    if had_pending {
        db.pager.flush(table.root_page)?;
    }

    Ok(ExecOutcome::Success)
}
