use crate::catalog::{Index, Table};
use crate::database::Database;
use crate::error::EngineError;
use crate::outcome::ExecOutcome;
use crate::row::{self, PredicateValue};
use pager::Pager;
use sql::ast::{ColumnRef, DataType, SelectStmt};
use std::io::Write;

/// Which table of a (possibly joined) SELECT a resolved column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Main,
    Joined,
}

/// Resolves `[table.]column` against the statement's tables: an explicit
/// qualifier must name one of them (and the column must exist there); a
/// bare column goes to the first table that has it.
fn resolve_column(
    t1: &Table,
    t2: Option<&Table>,
    cref: &ColumnRef<'_>,
) -> Option<(Side, usize)> {
    if let Some(qualifier) = cref.table {
        if t1.name.eq_ignore_ascii_case(qualifier) {
            return t1.col_index(cref.column).map(|i| (Side::Main, i));
        }
        if let Some(t2) = t2 {
            if t2.name.eq_ignore_ascii_case(qualifier) {
                return t2.col_index(cref.column).map(|i| (Side::Joined, i));
            }
        }
        return None;
    }

    if let Some(i) = t1.col_index(cref.column) {
        return Some((Side::Main, i));
    }
    t2.and_then(|t2| t2.col_index(cref.column).map(|i| (Side::Joined, i)))
}

pub(super) fn execute_select(
    db: &mut Database,
    stmt: &SelectStmt<'_>,
    out: &mut dyn Write,
) -> Result<ExecOutcome, EngineError> {
    let Some(t1_idx) = db.find_table_index(stmt.table) else {
        return Ok(ExecOutcome::TableNotExists);
    };
    let t2_idx = match &stmt.join {
        Some(join) => match db.find_table_index(join.table) {
            Some(i) => Some(i),
            None => return Ok(ExecOutcome::TableNotExists),
        },
        None => None,
    };

    let t1 = &db.tables[t1_idx];
    let t2 = t2_idx.map(|i| &db.tables[i]);

    // Output projection: `*` is every t1 column then every t2 column.
    let mut output: Vec<(Side, usize)> = Vec::new();
    if stmt.fields.is_empty() {
        output.extend((0..t1.columns.len()).map(|i| (Side::Main, i)));
        if let Some(t2) = t2 {
            output.extend((0..t2.columns.len()).map(|i| (Side::Joined, i)));
        }
    } else {
        for field in &stmt.fields {
            match resolve_column(t1, t2, field) {
                Some(target) => output.push(target),
                None => return Ok(ExecOutcome::ColumnNotFound),
            }
        }
    }

    // A single-table WHERE on an indexed column takes the lookup path.
    if let (Some(pred), None) = (&stmt.predicate, &stmt.join) {
        let found = db.indexes.iter().find(|idx| {
            idx.table.eq_ignore_ascii_case(&t1.name)
                && idx.column.eq_ignore_ascii_case(pred.column.column)
        });
        if let Some(index) = found {
            if let Some(col_idx) = t1.col_index(&index.column) {
                return index_lookup(
                    &mut db.pager,
                    t1,
                    index,
                    t1.columns[col_idx].ty,
                    pred.value,
                    &output,
                    out,
                );
            }
        }
    }

    full_scan(&mut db.pager, t1, t2, stmt, &output, out)
}

/// Index path: matching index entries name the PKs to fetch; both scans are
/// linear over a single leaf.
/// TODO replace with an ordered tree descent once pages split.
fn index_lookup(
    pager: &mut Pager,
    t1: &Table,
    index: &Index,
    indexed_ty: DataType,
    where_value: &str,
    output: &[(Side, usize)],
    out: &mut dyn Write,
) -> Result<ExecOutcome, EngineError> {
    let search_key = row::encode_key(indexed_ty, where_value);

    let mut pk_keys: Vec<Vec<u8>> = Vec::new();
    {
        let page = pager.page(index.root_page)?;
        for i in 0..page.num_cells()? {
            if !page.is_live(i)? {
                continue;
            }
            let cell = page.cell(i)?;
            if cell.key == search_key.as_slice() {
                pk_keys.push(cell.value.to_vec());
            }
        }
    }

    let mut row_vals: Vec<String> = Vec::new();
    let page = pager.page(t1.root_page)?;
    for pk in &pk_keys {
        for i in 0..page.num_cells()? {
            if !page.is_live(i)? {
                continue;
            }
            let cell = page.cell(i)?;
            if cell.key != pk.as_slice() {
                continue;
            }
            row::decode_into(&t1.columns, cell.value, &mut row_vals)?;
            if !emit_row(out, output, t1, None, &row_vals, &[]) {
                return Ok(ExecOutcome::Success);
            }
        }
    }

    Ok(ExecOutcome::Success)
}

/// Full-scan path: linear over t1, nested-loop over t2 when joined.
fn full_scan(
    pager: &mut Pager,
    t1: &Table,
    t2: Option<&Table>,
    stmt: &SelectStmt<'_>,
    output: &[(Side, usize)],
    out: &mut dyn Write,
) -> Result<ExecOutcome, EngineError> {
    let mut where_target: Option<(Side, usize, PredicateValue<'_>)> = None;
    if let Some(pred) = &stmt.predicate {
        let Some((side, col)) = resolve_column(t1, t2, &pred.column) else {
            return Ok(ExecOutcome::ColumnNotFound);
        };
        let ty = match (side, t2) {
            (Side::Main, _) => t1.columns[col].ty,
            (Side::Joined, Some(t2)) => t2.columns[col].ty,
            // resolve_column never yields Joined without a join table.
            (Side::Joined, None) => return Ok(ExecOutcome::ColumnNotFound),
        };
        where_target = Some((side, col, PredicateValue::new(ty, pred.value)));
    }

    let mut join_cols: Option<((Side, usize), (Side, usize))> = None;
    if let Some(join) = &stmt.join {
        let Some(left) = resolve_column(t1, t2, &join.left) else {
            return Ok(ExecOutcome::ColumnNotFound);
        };
        let Some(right) = resolve_column(t1, t2, &join.right) else {
            return Ok(ExecOutcome::ColumnNotFound);
        };
        join_cols = Some((left, right));
    }

    let num1 = pager.page(t1.root_page)?.num_cells()?;
    let num2 = match t2 {
        Some(t2) => pager.page(t2.root_page)?.num_cells()?,
        None => 0,
    };

    let mut t1_vals: Vec<String> = Vec::new();
    let mut t2_vals: Vec<String> = Vec::new();

    for i in 0..num1 {
        {
            let page = pager.page(t1.root_page)?;
            if !page.is_live(i)? {
                continue;
            }
            let cell = page.cell(i)?;
            if let Some((Side::Main, col, target)) = where_target {
                if !row::row_matches_predicate(&t1.columns, cell.value, col, target)? {
                    continue;
                }
            }
            row::decode_into(&t1.columns, cell.value, &mut t1_vals)?;
        }

        if let Some(t2) = t2 {
            for j in 0..num2 {
                {
                    let page = pager.page(t2.root_page)?;
                    if !page.is_live(j)? {
                        continue;
                    }
                    let cell = page.cell(j)?;
                    if let Some((Side::Joined, col, target)) = where_target {
                        if !row::row_matches_predicate(&t2.columns, cell.value, col, target)? {
                            continue;
                        }
                    }
                    row::decode_into(&t2.columns, cell.value, &mut t2_vals)?;
                }

                if let Some((left, right)) = join_cols {
                    let left_val = side_value(left, &t1_vals, &t2_vals);
                    let right_val = side_value(right, &t1_vals, &t2_vals);
                    if left_val != right_val {
                        continue;
                    }
                }

                if !emit_row(out, output, t1, Some(t2), &t1_vals, &t2_vals) {
                    return Ok(ExecOutcome::Success);
                }
            }
        } else if !emit_row(out, output, t1, None, &t1_vals, &[]) {
            return Ok(ExecOutcome::Success);
        }
    }

    Ok(ExecOutcome::Success)
}

fn side_value<'v>(target: (Side, usize), t1_vals: &'v [String], t2_vals: &'v [String]) -> &'v str {
    match target.0 {
        Side::Main => &t1_vals[target.1],
        Side::Joined => &t2_vals[target.1],
    }
}

/// Formats one output row as `(v1, v2, …)\n` (TEXT double-quoted) and
/// writes it to the sink. A rejected write means the client is gone; the
/// caller ends the result set as a success.
fn emit_row(
    out: &mut dyn Write,
    output: &[(Side, usize)],
    t1: &Table,
    t2: Option<&Table>,
    t1_vals: &[String],
    t2_vals: &[String],
) -> bool {
    let mut line = String::from("(");

    for (pos, &(side, col)) in output.iter().enumerate() {
        let (table, vals): (&Table, &[String]) = match side {
            Side::Main => (t1, t1_vals),
            Side::Joined => match t2 {
                Some(t2) => (t2, t2_vals),
                None => continue,
            },
        };

        if pos > 0 {
            line.push_str(", ");
        }
        let is_text = table.columns[col].ty == DataType::Text;
        row::push_formatted(&mut line, &vals[col], is_text);
    }

    line.push_str(")\n");
    out.write_all(line.as_bytes()).is_ok()
}
