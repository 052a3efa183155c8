use crate::catalog::{self, Index};
use crate::database::{CATALOG_PAGE, Database, MAX_INDEXES};
use crate::error::EngineError;
use crate::outcome::ExecOutcome;
use crate::row;
use sql::ast::CreateIndexStmt;

pub(super) fn execute_create_index(
    db: &mut Database,
    stmt: &CreateIndexStmt<'_>,
) -> Result<ExecOutcome, EngineError> {
    let Some(t_idx) = db.find_table_index(stmt.table) else {
        return Ok(ExecOutcome::TableNotExists);
    };
    let table = &db.tables[t_idx];

    let Some(col_idx) = table.col_index(stmt.column) else {
        return Ok(ExecOutcome::ColumnNotFound);
    };

    if db.indexes.len() >= MAX_INDEXES {
        return Ok(ExecOutcome::DbFull);
    }

    let root_page = db.pager.allocate_page();
    {
        let page = db.pager.page(root_page)?;
        page.init_leaf()?;
        page.set_root(true)?;
    }
    db.pager.flush(root_page)?;

    let pk_idx = table.primary_key_index();
    let col_ty = table.columns[col_idx].ty;
    let pk_ty = table.columns[pk_idx].ty;

    // Backfill: one (column key, pk key) entry per live row.
    let mut entries: Vec<(Vec<u8>, Vec<u8>)> = Vec::new();
    {
        let page = db.pager.page(table.root_page)?;
        let mut row_vals: Vec<String> = Vec::new();
        for i in 0..page.num_cells()? {
            if !page.is_live(i)? {
                continue;
            }
            let cell = page.cell(i)?;
            row::decode_into(&table.columns, cell.value, &mut row_vals)?;
            entries.push((
                row::encode_key(col_ty, &row_vals[col_idx]),
                row::encode_key(pk_ty, &row_vals[pk_idx]),
            ));
        }
    }

    {
        let page = db.pager.page(root_page)?;
        for (key, value) in &entries {
            if let Err(e) = page.insert(key, value) {
                if e.is_page_full() {
                    tracing::warn!(
                        index = stmt.index,
                        "index page full during backfill; entry dropped"
                    );
                } else {
                    return Err(e.into());
                }
            }
        }
    }
    db.pager.flush(root_page)?;

    // Persist the index in the catalog page so a restart rebuilds it.
    let column_name = table.columns[col_idx].name.clone();
    let blob = catalog::serialize_index_entry(root_page, &table.name, &column_name);
    {
        let page = db.pager.page(CATALOG_PAGE)?;
        match page.insert(stmt.index.as_bytes(), &blob) {
            Ok(()) => {}
            Err(e) if e.is_page_full() => return Ok(ExecOutcome::DbFull),
            Err(e) => return Err(e.into()),
        }
    }
    db.pager.flush(CATALOG_PAGE)?;

    let table_name = table.name.clone();
    db.indexes.push(Index {
        name: stmt.index.to_string(),
        table: table_name,
        column: column_name,
        root_page,
    });

    tracing::debug!(
        index = stmt.index,
        table = stmt.table,
        entries = entries.len(),
        "created index"
    );
    Ok(ExecOutcome::Success)
}
