use crate::catalog::{self, ColumnDef, Table};
use crate::database::{CATALOG_PAGE, Database, MAX_TABLES};
use crate::error::EngineError;
use crate::outcome::ExecOutcome;
use sql::ast::CreateTableStmt;

pub(super) fn execute_create_table(
    db: &mut Database,
    stmt: &CreateTableStmt<'_>,
) -> Result<ExecOutcome, EngineError> {
    if db.find_table(stmt.table).is_some() {
        return Ok(ExecOutcome::TableExists);
    }

    // The new table's root: a fresh, empty leaf, durable before the catalog
    // references it.
    let root_page = db.pager.allocate_page();
    {
        let page = db.pager.page(root_page)?;
        page.init_leaf()?;
        page.set_root(true)?;
    }
    db.pager.flush(root_page)?;

    let columns: Vec<ColumnDef> = stmt
        .columns
        .iter()
        .map(|col| ColumnDef {
            name: col.name.to_string(),
            ty: col.ty,
            is_primary_key: col.is_primary_key,
            is_unique: col.is_unique,
        })
        .collect();

    let blob = catalog::serialize_table_schema(root_page, &columns);
    {
        let page = db.pager.page(CATALOG_PAGE)?;
        match page.insert(stmt.table.as_bytes(), &blob) {
            Ok(()) => {}
            Err(e) if e.is_page_full() => return Ok(ExecOutcome::DbFull),
            Err(e) => return Err(e.into()),
        }
    }

    if db.tables.len() >= MAX_TABLES {
        return Ok(ExecOutcome::TableFull);
    }
    db.tables.push(Table {
        name: stmt.table.to_string(),
        root_page,
        columns,
    });

    db.pager.flush(CATALOG_PAGE)?;

    tracing::debug!(table = stmt.table, root_page, "created table");
    Ok(ExecOutcome::Success)
}
