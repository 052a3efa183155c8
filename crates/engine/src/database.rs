//! The `Database`: pager plus the in-memory catalog lists.

use crate::catalog::{self, CatalogEntry, Index, Table};
use crate::error::EngineError;
use pager::Pager;
use std::path::Path;

/// Cap on tables the in-memory catalog holds.
pub const MAX_TABLES: usize = 100;
/// Cap on secondary indexes.
pub const MAX_INDEXES: usize = 20;
/// Page number of the catalog root.
pub const CATALOG_PAGE: u32 = 0;

/// The process-wide database: the pager, and the table/index lists rebuilt
/// from page 0 at startup. The server wraps this in a single mutex; the
/// executor requires exclusive access for the duration of one statement.
#[derive(Debug)]
pub struct Database {
    pub(crate) pager: Pager,
    pub(crate) tables: Vec<Table>,
    pub(crate) indexes: Vec<Index>,
}

impl Database {
    /// Opens the database file. An empty file gets page 0 formatted as the
    /// catalog root; a non-empty one has its catalog decoded back into
    /// memory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let mut pager = Pager::open(path)?;

        let mut tables = Vec::new();
        let mut indexes = Vec::new();

        if pager.num_pages() == 0 {
            let page_num = pager.allocate_page();
            debug_assert_eq!(page_num, CATALOG_PAGE);
            let page = pager.page(page_num)?;
            page.init_leaf()?;
            page.set_root(true)?;
        } else {
            load_catalog(&mut pager, &mut tables, &mut indexes)?;
        }

        Ok(Self {
            pager,
            tables,
            indexes,
        })
    }

    /// The loaded tables, in catalog order.
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// The loaded indexes, in catalog order.
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Finds a table by name, case-insensitively.
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.find_table_index(name).map(|i| &self.tables[i])
    }

    pub(crate) fn find_table_index(&self, name: &str) -> Option<usize> {
        self.tables
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Rebuilds the in-memory catalog from page 0's live cells. Entries beyond
/// the caps and cells with undecodable names are dropped with a warning
/// rather than failing the boot.
fn load_catalog(
    pager: &mut Pager,
    tables: &mut Vec<Table>,
    indexes: &mut Vec<Index>,
) -> Result<(), EngineError> {
    let page = pager.page(CATALOG_PAGE)?;

    for i in 0..page.num_cells()? {
        if !page.is_live(i)? {
            continue;
        }
        let cell = page.cell(i)?;

        let Ok(name) = std::str::from_utf8(cell.key) else {
            tracing::warn!(slot = i, "catalog entry name is not UTF-8; skipping");
            continue;
        };

        match catalog::deserialize_entry(name, cell.value)? {
            CatalogEntry::Table(table) => {
                if tables.len() < MAX_TABLES {
                    tracing::info!(
                        table = %table.name,
                        columns = table.columns.len(),
                        root_page = table.root_page,
                        "loaded table"
                    );
                    tables.push(table);
                } else {
                    tracing::warn!("catalog contains more tables than memory cache can hold");
                }
            }
            CatalogEntry::Index(index) => {
                if indexes.len() < MAX_INDEXES {
                    tracing::info!(
                        index = %index.name,
                        table = %index.table,
                        column = %index.column,
                        "loaded index"
                    );
                    indexes.push(index);
                } else {
                    tracing::warn!("catalog contains more indexes than memory cache can hold");
                }
            }
        }
    }

    Ok(())
}
