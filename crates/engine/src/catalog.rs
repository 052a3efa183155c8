//! Catalog metadata and its page-0 persistence format.
//!
//! Page 0 is an ordinary slotted leaf holding one cell per table and one per
//! index. A table cell's key is the table name; its value is the schema
//! blob:
//!
//! ```text
//! root_page u32 | col_count u32 | per column:
//!     type u32 (0 = INT, 1 = TEXT) | name_len u32 | name bytes | is_pk u8 | is_unique u8
//! ```
//!
//! An index cell's key is the index name; its value reuses the first two
//! words with `col_count = 0` as the discriminator (a table always has at
//! least one column):
//!
//! ```text
//! root_page u32 | 0 u32 | table_name_len u32 | table_name | col_name_len u32 | col_name
//! ```

use crate::error::CatalogError;
use binary_helpers::le::read_le;
use sql::ast::DataType;

/// One column of a table schema, owned by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub ty: DataType,
    pub is_primary_key: bool,
    pub is_unique: bool,
}

/// An in-memory catalog entry for a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    /// The single leaf page holding all of this table's rows.
    pub root_page: u32,
    pub columns: Vec<ColumnDef>,
}

impl Table {
    /// Finds a column by name, case-insensitively.
    pub fn col_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|col| col.name.eq_ignore_ascii_case(name))
    }

    /// The primary-key column: the first column flagged PRIMARY KEY, or
    /// column 0 when none is flagged.
    pub fn primary_key_index(&self) -> usize {
        self.columns
            .iter()
            .position(|col| col.is_primary_key)
            .unwrap_or(0)
    }
}

/// An in-memory catalog entry for a secondary index. The index root leaf
/// maps key-encoded column values to key-encoded primary keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    pub table: String,
    pub column: String,
    pub root_page: u32,
}

/// A decoded page-0 cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    Table(Table),
    Index(Index),
}

fn data_type_to_u32(ty: DataType) -> u32 {
    match ty {
        DataType::Int => 0,
        DataType::Text => 1,
    }
}

fn data_type_from_u32(raw: u32) -> Result<DataType, CatalogError> {
    match raw {
        0 => Ok(DataType::Int),
        1 => Ok(DataType::Text),
        other => Err(CatalogError::UnknownColumnType { raw: other }),
    }
}

/// Serializes a table's schema blob (the page-0 cell value).
pub fn serialize_table_schema(root_page: u32, columns: &[ColumnDef]) -> Vec<u8> {
    let mut blob = Vec::new();
    blob.extend_from_slice(&root_page.to_le_bytes());
    blob.extend_from_slice(&(columns.len() as u32).to_le_bytes());

    for col in columns {
        blob.extend_from_slice(&data_type_to_u32(col.ty).to_le_bytes());
        blob.extend_from_slice(&(col.name.len() as u32).to_le_bytes());
        blob.extend_from_slice(col.name.as_bytes());
        blob.push(u8::from(col.is_primary_key));
        blob.push(u8::from(col.is_unique));
    }

    blob
}

/// Serializes an index's page-0 cell value.
pub fn serialize_index_entry(root_page: u32, table: &str, column: &str) -> Vec<u8> {
    let mut blob = Vec::new();
    blob.extend_from_slice(&root_page.to_le_bytes());
    blob.extend_from_slice(&0u32.to_le_bytes());
    blob.extend_from_slice(&(table.len() as u32).to_le_bytes());
    blob.extend_from_slice(table.as_bytes());
    blob.extend_from_slice(&(column.len() as u32).to_le_bytes());
    blob.extend_from_slice(column.as_bytes());
    blob
}

/// Decodes one page-0 cell back into a catalog entry. `name` is the cell
/// key; the blob's second word picks the entry kind.
pub fn deserialize_entry(name: &str, blob: &[u8]) -> Result<CatalogEntry, CatalogError> {
    let mut cursor = Cursor::new(blob);

    let root_page = cursor.read_u32()?;
    let col_count = cursor.read_u32()? as usize;

    if col_count == 0 {
        let table = cursor.read_string()?;
        let column = cursor.read_string()?;
        return Ok(CatalogEntry::Index(Index {
            name: name.to_string(),
            table,
            column,
            root_page,
        }));
    }

    let mut columns = Vec::with_capacity(col_count);
    for _ in 0..col_count {
        let ty = data_type_from_u32(cursor.read_u32()?)?;
        let name = cursor.read_string()?;
        let is_primary_key = cursor.read_u8()? != 0;
        let is_unique = cursor.read_u8()? != 0;
        columns.push(ColumnDef {
            name,
            ty,
            is_primary_key,
            is_unique,
        });
    }

    Ok(CatalogEntry::Table(Table {
        name: name.to_string(),
        root_page,
        columns,
    }))
}

/// A bounds-checked read cursor over a schema blob.
#[derive(Debug)]
struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    fn read_u32(&mut self) -> Result<u32, CatalogError> {
        let value = read_le::<u32>(self.bytes, self.offset)?;
        self.offset += 4;
        Ok(value)
    }

    fn read_u8(&mut self) -> Result<u8, CatalogError> {
        let value = read_le::<u8>(self.bytes, self.offset)?;
        self.offset += 1;
        Ok(value)
    }

    fn read_string(&mut self) -> Result<String, CatalogError> {
        let len = self.read_u32()? as usize;
        let bytes = self
            .bytes
            .get(self.offset..self.offset + len)
            .ok_or(CatalogError::TruncatedBlob {
                at: self.offset,
                wanted: len,
            })?;
        self.offset += len;
        String::from_utf8(bytes.to_vec()).map_err(|_| CatalogError::InvalidName)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef {
                name: "id".to_string(),
                ty: DataType::Int,
                is_primary_key: true,
                is_unique: false,
            },
            ColumnDef {
                name: "name".to_string(),
                ty: DataType::Text,
                is_primary_key: false,
                is_unique: true,
            },
        ]
    }

    #[test]
    fn table_schema_roundtrips() {
        let columns = sample_columns();
        let blob = serialize_table_schema(3, &columns);

        let entry = deserialize_entry("users", &blob).unwrap();
        assert_eq!(
            entry,
            CatalogEntry::Table(Table {
                name: "users".to_string(),
                root_page: 3,
                columns,
            })
        );
    }

    #[test]
    fn index_entry_roundtrips() {
        let blob = serialize_index_entry(7, "users", "name");

        let entry = deserialize_entry("by_name", &blob).unwrap();
        assert_eq!(
            entry,
            CatalogEntry::Index(Index {
                name: "by_name".to_string(),
                table: "users".to_string(),
                column: "name".to_string(),
                root_page: 7,
            })
        );
    }

    #[test]
    fn truncated_blob_is_an_error() {
        let columns = sample_columns();
        let blob = serialize_table_schema(3, &columns);

        assert!(deserialize_entry("users", &blob[..blob.len() - 3]).is_err());
    }

    #[test]
    fn unknown_column_type_is_an_error() {
        let mut blob = Vec::new();
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&1u32.to_le_bytes());
        blob.extend_from_slice(&9u32.to_le_bytes()); // bogus type tag

        assert!(matches!(
            deserialize_entry("t", &blob),
            Err(CatalogError::UnknownColumnType { raw: 9 })
        ));
    }

    #[test]
    fn column_lookup_is_case_insensitive() {
        let table = Table {
            name: "users".to_string(),
            root_page: 1,
            columns: sample_columns(),
        };
        assert_eq!(table.col_index("NAME"), Some(1));
        assert_eq!(table.col_index("missing"), None);
    }

    #[test]
    fn primary_key_defaults_to_first_column() {
        let mut columns = sample_columns();
        columns[0].is_primary_key = false;
        let table = Table {
            name: "t".to_string(),
            root_page: 1,
            columns,
        };
        assert_eq!(table.primary_key_index(), 0);
    }
}
