//! Cell parsing: the key/value payload a slot points at.
//!
//! A cell is stored in the heap as `key_len: u32 LE | key bytes | value
//! bytes`; the owning slot's `size` covers the whole cell, so the value
//! length is implicit (`size - 4 - key_len`).

use crate::errors::cell_error::CellError;
use binary_helpers::le::read_le;

/// Number of bytes the key-length prefix occupies at the start of a cell.
pub const CELL_KEY_LEN_SIZE: usize = 4;

/// A zero-copy view of one cell: borrowed key and value slices into the page.
#[derive(Debug)]
pub struct CellRef<'a> {
    /// The cell key (table PK bytes, catalog table name, or index key).
    pub key: &'a [u8],
    /// The cell value (serialized row, schema blob, or index PK value).
    pub value: &'a [u8],
}

impl<'a> CellRef<'a> {
    /// Parses a cell out of the `bytes` a slot claims.
    ///
    /// Fails when the length prefix overruns the slot's extent, which means
    /// the page is corrupt.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, CellError> {
        let key_len = read_le::<u32>(bytes, 0)? as usize;

        let key_end = CELL_KEY_LEN_SIZE + key_len;
        if key_end > bytes.len() {
            return Err(CellError::KeyOverrunsCell {
                key_len,
                cell_len: bytes.len(),
            });
        }

        Ok(CellRef {
            key: &bytes[CELL_KEY_LEN_SIZE..key_end],
            value: &bytes[key_end..],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_key_and_value() {
        let mut bytes = vec![3, 0, 0, 0];
        bytes.extend_from_slice(b"abc");
        bytes.extend_from_slice(b"value!");

        let cell = CellRef::parse(&bytes).unwrap();
        assert_eq!(cell.key, b"abc");
        assert_eq!(cell.value, b"value!");
    }

    #[test]
    fn parse_accepts_empty_value() {
        let mut bytes = vec![2, 0, 0, 0];
        bytes.extend_from_slice(b"hi");

        let cell = CellRef::parse(&bytes).unwrap();
        assert_eq!(cell.key, b"hi");
        assert!(cell.value.is_empty());
    }

    #[test]
    fn parse_rejects_overlong_key() {
        let bytes = vec![9, 0, 0, 0, b'x'];
        assert!(matches!(
            CellRef::parse(&bytes),
            Err(CellError::KeyOverrunsCell {
                key_len: 9,
                cell_len: 5
            })
        ));
    }
}
