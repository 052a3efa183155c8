//! Row codec: typed cells in column-declaration order, no terminator.
//!
//! INT cells are 4-byte little-endian signed integers; TEXT cells are a
//! `u32 LE` length prefix followed by the bytes. Decoding therefore needs
//! the schema to find cell boundaries.
//!
//! The same module defines the **key encoding**, the canonical comparable
//! byte form of a typed value: INT values encode as their 4-byte LE
//! representation, TEXT values as their raw bytes. Table-row keys (the PK),
//! index keys and index values all use it, so an index value compares equal
//! to the table key it refers to, byte for byte.

use crate::catalog::ColumnDef;
use crate::error::RowError;
use binary_helpers::le::read_le;
use sql::ast::DataType;

/// Parses an integer literal with C `atoi` semantics: optional sign, then
/// leading digits; anything trailing is ignored; no digits parse as 0.
/// Out-of-range values saturate.
pub fn parse_int(text: &str) -> i32 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        value = value * 10 + i64::from(b - b'0');
        if value > i64::from(i32::MAX) + 1 {
            break;
        }
    }

    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Encodes one literal as its canonical key bytes for the given type.
pub fn encode_key(ty: DataType, literal: &str) -> Vec<u8> {
    match ty {
        DataType::Int => parse_int(literal).to_le_bytes().to_vec(),
        DataType::Text => literal.as_bytes().to_vec(),
    }
}

/// Serializes the literal values of one row against the schema.
pub fn serialize_row<S: AsRef<str>>(columns: &[ColumnDef], values: &[S]) -> Vec<u8> {
    let mut row = Vec::new();
    for (col, value) in columns.iter().zip(values) {
        let value = value.as_ref();
        match col.ty {
            DataType::Int => {
                row.extend_from_slice(&parse_int(value).to_le_bytes());
            }
            DataType::Text => {
                row.extend_from_slice(&(value.len() as u32).to_le_bytes());
                row.extend_from_slice(value.as_bytes());
            }
        }
    }
    row
}

/// Decodes a row into per-column strings (INT columns formatted decimal).
///
/// `out` is a scratch buffer the caller keeps across rows; it is cleared and
/// refilled so the inner loops of scans do not reallocate the vector.
pub fn decode_into(
    columns: &[ColumnDef],
    row: &[u8],
    out: &mut Vec<String>,
) -> Result<(), RowError> {
    out.clear();

    let mut offset = 0usize;
    for (column, col) in columns.iter().enumerate() {
        match col.ty {
            DataType::Int => {
                let value = read_le::<i32>(row, offset)?;
                offset += 4;
                out.push(value.to_string());
            }
            DataType::Text => {
                let len = read_le::<u32>(row, offset)? as usize;
                offset += 4;
                let bytes = row
                    .get(offset..offset + len)
                    .ok_or(RowError::Truncated { at: offset, column })?;
                offset += len;
                out.push(String::from_utf8_lossy(bytes).into_owned());
            }
        }
    }

    Ok(())
}

/// A typed comparison value for a `column = literal` predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateValue<'a> {
    Int(i32),
    Text(&'a str),
}

impl<'a> PredicateValue<'a> {
    /// Interprets a literal against the target column's type.
    pub fn new(ty: DataType, literal: &'a str) -> Self {
        match ty {
            DataType::Int => PredicateValue::Int(parse_int(literal)),
            DataType::Text => PredicateValue::Text(literal),
        }
    }
}

/// Walks a serialized row's cells in order and compares the target column
/// against the predicate value: INT as i32 equality, TEXT as length plus
/// byte equality. Columns after the target are never examined.
pub fn row_matches_predicate(
    columns: &[ColumnDef],
    row: &[u8],
    target_col: usize,
    target: PredicateValue<'_>,
) -> Result<bool, RowError> {
    let mut offset = 0usize;
    for (column, col) in columns.iter().enumerate() {
        if column == target_col {
            return match (col.ty, target) {
                (DataType::Int, PredicateValue::Int(expected)) => {
                    Ok(read_le::<i32>(row, offset)? == expected)
                }
                (DataType::Text, PredicateValue::Text(expected)) => {
                    let len = read_le::<u32>(row, offset)? as usize;
                    offset += 4;
                    let bytes = row
                        .get(offset..offset + len)
                        .ok_or(RowError::Truncated { at: offset, column })?;
                    Ok(len == expected.len() && bytes == expected.as_bytes())
                }
                // Type/value mismatch can only come from a caller bug; a row
                // never matches it.
                _ => Ok(false),
            };
        }

        match col.ty {
            DataType::Int => offset += 4,
            DataType::Text => {
                let len = read_le::<u32>(row, offset)? as usize;
                offset += 4 + len;
            }
        }
    }

    Ok(false)
}

/// Appends one projected value to a result line, quoting TEXT.
pub fn push_formatted(line: &mut String, value: &str, is_text: bool) {
    if is_text {
        line.push('"');
        line.push_str(value);
        line.push('"');
    } else {
        line.push_str(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_columns() -> Vec<ColumnDef> {
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
                is_unique: false,
            },
        ]
    }

    #[test]
    fn parse_int_has_atoi_semantics() {
        assert_eq!(parse_int("42"), 42);
        assert_eq!(parse_int("-7"), -7);
        assert_eq!(parse_int("12abc"), 12);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("  9"), 9);
    }

    #[test]
    fn serialize_then_decode_roundtrips_as_strings() {
        let columns = users_columns();
        let row = serialize_row(&columns, &["1", "alice"]);

        let mut values = Vec::new();
        decode_into(&columns, &row, &mut values).unwrap();
        assert_eq!(values, vec!["1".to_string(), "alice".to_string()]);
    }

    #[test]
    fn int_cells_are_four_le_bytes() {
        let columns = vec![ColumnDef {
            name: "n".to_string(),
            ty: DataType::Int,
            is_primary_key: false,
            is_unique: false,
        }];
        let row = serialize_row(&columns, &["258"]);
        assert_eq!(row, vec![0x02, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn text_cells_are_length_prefixed() {
        let columns = vec![ColumnDef {
            name: "s".to_string(),
            ty: DataType::Text,
            is_primary_key: false,
            is_unique: false,
        }];
        let row = serialize_row(&columns, &["hi"]);
        assert_eq!(row, vec![2, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn decode_rejects_truncated_text() {
        let columns = users_columns();
        let row = serialize_row(&columns, &["1", "alice"]);

        let mut values = Vec::new();
        let err = decode_into(&columns, &row[..row.len() - 2], &mut values);
        assert!(err.is_err());
    }

    #[test]
    fn predicate_matches_int_column() {
        let columns = users_columns();
        let row = serialize_row(&columns, &["5", "bob"]);

        assert!(row_matches_predicate(&columns, &row, 0, PredicateValue::Int(5)).unwrap());
        assert!(!row_matches_predicate(&columns, &row, 0, PredicateValue::Int(6)).unwrap());
    }

    #[test]
    fn predicate_matches_text_column_case_sensitively() {
        let columns = users_columns();
        let row = serialize_row(&columns, &["5", "bob"]);

        assert!(row_matches_predicate(&columns, &row, 1, PredicateValue::Text("bob")).unwrap());
        assert!(!row_matches_predicate(&columns, &row, 1, PredicateValue::Text("Bob")).unwrap());
        assert!(!row_matches_predicate(&columns, &row, 1, PredicateValue::Text("bo")).unwrap());
    }

    #[test]
    fn key_encoding_matches_for_int_and_text() {
        assert_eq!(encode_key(DataType::Int, "2"), 2i32.to_le_bytes().to_vec());
        assert_eq!(encode_key(DataType::Text, "bob"), b"bob".to_vec());
    }
}
