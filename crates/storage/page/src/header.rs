//! Layout and accessors for the page header of a slotted page.
//!
//! # Page Header Layout
//!
//! The page header occupies the first **8 bytes** of every slotted page.
//! All multi-byte fields are stored in **little-endian** binary format.
//!
//! | Field        | Type | Offset | Description |
//! |--------------|------|--------|-------------|
//! | `node_type`  | u8   | [`NODE_TYPE`]  | Leaf (0) or internal (1). Only leaf pages exist today. |
//! | `is_root`    | u8   | [`IS_ROOT`]    | Whether this page is the root of its table/index. |
//! | `num_cells`  | u16  | [`NUM_CELLS`]  | Number of slot entries, tombstones included. |
//! | `data_start` | u16  | [`DATA_START`] | Offset where the cell heap begins; the heap grows downward. |
//! | `next_leaf`  | u16  | [`NEXT_LEAF`]  | Reserved for linked-leaf traversal; always written as 0. |
//!
//! ## Memory Diagram
//!
//! ```text
//! +----------+----------------------+------------------+------------------+
//! |  Header  |    Slot Directory    |    Free Space    |    Cell Heap     |
//! |   (8B)   |    (grows right)     |                  |   (grows left)   |
//! +----------+----------------------+------------------+------------------+
//! 0          8                        ^ data_start points here         4096
//! ```
//!
//! Each constant below defines the byte offset where its corresponding field
//! is stored within the header.

use crate::errors::header_error::HeaderError;
use binary_helpers::le::{read_le, write_le};
use paste::paste;

/// Size of the header in bytes.
pub const HEADER_SIZE: usize = 8;

/// The `HeaderRef` struct provides an immutable view into the header of a page.
#[derive(Debug)]
pub struct HeaderRef<'a> {
    bytes: &'a [u8; HEADER_SIZE],
}

impl<'a> HeaderRef<'a> {
    /// Creates a new `HeaderRef` from a byte slice of exactly [`HEADER_SIZE`]
    /// bytes. Any other length is a [`HeaderError::HeaderSliceSizeMismatch`].
    pub fn new(bytes: &'a [u8]) -> Result<Self, HeaderError> {
        let bytes: &[u8; HEADER_SIZE] =
            bytes
                .try_into()
                .map_err(|_| HeaderError::HeaderSliceSizeMismatch {
                    actual: bytes.len(),
                    expected: HEADER_SIZE,
                })?;
        Ok(HeaderRef { bytes })
    }
}

/// The `HeaderMut` struct provides a mutable view into the header of a page.
#[derive(Debug)]
pub struct HeaderMut<'a> {
    bytes: &'a mut [u8; HEADER_SIZE],
}

impl<'a> HeaderMut<'a> {
    /// Creates a new `HeaderMut` from a byte slice of exactly [`HEADER_SIZE`]
    /// bytes. Any other length is a [`HeaderError::HeaderSliceSizeMismatch`].
    pub fn new(bytes: &'a mut [u8]) -> Result<Self, HeaderError> {
        let len = bytes.len();
        let bytes: &mut [u8; HEADER_SIZE] =
            bytes
                .try_into()
                .map_err(|_| HeaderError::HeaderSliceSizeMismatch {
                    actual: len,
                    expected: HEADER_SIZE,
                })?;
        Ok(HeaderMut { bytes })
    }
}

/// Defines header field constants and getter/setter methods.
///
/// Pattern: `field_id(identifier): field_type(type) = field_offset(usize)`
macro_rules! impl_header_accessors {
    ( $( $field_name:ident : $field_type:ty = $field_offset:expr ; )* ) => {
        paste! {
            $(
                #[doc = concat!("Offset of ", stringify!($field_name), " — type ", stringify!($field_type))]
                pub const [<$field_name:upper>] : usize = $field_offset;

                impl<'a> HeaderRef<'a> {
                    #[doc = concat!(
                        "Getter for field `", stringify!($field_name), "`.\n",
                        "Type: `", stringify!($field_type), "`.\n",
                        "Offset: ", stringify!($field_offset), "."
                    )]
                    pub fn [<get_ $field_name>](&self)
                        -> Result<$field_type, HeaderError>
                    {
                        Ok(read_le::<$field_type>(self.bytes, $field_offset)?)
                    }
                }

                impl<'a> HeaderMut<'a> {
                    #[doc = concat!(
                        "Getter for field `", stringify!($field_name), "`.\n",
                        "Type: `", stringify!($field_type), "`.\n",
                        "Offset: ", stringify!($field_offset), "."
                    )]
                    pub fn [<get_ $field_name>](&self)
                        -> Result<$field_type, HeaderError>
                    {
                        Ok(read_le::<$field_type>(self.bytes, $field_offset)?)
                    }

                    #[doc = concat!(
                        "Setter for field `", stringify!($field_name), "`.\n",
                        "Type: `", stringify!($field_type), "`.\n",
                        "Offset: ", stringify!($field_offset), "."
                    )]
                    pub fn [<set_ $field_name>](&mut self, val: $field_type)
                        -> Result<(), HeaderError>
                    {
                        write_le::<$field_type>(self.bytes, $field_offset, val)?;
                        Ok(())
                    }
                }
            )*
        }
    };
}

impl_header_accessors! {
    node_type : u8 = 0;
    is_root : u8 = 1;
    num_cells : u16 = 2;
    data_start : u16 = 4;
    next_leaf : u16 = 6;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_ref_rejects_wrong_size() {
        let bytes = [0u8; 7];
        assert!(matches!(
            HeaderRef::new(&bytes),
            Err(HeaderError::HeaderSliceSizeMismatch {
                actual: 7,
                expected: 8
            })
        ));
    }

    #[test]
    fn header_fields_read_little_endian() {
        // node_type=0, is_root=1, num_cells=3, data_start=0x0FF0, next_leaf=0
        let bytes = [0x00, 0x01, 0x03, 0x00, 0xF0, 0x0F, 0x00, 0x00];
        let header = HeaderRef::new(&bytes).unwrap();
        assert_eq!(header.get_node_type().unwrap(), 0);
        assert_eq!(header.get_is_root().unwrap(), 1);
        assert_eq!(header.get_num_cells().unwrap(), 3);
        assert_eq!(header.get_data_start().unwrap(), 0x0FF0);
        assert_eq!(header.get_next_leaf().unwrap(), 0);
    }

    #[test]
    fn header_mut_writes_read_back() {
        let mut bytes = [0u8; HEADER_SIZE];
        {
            let mut header = HeaderMut::new(&mut bytes).unwrap();
            header.set_num_cells(17).unwrap();
            header.set_data_start(4000).unwrap();
            assert_eq!(header.get_num_cells().unwrap(), 17);
        }
        let header = HeaderRef::new(&bytes).unwrap();
        assert_eq!(header.get_num_cells().unwrap(), 17);
        assert_eq!(header.get_data_start().unwrap(), 4000);
    }
}
