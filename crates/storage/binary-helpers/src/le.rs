use crate::bin_error::BinaryError;

/// A trait for fixed-width integers that serialize in little-endian format.
/// Implemented for the widths the on-disk format actually uses: `u8`, `u16`,
/// `u32`, `u64` and the signed cell type `i32`.
pub trait LittleEndianInteger: Sized + Copy {
    /// The size of the type in bytes.
    const SIZE: usize;

    /// Converts a slice of exactly `Self::SIZE` bytes into the integer.
    fn from_le(source_bytes: &[u8]) -> Result<Self, BinaryError>;

    /// Serializes the integer into a slice of exactly `Self::SIZE` bytes.
    fn to_le(self, target_buffer: &mut [u8]) -> Result<(), BinaryError>;
}

macro_rules! impl_little_endian_integer {
    ($t:ty) => {
        impl LittleEndianInteger for $t {
            const SIZE: usize = std::mem::size_of::<$t>();

            fn from_le(source_bytes: &[u8]) -> Result<Self, BinaryError> {
                // this really should not happen, but we will check just in case
                if source_bytes.len() != Self::SIZE {
                    return Err(BinaryError::BytesSliceSizeMismatch {
                        // We don't really have any info as to where this slice appears in the main
                        // byte array, so we'll report offset 0 as the starting point
                        from_offset: 0usize,
                        expected: Self::SIZE,
                    });
                }

                Ok(<$t>::from_le_bytes(source_bytes.try_into()?))
            }

            fn to_le(self, target_buffer: &mut [u8]) -> Result<(), BinaryError> {
                let self_bytes = &self.to_le_bytes();

                // Proactively compare sizes to avoid a panic
                if self_bytes.len() != target_buffer.len() {
                    return Err(BinaryError::WriteErrorSliceSizeMismatch {
                        src: self_bytes.len(),
                        target: target_buffer.len(),
                    });
                }

                target_buffer.copy_from_slice(self_bytes);
                Ok(())
            }
        }
    };
}

impl_little_endian_integer!(u8);
impl_little_endian_integer!(u16);
impl_little_endian_integer!(u32);
impl_little_endian_integer!(u64);
impl_little_endian_integer!(i32);

/// Reads a value of type `T` from `bytes` at `start_offset`, little-endian.
/// Fails when the slice does not contain the full `T::SIZE`-byte range.
pub fn read_le<T: LittleEndianInteger>(
    bytes: &[u8],
    start_offset: usize,
) -> Result<T, BinaryError> {
    // Is the range we are trying to read valid?
    let Some(slice) = bytes.get(start_offset..start_offset + T::SIZE) else {
        return Err(BinaryError::BytesSliceSizeMismatch {
            expected: T::SIZE,
            from_offset: start_offset,
        });
    };

    T::from_le(slice)
}

/// Writes `value` into `bytes` at `start_offset`, little-endian.
/// Fails when the slice does not contain the full `T::SIZE`-byte range.
pub fn write_le<T: LittleEndianInteger>(
    bytes: &mut [u8],
    start_offset: usize,
    value: T,
) -> Result<(), BinaryError> {
    // Is the range we are trying to write into valid?
    let Some(slice) = bytes.get_mut(start_offset..start_offset + T::SIZE) else {
        return Err(BinaryError::BytesSliceSizeMismatch {
            expected: T::SIZE,
            from_offset: start_offset,
        });
    };

    value.to_le(slice)
}

#[cfg(test)]
mod read_le_tests {
    use super::*;

    #[test]
    fn test_read_le_u8() {
        let bytes = [0x17];
        let result = read_le::<u8>(&bytes, 0).unwrap();
        assert_eq!(result, 23);
    }

    #[test]
    fn test_read_le_u16() {
        let bytes = [0x17, 0x00];
        let result = read_le::<u16>(&bytes, 0).unwrap();
        assert_eq!(result, 23);
    }

    #[test]
    fn test_read_le_u16_larger_array() {
        let bytes = [0x00, 0x00, 0x00, 0x00, 0x17, 0x00];
        let result = read_le::<u16>(&bytes, 4).unwrap();
        assert_eq!(result, 23);
    }

    #[test]
    fn test_read_le_u32() {
        let bytes = [0x17, 0x00, 0x00, 0x00];
        let result = read_le::<u32>(&bytes, 0).unwrap();
        assert_eq!(result, 23);
    }

    #[test]
    fn test_read_le_i32_negative() {
        let bytes = (-7i32).to_le_bytes();
        let result = read_le::<i32>(&bytes, 0).unwrap();
        assert_eq!(result, -7);
    }

    #[test]
    fn test_read_le_out_of_range() {
        let bytes = [0x17, 0x00];
        let result = read_le::<u32>(&bytes, 1);
        assert!(matches!(
            result,
            Err(BinaryError::BytesSliceSizeMismatch {
                expected: 4,
                from_offset: 1
            })
        ));
    }
}

#[cfg(test)]
mod write_le_tests {
    use super::*;

    #[test]
    fn test_write_le_u16() {
        let mut bytes = [0u8; 4];
        write_le::<u16>(&mut bytes, 2, 23).unwrap();
        assert_eq!(bytes, [0x00, 0x00, 0x17, 0x00]);
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let mut bytes = [0u8; 8];
        write_le::<u32>(&mut bytes, 3, 0xDEAD).unwrap();
        assert_eq!(read_le::<u32>(&bytes, 3).unwrap(), 0xDEAD);
    }

    #[test]
    fn test_write_le_out_of_range() {
        let mut bytes = [0u8; 2];
        let result = write_le::<u32>(&mut bytes, 0, 1);
        assert!(matches!(
            result,
            Err(BinaryError::BytesSliceSizeMismatch {
                expected: 4,
                from_offset: 0
            })
        ));
    }
}
