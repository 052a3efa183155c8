use crate::errors::slot_error::SlotError;
use binary_helpers::le::{read_le, write_le};

/// Fixed size of a slot in bytes.
pub(crate) const SLOT_SIZE: usize = 4;

/// A zero-copy read-only view into a 4-byte slot (offset: u16, size: u16) in
/// the byte array of the slotted page.
///
/// A slot whose `size` is 0 is a tombstone: its cell was deleted and the heap
/// bytes it used to claim are abandoned.
#[derive(Debug)]
pub(crate) struct SlotRef<'a> {
    /// Logical index of the slot within the page.
    slot_index: u16,
    /// View into the raw bytes of the slot.
    /// # Format
    /// | Offset | Size |
    /// |--------|------|
    /// | 0      | 2    |
    ///
    /// Both fields are stored as u16 in little-endian format.
    /// - Offset: the starting byte position of the cell within the page.
    /// - Size: the size of the whole cell in bytes (0 marks a tombstone).
    bytes: &'a [u8; SLOT_SIZE],
}

impl<'a> SlotRef<'a> {
    /// Create a new SlotRef from raw bytes and slot number.
    /// If the byte slice is not exactly 4 bytes, returns a SizeMismatch error.
    #[inline]
    pub(crate) fn from_raw(slot_index: u16, bytes: &'a [u8]) -> Result<Self, SlotError> {
        let bytes: &[u8; SLOT_SIZE] =
            bytes
                .try_into()
                .map_err(|_| SlotError::SlotSizeMismatch {
                    expected_size: SLOT_SIZE,
                    actual_size: bytes.len(),
                })?;

        Ok(Self { slot_index, bytes })
    }

    /// Get the logical slot index.
    #[inline]
    #[allow(dead_code)]
    pub(crate) fn slot_index(&self) -> u16 {
        self.slot_index
    }

    /// Read the offset (u16) from the slot (little-endian).
    #[inline]
    pub(crate) fn offset(&self) -> Result<u16, SlotError> {
        Ok(read_le::<u16>(self.bytes, 0)?)
    }

    /// Read the size (u16) from the slot (little-endian).
    #[inline]
    pub(crate) fn size(&self) -> Result<u16, SlotError> {
        Ok(read_le::<u16>(self.bytes, 2)?)
    }
}

/// A zero-copy mutable view into a 4-byte slot (offset: u16, size: u16) in
/// the byte array of the slotted page.
#[derive(Debug)]
pub(crate) struct SlotMut<'a> {
    /// Logical index of the slot within the page.
    #[allow(dead_code)]
    slot_index: u16,
    /// Mutable view into the raw bytes of the slot. Same format as
    /// [`SlotRef`].
    bytes: &'a mut [u8; SLOT_SIZE],
}

impl<'a> SlotMut<'a> {
    /// Create a new SlotMut from raw bytes and slot number.
    /// If the byte slice is not exactly 4 bytes, returns a SizeMismatch error.
    #[inline]
    pub(crate) fn from_raw(slot_index: u16, bytes: &'a mut [u8]) -> Result<Self, SlotError> {
        let len = bytes.len();
        let bytes: &mut [u8; SLOT_SIZE] =
            bytes
                .try_into()
                .map_err(|_| SlotError::SlotSizeMismatch {
                    expected_size: SLOT_SIZE,
                    actual_size: len,
                })?;

        Ok(Self { slot_index, bytes })
    }

    /// Read the offset (u16) from the slot (little-endian).
    #[inline]
    pub(crate) fn offset(&self) -> Result<u16, SlotError> {
        Ok(read_le::<u16>(self.bytes, 0)?)
    }

    /// Read the size (u16) from the slot (little-endian).
    #[inline]
    pub(crate) fn size(&self) -> Result<u16, SlotError> {
        Ok(read_le::<u16>(self.bytes, 2)?)
    }

    /// Write the offset (u16) into the slot (little-endian).
    #[inline]
    pub(crate) fn set_offset(&mut self, offset: u16) -> Result<(), SlotError> {
        Ok(write_le::<u16>(self.bytes, 0, offset)?)
    }

    /// Write the size (u16) into the slot (little-endian).
    #[inline]
    pub(crate) fn set_size(&mut self, size: u16) -> Result<(), SlotError> {
        Ok(write_le::<u16>(self.bytes, 2, size)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_size_constant_is_four() {
        assert_eq!(SLOT_SIZE, 4);
    }

    #[test]
    fn slot_ref_from_raw_with_valid_bytes_reads_fields_correctly() {
        let bytes = [0x01, 0x00, 0x02, 0x00];
        let slot = SlotRef::from_raw(5, &bytes).unwrap();
        assert_eq!(slot.slot_index(), 5);
        assert_eq!(slot.offset().unwrap(), 1);
        assert_eq!(slot.size().unwrap(), 2);
    }

    #[test]
    fn slot_ref_from_raw_with_invalid_size_returns_size_mismatch() {
        let bytes = [0x01, 0x02, 0x03];
        let res = SlotRef::from_raw(1, &bytes);
        assert!(matches!(
            res,
            Err(SlotError::SlotSizeMismatch {
                expected_size: 4,
                actual_size: 3
            })
        ));
    }

    #[test]
    fn slot_ref_reads_zero_values() {
        let bytes = [0x00, 0x00, 0x00, 0x00];
        let slot = SlotRef::from_raw(0, &bytes).unwrap();
        assert_eq!(slot.offset().unwrap(), 0);
        assert_eq!(slot.size().unwrap(), 0);
    }

    #[test]
    fn slot_mut_set_offset_and_size_updates_underlying_bytes_and_reads_back() {
        let mut bytes = [0x00, 0x00, 0x00, 0x00];
        {
            let mut slot = SlotMut::from_raw(1, &mut bytes).unwrap();
            slot.set_offset(0x0102).unwrap();
            slot.set_size(0x0304).unwrap();
            assert_eq!(slot.offset().unwrap(), 0x0102);
            assert_eq!(slot.size().unwrap(), 0x0304);
        }
        assert_eq!(bytes, [0x02, 0x01, 0x04, 0x03]);
    }

    #[test]
    fn slot_mut_write_and_read_max_u16_values() {
        let mut bytes = [0x00, 0x00, 0x00, 0x00];
        {
            let mut slot = SlotMut::from_raw(7, &mut bytes).unwrap();
            slot.set_offset(u16::MAX).unwrap();
            slot.set_size(u16::MAX).unwrap();
            assert_eq!(slot.offset().unwrap(), u16::MAX);
            assert_eq!(slot.size().unwrap(), u16::MAX);
        }
        assert_eq!(bytes, [0xFF, 0xFF, 0xFF, 0xFF]);
    }
}
