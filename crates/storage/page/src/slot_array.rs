//! Slot directory handling for slotted pages.
//!
//! The slot directory sits immediately after the page header and grows
//! **forward**, toward the heap: slot 0 occupies the first [`SLOT_SIZE`]
//! bytes of the region, slot 1 the next, and so on. Appending a slot never
//! moves existing entries; it only extends the region by one entry and
//! narrows the free space between directory and heap.
//!
//! ```text
//!   header | [slot 0][slot 1]...[slot n-1] | free space | heap cells
//!          ^ region start                    ^ region end = 8 + n*4
//! ```
//!
//! These types never own memory; they borrow exactly the directory region of
//! a page (`num_cells * SLOT_SIZE` bytes, tombstones included) and hand out
//! [`SlotRef`]/[`SlotMut`] views into single entries. Construction verifies
//! the region length so later per-slot accesses only need an index check.

use crate::errors::slot_error::SlotError;
use crate::slot::{SLOT_SIZE, SlotMut, SlotRef};
use std::ops::Range;

/// Immutable zero-copy view into the slot directory of a slotted page.
#[derive(Debug)]
pub(crate) struct SlotArrayRef<'a> {
    /// View into the raw bytes of the slot directory.
    /// Each slot is `SLOT_SIZE` bytes long.
    bytes: &'a [u8],
}

impl<'a> SlotArrayRef<'a> {
    /// Creates a new SlotArrayRef.
    /// Validates that the slice length matches the expected slot count.
    pub(crate) fn new(bytes: &'a [u8], slot_count: u16) -> Result<Self, SlotError> {
        let expected_len = slot_count as usize * SLOT_SIZE;

        if bytes.len() != expected_len {
            return Err(SlotError::SlotRegionSizeMismatch {
                expected_size: expected_len,
                actual_size: bytes.len(),
            });
        }

        Ok(Self { bytes })
    }

    /// Gets an immutable view of the slot at the given index.
    /// Slots are zero-indexed.
    /// Returns an error if the slot index is out of bounds.
    pub(crate) fn slot_ref(&self, slot_index: u16) -> Result<SlotRef<'a>, SlotError> {
        let range = get_slot_range(self.bytes.len(), slot_index)?;

        let slot_bytes = self.bytes.get(range).ok_or(SlotError::InvalidSlot {
            slot_index: slot_index as usize,
        })?;

        SlotRef::from_raw(slot_index, slot_bytes)
    }
}

/// Mutable zero-copy view into the slot directory of a slotted page.
#[derive(Debug)]
pub(crate) struct SlotArrayMut<'a> {
    /// View into the raw bytes of the slot directory.
    /// Each slot is `SLOT_SIZE` bytes long.
    bytes: &'a mut [u8],
}

impl<'a> SlotArrayMut<'a> {
    /// Creates a new SlotArrayMut.
    /// Validates that the slice length matches the expected slot count.
    pub(crate) fn new(bytes: &'a mut [u8], slot_count: u16) -> Result<Self, SlotError> {
        let expected_len = slot_count as usize * SLOT_SIZE;

        if bytes.len() != expected_len {
            return Err(SlotError::SlotRegionSizeMismatch {
                expected_size: expected_len,
                actual_size: bytes.len(),
            });
        }

        Ok(Self { bytes })
    }

    /// Gets an immutable view of the slot at the given index.
    /// Slots are zero-indexed.
    /// Returns an error if the slot index is out of bounds.
    pub(crate) fn slot_ref(&self, slot_index: u16) -> Result<SlotRef<'_>, SlotError> {
        let range = get_slot_range(self.bytes.len(), slot_index)?;

        let slot_bytes = self.bytes.get(range).ok_or(SlotError::InvalidSlot {
            slot_index: slot_index as usize,
        })?;

        SlotRef::from_raw(slot_index, slot_bytes)
    }

    /// Gets a mutable view of the slot at the given index.
    /// Slots are zero-indexed.
    /// Returns an error if the slot index is out of bounds.
    pub(crate) fn slot_mut(&mut self, slot_index: u16) -> Result<SlotMut<'_>, SlotError> {
        let range = get_slot_range(self.bytes.len(), slot_index)?;

        let slot_bytes = self.bytes.get_mut(range).ok_or(SlotError::InvalidSlot {
            slot_index: slot_index as usize,
        })?;

        SlotMut::from_raw(slot_index, slot_bytes)
    }

    /// Sets the values of a slot in the slot directory.
    pub(crate) fn set_slot(
        &mut self,
        slot_index: u16,
        slot_offset: u16,
        slot_size: u16,
    ) -> Result<(), SlotError> {
        let mut slot_mut = self.slot_mut(slot_index)?;
        slot_mut.set_offset(slot_offset)?;
        slot_mut.set_size(slot_size)?;
        Ok(())
    }
}

fn get_slot_range(slot_region_size: usize, slot_index: u16) -> Result<Range<usize>, SlotError> {
    let start = slot_index as usize * SLOT_SIZE;
    let end = start + SLOT_SIZE;
    if end > slot_region_size {
        return Err(SlotError::InvalidSlot {
            slot_index: slot_index as usize,
        });
    }
    Ok(start..end)
}

#[cfg(test)]
mod slot_array_ref_test {
    use super::*;

    #[test]
    fn slot_array_ref_new_invalid_size() {
        let bytes = vec![0u8; 10]; // Not a multiple of SLOT_SIZE
        let result = SlotArrayRef::new(&bytes, 3); // Expecting 3 slots (12 bytes)
        assert!(matches!(
            result,
            Err(SlotError::SlotRegionSizeMismatch {
                expected_size: 12,
                actual_size: 10
            })
        ));
    }

    #[test]
    fn slot_array_ref_new_valid() {
        let bytes = vec![0u8; SLOT_SIZE * 2]; // 2 slots
        let result = SlotArrayRef::new(&bytes, 2);
        assert!(result.is_ok());
    }

    #[test]
    fn slot_array_ref_slot_ref_invalid_index() {
        let bytes = vec![0u8; SLOT_SIZE * 2]; // 2 slots
        let slot_array = SlotArrayRef::new(&bytes, 2).unwrap();
        let result = slot_array.slot_ref(3); // Invalid index
        assert!(matches!(
            result,
            Err(SlotError::InvalidSlot { slot_index: 3 })
        ));
    }

    #[test]
    fn slot_array_ref_slot_ref_valid() {
        let mut bytes = vec![0u8; SLOT_SIZE * 2]; // 2 slots
        // Slot 0 is the first entry, slot 1 the second.
        bytes[0..4].copy_from_slice(&[1, 0, 2, 0]); // offset=1, size=2
        bytes[4..8].copy_from_slice(&[3, 0, 4, 0]); // offset=3, size=4

        let slot_array = SlotArrayRef::new(&bytes, 2).unwrap();

        let slot0 = slot_array.slot_ref(0).unwrap();
        assert_eq!(slot0.offset().unwrap(), 1);
        assert_eq!(slot0.size().unwrap(), 2);

        let slot1 = slot_array.slot_ref(1).unwrap();
        assert_eq!(slot1.offset().unwrap(), 3);
        assert_eq!(slot1.size().unwrap(), 4);
    }
}

#[cfg(test)]
mod slot_array_mut_test {
    use super::*;

    #[test]
    fn slot_array_mut_new_invalid_size() {
        let mut bytes = vec![0u8; 10]; // Not a multiple of SLOT_SIZE
        let result = SlotArrayMut::new(&mut bytes, 3); // Expecting 3 slots (12 bytes)
        assert!(matches!(
            result,
            Err(SlotError::SlotRegionSizeMismatch {
                expected_size: 12,
                actual_size: 10
            })
        ));
    }

    #[test]
    fn slot_array_mut_slot_mut_invalid_index() {
        let mut bytes = vec![0u8; SLOT_SIZE * 2]; // 2 slots
        let mut slot_array = SlotArrayMut::new(&mut bytes, 2).unwrap();
        let result = slot_array.slot_mut(3); // Invalid index
        assert!(matches!(
            result,
            Err(SlotError::InvalidSlot { slot_index: 3 })
        ));
    }

    #[test]
    fn slot_array_mut_set_slot_writes_through() {
        let mut bytes = vec![0u8; SLOT_SIZE * 2]; // 2 slots
        {
            let mut slot_array = SlotArrayMut::new(&mut bytes, 2).unwrap();
            slot_array.set_slot(1, 0x0F00, 0x0020).unwrap();

            let slot1 = slot_array.slot_ref(1).unwrap();
            assert_eq!(slot1.offset().unwrap(), 0x0F00);
            assert_eq!(slot1.size().unwrap(), 0x0020);
        }
        assert_eq!(&bytes[4..8], &[0x00, 0x0F, 0x20, 0x00]);
    }
}
