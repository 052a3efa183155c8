//! The `Page` struct: a fixed-size slotted leaf page and its operations.
//!
//! # Memory Layout Overview
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────────┐
//!   │ Page Header (8B: node_type, is_root, num_cells, data_start,   │
//!   │              next_leaf)                                       │
//!   ├───────────────────────────────────────────────────────────────┤
//!   │ Slot Directory (grows downward in the diagram = toward higher │
//!   │ offsets; fixed 4-byte entries, tombstones stay in place)      │
//!   ├───────────────────────────────────────────────────────────────┤
//!   │ Free Space                                                    │
//!   ├───────────────────────────────────────────────────────────────┤
//!   │ Cell Heap (grows upward = toward lower offsets from 4096)     │
//!   │   [key_len u32 | key | value] cells, variable sized           │
//!   └───────────────────────────────────────────────────────────────┘
//!
//!                     ↑ offset 0                        offset 4096 ↑
//! ```
//!
//! # Why This Design?
//!
//! - Appending a cell never moves existing cells or slots.
//! - Deleting a cell only zeroes its slot (a tombstone); the heap bytes are
//!   abandoned until a future compaction.
//! - Reads are zero-copy: a cell access returns slices into the page.
//!
//! Header access is provided via `header::HeaderRef` and `header::HeaderMut`.
//! Slot directory access is provided via the crate-private slot array views.

use crate::PAGE_SIZE;
use crate::cell::{CELL_KEY_LEN_SIZE, CellRef};
use crate::errors::cell_error::CellError;
use crate::errors::header_error::HeaderError;
use crate::errors::insert_error::InsertError;
use crate::errors::page_error::PageResult;
use crate::errors::slot_error::SlotError;
use crate::header::{HEADER_SIZE, HeaderMut, HeaderRef};
use crate::node_type::NodeType;
use crate::slot::SLOT_SIZE;
use crate::slot_array::{SlotArrayMut, SlotArrayRef};
use binary_helpers::le::{read_le, write_le};

/// Wrapper around a fixed-size byte array representing a page.
#[derive(Debug)]
pub struct Page {
    /// Main binary array holding the `PAGE_SIZE` bytes of data for the page.
    /// Boxed and owned by this struct.
    data: Box<[u8; PAGE_SIZE]>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    /// Creates a zero-filled page. The caller either reads page bytes into it
    /// via [`Page::data_mut`] or formats it with [`Page::init_leaf`].
    pub fn new() -> Self {
        Page {
            data: Box::new([0u8; PAGE_SIZE]),
        }
    }

    /// Formats this page as an empty, non-root leaf: `num_cells = 0`,
    /// `data_start = PAGE_SIZE`, `next_leaf = 0`.
    pub fn init_leaf(&mut self) -> PageResult<()> {
        self.data[..HEADER_SIZE].fill(0);
        let mut header = self.header_mut()?;
        header.set_node_type(NodeType::Leaf.into())?;
        header.set_is_root(0)?;
        header.set_num_cells(0)?;
        header.set_data_start(PAGE_SIZE as u16)?;
        header.set_next_leaf(0)?;
        Ok(())
    }

    /// The number of slot directory entries, tombstones included.
    pub fn num_cells(&self) -> PageResult<u16> {
        Ok(self.header_ref()?.get_num_cells()?)
    }

    /// The offset where the cell heap begins.
    pub fn data_start(&self) -> PageResult<u16> {
        Ok(self.header_ref()?.get_data_start()?)
    }

    /// Free bytes between the end of the slot directory and the heap.
    pub fn free_space(&self) -> PageResult<usize> {
        let header = self.header_ref()?;
        let data_start = header.get_data_start()? as usize;
        let directory_end = HEADER_SIZE + header.get_num_cells()? as usize * SLOT_SIZE;
        data_start
            .checked_sub(directory_end)
            .ok_or_else(|| HeaderError::OffsetArithmetic.into())
    }

    /// Whether this page is the root of its table or index.
    pub fn is_root(&self) -> PageResult<bool> {
        Ok(self.header_ref()?.get_is_root()? != 0)
    }

    /// Marks or unmarks this page as a root.
    pub fn set_root(&mut self, is_root: bool) -> PageResult<()> {
        Ok(self.header_mut()?.set_is_root(u8::from(is_root))?)
    }

    /// Inserts a `(key, value)` cell.
    ///
    /// The cell payload is `4 + |key| + |value|` bytes; the insert is
    /// rejected with [`InsertError::PageFull`] when the free region cannot
    /// hold the payload plus one directory slot. On success the heap grows
    /// downward by the payload and the cell is recorded in the directory,
    /// reusing the lowest tombstoned slot if one exists, otherwise appending
    /// a new slot.
    ///
    /// Duplicate keys are not detected here; callers that need key
    /// uniqueness (the table PK path) must check before inserting.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> PageResult<()> {
        let payload = CELL_KEY_LEN_SIZE + key.len() + value.len();
        let num_cells = self.num_cells()?;
        let data_start = self.data_start()? as usize;

        let free = self.free_space()?;
        if free < payload + SLOT_SIZE {
            return Err(InsertError::PageFull {
                needed: payload + SLOT_SIZE,
                free,
            }
            .into());
        }

        // Tombstoned slot numbers are reused; heap bytes never are.
        let mut reuse_slot: Option<u16> = None;
        {
            let slots = self.slot_array_ref()?;
            for i in 0..num_cells {
                if slots.slot_ref(i)?.size()? == 0 {
                    reuse_slot = Some(i);
                    break;
                }
            }
        }

        let cell_start = data_start - payload;

        // Write [key_len | key | value] at the new heap start.
        write_le::<u32>(&mut self.data[..], cell_start, key.len() as u32)
            .map_err(CellError::from)?;
        let key_start = cell_start + CELL_KEY_LEN_SIZE;
        self.data[key_start..key_start + key.len()].copy_from_slice(key);
        let value_start = key_start + key.len();
        self.data[value_start..value_start + value.len()].copy_from_slice(value);

        // Update the header before touching the directory so the slot array
        // view already spans the appended entry.
        {
            let mut header = self.header_mut()?;
            header.set_data_start(cell_start as u16)?;
            if reuse_slot.is_none() {
                header.set_num_cells(num_cells + 1)?;
            }
        }

        let slot_index = reuse_slot.unwrap_or(num_cells);
        self.slot_array_mut()?
            .set_slot(slot_index, cell_start as u16, payload as u16)?;

        Ok(())
    }

    /// Parses the cell the `slot_index`-th slot points at.
    ///
    /// Tombstoned slots have no cell; accessing one is a
    /// [`CellError::TombstonedSlot`] error — iterate with
    /// [`Page::is_live`] and skip them.
    pub fn cell(&self, slot_index: u16) -> PageResult<CellRef<'_>> {
        let slot = self.slot_array_ref()?.slot_ref(slot_index)?;
        let offset = slot.offset()? as usize;
        let size = slot.size()? as usize;

        if size == 0 {
            return Err(CellError::TombstonedSlot {
                slot_index: slot_index as usize,
            }
            .into());
        }

        let bytes = self
            .data
            .get(offset..offset + size)
            .ok_or(CellError::SlotOverrunsPage { offset, size })?;

        Ok(CellRef::parse(bytes)?)
    }

    /// Whether the `slot_index`-th slot holds a live cell (not a tombstone).
    pub fn is_live(&self, slot_index: u16) -> PageResult<bool> {
        let slot = self.slot_array_ref()?.slot_ref(slot_index)?;
        Ok(slot.size()? != 0)
    }

    /// The directory `size` of the `slot_index`-th slot (0 for tombstones).
    pub fn slot_size(&self, slot_index: u16) -> PageResult<u16> {
        Ok(self.slot_array_ref()?.slot_ref(slot_index)?.size()?)
    }

    /// Tombstones the `slot_index`-th slot: size and offset are zeroed, the
    /// heap bytes are abandoned. The slot number stays in the directory and
    /// may be reused by a later insert.
    pub fn tombstone(&mut self, slot_index: u16) -> PageResult<()> {
        let mut slots = self.slot_array_mut()?;
        let mut slot = slots.slot_mut(slot_index)?;
        slot.set_size(0)?;
        slot.set_offset(0)?;
        Ok(())
    }

    /// Replaces the value bytes of a live cell in place when the new cell
    /// size (`4 + key_len + |new_value|`) fits within the slot's current
    /// size. The slot offset is preserved and its size shrinks to the new
    /// cell size. Returns `false` without modifying anything when the new
    /// value does not fit; the caller then tombstones and re-inserts.
    pub fn replace_value(&mut self, slot_index: u16, new_value: &[u8]) -> PageResult<bool> {
        let slot = self.slot_array_ref()?.slot_ref(slot_index)?;
        let offset = slot.offset()? as usize;
        let size = slot.size()? as usize;

        if size == 0 {
            return Err(CellError::TombstonedSlot {
                slot_index: slot_index as usize,
            }
            .into());
        }

        let key_len = read_le::<u32>(&self.data[..], offset).map_err(CellError::from)? as usize;
        let new_total = CELL_KEY_LEN_SIZE + key_len + new_value.len();
        if new_total > size {
            return Ok(false);
        }

        let value_start = offset + CELL_KEY_LEN_SIZE + key_len;
        self.data[value_start..value_start + new_value.len()].copy_from_slice(new_value);
        self.slot_array_mut()?
            .slot_mut(slot_index)?
            .set_size(new_total as u16)?;

        Ok(true)
    }

    /// Returns an immutable reference to the underlying data of the page.
    pub fn data(&self) -> &[u8; PAGE_SIZE] {
        &self.data
    }

    /// Returns a mutable reference to the underlying byte array of the page.
    pub fn data_mut(&mut self) -> &mut [u8; PAGE_SIZE] {
        &mut self.data
    }

    /// Immutable view of the page header.
    fn header_ref(&self) -> Result<HeaderRef<'_>, HeaderError> {
        HeaderRef::new(&self.data[..HEADER_SIZE])
    }

    /// Mutable view of the page header.
    fn header_mut(&mut self) -> Result<HeaderMut<'_>, HeaderError> {
        HeaderMut::new(&mut self.data[..HEADER_SIZE])
    }

    /// Immutable view of the slot directory.
    fn slot_array_ref(&self) -> Result<SlotArrayRef<'_>, SlotError> {
        let num_cells = self.header_ref()?.get_num_cells()?;
        let end = HEADER_SIZE + num_cells as usize * SLOT_SIZE;
        let bytes = self
            .data
            .get(HEADER_SIZE..end)
            .ok_or(SlotError::SlotRegionSizeMismatch {
                expected_size: num_cells as usize * SLOT_SIZE,
                actual_size: PAGE_SIZE - HEADER_SIZE,
            })?;
        SlotArrayRef::new(bytes, num_cells)
    }

    /// Mutable view of the slot directory.
    fn slot_array_mut(&mut self) -> Result<SlotArrayMut<'_>, SlotError> {
        let num_cells = self.header_ref()?.get_num_cells()?;
        let end = HEADER_SIZE + num_cells as usize * SLOT_SIZE;
        let bytes =
            self.data
                .get_mut(HEADER_SIZE..end)
                .ok_or(SlotError::SlotRegionSizeMismatch {
                    expected_size: num_cells as usize * SLOT_SIZE,
                    actual_size: PAGE_SIZE - HEADER_SIZE,
                })?;
        SlotArrayMut::new(bytes, num_cells)
    }
}

#[cfg(test)]
mod init_tests {
    use super::*;

    #[test]
    fn init_leaf_produces_empty_page() {
        let mut page = Page::new();
        page.init_leaf().unwrap();

        assert_eq!(page.num_cells().unwrap(), 0);
        assert_eq!(page.data_start().unwrap(), PAGE_SIZE as u16);
        assert!(!page.is_root().unwrap());
        assert_eq!(page.free_space().unwrap(), PAGE_SIZE - HEADER_SIZE);
    }

    #[test]
    fn set_root_roundtrip() {
        let mut page = Page::new();
        page.init_leaf().unwrap();
        page.set_root(true).unwrap();
        assert!(page.is_root().unwrap());
        page.set_root(false).unwrap();
        assert!(!page.is_root().unwrap());
    }
}

#[cfg(test)]
mod insert_tests {
    use super::*;

    #[test]
    fn insert_then_read_back() {
        let mut page = Page::new();
        page.init_leaf().unwrap();

        page.insert(b"users", b"schema blob").unwrap();

        assert_eq!(page.num_cells().unwrap(), 1);
        let cell = page.cell(0).unwrap();
        assert_eq!(cell.key, b"users");
        assert_eq!(cell.value, b"schema blob");

        // Payload = 4 + 5 + 11 = 20, heap grew down by that much.
        assert_eq!(page.data_start().unwrap(), (PAGE_SIZE - 20) as u16);
    }

    #[test]
    fn inserts_stack_downward_in_the_heap() {
        let mut page = Page::new();
        page.init_leaf().unwrap();

        page.insert(b"a", b"first").unwrap();
        let first_start = page.data_start().unwrap();
        page.insert(b"b", b"second").unwrap();
        let second_start = page.data_start().unwrap();

        assert!(second_start < first_start);
        assert_eq!(page.cell(0).unwrap().value, b"first");
        assert_eq!(page.cell(1).unwrap().value, b"second");
    }

    #[test]
    fn exact_fit_succeeds_and_next_insert_fails() {
        let mut page = Page::new();
        page.init_leaf().unwrap();

        // 39 cells of payload 100 (key 4 + value 92) use 39 * 104 bytes of
        // the 4088 free, leaving exactly 32.
        for i in 0..39u32 {
            page.insert(&i.to_le_bytes(), &[0xAB; 92]).unwrap();
        }
        assert_eq!(page.free_space().unwrap(), 32);

        // payload 28 + slot 4 == 32: fits to the last byte.
        page.insert(&99u32.to_le_bytes(), &[0xCD; 20]).unwrap();
        assert_eq!(page.free_space().unwrap(), 0);

        let err = page.insert(b"x", b"").unwrap_err();
        assert!(err.is_page_full());

        // The failed insert must not have changed the page.
        assert_eq!(page.num_cells().unwrap(), 40);
        assert_eq!(page.free_space().unwrap(), 0);
    }

    #[test]
    fn insert_reuses_tombstoned_slot_with_fresh_heap_offset() {
        let mut page = Page::new();
        page.init_leaf().unwrap();

        page.insert(b"k1", b"one").unwrap();
        page.insert(b"k2", b"two").unwrap();
        let heap_before = page.data_start().unwrap();

        page.tombstone(0).unwrap();
        assert!(!page.is_live(0).unwrap());

        page.insert(b"k3", b"three").unwrap();

        // Slot 0 was reused, the directory did not grow, and the cell got a
        // fresh (lower) heap offset.
        assert_eq!(page.num_cells().unwrap(), 2);
        assert!(page.is_live(0).unwrap());
        assert_eq!(page.cell(0).unwrap().key, b"k3");
        assert!(page.data_start().unwrap() < heap_before);
    }
}

#[cfg(test)]
mod tombstone_tests {
    use super::*;

    #[test]
    fn tombstoned_cell_is_unreadable() {
        let mut page = Page::new();
        page.init_leaf().unwrap();
        page.insert(b"k", b"v").unwrap();

        page.tombstone(0).unwrap();

        assert_eq!(page.slot_size(0).unwrap(), 0);
        assert!(matches!(
            page.cell(0),
            Err(crate::PageError::Cell(CellError::TombstonedSlot {
                slot_index: 0
            }))
        ));
    }

    #[test]
    fn tombstone_keeps_directory_entry() {
        let mut page = Page::new();
        page.init_leaf().unwrap();
        page.insert(b"k1", b"v1").unwrap();
        page.insert(b"k2", b"v2").unwrap();

        page.tombstone(0).unwrap();

        // num_cells still counts the tombstone.
        assert_eq!(page.num_cells().unwrap(), 2);
        assert_eq!(page.cell(1).unwrap().key, b"k2");
    }
}

#[cfg(test)]
mod replace_tests {
    use super::*;

    #[test]
    fn replace_smaller_value_in_place_preserves_offset() {
        let mut page = Page::new();
        page.init_leaf().unwrap();
        page.insert(b"key", b"a long value").unwrap();

        let offset_before = page.slot_array_ref().unwrap().slot_ref(0).unwrap();
        let offset_before = offset_before.offset().unwrap();

        assert!(page.replace_value(0, b"short").unwrap());

        let slot = page.slot_array_ref().unwrap().slot_ref(0).unwrap();
        assert_eq!(slot.offset().unwrap(), offset_before);
        // New cell size: 4 + 3 + 5.
        assert_eq!(slot.size().unwrap(), 12);
        assert_eq!(page.cell(0).unwrap().value, b"short");
    }

    #[test]
    fn replace_equal_size_value_in_place() {
        let mut page = Page::new();
        page.init_leaf().unwrap();
        page.insert(b"key", b"12345").unwrap();

        assert!(page.replace_value(0, b"abcde").unwrap());
        assert_eq!(page.cell(0).unwrap().value, b"abcde");
    }

    #[test]
    fn replace_larger_value_is_refused() {
        let mut page = Page::new();
        page.init_leaf().unwrap();
        page.insert(b"key", b"tiny").unwrap();

        assert!(!page.replace_value(0, b"much bigger value").unwrap());
        // Untouched.
        assert_eq!(page.cell(0).unwrap().value, b"tiny");
    }
}
