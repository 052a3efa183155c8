use thiserror::Error;

#[derive(Debug, Error)]
pub enum CellError {
    #[error("cell key length {key_len} overruns the {cell_len}-byte cell")]
    KeyOverrunsCell { key_len: usize, cell_len: usize },
    #[error("attempted to read the cell of tombstoned slot {slot_index}")]
    TombstonedSlot { slot_index: usize },
    #[error("slot range {offset}+{size} overruns the page")]
    SlotOverrunsPage { offset: usize, size: usize },
    #[error("error while interpreting binary data")]
    BinaryError(#[from] binary_helpers::bin_error::BinaryError),
}
