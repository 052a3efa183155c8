use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsertError {
    #[error("unable to insert a {needed}-byte cell+slot in a page with {free} free bytes")]
    PageFull {
        /// Bytes required for the cell payload plus its directory slot.
        needed: usize,
        /// Free bytes between the slot directory and the heap.
        free: usize,
    },
}
