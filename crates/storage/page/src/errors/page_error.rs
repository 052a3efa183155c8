use crate::errors::cell_error::CellError;
use crate::errors::header_error::HeaderError;
use crate::errors::insert_error::InsertError;
use crate::errors::slot_error::SlotError;
use thiserror::Error;

/// Aggregator error type for all page-level sub-errors. This is what the
/// public `Page` API surfaces; callers that care (the executor maps a full
/// page to a client-visible outcome) match on the variant.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("error while accessing header")]
    Header(#[from] HeaderError),
    #[error("error while accessing slot directory")]
    Slot(#[from] SlotError),
    #[error("error while reading cell")]
    Cell(#[from] CellError),
    #[error("error while inserting cell")]
    Insert(#[from] InsertError),
}

impl PageError {
    /// Whether this error is the page rejecting an insert for lack of room,
    /// as opposed to a corrupt or misused page.
    pub fn is_page_full(&self) -> bool {
        matches!(self, PageError::Insert(InsertError::PageFull { .. }))
    }
}

/// Result type of page operations.
pub type PageResult<T> = Result<T, PageError>;
