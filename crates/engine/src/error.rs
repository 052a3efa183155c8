use binary_helpers::bin_error::BinaryError;
use page::PageError;
use pager::PagerError;
use thiserror::Error;

/// Errors while encoding or decoding catalog entries on page 0.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("schema blob truncated at offset {at} (wanted {wanted} more bytes)")]
    TruncatedBlob { at: usize, wanted: usize },
    #[error("catalog entry name is not valid UTF-8")]
    InvalidName,
    #[error("unknown column type tag {raw}")]
    UnknownColumnType { raw: u32 },
    #[error("error while interpreting binary data")]
    Binary(#[from] BinaryError),
}

/// Errors while decoding a serialized row against a schema.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("row data truncated at offset {at} in column {column}")]
    Truncated { at: usize, column: usize },
    #[error("error while interpreting binary data")]
    Binary(#[from] BinaryError),
}

/// Internal failures of the execution core: storage i/o, corrupt pages,
/// corrupt catalog blobs or rows. These are not client mistakes; the server
/// logs them and answers with the catchall execution-failed line.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("pager error")]
    Pager(#[from] PagerError),
    #[error("page error")]
    Page(#[from] PageError),
    #[error("catalog error")]
    Catalog(#[from] CatalogError),
    #[error("row codec error")]
    Row(#[from] RowError),
}
