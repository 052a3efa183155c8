use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("header error")]
    BinaryError(#[from] binary_helpers::bin_error::BinaryError),
    #[error("arithmetic error while computing offsets within the page")]
    OffsetArithmetic,
    #[error("provided slice length ({actual}) does not match the expected length ({expected})")]
    HeaderSliceSizeMismatch { actual: usize, expected: usize },
}
