use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PagerError {
    #[error("could not open database file {path}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("i/o error on page {page_num}")]
    Io {
        page_num: u32,
        source: std::io::Error,
    },
    #[error("page number {page_num} out of bounds for cache (max {max})")]
    PageOutOfBounds { page_num: u32, max: usize },
    #[error("tried to flush page {page_num} which is not in cache")]
    FlushUncached { page_num: u32 },
}
