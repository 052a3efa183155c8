//! Data-file access and the bounded page cache.
//!
//! The pager owns the single database file and a fixed-size table of
//! materialized pages indexed by page number. Mutating callers follow a
//! write-through discipline: every page mutation is flushed before the
//! statement that made it reports success.

pub mod error;
pub mod pager;

pub use error::PagerError;
pub use pager::{MAX_PAGES, Pager};
