//! Checked little-endian integer reads and writes over byte slices.
//!
//! Every on-disk structure in this workspace (page headers, slot entries,
//! cell length prefixes, schema blobs) stores its integers little-endian.
//! This crate provides the bounds-checked primitives those codecs share.

pub mod bin_error;
pub mod le;
