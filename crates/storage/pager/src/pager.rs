//! The pager: page materialization and write-through flushing against the
//! single database file.

use crate::error::PagerError;
use page::{PAGE_SIZE, Page};
use std::fs::{File, OpenOptions};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::FileExt;
#[cfg(windows)]
use std::os::windows::fs::FileExt;

/// Upper bound on the page cache; also the hard cap on addressable pages
/// until the cache learns eviction.
pub const MAX_PAGES: usize = 100;

/// Owns the database file and a fixed table of cached pages indexed by page
/// number. Page 0 is the catalog root; pages `1..num_pages` belong to user
/// tables and indexes.
#[derive(Debug)]
pub struct Pager {
    file: File,
    /// Length of the backing file in bytes.
    file_len: u64,
    /// Number of pages the database addresses. Grows when a page is
    /// allocated, before that page is ever flushed.
    num_pages: u32,
    /// Materialized pages. `None` until first touched.
    cache: Vec<Option<Page>>,
}

impl Pager {
    /// Opens (creating if missing) the database file and sizes the page
    /// table. A file length that is not a multiple of [`PAGE_SIZE`] is
    /// suspicious but tolerated: the trailing partial page reads as
    /// zero-padded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PagerError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| PagerError::Open {
                path: path.to_path_buf(),
                source: e,
            })?;

        let file_len = file
            .metadata()
            .map_err(|e| PagerError::Open {
                path: path.to_path_buf(),
                source: e,
            })?
            .len();

        if file_len % PAGE_SIZE as u64 != 0 {
            tracing::warn!(
                file_len,
                "database file length is not a multiple of the page size; corrupt?"
            );
        }

        let mut cache = Vec::with_capacity(MAX_PAGES);
        cache.resize_with(MAX_PAGES, || None);

        Ok(Self {
            file,
            file_len,
            num_pages: (file_len / PAGE_SIZE as u64) as u32,
            cache,
        })
    }

    /// Number of pages the database currently addresses.
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Hands out the next page number and grows the addressable range. The
    /// page itself only reaches disk on its first [`Pager::flush`].
    pub fn allocate_page(&mut self) -> u32 {
        let page_num = self.num_pages;
        self.num_pages += 1;
        page_num
    }

    /// Returns the cached page, materializing it on first touch: a zeroed
    /// buffer, filled from disk when the page lies within the file (a short
    /// read leaves the tail zeroed).
    pub fn page(&mut self, page_num: u32) -> Result<&mut Page, PagerError> {
        if page_num as usize >= MAX_PAGES {
            return Err(PagerError::PageOutOfBounds {
                page_num,
                max: MAX_PAGES,
            });
        }

        let slot = &mut self.cache[page_num as usize];
        if slot.is_none() {
            let mut page = Page::new();

            let offset = page_num as u64 * PAGE_SIZE as u64;
            if offset < self.file_len {
                Self::read_at(&self.file, page.data_mut(), offset)
                    .map_err(|e| PagerError::Io {
                        page_num,
                        source: e,
                    })?;
            }

            *slot = Some(page);
        }

        // The slot was just filled if it was empty.
        Ok(slot.as_mut().unwrap())
    }

    /// Writes the cached page's full [`PAGE_SIZE`] bytes at its file offset.
    /// Extending writes advance `file_len` and `num_pages`.
    pub fn flush(&mut self, page_num: u32) -> Result<(), PagerError> {
        if page_num as usize >= MAX_PAGES {
            return Err(PagerError::PageOutOfBounds {
                page_num,
                max: MAX_PAGES,
            });
        }

        let page = self.cache[page_num as usize]
            .as_ref()
            .ok_or(PagerError::FlushUncached { page_num })?;

        let offset = page_num as u64 * PAGE_SIZE as u64;
        Self::write_at(&self.file, page.data(), offset).map_err(|e| PagerError::Io {
            page_num,
            source: e,
        })?;

        let file_end = offset + PAGE_SIZE as u64;
        if file_end > self.file_len {
            self.file_len = file_end;
            self.num_pages = self.num_pages.max((self.file_len / PAGE_SIZE as u64) as u32);
        }

        Ok(())
    }

    /// Reads up to `buf.len()` bytes at `offset`, tolerating a short read at
    /// end-of-file (the remainder of `buf` keeps its previous contents).
    fn read_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
        let mut read = 0;
        while read < buf.len() {
            #[cfg(unix)]
            let n = file.read_at(&mut buf[read..], offset + read as u64)?;
            #[cfg(windows)]
            let n = file.seek_read(&mut buf[read..], offset + read as u64)?;

            if n == 0 {
                break; // EOF short read; the rest stays zeroed
            }
            read += n;
        }
        Ok(())
    }

    /// Writes all of `buf` at `offset`.
    fn write_at(file: &File, buf: &[u8], offset: u64) -> std::io::Result<()> {
        let mut written = 0;
        while written < buf.len() {
            #[cfg(unix)]
            let n = file.write_at(&buf[written..], offset + written as u64)?;
            #[cfg(windows)]
            let n = file.seek_write(&buf[written..], offset + written as u64)?;

            if n == 0 {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "disk write wrote 0 bytes",
                ));
            }
            written += n;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_missing_file_starts_empty() {
        let dir = tempdir().unwrap();
        let pager = Pager::open(dir.path().join("db")).unwrap();
        assert_eq!(pager.num_pages(), 0);
    }

    #[test]
    fn fresh_page_is_zeroed() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("db")).unwrap();

        let n = pager.allocate_page();
        assert_eq!(n, 0);
        let page = pager.page(n).unwrap();
        assert!(page.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn flush_extends_the_file_and_page_count() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db");
        let mut pager = Pager::open(&path).unwrap();

        let n = pager.allocate_page();
        pager.page(n).unwrap().init_leaf().unwrap();
        pager.flush(n).unwrap();

        assert_eq!(pager.num_pages(), 1);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), PAGE_SIZE as u64);
    }

    #[test]
    fn reopen_reads_back_flushed_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db");

        {
            let mut pager = Pager::open(&path).unwrap();
            let n = pager.allocate_page();
            let page = pager.page(n).unwrap();
            page.init_leaf().unwrap();
            page.insert(b"key", b"value").unwrap();
            pager.flush(n).unwrap();
        }

        let mut pager = Pager::open(&path).unwrap();
        assert_eq!(pager.num_pages(), 1);
        let page = pager.page(0).unwrap();
        assert_eq!(page.num_cells().unwrap(), 1);
        let cell = page.cell(0).unwrap();
        assert_eq!(cell.key, b"key");
        assert_eq!(cell.value, b"value");
    }

    #[test]
    fn page_out_of_bounds_is_an_error() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("db")).unwrap();
        assert!(matches!(
            pager.page(MAX_PAGES as u32),
            Err(PagerError::PageOutOfBounds { .. })
        ));
    }

    #[test]
    fn flush_of_uncached_page_is_an_error() {
        let dir = tempdir().unwrap();
        let mut pager = Pager::open(dir.path().join("db")).unwrap();
        let n = pager.allocate_page();
        assert!(matches!(
            pager.flush(n),
            Err(PagerError::FlushUncached { page_num: 0 })
        ));
    }
}
