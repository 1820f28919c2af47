//! Fixed-width length/free header

use crate::error::{Error, Result};

/// Integer type of the header fields.
pub type HeaderWord = u32;

/// Largest allocation a header can describe, terminator included.
pub const MAX_SIZE: usize = HeaderWord::MAX as usize;

/// Length and free-space bookkeeping stored beside the bytes of an `Sds`.
///
/// `len + free + 1` always fits in a `HeaderWord`; the constructor refuses
/// anything larger so the fields never wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Header {
    len: HeaderWord,
    free: HeaderWord,
}

impl Header {
    /// Build a header for `len` valid bytes followed by `free` spare bytes.
    pub fn new(len: usize, free: usize) -> Result<Self> {
        let total = len
            .checked_add(free)
            .and_then(|n| n.checked_add(1))
            .ok_or_else(|| Error::limit("buffer size overflows usize"))?;
        if total > MAX_SIZE {
            return Err(Error::limit(format!(
                "allocation of {total} bytes exceeds header maximum {MAX_SIZE}"
            )));
        }
        // Both fit: each is at most total - 1.
        Ok(Self {
            len: len as HeaderWord,
            free: free as HeaderWord,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn free(&self) -> usize {
        self.free as usize
    }

    /// Data capacity: valid plus spare bytes, terminator excluded.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.len() + self.free()
    }

    /// Bytes backing the buffer, terminator included.
    #[inline]
    pub fn alloc_size(&self) -> usize {
        self.capacity() + 1
    }

    /// Move the length within the current capacity.
    ///
    /// Callers check `len <= capacity()` first; the capacity is unchanged so
    /// the width bound still holds.
    #[inline]
    pub(super) fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.capacity());
        let cap = self.capacity();
        self.len = len as HeaderWord;
        self.free = (cap - len) as HeaderWord;
    }

    #[inline]
    pub(super) fn clear_free(&mut self) {
        self.free = 0;
    }
}
