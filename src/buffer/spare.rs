//! Scoped reserve/write/commit over a buffer's spare bytes

use super::core::Sds;
use crate::error::{Error, Result};
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Exactly `n` reserved spare bytes of an [`Sds`], borrowed for writing.
///
/// Nothing becomes part of the buffer until [`SpareGuard::commit`] is
/// called with the count actually written. Dropping the guard without
/// committing leaves the length as it was and restores the terminator.
#[must_use = "written bytes are discarded unless committed"]
pub struct SpareGuard<'a> {
    sds: &'a mut Sds,
    reserved: usize,
}

impl Sds {
    /// Reserve `n` spare bytes and borrow exactly that region.
    ///
    /// ```
    /// use sdsbuf::Sds;
    ///
    /// let mut s = Sds::new(b"GET ").unwrap();
    /// let mut spare = s.reserve_spare(16).unwrap();
    /// spare[..3].copy_from_slice(b"key");
    /// spare.commit(3).unwrap();
    /// assert_eq!(s, "GET key");
    /// ```
    pub fn reserve_spare(&mut self, n: usize) -> Result<SpareGuard<'_>> {
        self.make_room_for(n)?;
        Ok(SpareGuard {
            sds: self,
            reserved: n,
        })
    }
}

impl SpareGuard<'_> {
    /// Size of the borrowed region.
    #[inline]
    pub fn len(&self) -> usize {
        self.reserved
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reserved == 0
    }

    /// Make the first `written` bytes of the region part of the buffer.
    ///
    /// Committing more than was reserved is rejected and commits nothing.
    pub fn commit(self, written: usize) -> Result<usize> {
        if written > self.reserved {
            warn!(written, reserved = self.reserved, "spare commit over reservation");
            return Err(Error::contract(format!(
                "commit of {written} bytes exceeds reserved {}",
                self.reserved
            )));
        }
        self.sds.advance(written)?;
        Ok(written)
    }
}

impl Drop for SpareGuard<'_> {
    fn drop(&mut self) {
        // The region starts on the terminator byte.
        let len = self.sds.hdr.len();
        self.sds.buf[len] = 0;
    }
}

impl Deref for SpareGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        let start = self.sds.hdr.len();
        &self.sds.buf[start..start + self.reserved]
    }
}

impl DerefMut for SpareGuard<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        let start = self.sds.hdr.len();
        &mut self.sds.buf[start..start + self.reserved]
    }
}
