//! Core Sds implementation

use super::growth::GrowthPolicy;
use super::header::{Header, MAX_SIZE};
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::ffi::CStr;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::str::FromStr;
use tracing::{debug, trace, warn};

/// A dynamic byte string with O(1) length and amortized O(1) append.
///
/// The header records how many bytes are valid and how many spare bytes
/// follow them. Storage always holds `len + avail + 1` bytes: the extra one
/// is a zero terminator kept directly after the valid bytes, so
/// [`Sds::as_bytes_with_nul`] can be handed to code expecting a C string.
///
/// Mutating methods take `&mut self`; a reallocation can never leave a
/// stale view of the old storage behind.
pub struct Sds {
    pub(super) hdr: Header,
    pub(super) policy: GrowthPolicy,
    /// `hdr.alloc_size()` initialized bytes.
    pub(super) buf: Vec<u8>,
}

/// Allocate `size` zeroed bytes, reporting allocator refusal.
fn alloc_zeroed(size: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(size)?;
    buf.resize(size, 0);
    Ok(buf)
}

impl Sds {
    /// Create a buffer of `len` bytes copied from `init`, or `len` zero bytes
    /// when `init` is `None`. The new buffer has no spare capacity.
    pub fn new_len(init: Option<&[u8]>, len: usize) -> Result<Self> {
        Self::build(init, len, GrowthPolicy::default())
    }

    /// Create a buffer holding a copy of `init`.
    pub fn new(init: &[u8]) -> Result<Self> {
        Self::new_len(Some(init), init.len())
    }

    /// Create a buffer from a C string, terminator excluded.
    pub fn from_c_str(init: &CStr) -> Result<Self> {
        Self::new(init.to_bytes())
    }

    /// Create an empty buffer with no spare capacity.
    pub fn empty() -> Self {
        Self {
            hdr: Header::default(),
            policy: GrowthPolicy::default(),
            buf: vec![0],
        }
    }

    fn build(init: Option<&[u8]>, len: usize, policy: GrowthPolicy) -> Result<Self> {
        let hdr = Header::new(len, 0)?;
        if let Some(data) = init {
            if data.len() < len {
                return Err(Error::contract(format!(
                    "init holds {} bytes, {len} requested",
                    data.len()
                )));
            }
        }
        let mut buf = alloc_zeroed(hdr.alloc_size())?;
        if let Some(data) = init {
            buf[..len].copy_from_slice(&data[..len]);
        }
        Ok(Self { hdr, policy, buf })
    }

    /// Replace the growth policy used by later reservations.
    #[must_use]
    pub fn with_policy(mut self, policy: GrowthPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[inline]
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Number of valid bytes. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.hdr.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hdr.len() == 0
    }

    /// Number of spare bytes after the valid ones. O(1).
    #[inline]
    pub fn avail(&self) -> usize {
        self.hdr.free()
    }

    /// Valid plus spare bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.hdr.capacity()
    }

    /// Bytes backing the buffer, terminator included.
    #[inline]
    pub fn alloc_size(&self) -> usize {
        self.hdr.alloc_size()
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.hdr.len()]
    }

    /// Valid bytes for in-place rewriting; the length cannot change.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        let len = self.hdr.len();
        &mut self.buf[..len]
    }

    /// Valid bytes followed by the zero terminator.
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.buf[..=self.hdr.len()]
    }

    /// View as a C string. Fails if the valid bytes contain a zero.
    pub fn as_c_str(&self) -> Result<&CStr> {
        CStr::from_bytes_with_nul(self.as_bytes_with_nul())
            .map_err(|e| Error::contract(format!("not a C string: {e}")))
    }

    /// The spare bytes, for writing before [`Sds::incr_len`] commits them.
    ///
    /// The first byte is the terminator; callers restore it if they do not
    /// commit. Public writers go through [`Sds::reserve_spare`].
    #[inline]
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        let start = self.hdr.len();
        let end = self.hdr.capacity();
        &mut self.buf[start..end]
    }

    /// Deep copy with no spare capacity, keeping the growth policy.
    pub fn dup(&self) -> Result<Self> {
        Self::build(Some(self.as_bytes()), self.len(), self.policy)
    }

    /// Free the buffer.
    pub fn release(self) {
        trace!(alloc = self.alloc_size(), "sds release");
    }

    /// Guarantee at least `addlen` spare bytes.
    ///
    /// Does nothing when enough space is already free. Otherwise the data
    /// capacity is recomputed by the growth policy and storage reallocated
    /// once. Length and content are never touched; on failure the buffer is
    /// left exactly as it was.
    pub fn make_room_for(&mut self, addlen: usize) -> Result<()> {
        if self.hdr.free() >= addlen {
            return Ok(());
        }
        let len = self.hdr.len();
        let needed = len
            .checked_add(addlen)
            .ok_or_else(|| Error::limit(format!("length {len} + {addlen} overflows")))?;
        // Growth may overshoot the header width even when `needed` fits.
        let cap = self.policy.grow(len, addlen)?.min(MAX_SIZE - 1).max(needed);
        let hdr = Header::new(len, cap - len)?;

        if self.policy.is_additive(len, addlen) {
            debug!(
                needed,
                max_prealloc = self.policy.max_prealloc(),
                "sds growing additively"
            );
        }

        let old_alloc = self.buf.len();
        self.buf.try_reserve_exact(hdr.alloc_size() - old_alloc)?;
        self.buf.resize(hdr.alloc_size(), 0);
        trace!(old_alloc, new_alloc = hdr.alloc_size(), "sds realloc");
        self.hdr = hdr;
        Ok(())
    }

    /// Drop all spare capacity, leaving exactly `len + 1` bytes allocated.
    pub fn remove_free_space(&mut self) {
        if self.hdr.free() == 0 {
            return;
        }
        let old_alloc = self.hdr.alloc_size();
        self.hdr.clear_free();
        self.buf.truncate(self.hdr.alloc_size());
        self.buf.shrink_to_fit();
        trace!(old_alloc, new_alloc = self.hdr.alloc_size(), "sds trimmed");
    }

    /// Set the length inside the current capacity and rewrite the terminator.
    #[inline]
    pub(super) fn set_len(&mut self, len: usize) {
        self.hdr.set_len(len);
        self.buf[len] = 0;
    }

    /// Commit `n` spare bytes as valid.
    pub(super) fn advance(&mut self, n: usize) -> Result<()> {
        let free = self.hdr.free();
        if n > free {
            warn!(n, free, "sds commit exceeds free space");
            return Err(Error::contract(format!(
                "increment {n} exceeds free space {free}"
            )));
        }
        self.set_len(self.hdr.len() + n);
        Ok(())
    }

    /// Adjust the length by `incr` after writing into the spare bytes
    /// directly, or shrink it after over-reserving.
    ///
    /// A positive `incr` larger than [`Sds::avail`], or a negative one larger
    /// than [`Sds::len`], is rejected and leaves the buffer unchanged.
    pub fn incr_len(&mut self, incr: isize) -> Result<()> {
        let n = incr.unsigned_abs();
        if incr >= 0 {
            return self.advance(n);
        }
        let len = self.hdr.len();
        if n > len {
            warn!(incr, len, "sds decrement below zero");
            return Err(Error::contract(format!(
                "decrement {n} exceeds length {len}"
            )));
        }
        self.set_len(len - n);
        Ok(())
    }

    /// Extend to `len` bytes, zero-filling the new ones. No-op if the buffer
    /// is already that long.
    pub fn grow_zero(&mut self, len: usize) -> Result<()> {
        let cur = self.hdr.len();
        if len <= cur {
            return Ok(());
        }
        self.make_room_for(len - cur)?;
        self.buf[cur..=len].fill(0);
        self.set_len(len);
        Ok(())
    }

    /// Append `t`.
    pub fn cat_len(&mut self, t: &[u8]) -> Result<()> {
        let cur = self.hdr.len();
        self.make_room_for(t.len())?;
        self.buf[cur..cur + t.len()].copy_from_slice(t);
        self.set_len(cur + t.len());
        Ok(())
    }

    pub fn cat(&mut self, t: &str) -> Result<()> {
        self.cat_len(t.as_bytes())
    }

    /// Append the valid bytes of another buffer.
    pub fn cat_sds(&mut self, t: &Sds) -> Result<()> {
        self.cat_len(t.as_bytes())
    }

    /// Replace the content with `t`.
    ///
    /// Storage only grows when `t` does not fit in the current capacity.
    pub fn cpy_len(&mut self, t: &[u8]) -> Result<()> {
        if self.hdr.capacity() < t.len() {
            self.make_room_for(t.len() - self.hdr.len())?;
        }
        self.buf[..t.len()].copy_from_slice(t);
        self.set_len(t.len());
        Ok(())
    }

    pub fn cpy(&mut self, t: &str) -> Result<()> {
        self.cpy_len(t.as_bytes())
    }

    /// Empty the buffer, keeping its capacity as spare space.
    pub fn clear(&mut self) {
        self.set_len(0);
    }

    /// Shorten to `len` bytes; the cut tail becomes spare space.
    pub fn truncate(&mut self, len: usize) {
        if len < self.hdr.len() {
            self.set_len(len);
        }
    }

    /// Recompute the length as the offset of the first zero byte.
    ///
    /// Used after raw writes that placed a terminator by hand. The search
    /// covers the spare bytes too and is bounded by the final zero byte of
    /// storage.
    pub fn update_len(&mut self) {
        let cap = self.hdr.capacity();
        let len = self.buf[..=cap].iter().position(|&b| b == 0).unwrap_or(cap);
        self.hdr.set_len(len);
    }

    /// Byte-wise comparison; a proper prefix orders first.
    pub fn compare(&self, other: &Sds) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl Default for Sds {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromStr for Sds {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s.as_bytes())
    }
}

impl fmt::Debug for Sds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sds")
            .field("len", &self.len())
            .field("free", &self.avail())
            .field("data", &String::from_utf8_lossy(self.as_bytes()))
            .finish()
    }
}

impl Deref for Sds {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for Sds {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for Sds {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for Sds {}

impl PartialEq<[u8]> for Sds {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&str> for Sds {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialOrd for Sds {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for Sds {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for Sds {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}
