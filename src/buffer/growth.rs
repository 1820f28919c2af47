//! Capacity growth policy

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default doubling threshold, 1 MiB.
pub const MAX_PREALLOC: usize = 1024 * 1024;

/// Decides how much data capacity a buffer gets when it must grow.
///
/// Below `max_prealloc` the required size is doubled so that runs of small
/// appends reallocate rarely. From the threshold on, growth is additive:
/// `max_prealloc` spare bytes on top of what was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrowthPolicy {
    max_prealloc: usize,
}

impl GrowthPolicy {
    /// Create a policy with a custom threshold.
    ///
    /// A zero threshold would never preallocate and is rejected.
    pub fn new(max_prealloc: usize) -> Result<Self> {
        if max_prealloc == 0 {
            return Err(Error::config("max_prealloc must be greater than zero"));
        }
        Ok(Self { max_prealloc })
    }

    #[inline]
    pub fn max_prealloc(&self) -> usize {
        self.max_prealloc
    }

    /// Data capacity (terminator excluded) to allocate so that `addlen`
    /// bytes fit after `len` valid bytes.
    pub fn grow(&self, len: usize, addlen: usize) -> Result<usize> {
        let needed = len
            .checked_add(addlen)
            .ok_or_else(|| Error::limit(format!("length {len} + {addlen} overflows")))?;
        let grown = if needed < self.max_prealloc {
            needed.checked_mul(2)
        } else {
            needed.checked_add(self.max_prealloc)
        };
        grown.ok_or_else(|| Error::limit(format!("growth from {needed} bytes overflows")))
    }

    /// Whether growing to `len + addlen` leaves the doubling regime.
    #[inline]
    pub fn is_additive(&self, len: usize, addlen: usize) -> bool {
        len.saturating_add(addlen) >= self.max_prealloc
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            max_prealloc: MAX_PREALLOC,
        }
    }
}
