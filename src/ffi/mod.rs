//! C FFI Module - sds-style exports
//!
//! Buffers handed to C live in a [`HandleStore`] and are addressed by
//! opaque `u64` handles. The store owns each buffer, so a handle stays
//! valid across reallocation until `sds_free` releases it. Handle `0` is
//! never issued and signals failure.

// Exports take raw pointers; each dereference sits behind a null check.
#![allow(clippy::not_unsafe_ptr_arg_deref)]

pub mod sds;

use std::collections::HashMap;
use std::sync::{
    Arc, LazyLock, Mutex, MutexGuard, PoisonError,
    atomic::{AtomicU64, Ordering},
};
use tracing::warn;

static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

pub type Handle = u64;

pub fn new_handle() -> Handle {
    HANDLE_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Statistics for handle store tracking
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HandleStoreStats {
    /// Total handles ever created
    pub total_created: u64,
    /// Total handles destroyed
    pub total_destroyed: u64,
    /// Current live handles
    pub current_count: u64,
    /// Peak concurrent handles
    pub peak_count: u64,
}

/// Handle-addressed storage for values owned on behalf of C callers.
pub struct HandleStore<T> {
    store: Mutex<HashMap<Handle, Arc<Mutex<T>>>>,
    stats: Mutex<HandleStoreStats>,
}

/// Lock, recovering the guard from a poisoned mutex.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> HandleStore<T> {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            stats: Mutex::new(HandleStoreStats::default()),
        }
    }

    /// Insert a value and return its non-zero handle.
    #[must_use = "handle must be stored and later passed to remove() to avoid resource leaks"]
    pub fn insert(&self, value: T) -> Handle {
        let handle = new_handle();
        lock(&self.store).insert(handle, Arc::new(Mutex::new(value)));

        let mut stats = lock(&self.stats);
        stats.total_created += 1;
        stats.current_count += 1;
        stats.peak_count = stats.peak_count.max(stats.current_count);

        handle
    }

    pub fn get(&self, handle: Handle) -> Option<Arc<Mutex<T>>> {
        lock(&self.store).get(&handle).cloned()
    }

    pub fn remove(&self, handle: Handle) -> Option<Arc<Mutex<T>>> {
        let result = lock(&self.store).remove(&handle);
        if result.is_some() {
            let mut stats = lock(&self.stats);
            stats.total_destroyed += 1;
            stats.current_count = stats.current_count.saturating_sub(1);
        }
        result
    }

    pub fn stats(&self) -> HandleStoreStats {
        *lock(&self.stats)
    }

    pub fn len(&self) -> usize {
        lock(&self.store).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> Default for HandleStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for HandleStore<T> {
    fn drop(&mut self) {
        let count = lock(&self.store).len();
        if count > 0 {
            warn!(count, "handle store dropped with unreleased handles");
        }
    }
}

pub static BUFFERS: LazyLock<HandleStore<crate::buffer::Sds>> = LazyLock::new(HandleStore::new);
