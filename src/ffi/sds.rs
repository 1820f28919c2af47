//! C FFI for Sds
//!
//! Constructors return a handle (`0` on failure). Mutators return `0` on
//! success and `-1` on failure; a failed call leaves the buffer unchanged.
//! Accessors on a dead handle return `0`.

use super::{BUFFERS, Handle, HandleStoreStats, lock};
use crate::buffer::Sds;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::ffi::{CStr, c_char, c_int};
use tracing::warn;

/// Run `f` on the buffer behind `handle`.
fn with_sds<R>(handle: Handle, f: impl FnOnce(&mut Sds) -> Result<R>) -> Result<R> {
    let Some(buffer) = BUFFERS.get(handle) else {
        warn!(handle, "sds call on dead handle");
        return Err(Error::InvalidHandle(handle));
    };
    let mut guard = lock(&buffer);
    f(&mut guard)
}

/// Copy of the valid bytes behind `handle`.
fn snapshot(handle: Handle) -> Result<Vec<u8>> {
    with_sds(handle, |s| Ok(s.as_bytes().to_vec()))
}

fn status(result: Result<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(e) => {
            warn!(error = %e, "sds call failed");
            -1
        }
    }
}

fn register(result: Result<Sds>) -> Handle {
    match result {
        Ok(s) => BUFFERS.insert(s),
        Err(e) => {
            warn!(error = %e, "sds creation failed");
            0
        }
    }
}

/// Borrow `len` bytes at `data`; null means no bytes.
///
/// # Safety
/// A non-null `data` must point to `len` readable bytes.
unsafe fn bytes_from<'a>(data: *const u8, len: usize) -> &'a [u8] {
    if data.is_null() || len == 0 {
        return &[];
    }
    // SAFETY: caller guarantees `data` spans `len` bytes
    unsafe { std::slice::from_raw_parts(data, len) }
}

/// Borrow a C string; null reads as empty.
///
/// # Safety
/// A non-null `s` must be a valid null-terminated string.
unsafe fn c_str_from<'a>(s: *const c_char) -> &'a [u8] {
    if s.is_null() {
        return &[];
    }
    // SAFETY: caller guarantees `s` is null-terminated
    unsafe { CStr::from_ptr(s) }.to_bytes()
}

/// Create a buffer of `len` bytes copied from `init`, zero-filled if `init`
/// is null.
#[unsafe(no_mangle)]
pub extern "C" fn sds_new_len(init: *const u8, len: usize) -> Handle {
    if init.is_null() {
        return register(Sds::new_len(None, len));
    }
    // SAFETY: caller guarantees `init` spans `len` bytes
    let data = unsafe { bytes_from(init, len) };
    register(Sds::new(data))
}

/// Create a buffer from a null-terminated string.
#[unsafe(no_mangle)]
pub extern "C" fn sds_new(init: *const c_char) -> Handle {
    // SAFETY: caller guarantees `init` is null or null-terminated
    let data = unsafe { c_str_from(init) };
    register(Sds::new(data))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_empty() -> Handle {
    BUFFERS.insert(Sds::empty())
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_dup(s: Handle) -> Handle {
    register(with_sds(s, |s| s.dup()))
}

/// Release a buffer; the handle is dead afterwards.
#[unsafe(no_mangle)]
pub extern "C" fn sds_free(s: Handle) {
    if BUFFERS.remove(s).is_none() {
        warn!(handle = s, "sds_free on dead handle");
    }
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_len(s: Handle) -> usize {
    with_sds(s, |s| Ok(s.len())).unwrap_or(0)
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_avail(s: Handle) -> usize {
    with_sds(s, |s| Ok(s.avail())).unwrap_or(0)
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_alloc_size(s: Handle) -> usize {
    with_sds(s, |s| Ok(s.alloc_size())).unwrap_or(0)
}

/// Pointer to the null-terminated bytes; the length goes to `len` if
/// non-null.
///
/// # Safety
/// The pointer is valid only until the next call that mutates or frees the
/// buffer.
#[unsafe(no_mangle)]
pub extern "C" fn sds_data(s: Handle, len: *mut usize) -> *const u8 {
    let (ptr, n) = with_sds(s, |s| Ok((s.as_bytes_with_nul().as_ptr(), s.len())))
        .unwrap_or((std::ptr::null(), 0));
    if !len.is_null() {
        // SAFETY: caller guarantees `len` is writable when non-null
        unsafe {
            *len = n;
        }
    }
    ptr
}

/// Reserve `addlen` spare bytes and return a pointer to the first of them.
///
/// Write at most `addlen` bytes there, then commit with `sds_incr_len`.
/// Returns null on failure.
///
/// # Safety
/// Same lifetime rule as [`sds_data`].
#[unsafe(no_mangle)]
pub extern "C" fn sds_spare(s: Handle, addlen: usize) -> *mut u8 {
    with_sds(s, |s| {
        s.make_room_for(addlen)?;
        Ok(s.spare_mut().as_mut_ptr())
    })
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_make_room_for(s: Handle, addlen: usize) -> c_int {
    status(with_sds(s, |s| s.make_room_for(addlen)))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_incr_len(s: Handle, incr: isize) -> c_int {
    status(with_sds(s, |s| s.incr_len(incr)))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_remove_free_space(s: Handle) -> c_int {
    status(with_sds(s, |s| {
        s.remove_free_space();
        Ok(())
    }))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_grow_zero(s: Handle, len: usize) -> c_int {
    status(with_sds(s, |s| s.grow_zero(len)))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_cat_len(s: Handle, t: *const u8, len: usize) -> c_int {
    // SAFETY: caller guarantees `t` spans `len` bytes
    let data = unsafe { bytes_from(t, len) };
    status(with_sds(s, |s| s.cat_len(data)))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_cat(s: Handle, t: *const c_char) -> c_int {
    // SAFETY: caller guarantees `t` is null or null-terminated
    let data = unsafe { c_str_from(t) };
    status(with_sds(s, |s| s.cat_len(data)))
}

/// Append `t` to `s`; `t` may be the same handle as `s`.
#[unsafe(no_mangle)]
pub extern "C" fn sds_cat_sds(s: Handle, t: Handle) -> c_int {
    status(snapshot(t).and_then(|data| with_sds(s, |s| s.cat_len(&data))))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_cpy_len(s: Handle, t: *const u8, len: usize) -> c_int {
    // SAFETY: caller guarantees `t` spans `len` bytes
    let data = unsafe { bytes_from(t, len) };
    status(with_sds(s, |s| s.cpy_len(data)))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_cpy(s: Handle, t: *const c_char) -> c_int {
    // SAFETY: caller guarantees `t` is null or null-terminated
    let data = unsafe { c_str_from(t) };
    status(with_sds(s, |s| s.cpy_len(data)))
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_clear(s: Handle) {
    with_sds(s, |s| {
        s.clear();
        Ok(())
    })
    .ok();
}

#[unsafe(no_mangle)]
pub extern "C" fn sds_update_len(s: Handle) {
    with_sds(s, |s| {
        s.update_len();
        Ok(())
    })
    .ok();
}

/// Handle counters for leak diagnostics: live, peak and lifetime totals.
#[unsafe(no_mangle)]
pub extern "C" fn sds_handle_stats() -> HandleStoreStats {
    BUFFERS.stats()
}

/// Compare two buffers byte-wise: negative, zero or positive.
///
/// A dead handle orders as an empty buffer.
#[unsafe(no_mangle)]
pub extern "C" fn sds_cmp(s1: Handle, s2: Handle) -> c_int {
    let a = snapshot(s1).unwrap_or_default();
    let b = snapshot(s2).unwrap_or_default();
    match a.cmp(&b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}
