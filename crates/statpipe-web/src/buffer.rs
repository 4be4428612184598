//! Cross-boundary byte buffers
//!
//! The JS loader moves raw frames in and out of linear memory through
//! these three exports. Ownership crosses the boundary with the pointer:
//! whoever holds the pointer calls `pipe_buffer_release` (or hands it to
//! `pipe_buffer_grow`, which consumes it).
//!
//! Zero-length buffers use a dangling, well-aligned sentinel pointer so
//! callers never have to special-case empties; allocation failure returns
//! null instead of aborting.

use std::alloc::{alloc, dealloc, realloc, Layout};
use std::ptr;

fn byte_layout(len: usize) -> Option<Layout> {
    Layout::array::<u8>(len).ok()
}

/// Allocate `len` bytes and return the pointer, or null on failure.
#[no_mangle]
pub extern "C" fn pipe_buffer_alloc(len: usize) -> *mut u8 {
    if len == 0 {
        return ptr::NonNull::<u8>::dangling().as_ptr();
    }
    match byte_layout(len) {
        Some(layout) => unsafe { alloc(layout) },
        None => ptr::null_mut(),
    }
}

/// Resize a buffer from `old_len` to `new_len` bytes, preserving contents
/// up to the smaller length. Returns the new pointer, or null on failure
/// (in which case the original buffer is still owned by the caller).
///
/// # Safety
///
/// `ptr` must have come from `pipe_buffer_alloc`/`pipe_buffer_grow` with
/// exactly `old_len`, and must not be used again after a non-null return.
#[no_mangle]
pub unsafe extern "C" fn pipe_buffer_grow(ptr: *mut u8, old_len: usize, new_len: usize) -> *mut u8 {
    if old_len == 0 {
        return pipe_buffer_alloc(new_len);
    }
    if new_len == 0 {
        pipe_buffer_release(ptr, old_len);
        return ptr::NonNull::<u8>::dangling().as_ptr();
    }
    match byte_layout(old_len) {
        Some(layout) => realloc(ptr, layout, new_len),
        None => ptr::null_mut(),
    }
}

/// Return a buffer of `len` bytes to the allocator.
///
/// # Safety
///
/// `ptr` must have come from `pipe_buffer_alloc`/`pipe_buffer_grow` with
/// exactly `len`, and must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn pipe_buffer_release(ptr: *mut u8, len: usize) {
    if len == 0 || ptr.is_null() {
        return;
    }
    if let Some(layout) = byte_layout(len) {
        dealloc(ptr, layout);
    }
}
