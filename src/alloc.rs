//! Control-block allocation strategies.
//!
//! A `BlockAlloc` provides storage for the control block only; the
//! pointee is allocated by the caller and destroyed by the deleter. The
//! block is always deallocated through the same allocator instance it was
//! allocated from, so matching alloc/dealloc pairs are guaranteed by
//! construction.

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::ptr::NonNull;

/// Allocates and deallocates control-block storage.
pub trait BlockAlloc {
    /// Allocate storage for one control block.
    ///
    /// Must not return null: implementations diverge on failure (e.g. via
    /// [`handle_alloc_error`]). `layout` always has nonzero size.
    fn allocate(&self, layout: Layout) -> NonNull<u8>;

    /// Release storage previously obtained from [`BlockAlloc::allocate`].
    ///
    /// # Safety
    ///
    /// `ptr` was returned by `allocate` on this allocator with the same
    /// `layout`, and is not used after this call.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// Default allocator: the global heap.
#[derive(Copy, Clone, Debug, Default)]
pub struct Heap;

impl BlockAlloc for Heap {
    fn allocate(&self, layout: Layout) -> NonNull<u8> {
        debug_assert!(layout.size() != 0);
        // SAFETY: layout has nonzero size (a block holds two counts).
        let ptr = unsafe { alloc(layout) };
        match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => handle_alloc_error(layout),
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        dealloc(ptr.as_ptr(), layout);
    }
}
