//! The control block: count bookkeeping, stored deleter and allocator.
//!
//! A block never decides anything on its own. It mutates counts on
//! request and exposes the resulting values; the handle destructors act
//! on them. The only exceptions are the two terminal operations,
//! `run_deleter` and `release`, which the handles call at the count
//! transitions the crate-level docs describe.

use core::cell::{Cell, UnsafeCell};
use std::alloc::Layout;
use std::ptr::{self, NonNull};

use crate::alloc::BlockAlloc;
use crate::deleter::Deleter;

pub(crate) struct Block<D, A> {
    strong: Cell<usize>,
    weak: Cell<usize>,
    deleter: UnsafeCell<D>,
    alloc: A,
}

impl<D, A: BlockAlloc> Block<D, A> {
    /// Allocate a block through `alloc` and initialize it with
    /// `strong = 1`, `weak = 1`. The weak count starts at one because the
    /// strong handles collectively hold one implicit weak reference,
    /// given up by the last strong drop after the deleter has run. The
    /// allocator is moved into the block so the matching `deallocate` in
    /// [`Block::release`] uses the same instance.
    pub(crate) fn new_in(deleter: D, alloc: A) -> NonNull<Self> {
        let layout = Layout::new::<Self>();
        let mem = alloc.allocate(layout).cast::<Self>();
        // SAFETY: `mem` is fresh storage for one `Self` per the
        // BlockAlloc contract.
        unsafe {
            mem.as_ptr().write(Block {
                strong: Cell::new(1),
                weak: Cell::new(1),
                deleter: UnsafeCell::new(deleter),
                alloc,
            });
        }
        mem
    }

    /// Free the block through its own allocator. The sole deallocation
    /// path; callers dispatch here from whichever handle destructor
    /// observed both counts at zero.
    ///
    /// # Safety
    ///
    /// `block` came from [`Block::new_in`], both counts are zero, and no
    /// handle references it afterwards.
    pub(crate) unsafe fn release(block: NonNull<Self>) {
        let raw = block.as_ptr();
        debug_assert_eq!((*raw).strong.get(), 0);
        debug_assert_eq!((*raw).weak.get(), 0);
        // Move the allocator out before the block's storage goes away,
        // then drop the remaining field in place.
        let alloc = ptr::read(ptr::addr_of!((*raw).alloc));
        ptr::drop_in_place(ptr::addr_of_mut!((*raw).deleter));
        alloc.deallocate(block.cast::<u8>(), Layout::new::<Self>());
    }
}

impl<D, A> Block<D, A> {
    #[inline]
    pub(crate) fn strong(&self) -> usize {
        self.strong.get()
    }

    #[inline]
    pub(crate) fn weak(&self) -> usize {
        self.weak.get()
    }

    #[inline]
    pub(crate) fn inc_strong(&self) {
        let n = self.strong.get().wrapping_add(1);
        self.strong.set(n);
        if n == 0 {
            // Follow Rc semantics: abort on overflow rather than continue unsafely.
            std::process::abort();
        }
    }

    #[inline]
    pub(crate) fn dec_strong(&self) {
        let c = self.strong.get();
        assert!(c > 0, "strong count underflow");
        self.strong.set(c - 1);
    }

    #[inline]
    pub(crate) fn inc_weak(&self) {
        let n = self.weak.get().wrapping_add(1);
        self.weak.set(n);
        if n == 0 {
            std::process::abort();
        }
    }

    #[inline]
    pub(crate) fn dec_weak(&self) {
        let c = self.weak.get();
        assert!(c > 0, "weak count underflow");
        self.weak.set(c - 1);
    }

    /// Invoke the stored deleter on `ptr`.
    ///
    /// # Safety
    ///
    /// Called exactly once per managed object, with the pointer the
    /// owning handle was constructed from, and never reentrantly.
    pub(crate) unsafe fn run_deleter<T: ?Sized>(&self, ptr: *mut T)
    where
        D: Deleter<T>,
    {
        (*self.deleter.get()).delete(ptr);
    }

    /// Shared access to the stored deleter.
    ///
    /// # Safety
    ///
    /// The returned borrow must not overlap a `run_deleter` call. Handle
    /// accessors uphold this: the deleter only runs once no strong handle
    /// is left to borrow it through.
    pub(crate) unsafe fn deleter(&self) -> &D {
        &*self.deleter.get()
    }

    pub(crate) fn alloc(&self) -> &A {
        &self.alloc
    }
}
