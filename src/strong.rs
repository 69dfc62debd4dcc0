//! The owning handle.

use core::fmt;
use core::mem;
use core::ops::Deref;
use core::ptr::NonNull;

use crate::alloc::{BlockAlloc, Heap};
use crate::block::Block;
use crate::deleter::{BoxDelete, Deleter};
use crate::owner::OwnerIdent;
use crate::self_ref::SelfReferential;
use crate::weak::{Expired, Weak};

/// A shared-ownership handle to a heap object.
///
/// Every live `Strong` contributes one to its control block's strong
/// count; the managed object is destroyed (through the stored deleter)
/// when the last `Strong` is dropped, independently of any [`Weak`]
/// observers. Handles may also be *empty*: no pointee, no control block,
/// no count contribution.
///
/// `D` destroys the pointee and `A` allocates the control block; both
/// default to the `Box`/global-heap pair used by [`Strong::new`].
///
/// Not `Send` or `Sync`: counts are plain non-atomic cells.
pub struct Strong<T: ?Sized, D: Deleter<T> = BoxDelete, A: BlockAlloc = Heap> {
    // Both `Some` or both `None`; the block pointer alone decides
    // emptiness everywhere else in the crate.
    ptr: Option<NonNull<T>>,
    block: Option<NonNull<Block<D, A>>>,
}

impl<T> Strong<T> {
    /// Construct `value` on the heap and wrap it in one step.
    ///
    /// ```
    /// # use rc_handle::Strong;
    /// let s = Strong::new(6);
    /// assert_eq!(*s, 6);
    /// assert_eq!(s.use_count(), 1);
    /// ```
    pub fn new(value: T) -> Self {
        // SAFETY: the pointer is a fresh Box allocation, matching BoxDelete.
        unsafe { Self::from_raw(Box::into_raw(Box::new(value))) }
    }
}

impl<T: SelfReferential> Strong<T> {
    /// Wrap a self-referential object.
    ///
    /// Two-phase initialization: the object is first wrapped like
    /// [`Strong::new`], then a weak handle to it is installed into its
    /// embedded [`SelfRef`][crate::SelfRef]. The object must not use its
    /// self reference before this constructor returns. Restricted to the
    /// default deleter and allocator; the mixin assumes `Box` destruction
    /// semantics.
    pub fn new_self_referential(value: T) -> Self {
        let strong = Strong::new(value);
        let weak = strong.downgrade();
        SelfReferential::self_ref(&*strong).install(weak);
        strong
    }
}

impl<T: ?Sized> Strong<T> {
    /// Take ownership of a `Box`, the move-only unique-ownership form.
    /// The pointer transfers to a fresh control block with a strong count
    /// of one.
    pub fn from_box(boxed: Box<T>) -> Self {
        // SAFETY: a Box pointer is non-null and matches BoxDelete.
        unsafe { Self::from_raw(Box::into_raw(boxed)) }
    }

    /// Take ownership of a raw pointer with the default deleter and
    /// allocator. A null pointer yields an empty handle.
    ///
    /// # Safety
    ///
    /// `ptr` is null or was obtained from `Box::into_raw`, and ownership
    /// transfers to the returned handle.
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        Self::from_raw_parts(ptr, BoxDelete, Heap)
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Strong<T, D, A> {
    /// An empty handle: null pointee, no control block, counts untouched.
    pub const fn empty() -> Self {
        Strong {
            ptr: None,
            block: None,
        }
    }

    /// Take ownership of a raw pointer with an explicit deleter and
    /// control-block allocator. A null pointer yields an empty handle and
    /// the deleter is discarded unused.
    ///
    /// # Safety
    ///
    /// `ptr` is null or points to a live object that `deleter` can
    /// destroy, and ownership transfers to the returned handle.
    pub unsafe fn from_raw_parts(ptr: *mut T, deleter: D, alloc: A) -> Self {
        let Some(ptr) = NonNull::new(ptr) else {
            return Self::empty();
        };
        let block = Block::new_in(deleter, alloc);
        Strong {
            ptr: Some(ptr),
            block: Some(block),
        }
    }

    pub(crate) fn from_parts(
        ptr: Option<NonNull<T>>,
        block: Option<NonNull<Block<D, A>>>,
    ) -> Self {
        debug_assert_eq!(ptr.is_some(), block.is_some());
        Strong { ptr, block }
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// The managed pointer, or `None` for an empty handle.
    pub fn as_ptr(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Borrow the pointee, or `None` for an empty handle.
    pub fn value(&self) -> Option<&T> {
        // SAFETY: a non-empty handle contributes to the strong count, so
        // the pointee outlives this borrow of `self`.
        self.ptr.map(|p| unsafe { &*p.as_ptr() })
    }

    /// Mutably borrow the pointee, but only while this handle is the sole
    /// reference of either kind. Mirrors `Rc::get_mut`.
    pub fn value_mut(&mut self) -> Option<&mut T> {
        let block = unsafe { self.block?.as_ref() };
        // weak == 1 means only the implicit weak reference remains.
        if block.strong() == 1 && block.weak() == 1 {
            // SAFETY: no other handle exists, so the borrow is exclusive.
            self.ptr.map(|p| unsafe { &mut *p.as_ptr() })
        } else {
            None
        }
    }

    /// Number of live strong handles sharing the object, 0 if empty.
    pub fn use_count(&self) -> usize {
        self.block.map_or(0, |b| unsafe { b.as_ref() }.strong())
    }

    /// Number of live weak handles observing the object, 0 if empty.
    pub fn weak_count(&self) -> usize {
        self.block.map_or(0, |b| {
            let b = unsafe { b.as_ref() };
            // Discount the implicit weak held on behalf of the strongs.
            b.weak() - usize::from(b.strong() > 0)
        })
    }

    /// True iff this is the only strong handle over the object.
    pub fn is_unique(&self) -> bool {
        self.use_count() == 1
    }

    /// Borrow the stored deleter, or `None` for an empty handle.
    pub fn deleter(&self) -> Option<&D> {
        // SAFETY: while the returned borrow of `self` lives, this handle
        // keeps the strong count >= 1, so the deleter cannot run.
        self.block.map(|b| unsafe { b.as_ref().deleter() })
    }

    /// A copy of the control-block allocator, or `None` for an empty
    /// handle.
    pub fn allocator(&self) -> Option<A>
    where
        A: Clone,
    {
        self.block.map(|b| unsafe { b.as_ref() }.alloc().clone())
    }

    /// Create a weak handle observing the same object. Downgrading an
    /// empty handle yields an empty weak handle.
    pub fn downgrade(&self) -> Weak<T, D, A> {
        if let Some(b) = self.block {
            unsafe { b.as_ref() }.inc_weak();
        }
        Weak::from_parts(self.ptr, self.block)
    }

    /// Drop this handle's ownership, leaving it empty.
    ///
    /// This releases the prior pointee like any other drop would;
    /// assigning an empty handle over a non-empty one behaves the same
    /// way (conventional shared-pointer semantics).
    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// Exchange pointee and control-block links with `other`. O(1), never
    /// fails, counts untouched.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// True iff `self`'s control block precedes `other`'s in the
    /// owner-identity order. Accepts either handle kind; empty handles
    /// order as owner address 0.
    pub fn owner_before<O: OwnerIdent>(&self, other: &O) -> bool {
        other.owner_addr() < self.owner_addr()
    }
}

impl<T, D: Deleter<T>, A: BlockAlloc> Strong<T, D, A> {
    /// The raw managed pointer, null for an empty handle.
    pub fn get(&self) -> *mut T {
        self.ptr.map_or(core::ptr::null_mut(), NonNull::as_ptr)
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Clone for Strong<T, D, A> {
    /// Attach to the same control block and increment the strong count.
    fn clone(&self) -> Self {
        if let Some(b) = self.block {
            unsafe { b.as_ref() }.inc_strong();
        }
        Strong {
            ptr: self.ptr,
            block: self.block,
        }
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Drop for Strong<T, D, A> {
    fn drop(&mut self) {
        let Some(block) = self.block else {
            debug_assert!(self.ptr.is_none());
            return;
        };
        let b = unsafe { block.as_ref() };

        if b.strong() != 1 {
            b.dec_strong();
            return;
        }

        // Last strong handle. The strong count hits zero before the
        // deleter runs, so any promotion attempted from inside the
        // pointee's destructor fails instead of reviving the object.
        b.dec_strong();
        if let Some(ptr) = self.ptr.take() {
            unsafe { b.run_deleter(ptr.as_ptr()) };
        }

        // Give up the implicit weak reference the strong handles held;
        // until here the weak count stayed nonzero, so a Weak dropped
        // inside the deleter could not have released the block.
        b.dec_weak();
        if b.weak() == 0 {
            // SAFETY: both counts are zero and no handle references the
            // block anymore.
            unsafe { Block::release(block) };
        }
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Default for Strong<T, D, A> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> From<Box<T>> for Strong<T> {
    fn from(boxed: Box<T>) -> Self {
        Self::from_box(boxed)
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> TryFrom<&Weak<T, D, A>> for Strong<T, D, A> {
    type Error = Expired;

    /// Promotion with an error value; the `Result`-shaped twin of
    /// [`Weak::upgrade`].
    fn try_from(weak: &Weak<T, D, A>) -> Result<Self, Expired> {
        weak.upgrade().ok_or(Expired)
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Deref for Strong<T, D, A> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the handle is empty.
    fn deref(&self) -> &T {
        self.value().expect("dereferenced an empty Strong handle")
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> OwnerIdent for Strong<T, D, A> {
    fn owner_addr(&self) -> usize {
        self.block.map_or(0, |b| b.as_ptr() as usize)
    }
}

impl<T: ?Sized + fmt::Debug, D: Deleter<T>, A: BlockAlloc> fmt::Debug for Strong<T, D, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = f.debug_tuple("Strong");
        if let Some(value) = self.value() {
            t.field(&value);
        }
        t.finish()
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> fmt::Pointer for Strong<T, D, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let addr: *const () = self
            .ptr
            .map_or(core::ptr::null(), |p| p.cast::<()>().as_ptr() as *const ());
        fmt::Pointer::fmt(&addr, f)
    }
}
