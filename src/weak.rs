//! The non-owning observer handle.

use core::fmt;
use core::mem;
use core::ptr::NonNull;

use crate::alloc::{BlockAlloc, Heap};
use crate::block::Block;
use crate::deleter::{BoxDelete, Deleter};
use crate::owner::OwnerIdent;
use crate::strong::Strong;

/// Promotion failure: the observed object was already destroyed.
///
/// The crate-wide policy is that promotion never panics; this value is
/// the `Result` form of it, returned by `Strong::try_from(&Weak)`.
/// [`Weak::upgrade`] reports the same condition as `None`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Expired;

impl fmt::Display for Expired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("weak handle is expired")
    }
}

impl std::error::Error for Expired {}

/// A non-owning handle observing a [`Strong`]-managed object.
///
/// A `Weak` contributes to the control block's weak count only. It keeps
/// the block alive, never the object: once the last `Strong` drops, the
/// handle is *expired* and can no longer be promoted. A `Weak` never
/// dereferences the pointee and never invokes the deleter.
///
/// Not `Send` or `Sync`, like its strong counterpart.
pub struct Weak<T: ?Sized, D: Deleter<T> = BoxDelete, A: BlockAlloc = Heap> {
    // Same shape and invariant as Strong: both Some or both None. The
    // pointee pointer is retained only so promotion can rebuild a Strong;
    // it is never dereferenced here.
    ptr: Option<NonNull<T>>,
    block: Option<NonNull<Block<D, A>>>,
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Weak<T, D, A> {
    /// An empty handle observing nothing; `expired()` is true.
    pub const fn new() -> Self {
        Weak {
            ptr: None,
            block: None,
        }
    }

    pub(crate) fn from_parts(
        ptr: Option<NonNull<T>>,
        block: Option<NonNull<Block<D, A>>>,
    ) -> Self {
        debug_assert_eq!(ptr.is_some(), block.is_some());
        Weak { ptr, block }
    }

    pub fn is_empty(&self) -> bool {
        self.block.is_none()
    }

    /// True iff the managed object no longer exists: either nothing is
    /// observed, or every strong handle was dropped.
    pub fn expired(&self) -> bool {
        self.block
            .map_or(true, |b| unsafe { b.as_ref() }.strong() == 0)
    }

    /// Number of live strong handles over the observed object, 0 if
    /// empty or expired.
    pub fn use_count(&self) -> usize {
        self.block.map_or(0, |b| unsafe { b.as_ref() }.strong())
    }

    /// Number of live weak handles sharing the control block, 0 if empty.
    pub fn weak_count(&self) -> usize {
        self.block.map_or(0, |b| {
            let b = unsafe { b.as_ref() };
            // Discount the implicit weak held on behalf of the strongs.
            b.weak() - usize::from(b.strong() > 0)
        })
    }

    /// Attempt promotion to a strong handle.
    ///
    /// Returns `None` when expired; the strong count is not touched in
    /// that case, so a dead object is never revived.
    pub fn upgrade(&self) -> Option<Strong<T, D, A>> {
        let block = self.block?;
        let b = unsafe { block.as_ref() };
        if b.strong() == 0 {
            return None;
        }
        b.inc_strong();
        Some(Strong::from_parts(self.ptr, self.block))
    }

    /// A copy of the control-block allocator, or `None` for an empty
    /// handle. Available even after expiry, while the block survives.
    pub fn allocator(&self) -> Option<A>
    where
        A: Clone,
    {
        self.block.map(|b| unsafe { b.as_ref() }.alloc().clone())
    }

    /// Drop this handle's observation, leaving it empty.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Exchange observed links with `other`. O(1), never fails.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// True iff `self`'s control block precedes `other`'s in the
    /// owner-identity order.
    pub fn owner_before<O: OwnerIdent>(&self, other: &O) -> bool {
        other.owner_addr() < self.owner_addr()
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Clone for Weak<T, D, A> {
    /// Attach to the same control block and increment the weak count.
    fn clone(&self) -> Self {
        if let Some(b) = self.block {
            unsafe { b.as_ref() }.inc_weak();
        }
        Weak {
            ptr: self.ptr,
            block: self.block,
        }
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Drop for Weak<T, D, A> {
    fn drop(&mut self) {
        let Some(block) = self.block else {
            debug_assert!(self.ptr.is_none());
            return;
        };
        let b = unsafe { block.as_ref() };

        b.dec_weak();
        if b.weak() == 0 {
            // The implicit weak held by the strong handles keeps the
            // count nonzero while any of them is alive, so reaching zero
            // here means the object already died with the last Strong.
            debug_assert_eq!(b.strong(), 0);
            // SAFETY: both counts are zero; this was the last handle of
            // either kind.
            unsafe { Block::release(block) };
        }
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> Default for Weak<T, D, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> From<&Strong<T, D, A>> for Weak<T, D, A> {
    fn from(strong: &Strong<T, D, A>) -> Self {
        strong.downgrade()
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> OwnerIdent for Weak<T, D, A> {
    fn owner_addr(&self) -> usize {
        self.block.map_or(0, |b| b.as_ptr() as usize)
    }
}

impl<T: ?Sized, D: Deleter<T>, A: BlockAlloc> fmt::Debug for Weak<T, D, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Weak")
            .field("expired", &self.expired())
            .finish()
    }
}
