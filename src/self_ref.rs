//! Self-referencing support for managed objects.
//!
//! An object that wants to mint handles to itself embeds a [`SelfRef`]
//! and implements [`SelfReferential`]. The weak handle inside the mixin
//! is installed once, by `Strong::new_self_referential`, after the object
//! is already wrapped; using the mixin before that wrap is a caller error
//! and panics.

use core::cell::RefCell;
use core::fmt;

use crate::strong::Strong;
use crate::weak::Weak;

/// The embedded slot holding a weak handle back to the owning object.
///
/// Starts empty; `Strong::new_self_referential` fills it exactly once.
/// The slot itself never keeps the object alive.
pub struct SelfRef<T> {
    weak: RefCell<Weak<T>>,
}

impl<T> SelfRef<T> {
    pub const fn new() -> Self {
        SelfRef {
            weak: RefCell::new(Weak::new()),
        }
    }

    pub(crate) fn install(&self, weak: Weak<T>) {
        let mut slot = self.weak.borrow_mut();
        debug_assert!(slot.is_empty(), "self reference installed twice");
        *slot = weak;
    }

    /// Mint a strong handle to the owning object.
    ///
    /// # Panics
    ///
    /// Panics if the object was never wrapped via
    /// `Strong::new_self_referential`.
    pub fn to_strong(&self) -> Strong<T> {
        self.weak
            .borrow()
            .upgrade()
            .expect("self reference used before the object was wrapped")
    }

    /// Mint a weak handle to the owning object.
    ///
    /// # Panics
    ///
    /// Panics if the object was never wrapped via
    /// `Strong::new_self_referential`.
    pub fn to_weak(&self) -> Weak<T> {
        let slot = self.weak.borrow();
        assert!(
            !slot.is_empty(),
            "self reference used before the object was wrapped"
        );
        slot.clone()
    }
}

impl<T> Default for SelfRef<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SelfRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SelfRef")
    }
}

/// Opt-in capability: the object exposes its embedded [`SelfRef`].
///
/// The provided methods are the public face of the mixin; from inside any
/// method of `Self` the object can call `self.to_strong()` without ever
/// touching a raw `self` pointer.
pub trait SelfReferential: Sized {
    fn self_ref(&self) -> &SelfRef<Self>;

    fn to_strong(&self) -> Strong<Self> {
        self.self_ref().to_strong()
    }

    fn to_weak(&self) -> Weak<Self> {
        self.self_ref().to_weak()
    }
}
