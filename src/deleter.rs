//! Pointee destruction strategies.
//!
//! The deleter is stored in the control block and invoked exactly once,
//! with the raw pointer the handle was constructed from, when the last
//! strong handle is dropped. Weak handles never invoke it.

/// Destroys the managed object when the strong count reaches zero.
///
/// Invocability with the pointee type is a compile-time bound on handle
/// construction; there is no runtime check.
pub trait Deleter<T: ?Sized> {
    /// Destroy the pointee and release its storage.
    ///
    /// # Safety
    ///
    /// `ptr` is the pointer the owning handle was constructed from. It is
    /// valid for the pointee's layout and is not used again afterwards.
    /// Called at most once per managed object.
    unsafe fn delete(&mut self, ptr: *mut T);
}

/// Default deleter: assumes the pointee came from [`Box`] and drops it.
#[derive(Copy, Clone, Debug, Default)]
pub struct BoxDelete;

impl<T: ?Sized> Deleter<T> for BoxDelete {
    unsafe fn delete(&mut self, ptr: *mut T) {
        drop(Box::from_raw(ptr));
    }
}

/// Adapter turning any `FnMut(*mut T)` into a [`Deleter`].
///
/// The closure takes over the contract of [`Deleter::delete`]: it must
/// free the pointee itself, by whatever means matches its allocation.
#[derive(Copy, Clone, Debug, Default)]
pub struct FnDelete<F>(pub F);

impl<T: ?Sized, F: FnMut(*mut T)> Deleter<T> for FnDelete<F> {
    unsafe fn delete(&mut self, ptr: *mut T) {
        (self.0)(ptr)
    }
}
