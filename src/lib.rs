//! rc-handle: single-threaded, reference-counted ownership handles with
//! pluggable deleters and control-block allocators.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: build `Strong`/`Weak` in small, verifiable layers so each piece
//!   can be reasoned about independently.
//! - Layers:
//!   - `Deleter` / `BlockAlloc`: capability traits for destroying the
//!     pointee and for allocating the control block. `BoxDelete` and
//!     `Heap` are the defaults.
//!   - `Block<D, A>`: the control block. Plain `Cell` counts, the stored
//!     deleter, and the allocator the block itself came from. Knows how
//!     to run the deleter and how to free itself; nothing else.
//!   - `Strong<T, D, A>` / `Weak<T, D, A>`: public handles. A handle is
//!     a pointee pointer plus a block pointer, both present or both
//!     absent. Strong handles keep the object alive; weak handles keep
//!     only the block alive.
//!   - `SelfRef<T>` / `SelfReferential`: opt-in mixin so a managed object
//!     can mint handles to itself.
//!   - `ByOwner<P>` / `OwnerIdent`: ordering and container keying by
//!     control-block identity rather than pointee value.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` by design (no atomics). Counts are
//!   plain non-atomic `Cell<usize>` increments and decrements.
//! - The object dies exactly when the strong count goes 1 -> 0; the block
//!   dies exactly when both counts are 0. `Block::release` is the only
//!   code path that frees a block, regardless of which handle kind
//!   observed the final zero.
//! - The deleter runs exactly once, with the pointer the handle was
//!   constructed from. The strong count is zeroed first, so promotion
//!   attempts from inside the deleter fail rather than revive the dying
//!   object. The strong handles collectively hold one implicit weak
//!   reference (the block starts at `weak = 1`), given up only after the
//!   deleter returns, so weak handles dropped from inside it cannot free
//!   the block out from under the caller.
//! - The control block is allocated and deallocated through the same
//!   `BlockAlloc` instance; the pointee is never touched by the allocator.
//!
//! Overflow semantics
//! - Reference-count overflow aborts the process, matching `std::rc::Rc`.
//!   Underflow is a bug in this crate and asserts.
//!
//! Promotion-failure policy
//! - Promoting an expired `Weak` fails by value: `Weak::upgrade` returns
//!   `None` and `Strong::try_from(&Weak)` returns `Err(Expired)`. No
//!   operation in this crate panics on an expired weak handle.
//!
//! Notes and non-goals
//! - No cycle detection; cycles must be broken manually with `Weak`.
//! - Dereferencing an empty `Strong` is a caller error and panics.
//! - Public API surface is the handle types plus the capability traits;
//!   the control block is an implementation detail.

mod alloc;
mod block;
mod deleter;
mod owner;
mod self_ref;
mod strong;
mod weak;

// Public surface
pub use alloc::{BlockAlloc, Heap};
pub use deleter::{BoxDelete, Deleter, FnDelete};
pub use owner::{ByOwner, OwnerIdent};
pub use self_ref::{SelfRef, SelfReferential};
pub use strong::Strong;
pub use weak::{Expired, Weak};
