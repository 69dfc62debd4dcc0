//! Ordering by owner identity.
//!
//! Two handles are "same owner" when they reference the same control
//! block, independent of pointee value or even pointee type. This is the
//! right key for associative containers that group handles by underlying
//! object; pointee-based comparison would conflate distinct allocations
//! holding equal values.

use core::cmp::Ordering;
use core::hash::{Hash, Hasher};

/// Exposes a handle's control-block address as an opaque identity.
///
/// Implemented by `Strong` and `Weak`. Empty handles report 0, so all of
/// them share one identity, at one extreme of either derived order.
pub trait OwnerIdent {
    fn owner_addr(&self) -> usize;
}

/// Newtype keying a handle by owner identity.
///
/// Wraps either handle kind and implements the comparison traits over the
/// control-block address, so handles can be used directly as
/// `BTreeMap`/`HashMap` keys regardless of whether the pointee is
/// comparable.
///
/// `Ord` here uses natural address order, which is the *reverse* of
/// `owner_before`: `ByOwner(a) < ByOwner(b)` corresponds to
/// `b.owner_before(&a)`. Both are strict weak orders over the same
/// identity; use one or the other consistently within a container.
///
/// ```
/// # use rc_handle::{ByOwner, Strong};
/// # use std::collections::BTreeMap;
/// let mut map = BTreeMap::new();
/// let s = Strong::new(1);
/// map.insert(ByOwner(s.clone()), "one");
/// assert_eq!(map.get(&ByOwner(s)), Some(&"one"));
/// ```
#[derive(Copy, Clone, Debug)]
pub struct ByOwner<P>(pub P);

impl<P: OwnerIdent> PartialEq for ByOwner<P> {
    fn eq(&self, other: &Self) -> bool {
        self.0.owner_addr() == other.0.owner_addr()
    }
}

impl<P: OwnerIdent> Eq for ByOwner<P> {}

impl<P: OwnerIdent> PartialOrd for ByOwner<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P: OwnerIdent> Ord for ByOwner<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.owner_addr().cmp(&other.0.owner_addr())
    }
}

impl<P: OwnerIdent> Hash for ByOwner<P> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.owner_addr().hash(state);
    }
}
