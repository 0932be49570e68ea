use std::fmt;
use std::marker::PhantomData;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};

/// Uniquely identifies a statement-like node in the AST.
///
/// # Uniqueness
///
/// [`NodeId`]s must be unique within any AST that a lowering pass is called on, because passes
/// use them to key per-node side tables.  Freshly constructed nodes may carry `None` until
/// [`crate::passes::resolution::fill_missing_node_ids`] runs; nodes synthesized *during* a pass
/// receive fresh ids immediately.  Cloned subtrees must be re-id'd before reinsertion.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub NonZeroU64);

/// Represents some sort of definition; a unique thing (a local variable, a function result
/// variable, a compiler temporary...) that a name in the source was resolved to.
///
/// The name binder (which runs before the passes in this crate) is responsible for mapping
/// identifiers to [`DefId`]s; information about each definition lives in
/// [`crate::context::defs::Defs`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefId(pub NonZeroU64);

/// Identifies a jump label.
///
/// A [`LabelId`] ties together the lowered control-flow triple: the `JumpBlock` that owns the
/// label, the `JumpLabel` marker at the end of that block, and every `JumpGo` that transfers
/// to it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(pub NonZeroU64);

macro_rules! impl_id_boilerplate {
    ($Id:ident) => {
        impl fmt::Debug for $Id {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, concat!(stringify!($Id), "({})"), self.0)
            }
        }

        impl fmt::Display for $Id {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<NonZeroU64> for $Id {
            fn from(x: NonZeroU64) -> Self { $Id(x) }
        }
    };
}

impl_id_boilerplate!(NodeId);
impl_id_boilerplate!(DefId);
impl_id_boilerplate!(LabelId);

/// Helper for allocating fresh ids in a threadsafe manner.
pub struct UnusedIds<T> {
    next_id: AtomicU64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: From<NonZeroU64>> UnusedIds<T> {
    pub const fn new() -> Self {
        UnusedIds { next_id: AtomicU64::new(1), _marker: PhantomData }
    }

    pub fn next(&self) -> T {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        T::from(NonZeroU64::new(id).expect("id counter overflowed"))
    }
}

impl<T: From<NonZeroU64>> Default for UnusedIds<T> {
    fn default() -> Self { Self::new() }
}

impl<T> fmt::Debug for UnusedIds<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("UnusedIds").field("next_id", &self.next_id).finish()
    }
}
