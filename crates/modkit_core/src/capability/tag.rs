//! Capability tags and the static capability hierarchy.
//!
//! # Responsibility
//! - Give every capability type a stable, type-erased lookup key.
//! - Describe the parent edges of the capability DAG without reflection.
//!
//! # Invariants
//! - Tag equality and hashing use only the `TypeId`; the name is diagnostic.
//! - An upcast function only accepts the view produced for its child tag.

use std::any::{type_name, Any, TypeId};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Type-erased handle produced for one capability of a live module.
///
/// The box always holds an `Rc<C>` for the capability `C` it was built for.
pub type View = Box<dyn Any>;

/// Converts the view of a child capability into the view of one parent.
pub type Upcast = fn(&dyn Any) -> Option<View>;

/// Lookup key for one capability type.
#[derive(Debug, Clone, Copy)]
pub struct CapabilityTag {
    id: TypeId,
    name: &'static str,
}

impl CapabilityTag {
    /// Tag of capability type `C` (a concrete module type or a `dyn Trait`).
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for CapabilityTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for CapabilityTag {}

impl Hash for CapabilityTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for CapabilityTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// A type that modules can be looked up by.
///
/// Implemented through [`capability!`](crate::capability!) for abstract
/// capabilities (`dyn Trait`) and through
/// [`module_type!`](crate::module_type!) for concrete module types.
pub trait Capability: 'static {
    /// Helper capabilities are part of the hierarchy but never used as keys.
    const HELPER: bool = false;

    /// Direct parents of this capability in the hierarchy.
    fn parents() -> Vec<Ancestor> {
        Vec::new()
    }

    fn tag() -> CapabilityTag {
        CapabilityTag::of::<Self>()
    }
}

/// One parent edge of the capability DAG.
#[derive(Clone, Copy)]
pub struct Ancestor {
    pub(crate) tag: CapabilityTag,
    pub(crate) helper: bool,
    pub(crate) upcast: Upcast,
    pub(crate) parents: fn() -> Vec<Ancestor>,
}

impl Ancestor {
    /// Edge to parent capability `P`, reached from the child view by `upcast`.
    pub fn new<P: Capability + ?Sized>(upcast: Upcast) -> Self {
        Self {
            tag: CapabilityTag::of::<P>(),
            helper: P::HELPER,
            upcast,
            parents: <P as Capability>::parents,
        }
    }

    pub fn tag(&self) -> CapabilityTag {
        self.tag
    }

    pub fn is_helper(&self) -> bool {
        self.helper
    }
}

impl std::fmt::Debug for Ancestor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ancestor")
            .field("tag", &self.tag)
            .field("helper", &self.helper)
            .finish()
    }
}
