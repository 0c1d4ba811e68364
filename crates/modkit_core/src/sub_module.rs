//! Sub-modules: modules bound to exactly one owning container.
//!
//! # Invariants
//! - A parent, once set, never changes.
//! - Moving a sub-module to another container goes through
//!   [`SubModule::copy`]; the original and its parent are left untouched.

use crate::container::ContainerRef;
use crate::error::{ModuleError, ModuleResult};
use crate::module::Module;
use once_cell::unsync::OnceCell;
use std::rc::Rc;

/// A module whose identity is tied to one container.
///
/// Declare implementors with `module_type!(sub_module ..)` so containers
/// route them through [`rebind`] and [`adopt`].
pub trait SubModule: Module + Sized {
    /// Container this module is bound to, if any.
    fn parent(&self) -> Option<ContainerRef>;

    /// Binds this module to `parent`.
    ///
    /// # Errors
    /// - `InvalidOperation` when already bound to a different container.
    fn set_parent(&self, parent: ContainerRef) -> ModuleResult<()>;

    /// Independent copy bound to `new_parent`.
    fn copy(&self, new_parent: ContainerRef) -> ModuleResult<Self>;

    /// Whether this module can live in `container` at all.
    fn is_applicable(&self, _container: ContainerRef) -> bool {
        true
    }
}

/// Single-assignment parent slot for [`SubModule`] implementors.
#[derive(Debug, Default)]
pub struct ParentBinding {
    parent: OnceCell<ContainerRef>,
}

impl ParentBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot already bound to `parent`; what [`SubModule::copy`] usually needs.
    pub fn bound_to(parent: ContainerRef) -> Self {
        Self {
            parent: OnceCell::with_value(parent),
        }
    }

    pub fn get(&self) -> Option<ContainerRef> {
        self.parent.get().copied()
    }

    /// Sets the parent; a no-op when already bound to the same container.
    pub fn set(&self, parent: ContainerRef) -> ModuleResult<()> {
        let current = *self.parent.get_or_init(|| parent);
        if current.id() != parent.id() {
            return Err(ModuleError::InvalidOperation(format!(
                "sub-module is already bound to container {}; cannot rebind to {}",
                current.id(),
                parent.id()
            )));
        }
        Ok(())
    }
}

/// Resolves which instance of `module` may enter `container`.
///
/// Unbound or same-parent modules pass through; modules bound elsewhere are
/// copied.
pub fn rebind<M: SubModule>(module: Rc<M>, container: ContainerRef) -> ModuleResult<Rc<M>> {
    if !module.is_applicable(container) {
        return Err(ModuleError::InvalidOperation(format!(
            "sub-module `{}` cannot be added to a `{}` container",
            module.name(),
            container.kind()
        )));
    }

    match module.parent() {
        Some(parent) if parent.id() != container.id() => {
            let copy = module.copy(container)?;
            match copy.parent() {
                Some(bound) if bound.id() != container.id() => {
                    Err(ModuleError::InvalidOperation(format!(
                        "copy of sub-module `{}` is bound to container {} instead of {}",
                        module.name(),
                        bound.id(),
                        container.id()
                    )))
                }
                _ => Ok(Rc::new(copy)),
            }
        }
        _ => Ok(module),
    }
}

/// Binds an unparented sub-module to the container it is entering.
pub fn adopt<M: SubModule>(module: &M, container: ContainerRef) -> ModuleResult<()> {
    if module.parent().is_none() {
        module.set_parent(container)?;
    }
    Ok(())
}
