//! Module contracts.
//!
//! # Responsibility
//! - Define what every registrable module exposes ([`Module`]).
//! - Tie a concrete module type to its cached capability set and its
//!   container-binding hooks ([`ModuleType`]).
//!
//! # Invariants
//! - `ModuleType::capability_set()` is computed at most once per type.
//! - Only types declared with `module_type!(sub_module ..)` are ever copied
//!   or re-parented by a container.

use crate::capability::{Capability, CapabilitySet};
use crate::container::{ContainerId, ContainerRef};
use crate::error::ModuleError;
use std::any::Any;
use std::rc::Rc;

/// Capability-bearing value stored in a [`ModuleContainer`](crate::ModuleContainer).
pub trait Module: Any {
    /// Human-readable name, used in diagnostics.
    fn name(&self) -> &str;

    /// Id of the container this module *is*, when the module is itself a
    /// container nested in another one.
    fn as_container(&self) -> Option<ContainerId> {
        None
    }
}

crate::capability!(helper dyn Module);

/// Static side of a concrete module type. Implement with
/// [`module_type!`](crate::module_type!).
pub trait ModuleType: Module + Capability + Sized {
    /// Capability set of this type, resolved once.
    fn capability_set() -> &'static CapabilitySet;

    /// Prepares `module` for insertion into `container`, possibly replacing
    /// it with a copy bound to that container.
    fn bind(module: Rc<Self>, _container: ContainerRef) -> Result<Rc<Self>, ModuleError> {
        Ok(module)
    }

    /// Called once `module` is about to become live in `container`.
    fn adopt(_module: &Self, _container: ContainerRef) -> Result<(), ModuleError> {
        Ok(())
    }
}

/// Declares a concrete module type and the capabilities it provides.
///
/// The listed capabilities must be traits the type implements; their own
/// parents are picked up from their [`capability!`](crate::capability!)
/// declarations. Prefix with `sub_module` for types implementing
/// [`SubModule`](crate::SubModule).
///
/// ```ignore
/// module_type!(UniformRates: dyn ModelRuptureRates, dyn Averageable);
/// module_type!(sub_module SectionSlipRates: dyn SlipRateModel);
/// ```
#[macro_export]
macro_rules! module_type {
    (sub_module $module:ty $(: $($cap:ty),+ $(,)?)?) => {
        $crate::capability!($module $(: $($cap),+)?);

        impl $crate::ModuleType for $module {
            fn capability_set() -> &'static $crate::CapabilitySet {
                static SET: $crate::__private::Lazy<$crate::CapabilitySet> =
                    $crate::__private::Lazy::new($crate::CapabilitySet::resolve::<$module>);
                &SET
            }

            fn bind(
                module: ::std::rc::Rc<Self>,
                container: $crate::ContainerRef,
            ) -> ::std::result::Result<::std::rc::Rc<Self>, $crate::ModuleError> {
                $crate::sub_module::rebind(module, container)
            }

            fn adopt(
                module: &Self,
                container: $crate::ContainerRef,
            ) -> ::std::result::Result<(), $crate::ModuleError> {
                $crate::sub_module::adopt(module, container)
            }
        }
    };
    ($module:ty $(: $($cap:ty),+ $(,)?)?) => {
        $crate::capability!($module $(: $($cap),+)?);

        impl $crate::ModuleType for $module {
            fn capability_set() -> &'static $crate::CapabilitySet {
                static SET: $crate::__private::Lazy<$crate::CapabilitySet> =
                    $crate::__private::Lazy::new($crate::CapabilitySet::resolve::<$module>);
                &SET
            }
        }
    };
}

/// Upcasts a shared module handle to `Rc<dyn Any>` for type-erased storage.
pub(crate) fn erase<M: ModuleType>(module: Rc<M>) -> (Rc<dyn Module>, Rc<dyn Any>) {
    let handle: Rc<dyn Module> = module.clone();
    let instance: Rc<dyn Any> = module;
    (handle, instance)
}

/// Data address of an `Rc`, used as module identity.
pub(crate) fn address<T: ?Sized>(rc: &Rc<T>) -> *const () {
    Rc::as_ptr(rc).cast::<()>()
}
