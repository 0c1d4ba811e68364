//! Capability type model.
//!
//! Capabilities are declared statically: abstract capabilities are trait
//! objects registered with [`capability!`](crate::capability!), concrete
//! modules with [`module_type!`](crate::module_type!). The resolved set of a
//! module type is computed once and cached.

pub mod set;
pub mod tag;

pub use set::{capability_tags, CapabilitySet};
pub use tag::{Ancestor, Capability, CapabilityTag, Upcast, View};

/// Declares a `dyn Trait` capability and its direct parents.
///
/// Every parent must be a supertrait of the declared trait, so the upcast
/// from `Rc<dyn Child>` to `Rc<dyn Parent>` is a plain coercion.
///
/// ```ignore
/// capability!(dyn RuptureRates);
/// capability!(dyn ModelRuptureRates: dyn RuptureRates);
/// capability!(helper dyn BranchAverageable);
/// ```
#[macro_export]
macro_rules! capability {
    (helper $cap:ty $(: $($parent:ty),+ $(,)?)?) => {
        impl $crate::Capability for $cap {
            const HELPER: bool = true;

            fn parents() -> ::std::vec::Vec<$crate::Ancestor> {
                $crate::__capability_ancestors!($cap $(; $($parent),+)?)
            }
        }
    };
    ($cap:ty $(: $($parent:ty),+ $(,)?)?) => {
        impl $crate::Capability for $cap {
            fn parents() -> ::std::vec::Vec<$crate::Ancestor> {
                $crate::__capability_ancestors!($cap $(; $($parent),+)?)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __capability_ancestors {
    ($child:ty) => {
        ::std::vec::Vec::new()
    };
    ($child:ty; $($parent:ty),+) => {
        ::std::vec![$(
            $crate::Ancestor::new::<$parent>(|view: &dyn ::std::any::Any| {
                view.downcast_ref::<::std::rc::Rc<$child>>().map(|child| {
                    let child: ::std::rc::Rc<$child> = ::std::rc::Rc::clone(child);
                    let parent: ::std::rc::Rc<$parent> = child;
                    ::std::boxed::Box::new(parent) as $crate::View
                })
            })
        ),+]
    };
}
