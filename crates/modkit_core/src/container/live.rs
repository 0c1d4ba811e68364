//! Live (eager) module store.
//!
//! # Invariants
//! - Every tag maps to at most one live module.
//! - Every live module is mapped under each tag of its capability set,
//!   including its own concrete type.
//! - The module list keeps insertion order and holds no duplicates.

use crate::capability::{CapabilitySet, CapabilityTag};
use crate::error::{ModuleError, ModuleResult};
use crate::module::{self, Module, ModuleType};
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

/// One registered module instance.
pub(crate) struct LiveModule {
    pub(crate) id: u64,
    pub(crate) handle: Rc<dyn Module>,
    pub(crate) instance: Rc<dyn Any>,
    pub(crate) capabilities: &'static CapabilitySet,
}

#[derive(Default)]
pub(crate) struct LiveModules {
    modules: Vec<LiveModule>,
    mappings: HashMap<CapabilityTag, u64>,
    next_id: u64,
}

impl LiveModules {
    /// Appends `module` and maps it under every tag of its type.
    ///
    /// Callers evict conflicting entries first.
    pub(crate) fn insert<M: ModuleType>(&mut self, module: Rc<M>) {
        let id = self.next_id;
        self.next_id += 1;

        let capabilities = M::capability_set();
        let (handle, instance) = module::erase(module);
        for tag in capabilities.tags() {
            self.mappings.insert(tag, id);
        }
        self.modules.push(LiveModule {
            id,
            handle,
            instance,
            capabilities,
        });
    }

    pub(crate) fn lookup(&self, tag: CapabilityTag) -> Option<&LiveModule> {
        let id = self.mappings.get(&tag)?;
        self.modules.iter().find(|module| module.id == *id)
    }

    pub(crate) fn contains(&self, tag: CapabilityTag) -> bool {
        self.mappings.contains_key(&tag)
    }

    /// Typed handle of the module mapped under `C`'s tag.
    pub(crate) fn view<C: ?Sized + 'static>(&self, tag: CapabilityTag) -> Option<Rc<C>> {
        let module = self.lookup(tag)?;
        let view = module.capabilities.view(tag, &module.instance)?;
        view.downcast::<Rc<C>>().ok().map(|handle| *handle)
    }

    /// Removes the module stored at `address`.
    ///
    /// Returns `Ok(None)` when no such module is live.
    pub(crate) fn remove(&mut self, address: *const ()) -> ModuleResult<Option<LiveModule>> {
        let Some(position) = self
            .modules
            .iter()
            .position(|module| module::address(&module.instance) == address)
        else {
            return Ok(None);
        };

        let removed = self.modules.remove(position);
        if self.unmap(removed.id) == 0 {
            return Err(ModuleError::InternalInvariant(format!(
                "live module `{}` had no capability mappings",
                removed.handle.name()
            )));
        }
        Ok(Some(removed))
    }

    /// Removes every module assignable to `tag`, last registered first.
    pub(crate) fn remove_instances(&mut self, tag: CapabilityTag) -> Vec<LiveModule> {
        let mut removed = Vec::new();
        for position in (0..self.modules.len()).rev() {
            if self.modules[position].capabilities.contains(tag) {
                let module = self.modules.remove(position);
                self.unmap(module.id);
                removed.push(module);
            }
        }
        removed
    }

    pub(crate) fn iter(&self) -> impl ExactSizeIterator<Item = &LiveModule> + '_ {
        self.modules.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.modules.len()
    }

    pub(crate) fn clear(&mut self) {
        self.modules.clear();
        self.mappings.clear();
    }

    fn unmap(&mut self, id: u64) -> usize {
        let before = self.mappings.len();
        self.mappings.retain(|_, mapped| *mapped != id);
        before - self.mappings.len()
    }

    #[cfg(test)]
    pub(crate) fn mapping_count(&self) -> usize {
        self.mappings.len()
    }

    #[cfg(test)]
    pub(crate) fn corrupt_unmap_all(&mut self) {
        self.mappings.clear();
    }
}
