//! Available (lazily loaded) module store.
//!
//! Mirrors the live store for factories whose module has not been built
//! yet. A factory leaves this store the moment it is taken for loading.

use crate::capability::{CapabilitySet, CapabilityTag};
use crate::container::observer::ContainerEvent;
use crate::container::{ContainerId, ModuleContainer};
use crate::error::ModuleResult;
use crate::module::ModuleType;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::marker::PhantomData;
use std::rc::Rc;

/// Handle of one registered factory, unique across containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FactoryId {
    container: ContainerId,
    seq: u64,
}

impl FactoryId {
    pub fn container(&self) -> ContainerId {
        self.container
    }
}

impl Display for FactoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "factory#{}@{}", self.seq, self.container)
    }
}

/// Builds and registers one module. Consumed by the load.
pub(crate) trait LoadModule {
    fn load(self: Box<Self>, container: &mut ModuleContainer) -> ModuleResult<bool>;
}

struct Loader<M, F> {
    factory: F,
    _module: PhantomData<fn() -> M>,
}

impl<M, F> LoadModule for Loader<M, F>
where
    M: ModuleType,
    F: FnOnce() -> anyhow::Result<M>,
{
    fn load(self: Box<Self>, container: &mut ModuleContainer) -> ModuleResult<bool> {
        let Loader { factory, .. } = *self;
        match factory() {
            Ok(module) => {
                container.add_module(Rc::new(module))?;
                Ok(true)
            }
            Err(error) => {
                container.emit(&ContainerEvent::LoadFailed {
                    module_type: CapabilityTag::of::<M>(),
                    error: &error,
                });
                Ok(false)
            }
        }
    }
}

pub(crate) struct PendingModule {
    pub(crate) id: FactoryId,
    pub(crate) capabilities: &'static CapabilitySet,
    pub(crate) loader: Box<dyn LoadModule>,
}

pub(crate) struct AvailableModules {
    container: ContainerId,
    pending: Vec<PendingModule>,
    mappings: HashMap<CapabilityTag, FactoryId>,
    next_seq: u64,
}

impl AvailableModules {
    pub(crate) fn new(container: ContainerId) -> Self {
        Self {
            container,
            pending: Vec::new(),
            mappings: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Appends a factory for `M` and maps it under every tag of `M`.
    ///
    /// Callers evict conflicting factories first.
    pub(crate) fn insert<M, F>(&mut self, factory: F) -> FactoryId
    where
        M: ModuleType,
        F: FnOnce() -> anyhow::Result<M> + 'static,
    {
        let id = FactoryId {
            container: self.container,
            seq: self.next_seq,
        };
        self.next_seq += 1;

        let capabilities = M::capability_set();
        for tag in capabilities.tags() {
            self.mappings.insert(tag, id);
        }
        self.pending.push(PendingModule {
            id,
            capabilities,
            loader: Box::new(Loader {
                factory,
                _module: PhantomData,
            }),
        });
        id
    }

    pub(crate) fn lookup(&self, tag: CapabilityTag) -> Option<FactoryId> {
        self.mappings.get(&tag).copied()
    }

    pub(crate) fn contains(&self, tag: CapabilityTag) -> bool {
        self.mappings.contains_key(&tag)
    }

    pub(crate) fn is_registered(&self, id: FactoryId) -> bool {
        self.pending.iter().any(|pending| pending.id == id)
    }

    /// Removes the factory and all of its mappings, handing it to the caller.
    pub(crate) fn take(&mut self, id: FactoryId) -> Option<PendingModule> {
        let position = self.pending.iter().position(|pending| pending.id == id)?;
        let pending = self.pending.remove(position);
        self.mappings.retain(|_, mapped| *mapped != id);
        Some(pending)
    }

    /// Removes every factory whose module type is assignable to `tag`.
    pub(crate) fn remove_instances(&mut self, tag: CapabilityTag) -> Vec<PendingModule> {
        let ids: Vec<FactoryId> = self
            .pending
            .iter()
            .filter(|pending| pending.capabilities.contains(tag))
            .map(|pending| pending.id)
            .collect();
        ids.into_iter().filter_map(|id| self.take(id)).collect()
    }

    /// Registered factory ids in registration order.
    pub(crate) fn ids(&self) -> Vec<FactoryId> {
        self.pending.iter().map(|pending| pending.id).collect()
    }

    pub(crate) fn iter(&self) -> impl ExactSizeIterator<Item = &PendingModule> + '_ {
        self.pending.iter()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
        self.mappings.clear();
    }
}
