//! Resolved capability sets of concrete module types.

use crate::capability::tag::{Ancestor, Capability, CapabilityTag, View};
use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;

type ViewFn = Arc<dyn Fn(&Rc<dyn Any>) -> Option<View> + Send + Sync>;

struct CapabilityEntry {
    tag: CapabilityTag,
    view: ViewFn,
}

/// Every capability tag a concrete module type is indexed under.
///
/// The module's own type comes first, followed by its ancestors in
/// breadth-first order. Helper capabilities are walked through (their parents
/// still count) but kept out of the indexable tags.
pub struct CapabilitySet {
    entries: Vec<CapabilityEntry>,
    helpers: Vec<CapabilityTag>,
}

impl CapabilitySet {
    /// Walks the hierarchy above concrete type `M`.
    pub fn resolve<M: Capability>() -> Self {
        let root_view: ViewFn = Arc::new(|instance: &Rc<dyn Any>| {
            Rc::clone(instance)
                .downcast::<M>()
                .ok()
                .map(|module| Box::new(module) as View)
        });

        let mut seen = HashSet::new();
        seen.insert(CapabilityTag::of::<M>());
        let mut entries = vec![CapabilityEntry {
            tag: CapabilityTag::of::<M>(),
            view: Arc::clone(&root_view),
        }];
        let mut helpers = Vec::new();

        let mut queue: VecDeque<(Ancestor, ViewFn)> = M::parents()
            .into_iter()
            .map(|ancestor| (ancestor, Arc::clone(&root_view)))
            .collect();

        while let Some((ancestor, child_view)) = queue.pop_front() {
            // Diamonds reach the same tag more than once; the first path wins.
            if !seen.insert(ancestor.tag) {
                continue;
            }
            let upcast = ancestor.upcast;
            let view: ViewFn = Arc::new(move |instance: &Rc<dyn Any>| {
                child_view(instance).and_then(|child| upcast(&*child))
            });
            for parent in (ancestor.parents)() {
                queue.push_back((parent, Arc::clone(&view)));
            }
            if ancestor.helper {
                helpers.push(ancestor.tag);
            } else {
                entries.push(CapabilityEntry {
                    tag: ancestor.tag,
                    view,
                });
            }
        }

        Self { entries, helpers }
    }

    /// Tag of the concrete module type itself.
    pub fn module_tag(&self) -> CapabilityTag {
        self.entries[0].tag
    }

    /// Indexable tags, own type first.
    pub fn tags(&self) -> impl ExactSizeIterator<Item = CapabilityTag> + '_ {
        self.entries.iter().map(|entry| entry.tag)
    }

    /// Helper capabilities found in the hierarchy (never indexed).
    pub fn helpers(&self) -> &[CapabilityTag] {
        &self.helpers
    }

    /// Whether a module of this type is assignable to `tag`.
    pub fn contains(&self, tag: CapabilityTag) -> bool {
        self.entries.iter().any(|entry| entry.tag == tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.tags().map(|tag| tag.name().to_string()).collect()
    }

    /// Builds the `Rc<C>` view of `instance` for `tag`, boxed.
    pub(crate) fn view(&self, tag: CapabilityTag, instance: &Rc<dyn Any>) -> Option<View> {
        let entry = self.entries.iter().find(|entry| entry.tag == tag)?;
        (entry.view)(instance)
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilitySet")
            .field("tags", &self.tags().collect::<Vec<_>>())
            .field("helpers", &self.helpers)
            .finish()
    }
}

/// Capability tags of module type `M`, own type first.
pub fn capability_tags<M: crate::ModuleType>() -> Vec<CapabilityTag> {
    M::capability_set().tags().collect()
}
