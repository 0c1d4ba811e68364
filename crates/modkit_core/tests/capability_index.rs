mod fixtures;

use fixtures::{
    Averageable, BranchHelper, HelperBacked, ModelRuptureRates, NestedSolution, RuptureRates,
    UniformRates,
};
use modkit_core::{capability_tags, CapabilityTag, Module, ModuleContainer, ModuleType};
use std::rc::Rc;

#[test]
fn capability_tags_cover_the_whole_hierarchy() {
    let tags = capability_tags::<UniformRates>();

    assert_eq!(tags[0], CapabilityTag::of::<UniformRates>());
    assert!(tags.contains(&CapabilityTag::of::<dyn ModelRuptureRates>()));
    assert!(tags.contains(&CapabilityTag::of::<dyn RuptureRates>()));
    assert!(tags.contains(&CapabilityTag::of::<dyn Averageable>()));
    assert!(!tags.contains(&CapabilityTag::of::<dyn Module>()));
    assert_eq!(tags.len(), 4);
}

#[test]
fn module_marker_is_walked_but_never_indexed() {
    let set = UniformRates::capability_set();
    assert!(set.helpers().contains(&CapabilityTag::of::<dyn Module>()));
    assert!(!set.contains(CapabilityTag::of::<dyn Module>()));
}

#[test]
fn every_tag_resolves_to_the_added_module() {
    let mut container = ModuleContainer::new();
    let module = container
        .add_module(Rc::new(UniformRates::new("branch avg", 0.25)))
        .expect("module should register");

    let concrete = container
        .get_module::<UniformRates>()
        .expect("concrete type should resolve");
    assert!(Rc::ptr_eq(&concrete, &module));

    let rates = container
        .get_module::<dyn RuptureRates>()
        .expect("supertrait should resolve");
    assert_eq!(rates.rate(3), 0.25);

    let model = container
        .get_module::<dyn ModelRuptureRates>()
        .expect("direct capability should resolve");
    assert_eq!(model.model(), "uniform");
    assert_eq!(model.name(), "branch avg");

    assert!(container.has_module::<dyn Averageable>());
}

#[test]
fn helper_capability_is_not_a_lookup_key() {
    let mut container = ModuleContainer::new();
    container
        .add_module(Rc::new(HelperBacked))
        .expect("module should register");

    assert!(container.get_module::<dyn BranchHelper>().is_none());
    assert!(!container.has_available_module::<dyn BranchHelper>());
    assert!(container.get_module::<HelperBacked>().is_some());
    assert!(!HelperBacked::capability_set().contains(CapabilityTag::of::<dyn BranchHelper>()));
}

#[test]
fn removing_by_helper_capability_removes_nothing() {
    let mut container = ModuleContainer::new();
    container
        .add_module(Rc::new(HelperBacked))
        .expect("module should register");

    assert!(!container.remove_module_instances::<dyn BranchHelper>());
    assert_eq!(container.len(), 1);
}

#[test]
fn type_without_capabilities_is_indexed_by_itself() {
    let set = NestedSolution::capability_set();
    assert_eq!(set.len(), 1);
    assert_eq!(set.module_tag(), CapabilityTag::of::<NestedSolution>());
}
