mod fixtures;

use fixtures::{
    recorded_container, solution_container, BranchSlips, DetachedSlips, SectionSlips, SlipRates,
    SOLUTION_KIND,
};
use modkit_core::{ModuleContainer, ModuleError, SubModule, DEFAULT_CONTAINER_KIND};
use std::rc::Rc;

#[test]
fn unbound_sub_module_is_adopted_by_its_container() {
    let mut container = solution_container();
    let module = Rc::new(BranchSlips::new(vec![1.5]));

    let registered = container
        .add_module(Rc::clone(&module))
        .expect("sub-module should register");

    assert!(Rc::ptr_eq(&registered, &module));
    assert_eq!(module.parent(), Some(container.container_ref()));
}

#[test]
fn sub_module_bound_elsewhere_is_copied() {
    let mut first = solution_container();
    let (mut second, observer) = recorded_container(SOLUTION_KIND);
    let original = first
        .add_module(Rc::new(BranchSlips::new(vec![0.5, 0.75])))
        .expect("first container adopts");

    let copy = second
        .add_module(Rc::clone(&original))
        .expect("second container copies");

    assert!(!Rc::ptr_eq(&copy, &original));
    assert_eq!(copy.parent(), Some(second.container_ref()));
    assert_eq!(original.parent(), Some(first.container_ref()));
    assert_eq!(copy.slip_rate(1), 0.75);
    assert_eq!(observer.count("copied"), 1);

    let held = first
        .get_module::<BranchSlips>()
        .expect("first container keeps its instance");
    assert!(Rc::ptr_eq(&held, &original));
    let resolved = second
        .get_module::<BranchSlips>()
        .expect("second container holds the copy");
    assert!(Rc::ptr_eq(&resolved, &copy));
}

#[test]
fn re_adding_to_the_same_parent_does_not_copy() {
    let (mut container, observer) = recorded_container(SOLUTION_KIND);
    let module = container
        .add_module(Rc::new(BranchSlips::new(vec![])))
        .expect("first add");
    let again = container
        .add_module(Rc::clone(&module))
        .expect("second add");

    assert!(Rc::ptr_eq(&module, &again));
    assert_eq!(observer.count("copied"), 0);
    assert_eq!(container.len(), 1);
}

#[test]
fn inapplicable_container_rejects_sub_module() {
    let mut container = ModuleContainer::new();
    let module = Rc::new(BranchSlips::new(vec![]));

    let err = container
        .add_module(Rc::clone(&module))
        .expect_err("default containers cannot hold branch slips");

    assert!(matches!(err, ModuleError::InvalidOperation(_)));
    assert!(container.is_empty());
    assert!(module.parent().is_none());
}

#[test]
fn rejected_lazy_sub_module_is_reported_and_dropped() {
    let (mut container, observer) = recorded_container(DEFAULT_CONTAINER_KIND);
    container.add_available_module::<BranchSlips, _>(|| Ok(BranchSlips::new(vec![2.0])));

    assert!(container.get_module::<dyn SlipRates>().is_none());
    assert!(!container.has_available_module::<dyn SlipRates>());
    assert_eq!(observer.count("load_rejected"), 1);
}

#[test]
fn lazily_loaded_sub_module_is_adopted() {
    let mut container = solution_container();
    container.add_available_module::<BranchSlips, _>(|| Ok(BranchSlips::new(vec![2.0])));

    let module = container
        .get_module::<BranchSlips>()
        .expect("factory should build the sub-module");
    assert_eq!(module.parent(), Some(container.container_ref()));
}

#[test]
fn refused_parent_leaves_container_untouched() {
    let (mut container, observer) = recorded_container(SOLUTION_KIND);
    container
        .add_module(Rc::new(SectionSlips { slips: vec![1.0] }))
        .expect("section slips should register");

    let err = container
        .add_module(Rc::new(DetachedSlips))
        .expect_err("a refused parent must fail the add");

    assert!(matches!(err, ModuleError::InvalidOperation(_)));
    assert_eq!(container.len(), 1);
    let slips = container
        .get_module::<SectionSlips>()
        .expect("existing slips stay registered");
    assert_eq!(slips.slip_rate(0), 1.0);
    assert_eq!(observer.count("evicted"), 0);
}
