//! Shared scaffolding for transform tests: build an actual and an expected
//! module declaratively, run a pipeline over the actual one, compare dumps.
#![allow(dead_code)]

use pyrite_core::DeclarativeModule;
use pyrite_optimizer::{CascadeTransform, Optimizer, Transform};

/// Runs a configured optimizer over the module and returns the final dump.
pub fn run_with(m: DeclarativeModule, setup: impl FnOnce(&mut Optimizer)) -> String {
    let mut optimizer = Optimizer::new();
    setup(&mut optimizer);
    let mut program = m.make_program();
    optimizer.process(&mut program);
    program.dump()
}

/// Runs a single transform without cascading.
pub fn run_single(m: DeclarativeModule, transform: Box<dyn Transform>) -> String {
    run_with(m, |optimizer| {
        optimizer.add(transform);
    })
}

/// Runs a single transform inside a fixed-point cascade, the way the
/// canonicalizer bundles them.
pub fn run_cascaded(m: DeclarativeModule, transform: Box<dyn Transform>) -> String {
    run_with(m, |optimizer| {
        optimizer.add(Box::new(
            CascadeTransform::new("TestCascade").add(transform),
        ));
    })
}
