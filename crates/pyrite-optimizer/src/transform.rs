//! Rewrite transforms and their composition.

use pyrite_core::{OpId, OpTree};

use crate::driver::run_to_fixpoint;
use crate::opt_builder::OptBuilder;

/// Default bound on fixed-point sweeps.
pub const DEFAULT_ITER_LIMIT: usize = 100;

/// One rewrite pattern.
pub trait Transform {
    /// Diagnostic tag.
    fn name(&self) -> &'static str;

    /// Pattern gate, typically a spec-id check.
    fn can_run(&self, tree: &OpTree, op: OpId) -> bool;

    /// Performs the rewrite through `builder`, whose cursor starts
    /// immediately before `op`.
    fn run(&self, op: OpId, builder: &mut OptBuilder);

    /// Whether the driver should also offer descendants of its root to this
    /// transform. Bundles running their own inner driver say no.
    fn recurse(&self) -> bool {
        true
    }
}

/// A named bundle of transforms driven to its own fixed point.
///
/// The cascade runs only at the driver root (`recurse` is `false`) and
/// applies its inner transforms with an independent iteration bound, so
/// outer and inner drivers stay separately bounded.
pub struct CascadeTransform {
    common_name: &'static str,
    iter_limit: usize,
    transforms: Vec<Box<dyn Transform>>,
}

impl CascadeTransform {
    pub fn new(common_name: &'static str) -> CascadeTransform {
        CascadeTransform::with_iter_limit(common_name, DEFAULT_ITER_LIMIT)
    }

    pub fn with_iter_limit(common_name: &'static str, iter_limit: usize) -> CascadeTransform {
        CascadeTransform {
            common_name,
            iter_limit,
            transforms: Vec::new(),
        }
    }

    pub fn add(mut self, transform: Box<dyn Transform>) -> CascadeTransform {
        self.transforms.push(transform);
        self
    }
}

impl Transform for CascadeTransform {
    fn name(&self) -> &'static str {
        self.common_name
    }

    fn can_run(&self, _tree: &OpTree, _op: OpId) -> bool {
        true
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        use pyrite_core::Inserter;
        run_to_fixpoint(builder.tree_mut(), op, &self.transforms, self.iter_limit);
    }

    fn recurse(&self) -> bool {
        false
    }
}
