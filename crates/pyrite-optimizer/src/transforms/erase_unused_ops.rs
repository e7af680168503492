//! Erasure of pure operations whose results have no uses.

use pyrite_core::{Inserter, OpId, OpKind, OpTree};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct EraseUnusedOps;

impl Transform for EraseUnusedOps {
    fn name(&self) -> &'static str {
        "EraseUnusedOps"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        matches!(
            tree.op(op).kind,
            OpKind::Constant
                | OpKind::ArithBinary
                | OpKind::ArithCast
                | OpKind::LogicBinary
                | OpKind::LogicUnary
        )
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let tree = builder.tree();
        let unused = tree
            .op(op)
            .results
            .iter()
            .all(|&result| tree.uses(result).is_empty());
        if unused {
            builder.erase(op);
        }
    }
}
