//! Merging of `If`s whose branches do the same thing.
//!
//! When the `Then` and `Else` bodies are pairwise similar (same operations,
//! attributes, and types, recursively), the branch content is hoisted out
//! once and the `If` disappears.

use pyrite_core::{similar, IfOp, Inserter, OpAdaptor, OpId, OpKind, OpTree};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;
use crate::transforms::fold_control_flow_ops::hoist_body;

pub struct JoinConditionsBranches;

impl Transform for JoinConditionsBranches {
    fn name(&self) -> &'static str {
        "JoinConditionsBranches"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        tree.op(op).kind == OpKind::If
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let tree = builder.tree();
        let if_op = IfOp::wrap(op);
        let (Some(then_op), Some(else_op)) = (if_op.then_op(tree), if_op.else_op(tree)) else {
            return;
        };
        let then_body = &tree.op(then_op.op_id()).body;
        let else_body = &tree.op(else_op.op_id()).body;
        if then_body.len() != else_body.len() {
            return;
        }
        let all_similar = then_body
            .iter()
            .zip(else_body.iter())
            .all(|(&a, &b)| similar(tree, a, b));
        if !all_similar {
            return;
        }
        builder.erase(else_op.op_id());
        hoist_body(then_op.op_id(), builder);
        builder.erase(op);
    }
}
