//! Folding of branches and loops with constant conditions.
//!
//! An `If` on a constant condition keeps only the taken branch: its body is
//! hoisted just before the `If`, then the `If` goes away. A `While` whose
//! condition terminator is constant `false` never runs and is erased.

use pyrite_core::{ConstantOp, IfOp, Inserter, OpAdaptor, OpId, OpKind, OpTree, WhileOp};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct FoldControlFlowOps;

impl Transform for FoldControlFlowOps {
    fn name(&self) -> &'static str {
        "FoldControlFlowOps"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        matches!(tree.op(op).kind, OpKind::If | OpKind::While)
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        match builder.tree().op(op).kind {
            OpKind::If => process_if(IfOp::wrap(op), builder),
            OpKind::While => process_while(WhileOp::wrap(op), builder),
            _ => {}
        }
    }
}

/// Clones every operation of a branch body to just before the branch's
/// parent, replacing the originals so their uses follow along.
pub(crate) fn hoist_body(op: OpId, builder: &mut OptBuilder) {
    let Some(parent) = builder.tree().op(op).parent else {
        return;
    };
    builder.set_insert_point_before(parent);
    let children: Vec<OpId> = builder.tree().op(op).body.clone();
    for child in children {
        let cloned = builder.clone_op(child);
        builder.replace(child, cloned);
        builder.set_insert_point_after(cloned);
    }
}

fn process_if(op: IfOp, builder: &mut OptBuilder) {
    let tree = builder.tree();
    let Some(condition_op) = tree.value_owner_as::<ConstantOp>(op.cond(tree)) else {
        return;
    };
    let Some(condition) = condition_op.value(tree).as_bool() else {
        return;
    };
    if condition {
        if let Some(then_op) = op.then_op(tree) {
            hoist_body(then_op.op_id(), builder);
        }
    } else if let Some(else_op) = op.else_op(tree) {
        hoist_body(else_op.op_id(), builder);
    }
    builder.erase(op.op_id());
}

fn process_while(op: WhileOp, builder: &mut OptBuilder) {
    let tree = builder.tree();
    let Some(terminator) = op.condition_op(tree).and_then(|cond| cond.terminator(tree)) else {
        return;
    };
    let Some(condition_op) = tree.value_owner_as::<ConstantOp>(terminator) else {
        return;
    };
    if condition_op.value(tree).as_bool() == Some(false) {
        builder.erase(op.op_id());
    }
}
