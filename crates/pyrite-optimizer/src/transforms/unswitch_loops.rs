//! Loop unswitching: an `If` on a loop-invariant condition moves out of
//! the loop.
//!
//! The loop is duplicated twice: one copy keeps the `Then` body hoisted in
//! place of the `If`, the other the `Else` body. The loop itself is then
//! replaced by an outer `If` dispatching between the two copies on the same
//! condition. Only branches with an `Else` unswitch; without one, there is
//! no second body to dispatch to.

use std::collections::HashSet;

use pyrite_core::{IfOp, Inserter, OpAdaptor, OpId, OpKind, OpTree, ValueId};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;
use crate::transforms::fold_control_flow_ops::hoist_body;

pub struct UnswitchLoops;

impl Transform for UnswitchLoops {
    fn name(&self) -> &'static str {
        "UnswitchLoops"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        matches!(tree.op(op).kind, OpKind::While | OpKind::For)
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let tree = builder.tree();
        let loop_values = collect_loop_values(tree, op);
        let Some(invariant_position) = tree.op(op).body.iter().position(|&child| {
            tree.op(child).kind == OpKind::If
                && IfOp::wrap(child).else_op(tree).is_some()
                && is_invariant(tree, child, &loop_values)
        }) else {
            return;
        };

        // Dispatching If, cloned with its original branch bodies for now.
        let invariant_if = builder.tree().op(op).body[invariant_position];
        let dispatch = builder.clone_op(invariant_if);

        // One loop copy per branch, the invariant If replaced by that
        // branch's hoisted body.
        let then_loop = clone_loop_with_branch(op, invariant_position, true, builder);
        let else_loop = clone_loop_with_branch(op, invariant_position, false, builder);

        // Swap the dispatch branches for the loop copies.
        let dispatch_if = IfOp::wrap(dispatch);
        let then_branch = dispatch_if
            .then_op(builder.tree())
            .expect("cloned If keeps its Then")
            .op_id();
        let else_branch = dispatch_if
            .else_op(builder.tree())
            .expect("unswitching requires an Else")
            .op_id();
        clear_body(then_branch, builder);
        clear_body(else_branch, builder);
        builder.update(dispatch, |tree| {
            tree.add_to_body(then_branch, then_loop);
            tree.add_to_body(else_branch, else_loop);
        });

        builder.replace(op, dispatch);
    }
}

fn collect_loop_values(tree: &OpTree, op: OpId) -> HashSet<ValueId> {
    let mut values: HashSet<ValueId> = tree.op(op).inwards.iter().copied().collect();
    for &child in &tree.op(op).body {
        values.extend(tree.op(child).results.iter().copied());
        if tree.op(child).kind == OpKind::Store {
            values.extend(tree.op(child).operands.iter().copied());
        }
    }
    values
}

fn is_invariant(tree: &OpTree, op: OpId, loop_values: &HashSet<ValueId>) -> bool {
    tree.op(op)
        .operands
        .iter()
        .all(|operand| !loop_values.contains(operand))
}

/// Clones the whole loop, then replaces the cloned invariant `If` with the
/// hoisted body of one of its branches. Returns the detached loop clone.
fn clone_loop_with_branch(
    loop_op: OpId,
    if_position: usize,
    take_then: bool,
    builder: &mut OptBuilder,
) -> OpId {
    // Hoisting below moves the cursor into the clone; start each copy from
    // a well-defined spot before the original loop.
    builder.set_insert_point_before(loop_op);
    let clone = builder.clone_op(loop_op);
    let cloned_if = builder.tree().op(clone).body[if_position];
    let if_op = IfOp::wrap(cloned_if);
    let branch = if take_then {
        if_op.then_op(builder.tree()).map(OpAdaptor::op_id)
    } else {
        if_op.else_op(builder.tree()).map(OpAdaptor::op_id)
    };
    if let Some(branch) = branch {
        hoist_body(branch, builder);
    }
    builder.erase(cloned_if);
    builder.tree_mut().detach(clone);
    clone
}

fn clear_body(op: OpId, builder: &mut OptBuilder) {
    while let Some(&last) = builder.tree().op(op).body.last() {
        builder.erase(last);
    }
}
