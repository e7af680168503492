//! Hoisting of loop-invariant computations out of `While`/`For` bodies.
//!
//! A direct child of the loop is invariant when none of its operands are
//! produced inside the loop: the loop-defined set covers results of the
//! loop's children, addresses and values of its stores, and the loop's own
//! inwards (the `For` iterator). Loads, stores, nested loops, and the
//! condition header never move.

use std::collections::HashSet;

use pyrite_core::{Inserter, OpId, OpKind, OpTree, ValueId};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct HoistLoopInvariants;

impl Transform for HoistLoopInvariants {
    fn name(&self) -> &'static str {
        "HoistLoopInvariants"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        matches!(tree.op(op).kind, OpKind::While | OpKind::For)
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let loop_values = collect_loop_values(builder.tree(), op);
        let children: Vec<OpId> = builder.tree().op(op).body.clone();
        for child in children {
            if !builder.tree().is_live(child) {
                continue;
            }
            if matches!(
                builder.tree().op(child).kind,
                OpKind::While | OpKind::For | OpKind::Load | OpKind::Condition | OpKind::Store
            ) {
                continue;
            }
            if is_invariant(builder.tree(), child, &loop_values) {
                builder.set_insert_point_before(op);
                let cloned = builder.clone_op(child);
                builder.replace(child, cloned);
            }
        }
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
