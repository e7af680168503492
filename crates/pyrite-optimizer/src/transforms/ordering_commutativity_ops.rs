//! Operand-order normalization for commutative operations.
//!
//! Owners rank `FunctionCall < Load < Constant`, so constants drift to the
//! right. Ties between calls order lexicographically by callee name, ties
//! between constants by payload; loads have no stable tie-break and stay
//! put.

use std::cmp::Ordering;

use pyrite_core::{
    ArithBinaryOp, BinaryOp, ConstantOp, FunctionCallOp, Inserter, LogicBinaryOp, OpAdaptor, OpId,
    OpKind, OpTree, ValueId,
};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct OrderingCommutativityOps;

impl Transform for OrderingCommutativityOps {
    fn name(&self) -> &'static str {
        "OrderingCommutativityOps"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        matches!(tree.op(op).kind, OpKind::ArithBinary | OpKind::LogicBinary)
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let tree = builder.tree();
        let commutative = match tree.op(op).kind {
            OpKind::ArithBinary => ArithBinaryOp::wrap(op).kind(tree).is_commutative(),
            OpKind::LogicBinary => LogicBinaryOp::wrap(op).kind(tree).is_commutative(),
            _ => false,
        };
        if commutative {
            sort_binary_operands(BinaryOp::wrap(op), builder);
        }
    }
}

/// Owner rank of an operand; unranked owners opt the operation out.
fn rank(tree: &OpTree, value: ValueId) -> Option<u8> {
    let owner = tree.value_owner(value);
    match tree.op(owner).kind {
        OpKind::FunctionCall => Some(0),
        OpKind::Load => Some(1),
        OpKind::Constant => Some(2),
        _ => None,
    }
}

fn tie_break(tree: &OpTree, lhs: ValueId, rhs: ValueId) -> Ordering {
    let lhs_owner = tree.value_owner(lhs);
    let rhs_owner = tree.value_owner(rhs);
    match (tree.op(lhs_owner).kind, tree.op(rhs_owner).kind) {
        (OpKind::FunctionCall, OpKind::FunctionCall) => {
            let lhs_name = FunctionCallOp::wrap(lhs_owner).callee_name(tree);
            let rhs_name = FunctionCallOp::wrap(rhs_owner).callee_name(tree);
            lhs_name.cmp(rhs_name)
        }
        (OpKind::Constant, OpKind::Constant) => ConstantOp::wrap(lhs_owner)
            .value(tree)
            .payload_cmp(ConstantOp::wrap(rhs_owner).value(tree))
            .unwrap_or(Ordering::Equal),
        // Loads carry no stable ordering key.
        _ => Ordering::Equal,
    }
}

fn sort_binary_operands(op: BinaryOp, builder: &mut OptBuilder) {
    let tree = builder.tree();
    let (lhs, rhs) = (op.lhs(tree), op.rhs(tree));
    let (Some(lhs_rank), Some(rhs_rank)) = (rank(tree, lhs), rank(tree, rhs)) else {
        return;
    };
    let needs_swap = match lhs_rank.cmp(&rhs_rank) {
        Ordering::Greater => true,
        Ordering::Equal => tie_break(tree, lhs, rhs) == Ordering::Greater,
        Ordering::Less => false,
    };
    if !needs_swap {
        return;
    }
    let id = op.op_id();
    builder.update(id, |tree| {
        tree.set_operand(id, 0, rhs);
        tree.set_operand(id, 1, lhs);
    });
}
