//! Boolean algebra over logic binaries.
//!
//! Handles idempotence (`x op x`), complementation (`x op !x`), and
//! identity/annihilator rules against a constant operand. Conjunction's
//! annihilator is `false`, disjunction's is `true`; equality's idempotent
//! value is `true`, inequality's is `false`.

use pyrite_core::{
    Attribute, ConstantOp, Inserter, LogicBinOpKind, LogicBinaryOp, LogicUnaryOp, OpAdaptor, OpId,
    OpKind, OpTree, Type, ValueId,
};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct MinimizeBoolExpression;

impl Transform for MinimizeBoolExpression {
    fn name(&self) -> &'static str {
        "MinimizeBoolExpression"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        tree.op(op).kind == OpKind::LogicBinary
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        let logic_op = LogicBinaryOp::wrap(op);
        match logic_op.kind(builder.tree()) {
            kind @ (LogicBinOpKind::Equal | LogicBinOpKind::NotEqual) => {
                process_equality(logic_op, kind == LogicBinOpKind::Equal, builder);
            }
            kind @ (LogicBinOpKind::AndI | LogicBinOpKind::OrI) => {
                process_and_or(logic_op, kind == LogicBinOpKind::OrI, builder);
            }
            _ => {}
        }
    }
}

/// `x op x`.
fn is_idempotent(tree: &OpTree, op: LogicBinaryOp) -> bool {
    op.lhs(tree) == op.rhs(tree)
}

/// `x op !x` in either orientation.
fn is_complementation(tree: &OpTree, op: LogicBinaryOp) -> bool {
    let negates = |not_side: ValueId, other: ValueId| {
        tree.value_owner_as::<LogicUnaryOp>(not_side)
            .is_some_and(|not_op| not_op.value(tree) == other)
    };
    negates(op.lhs(tree), op.rhs(tree)) || negates(op.rhs(tree), op.lhs(tree))
}

fn replace_with_constant(op: LogicBinaryOp, value: bool, builder: &mut OptBuilder) {
    let new_op = ConstantOp::build(builder, Type::boolean(), Attribute::Bool(value));
    builder.replace(op.op_id(), new_op.op_id());
}

fn replace_with_value(op: LogicBinaryOp, value: ValueId, builder: &mut OptBuilder) {
    let result = op.result(builder.tree());
    builder.replace_all_uses(result, value);
    builder.erase(op.op_id());
}

/// Identity/annihilator rules against one constant operand. Returns whether
/// a rewrite happened.
fn process_constant_operand(
    op: LogicBinaryOp,
    constant: ConstantOp,
    other: ValueId,
    annihilator: bool,
    builder: &mut OptBuilder,
) -> bool {
    let Some(truthy) = constant.value(builder.tree()).is_truthy() else {
        return false;
    };
    // The annihilator absorbs the other operand, the identity yields it.
    let yields_other = if annihilator { !truthy } else { truthy };
    if yields_other {
        replace_with_value(op, other, builder);
    } else {
        replace_with_constant(op, annihilator, builder);
    }
    true
}

fn process_and_or(op: LogicBinaryOp, annihilator: bool, builder: &mut OptBuilder) {
    let tree = builder.tree();
    if is_idempotent(tree, op) {
        let lhs = op.lhs(tree);
        replace_with_value(op, lhs, builder);
        return;
    }
    if is_complementation(tree, op) {
        replace_with_constant(op, annihilator, builder);
        return;
    }
    let (lhs, rhs) = (op.lhs(tree), op.rhs(tree));
    if let Some(constant) = tree.value_owner_as::<ConstantOp>(lhs) {
        if process_constant_operand(op, constant, rhs, annihilator, builder) {
            return;
        }
    }
    let tree = builder.tree();
    if let Some(constant) = tree.value_owner_as::<ConstantOp>(rhs) {
        process_constant_operand(op, constant, lhs, annihilator, builder);
    }
}

fn process_equality(op: LogicBinaryOp, idempotent_value: bool, builder: &mut OptBuilder) {
    let tree = builder.tree();
    if is_idempotent(tree, op) {
        replace_with_constant(op, idempotent_value, builder);
        return;
    }
    if is_complementation(tree, op) {
        replace_with_constant(op, !idempotent_value, builder);
    }
}
