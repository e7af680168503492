//! Constant folding over arithmetic, logic, and cast operations.

use pyrite_core::{
    ArithBinOpKind, ArithBinaryOp, ArithCastOp, ArithCastOpKind, Attribute, ConstantOp, Inserter,
    LogicBinOpKind, LogicBinaryOp, LogicUnaryOp, LogicUnaryOpKind, OpAdaptor, OpId, OpKind, OpTree,
    Type,
};

use crate::opt_builder::OptBuilder;
use crate::transform::Transform;

pub struct FoldConstants;

impl Transform for FoldConstants {
    fn name(&self) -> &'static str {
        "FoldConstants"
    }

    fn can_run(&self, tree: &OpTree, op: OpId) -> bool {
        matches!(
            tree.op(op).kind,
            OpKind::ArithBinary | OpKind::ArithCast | OpKind::LogicBinary | OpKind::LogicUnary
        )
    }

    fn run(&self, op: OpId, builder: &mut OptBuilder) {
        match builder.tree().op(op).kind {
            OpKind::ArithBinary => fold_arith_binary(ArithBinaryOp::wrap(op), builder),
            OpKind::ArithCast => fold_arith_cast(ArithCastOp::wrap(op), builder),
            OpKind::LogicBinary => fold_logic_binary(LogicBinaryOp::wrap(op), builder),
            OpKind::LogicUnary => fold_logic_unary(LogicUnaryOp::wrap(op), builder),
            _ => {}
        }
    }
}

fn constant_operand(tree: &OpTree, value: pyrite_core::ValueId) -> Option<ConstantOp> {
    tree.value_owner_as::<ConstantOp>(value)
}

fn fold_arith_binary(op: ArithBinaryOp, builder: &mut OptBuilder) {
    let tree = builder.tree();
    let (Some(lhs_op), Some(rhs_op)) = (
        constant_operand(tree, op.lhs(tree)),
        constant_operand(tree, op.rhs(tree)),
    ) else {
        return;
    };
    let result_type = tree.value_type(op.result(tree)).clone();
    if result_type.is_float() {
        let (Some(lhs), Some(rhs)) = (lhs_op.value(tree).as_float(), rhs_op.value(tree).as_float())
        else {
            return;
        };
        let folded = match op.kind(tree) {
            ArithBinOpKind::AddF => lhs + rhs,
            ArithBinOpKind::SubF => lhs - rhs,
            ArithBinOpKind::MulF => lhs * rhs,
            ArithBinOpKind::DivF => lhs / rhs,
            kind => unreachable!("{kind} on a float-typed ArithBinary"),
        };
        let new_op = ConstantOp::build(builder, result_type, Attribute::Float(folded));
        builder.replace(op.op_id(), new_op.op_id());
    } else if result_type.is_integer() {
        let (Some(lhs), Some(rhs)) = (lhs_op.value(tree).as_int(), rhs_op.value(tree).as_int())
        else {
            return;
        };
        let folded = match op.kind(tree) {
            ArithBinOpKind::AddI => lhs.wrapping_add(rhs),
            ArithBinOpKind::SubI => lhs.wrapping_sub(rhs),
            ArithBinOpKind::MulI => lhs.wrapping_mul(rhs),
            // Division by zero is left in place for the backend to trap on.
            ArithBinOpKind::DivI if rhs == 0 => return,
            ArithBinOpKind::DivI => lhs.wrapping_div(rhs),
            kind => unreachable!("{kind} on an integer-typed ArithBinary"),
        };
        let new_op = ConstantOp::build(builder, result_type, Attribute::Int(folded));
        builder.replace(op.op_id(), new_op.op_id());
    }
}

fn fold_arith_cast(op: ArithCastOp, builder: &mut OptBuilder) {
    let tree = builder.tree();
    let Some(value_op) = constant_operand(tree, op.value(tree)) else {
        return;
    };
    let in_type = tree.value_type(op.value(tree)).clone();
    let out_type = tree.value_type(op.result(tree)).clone();
    let folded = match op.kind(tree) {
        ArithCastOpKind::ExtI | ArithCastOpKind::TruncI
            if in_type.is_integer() && out_type.is_integer() =>
        {
            value_op.value(tree).as_int().map(Attribute::Int)
        }
        ArithCastOpKind::ExtF | ArithCastOpKind::TruncF
            if in_type.is_float() && out_type.is_float() =>
        {
            value_op.value(tree).as_float().map(Attribute::Float)
        }
        ArithCastOpKind::IntToFloat if in_type.is_integer() && out_type.is_float() => value_op
            .value(tree)
            .as_int()
            .map(|value| Attribute::Float(value as f64)),
        ArithCastOpKind::FloatToInt if in_type.is_float() && out_type.is_integer() => value_op
            .value(tree)
            .as_float()
            .map(|value| Attribute::Int(value as i64)),
        _ => None,
    };
    let Some(folded) = folded else {
        return;
    };
    let new_op = ConstantOp::build(builder, out_type, folded);
    builder.replace(op.op_id(), new_op.op_id());
}

fn fold_logic_binary(op: LogicBinaryOp, builder: &mut OptBuilder) {
    let tree = builder.tree();
    let (Some(lhs_op), Some(rhs_op)) = (
        constant_operand(tree, op.lhs(tree)),
        constant_operand(tree, op.rhs(tree)),
    ) else {
        return;
    };
    let operand_type = tree.value_type(op.lhs(tree)).clone();
    let folded = if operand_type.is_bool() {
        let (Some(lhs), Some(rhs)) = (lhs_op.value(tree).as_bool(), rhs_op.value(tree).as_bool())
        else {
            return;
        };
        match op.kind(tree) {
            LogicBinOpKind::AndI => lhs && rhs,
            LogicBinOpKind::OrI => lhs || rhs,
            LogicBinOpKind::Equal => lhs == rhs,
            LogicBinOpKind::NotEqual => lhs != rhs,
            kind => unreachable!("{kind} on a bool-typed LogicBinary"),
        }
    } else if operand_type.is_integer() {
        let (Some(lhs), Some(rhs)) = (lhs_op.value(tree).as_int(), rhs_op.value(tree).as_int())
        else {
            return;
        };
        match op.kind(tree) {
            LogicBinOpKind::Equal => lhs == rhs,
            LogicBinOpKind::NotEqual => lhs != rhs,
            LogicBinOpKind::LessI => lhs < rhs,
            LogicBinOpKind::LessEqualI => lhs <= rhs,
            LogicBinOpKind::GreaterI => lhs > rhs,
            LogicBinOpKind::GreaterEqualI => lhs >= rhs,
            kind => unreachable!("{kind} on an integer-typed LogicBinary"),
        }
    } else if operand_type.is_float() {
        let (Some(lhs), Some(rhs)) = (lhs_op.value(tree).as_float(), rhs_op.value(tree).as_float())
        else {
            return;
        };
        match op.kind(tree) {
            LogicBinOpKind::Equal => lhs == rhs,
            LogicBinOpKind::NotEqual => lhs != rhs,
            LogicBinOpKind::LessF => lhs < rhs,
            LogicBinOpKind::LessEqualF => lhs <= rhs,
            LogicBinOpKind::GreaterF => lhs > rhs,
            LogicBinOpKind::GreaterEqualF => lhs >= rhs,
            kind => unreachable!("{kind} on a float-typed LogicBinary"),
        }
    } else {
        return;
    };
    let new_op = ConstantOp::build(builder, Type::boolean(), Attribute::Bool(folded));
    builder.replace(op.op_id(), new_op.op_id());
}

fn fold_logic_unary(op: LogicUnaryOp, builder: &mut OptBuilder) {
    let tree = builder.tree();
    let Some(value_op) = constant_operand(tree, op.value(tree)) else {
        return;
    };
    let Some(value) = value_op.value(tree).as_bool() else {
        return;
    };
    let folded = match op.kind(tree) {
        LogicUnaryOpKind::Not => !value,
    };
    let new_op = ConstantOp::build(builder, Type::boolean(), Attribute::Bool(folded));
    builder.replace(op.op_id(), new_op.op_id());
}
