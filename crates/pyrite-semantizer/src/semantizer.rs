//! Well-formedness verification of an operation tree.
//!
//! Dispatches on the concrete adaptor of every operation and applies its
//! rule set: reusable trait rules first, then the adaptor-specific type
//! checks. All diagnostics accumulate; the aggregate buffer is raised at
//! the end of the pass.

use pyrite_core::{
    ArithCastOpKind, ErrorBuffer, OpAdaptor, OpId, OpKind, OpTree, Program, Type, ValueId,
};

use crate::error::SemantizerError;
use crate::traits::{
    AttrKind, HasAttributes, HasInwards, HasInwardsOfType, HasNthAttrOfKind, HasOperands,
    HasOperandsOfType, HasResultOfType, HasResults, SemantizerContext, TraitVerifier,
};

/// The verification pass.
pub struct Semantizer;

impl Semantizer {
    /// Verifies a whole program.
    pub fn process(program: &Program) -> Result<(), ErrorBuffer<SemantizerError>> {
        Semantizer::process_op(&program.tree, program.root)
    }

    /// Verifies the subtree rooted at `op`.
    pub fn process_op(tree: &OpTree, op: OpId) -> Result<(), ErrorBuffer<SemantizerError>> {
        let mut ctx = SemantizerContext::new();
        verify(tree, op, &mut ctx);
        ctx.errors.into_result()
    }
}

fn verify_body(tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
    let mut verified = true;
    for &child in &tree.op(op).body {
        verified &= verify(tree, child, ctx);
    }
    verified
}

fn values_have_types(tree: &OpTree, values: &[ValueId], types: &[Type]) -> bool {
    values.len() == types.len()
        && values
            .iter()
            .zip(types.iter())
            .all(|(&value, ty)| tree.value_has_type(value, ty))
}

fn values_same_type(tree: &OpTree, values: &[ValueId]) -> Option<Type> {
    let (&first, rest) = values.split_first()?;
    let ty = tree.value_type(first).clone();
    rest.iter()
        .all(|&value| tree.value_has_type(value, &ty))
        .then_some(ty)
}

fn verify(tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
    let mut verifier = TraitVerifier::new(tree, op);
    let v = &mut verifier;
    match tree.op(op).kind {
        OpKind::Module => {
            v.verify(HasOperands(0), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            v.ok() && verify_body(tree, op, ctx)
        }
        OpKind::Function => {
            v.verify(HasOperands(0), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasAttributes(2), ctx)
                .verify(HasNthAttrOfKind(0, AttrKind::Str), ctx)
                .verify(HasNthAttrOfKind(1, AttrKind::FunctionTypeRef), ctx);
            if !v.ok() {
                return false;
            }
            let func = pyrite_core::FunctionOp::wrap(op);
            ctx.functions.insert(func.name(tree).to_owned(), func);
            let arg_types = func.func_type(tree).arguments.clone();
            v.verify(HasInwards(arg_types.len()), ctx);
            if !values_have_types(tree, &tree.op(op).inwards, &arg_types) {
                ctx.push_op_error(
                    tree,
                    op,
                    "must have inwards with types of arguments of provided function type",
                );
                return false;
            }
            v.ok() && verify_body(tree, op, ctx)
        }
        OpKind::FunctionCall => {
            v.verify(HasInwards(0), ctx)
                .verify(HasAttributes(1), ctx)
                .verify(HasNthAttrOfKind(0, AttrKind::Str), ctx);
            if !v.ok() {
                return false;
            }
            let call = pyrite_core::FunctionCallOp::wrap(op);
            let name = call.callee_name(tree).to_owned();
            let Some(callee) = ctx.find_function(&name) else {
                ctx.push_op_error(tree, op, format!("has unknown callee name: {name}"));
                return false;
            };
            let func_type = callee.func_type(tree).clone();
            v.verify(HasResultOfType(func_type.result.clone()), ctx);
            if !values_have_types(tree, &tree.op(op).operands, &func_type.arguments) {
                ctx.push_op_error(
                    tree,
                    op,
                    "must have operands with types of arguments of provided function type",
                );
                return false;
            }
            v.ok()
        }
        OpKind::Return => {
            let Some(parent) = tree.find_parent::<pyrite_core::FunctionOp>(op) else {
                ctx.push_op_error(tree, op, "must live within function body");
                return false;
            };
            let result_type = parent.func_type(tree).result.clone();
            let num_operands = if result_type.is_none() { 0 } else { 1 };
            v.verify(HasOperands(num_operands), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            if num_operands > 0 && !tree.value_has_type(tree.operand(op, 0), &result_type) {
                ctx.push_op_error(
                    tree,
                    op,
                    "must have operands with result types of parent function type",
                );
                return false;
            }
            true
        }
        OpKind::Constant => {
            v.verify(HasOperands(0), ctx)
                .verify(HasResults(1), ctx)
                .verify(HasAttributes(1), ctx);
            if !v.ok() {
                return false;
            }
            let result_type = tree.value_type(tree.result(op, 0)).clone();
            if result_type.is_bool() {
                v.verify(HasNthAttrOfKind(0, AttrKind::Bool), ctx);
            } else if result_type.is_integer() {
                v.verify(HasNthAttrOfKind(0, AttrKind::Int), ctx);
            } else if result_type.is_float() {
                v.verify(HasNthAttrOfKind(0, AttrKind::Float), ctx);
            } else if result_type.is_str() {
                v.verify(HasNthAttrOfKind(0, AttrKind::Str), ctx);
            } else {
                ctx.push_op_error(tree, op, "must have result type one of int, float, bool, str");
                return false;
            }
            v.ok()
        }
        OpKind::ArithBinary => {
            v.verify(HasOperands(2), ctx)
                .verify(HasResults(1), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(1), ctx)
                .verify(HasNthAttrOfKind(0, AttrKind::ArithBinary), ctx);
            if !v.ok() {
                return false;
            }
            match values_same_type(tree, &tree.op(op).operands) {
                Some(ty) => {
                    if !tree.value_has_type(tree.result(op, 0), &ty) {
                        ctx.push_op_error(tree, op, format!("result must have type {ty}"));
                        return false;
                    }
                }
                None => {
                    ctx.push_op_error(tree, op, "operands must have same type");
                    return false;
                }
            }
            true
        }
        OpKind::LogicBinary => {
            v.verify(HasOperands(2), ctx)
                .verify(HasResults(1), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(1), ctx)
                .verify(HasNthAttrOfKind(0, AttrKind::LogicBinary), ctx)
                .verify(HasResultOfType(Type::boolean()), ctx);
            if !v.ok() {
                return false;
            }
            if values_same_type(tree, &tree.op(op).operands).is_none() {
                ctx.push_op_error(tree, op, "operands must have same type");
                return false;
            }
            true
        }
        OpKind::ArithCast => {
            v.verify(HasOperands(1), ctx)
                .verify(HasResults(1), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(1), ctx)
                .verify(HasNthAttrOfKind(0, AttrKind::ArithCast), ctx);
            if !v.ok() {
                return false;
            }
            let cast = pyrite_core::ArithCastOp::wrap(op);
            let in_type = tree.value_type(cast.value(tree)).clone();
            let out_type = tree.value_type(cast.result(tree)).clone();
            let (valid, message) = match cast.kind(tree) {
                ArithCastOpKind::IntToFloat => (
                    in_type.is_integer() && out_type.is_float(),
                    "must have int operand and float result",
                ),
                ArithCastOpKind::FloatToInt => (
                    in_type.is_float() && out_type.is_integer(),
                    "must have float operand and int result",
                ),
                ArithCastOpKind::ExtI => (
                    in_type.is_integer()
                        && out_type.is_integer()
                        && out_type.bit_width() > in_type.bit_width(),
                    "must have int operand and int result with greater bitwidth",
                ),
                ArithCastOpKind::TruncI => (
                    in_type.is_integer()
                        && out_type.is_integer()
                        && out_type.bit_width() < in_type.bit_width(),
                    "must have int operand and int result with less bitwidth",
                ),
                ArithCastOpKind::ExtF => (
                    in_type.is_float()
                        && out_type.is_float()
                        && out_type.bit_width() > in_type.bit_width(),
                    "must have float operand and float result with greater bitwidth",
                ),
                ArithCastOpKind::TruncF => (
                    in_type.is_float()
                        && out_type.is_float()
                        && out_type.bit_width() < in_type.bit_width(),
                    "must have float operand and float result with less bitwidth",
                ),
            };
            if valid {
                return true;
            }
            ctx.push_op_error(
                tree,
                op,
                format!("{message}, but got {in_type} operand and {out_type} result"),
            );
            false
        }
        OpKind::LogicUnary => {
            v.verify(HasOperandsOfType(1, Type::boolean()), ctx)
                .verify(HasResults(1), ctx)
                .verify(HasResultOfType(Type::boolean()), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(1), ctx)
                .verify(HasNthAttrOfKind(0, AttrKind::LogicUnary), ctx);
            v.ok()
        }
        OpKind::Allocate => {
            v.verify(HasResults(1), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            if tree.value_type(tree.result(op, 0)).is_pointer() {
                return true;
            }
            ctx.push_op_error(tree, op, "must have pointer result");
            false
        }
        OpKind::Load => {
            v.verify(HasOperands(1), ctx)
                .verify(HasResults(1), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            if tree.value_can_point_to(tree.operand(op, 0), tree.result(op, 0)) {
                return true;
            }
            ctx.push_op_error(tree, op, "must have source operand type as pointer to result type");
            false
        }
        OpKind::Store => {
            v.verify(HasOperands(2), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            if tree.value_can_point_to(tree.operand(op, 0), tree.operand(op, 1)) {
                return true;
            }
            ctx.push_op_error(
                tree,
                op,
                "must have destination operand type as pointer to value to store operand type",
            );
            false
        }
        OpKind::If => {
            v.verify(HasOperandsOfType(1, Type::boolean()), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            let body = &tree.op(op).body;
            if !body.is_empty() && tree.op(body[0]).kind == OpKind::Then {
                if body.len() == 1 {
                    return verify(tree, body[0], ctx);
                }
                if body.len() == 2 && tree.op(body[1]).kind == OpKind::Else {
                    return verify(tree, body[0], ctx) && verify(tree, body[1], ctx);
                }
            }
            ctx.push_op_error(
                tree,
                op,
                "must have one operation (Then) or two operations (Then, Else) within body",
            );
            false
        }
        OpKind::Then => {
            v.verify(HasOperands(0), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            if let Some(parent) = tree.op(op).parent {
                if tree.op(parent).kind != OpKind::If || tree.op(parent).body.first() != Some(&op) {
                    ctx.push_op_error(tree, op, "must be first operation within body of parent If");
                    return false;
                }
            }
            verify_body(tree, op, ctx)
        }
        OpKind::Else => {
            v.verify(HasOperands(0), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            if let Some(parent) = tree.op(op).parent {
                if tree.op(parent).kind != OpKind::If
                    || tree.op(parent).body.last() != Some(&op)
                    || tree.op(parent).body.len() != 2
                {
                    ctx.push_op_error(tree, op, "must be last operation within body of parent If");
                    return false;
                }
            }
            verify_body(tree, op, ctx)
        }
        OpKind::While => {
            v.verify(HasOperands(0), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            let body = &tree.op(op).body;
            if !body.is_empty() && tree.op(body[0]).kind == OpKind::Condition {
                return verify_body(tree, op, ctx);
            }
            ctx.push_op_error(tree, op, "must have one operation (Condition) within body");
            false
        }
        OpKind::Condition => {
            v.verify(HasOperands(0), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            if let Some(parent) = tree.op(op).parent {
                if tree.op(parent).kind != OpKind::While || tree.op(parent).body.first() != Some(&op)
                {
                    ctx.push_op_error(tree, op, "must be first operation within parent While");
                    return false;
                }
            }
            let body = &tree.op(op).body;
            let Some(&last) = body.last() else {
                ctx.push_op_error(tree, op, "must have at least one operation within body");
                return false;
            };
            let results = &tree.op(last).results;
            if results.len() != 1 || !tree.value_type(results[0]).is_bool() {
                ctx.push_op_error(
                    tree,
                    op,
                    "must have operation with one bool result as last within body",
                );
                return false;
            }
            true
        }
        OpKind::For => {
            v.verify(HasOperandsOfType(3, Type::int64()), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwardsOfType(1, Type::int64()), ctx)
                .verify(HasAttributes(0), ctx);
            v.ok() && verify_body(tree, op, ctx)
        }
        OpKind::Input => {
            v.verify(HasOperands(1), ctx)
                .verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            if !v.ok() {
                return false;
            }
            if tree.value_type(tree.operand(op, 0)).is_pointer() {
                return true;
            }
            ctx.push_op_error(tree, op, "must have one pointer operand");
            false
        }
        OpKind::Print => {
            v.verify(HasResults(0), ctx)
                .verify(HasInwards(0), ctx)
                .verify(HasAttributes(0), ctx);
            v.ok()
        }
    }
}
