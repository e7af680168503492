//! Cast deduction, cast insertion, and structural similarity.

use crate::adaptors::ArithCastOp;
use crate::builder::Inserter;
use crate::operation::{OpId, OpTree};
use crate::ops::ArithCastOpKind;
use crate::types::Type;
use crate::value::ValueId;

/// Deduces the common type two numeric operands should be cast toward.
///
/// In an assignment the target is always the left-hand (pointee) type. In a
/// plain expression the wider numeric type wins within one family, and
/// float wins across families. Returns `None` when the pair is not
/// promotable (non-numeric operands).
pub fn deduce_target_cast_type(out_type: &Type, in_type: &Type, is_assignment: bool) -> Option<Type> {
    if is_assignment {
        return Some(out_type.clone());
    }
    if in_type == out_type {
        return Some(in_type.clone());
    }
    let from_int = in_type.is_integer();
    let from_float = in_type.is_float();
    let to_int = out_type.is_integer();
    let to_float = out_type.is_float();
    let is_ext = in_type.bit_width() < out_type.bit_width();
    if from_float && to_int {
        return Some(in_type.clone());
    }
    if from_int && to_float {
        return Some(out_type.clone());
    }
    if (from_float && to_float) || (from_int && to_int) {
        return Some(if is_ext { out_type.clone() } else { in_type.clone() });
    }
    None
}

/// Inserts the numeric cast converting `value` to `result_type` at the
/// cursor of `b`. Returns `None` when no cast is needed (types equal) or
/// when the conversion is not a numeric one.
pub fn insert_numeric_cast(
    b: &mut dyn Inserter,
    result_type: &Type,
    value: ValueId,
) -> Option<ArithCastOp> {
    let in_type = b.tree().value_type(value).clone();
    if &in_type == result_type {
        return None;
    }
    let from_int = in_type.is_integer();
    let from_float = in_type.is_float();
    let to_int = result_type.is_integer();
    let to_float = result_type.is_float();
    let is_ext = in_type.bit_width() < result_type.bit_width();
    let kind = if from_int && to_int {
        if is_ext {
            ArithCastOpKind::ExtI
        } else {
            ArithCastOpKind::TruncI
        }
    } else if from_float && to_float {
        if is_ext {
            ArithCastOpKind::ExtF
        } else {
            ArithCastOpKind::TruncF
        }
    } else if from_int && to_float {
        ArithCastOpKind::IntToFloat
    } else if from_float && to_int {
        ArithCastOpKind::FloatToInt
    } else {
        return None;
    };
    Some(ArithCastOp::build(b, kind, result_type.clone(), value))
}

/// Structural similarity of two operations: same name, attributes equal
/// element-wise, operand/inward/result types equal element-wise, and bodies
/// pairwise similar.
pub fn similar(tree: &OpTree, lhs: OpId, rhs: OpId) -> bool {
    let a = tree.op(lhs);
    let b = tree.op(rhs);
    if a.kind != b.kind || a.attributes != b.attributes {
        return false;
    }
    let same_types = |xs: &[ValueId], ys: &[ValueId]| {
        xs.len() == ys.len()
            && xs
                .iter()
                .zip(ys.iter())
                .all(|(&x, &y)| tree.value_type(x) == tree.value_type(y))
    };
    if !same_types(&a.operands, &b.operands)
        || !same_types(&a.inwards, &b.inwards)
        || !same_types(&a.results, &b.results)
    {
        return false;
    }
    a.body.len() == b.body.len()
        && a.body
            .iter()
            .zip(b.body.iter())
            .all(|(&x, &y)| similar(tree, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adaptors::*;
    use crate::attribute::Attribute;
    use crate::builder::Builder;
    use crate::ops::ArithBinOpKind;

    #[test]
    fn promotion_prefers_float_over_int() {
        let target = deduce_target_cast_type(&Type::float64(), &Type::int64(), false);
        assert_eq!(target, Some(Type::float64()));
        let target = deduce_target_cast_type(&Type::int64(), &Type::float64(), false);
        assert_eq!(target, Some(Type::float64()));
    }

    #[test]
    fn promotion_prefers_the_wider_width() {
        let target = deduce_target_cast_type(&Type::integer(64), &Type::integer(32), false);
        assert_eq!(target, Some(Type::integer(64)));
        let target = deduce_target_cast_type(&Type::float(32), &Type::float(64), false);
        assert_eq!(target, Some(Type::float(64)));
    }

    #[test]
    fn assignment_always_targets_the_left_type() {
        let target = deduce_target_cast_type(&Type::int64(), &Type::float64(), true);
        assert_eq!(target, Some(Type::int64()));
    }

    #[test]
    fn promotion_rejects_non_numeric_pairs() {
        assert_eq!(
            deduce_target_cast_type(&Type::str8(), &Type::int64(), false),
            None
        );
    }

    #[test]
    fn cast_insertion_selects_the_kind() {
        let mut tree = OpTree::new();
        let module = ModuleOp::build_detached(&mut tree);
        let mut b = Builder::at_body_end(&mut tree, module.op_id());
        let int_const = ConstantOp::build(&mut b, Type::int64(), 7i64);
        let int_value = int_const.result(b.tree());
        let cast = insert_numeric_cast(&mut b, &Type::float64(), int_value).unwrap();
        assert_eq!(cast.kind(&tree), ArithCastOpKind::IntToFloat);
        assert_eq!(tree.value_type(cast.result(&tree)), &Type::float64());
    }

    #[test]
    fn cast_insertion_is_a_no_op_for_equal_types() {
        let mut tree = OpTree::new();
        let module = ModuleOp::build_detached(&mut tree);
        let mut b = Builder::at_body_end(&mut tree, module.op_id());
        let c = ConstantOp::build(&mut b, Type::int64(), 7i64);
        let value = c.result(b.tree());
        assert!(insert_numeric_cast(&mut b, &Type::int64(), value).is_none());
    }

    #[test]
    fn narrowing_within_a_family_truncates() {
        let mut tree = OpTree::new();
        let module = ModuleOp::build_detached(&mut tree);
        let mut b = Builder::at_body_end(&mut tree, module.op_id());
        let c = ConstantOp::build(&mut b, Type::integer(64), 7i64);
        let value = c.result(b.tree());
        let cast = insert_numeric_cast(&mut b, &Type::integer(32), value).unwrap();
        assert_eq!(cast.kind(&tree), ArithCastOpKind::TruncI);
    }

    #[test]
    fn similar_compares_structure_not_identity() {
        let mut tree = OpTree::new();
        let module = ModuleOp::build_detached(&mut tree);
        let mut b = Builder::at_body_end(&mut tree, module.op_id());
        let c1 = ConstantOp::build(&mut b, Type::float64(), 9.1);
        let c2 = ConstantOp::build(&mut b, Type::float64(), 9.1);
        let c3 = ConstantOp::build(&mut b, Type::float64(), 2.0);
        let v1 = c1.result(b.tree());
        let v2 = c2.result(b.tree());
        let a = ArithBinaryOp::build_infer(&mut b, ArithBinOpKind::SubF, v1, v2);
        let other = ArithBinaryOp::build_infer(&mut b, ArithBinOpKind::SubF, v2, v1);

        assert!(similar(&tree, c1.op_id(), c2.op_id()));
        assert!(!similar(&tree, c1.op_id(), c3.op_id()));
        assert!(similar(&tree, a.op_id(), other.op_id()));
        assert!(!similar(&tree, a.op_id(), c1.op_id()));
    }

    #[test]
    fn similar_recurses_into_bodies() {
        let mut tree = OpTree::new();
        let module = ModuleOp::build_detached(&mut tree);
        let mut b = Builder::at_body_end(&mut tree, module.op_id());
        let cond = ConstantOp::build(&mut b, Type::boolean(), true);
        let cond_value = cond.result(b.tree());
        let first = IfOp::build(&mut b, cond_value, false);
        let second = IfOp::build(&mut b, cond_value, false);
        let third = IfOp::build(&mut b, cond_value, true);

        assert!(similar(b.tree(), first.op_id(), second.op_id()));
        assert!(!similar(b.tree(), first.op_id(), third.op_id()));

        let then_op = first.then_op(b.tree()).unwrap();
        b.set_insert_point_at_body_end(then_op.op_id());
        ConstantOp::build(&mut b, Type::int64(), 1i64);
        assert!(!similar(&tree, first.op_id(), second.op_id()));
    }

    #[test]
    fn constants_with_equal_payloads_are_similar() {
        let mut tree = OpTree::new();
        let module = ModuleOp::build_detached(&mut tree);
        let mut b = Builder::at_body_end(&mut tree, module.op_id());
        let a = ConstantOp::build(&mut b, Type::int64(), Attribute::Int(5));
        let b_op = ConstantOp::build(&mut b, Type::int64(), Attribute::Int(6));
        assert!(!similar(&tree, a.op_id(), b_op.op_id()));
    }
}
