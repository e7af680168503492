//! End-to-end verification of well-formed and malformed operation trees.

use pyrite_core::{
    ArithBinOpKind, ArithCastOpKind, DeclarativeModule, Inserter, LogicBinOpKind, LogicUnaryOpKind,
    OpKind, Type,
};
use pyrite_semantizer::Semantizer;

fn assert_verified(m: DeclarativeModule) {
    let program = m.make_program();
    let result = Semantizer::process(&program);
    assert!(result.is_ok(), "unexpected errors: {}", result.unwrap_err());
}

fn first_error(m: DeclarativeModule) -> String {
    let program = m.make_program();
    let errors = Semantizer::process(&program).unwrap_err();
    let message = errors.iter().next().unwrap().to_string();
    message
}

#[test]
fn empty_module_verifies() {
    assert_verified(DeclarativeModule::new());
}

#[test]
fn straightline_function_verifies() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![Type::int64()], Type::int64()))
        .inward_at("x", 0)
        .with_body();
    m.constant(Type::int64(), 5i64).save(0);
    let (x, c) = (m.v("x"), m.v(0));
    m.arith_binary(ArithBinOpKind::AddI, x, c).save(1);
    let sum = m.v(1);
    m.ret_value(sum);
    m.end_body();
    assert_verified(m);
}

#[test]
fn memory_and_io_verify() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.allocate(Type::pointer(Type::float64())).save("z");
    let z = m.v("z");
    m.input(z);
    m.load(z).save("v");
    let v = m.v("v");
    m.print_values(&[v]);
    m.ret();
    m.end_body();
    assert_verified(m);
}

#[test]
fn control_flow_verifies() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::boolean(), true).save(0);
    let cond = m.v(0);
    m.if_else(cond, true);
    m.while_loop();
    let while_op = m.current();
    let condition = m.tree().op(while_op).body[0];
    // Fill the condition body with a boolean terminator.
    {
        use pyrite_core::{Builder, ConstantOp};
        let tree = m.tree_mut();
        let mut b = Builder::at_body_end(tree, condition);
        ConstantOp::build(&mut b, Type::boolean(), false);
    }
    m.ret();
    m.end_body();
    assert_verified(m);
}

#[test]
fn for_loop_verifies() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 0i64).save(0);
    m.constant(Type::int64(), 10i64).save(1);
    m.constant(Type::int64(), 1i64).save(2);
    let (start, stop, step) = (m.v(0), m.v(1), m.v(2));
    m.for_loop("i", Type::int64(), start, stop, step);
    m.ret();
    m.end_body();
    assert_verified(m);
}

#[test]
fn function_calls_resolve_in_traversal_order() {
    let mut m = DeclarativeModule::new();
    m.function("helper", Type::function(vec![Type::int64()], Type::int64()))
        .inward_at("x", 0)
        .with_body();
    let x = m.v("x");
    m.ret_value(x);
    m.end_body();
    m.function("main", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 3i64).save(0);
    let arg = m.v(0);
    m.function_call("helper", Type::int64(), &[arg]);
    m.ret();
    m.end_body();
    assert_verified(m);
}

#[test]
fn call_to_unknown_function_is_an_error() {
    let mut m = DeclarativeModule::new();
    m.function("main", Type::function(vec![], Type::none())).with_body();
    m.function_call("missing", Type::none(), &[]);
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "FunctionCall operation has unknown callee name: missing"
    );
}

#[test]
fn call_argument_types_must_match() {
    let mut m = DeclarativeModule::new();
    m.function("helper", Type::function(vec![Type::int64()], Type::none())).with_body();
    m.ret();
    m.end_body();
    m.function("main", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::float64(), 1.5).save(0);
    let arg = m.v(0);
    m.function_call("helper", Type::none(), &[arg]);
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "FunctionCall operation must have operands with types of arguments of provided function type"
    );
}

#[test]
fn return_outside_a_function_is_an_error() {
    let mut m = DeclarativeModule::new();
    m.ret();
    assert_eq!(first_error(m), "Return operation must live within function body");
}

#[test]
fn return_type_must_match_the_signature() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::int64())).with_body();
    m.constant(Type::float64(), 2.0).save(0);
    let v = m.v(0);
    m.ret_value(v);
    m.end_body();
    assert_eq!(
        first_error(m),
        "Return operation must have operands with result types of parent function type"
    );
}

#[test]
fn constant_attribute_must_match_result_type() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.op(OpKind::Constant).attr(1.5).result(Type::int64());
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "Constant operation must have attribute #0 of other type"
    );
}

#[test]
fn bool_constants_take_bool_attributes() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::boolean(), true);
    m.ret();
    m.end_body();
    assert_verified(m);
}

#[test]
fn arith_binary_operand_types_must_agree() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 1i64).save(0);
    m.constant(Type::float64(), 1.0).save(1);
    let (a, b) = (m.v(0), m.v(1));
    m.op(OpKind::ArithBinary)
        .attr(ArithBinOpKind::AddI)
        .operand(a)
        .operand(b)
        .result(Type::int64());
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "ArithBinary operation operands must have same type"
    );
}

#[test]
fn arith_binary_result_must_match_operands() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 1i64).save(0);
    let a = m.v(0);
    m.op(OpKind::ArithBinary)
        .attr(ArithBinOpKind::AddI)
        .operand(a)
        .operand(a)
        .result(Type::float64());
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "ArithBinary operation result must have type int(64)"
    );
}

#[test]
fn logic_binary_result_must_be_bool() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 1i64).save(0);
    let a = m.v(0);
    m.op(OpKind::LogicBinary)
        .attr(LogicBinOpKind::Equal)
        .operand(a)
        .operand(a)
        .result(Type::int64());
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "LogicBinary operation must have one result of int(8)"
    );
}

#[test]
fn ext_cast_requires_a_wider_result() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 1i64).save(0);
    let v = m.v(0);
    m.arith_cast(ArithCastOpKind::ExtI, Type::int64(), v);
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "ArithCast operation must have int operand and int result with greater bitwidth, \
         but got int(64) operand and int(64) result"
    );
}

#[test]
fn int_to_float_cast_verifies() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 1i64).save(0);
    let v = m.v(0);
    m.arith_cast(ArithCastOpKind::IntToFloat, Type::float64(), v);
    m.ret();
    m.end_body();
    assert_verified(m);
}

#[test]
fn logic_unary_requires_bool_operand() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 1i64).save(0);
    let v = m.v(0);
    m.logic_unary(LogicUnaryOpKind::Not, v);
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "LogicUnary operation must have 1 operands of int(8)"
    );
}

#[test]
fn load_must_match_the_pointee() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.allocate(Type::pointer(Type::int64())).save(0);
    let ptr = m.v(0);
    m.op(OpKind::Load).operand(ptr).result(Type::float64());
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "Load operation must have source operand type as pointer to result type"
    );
}

#[test]
fn store_must_match_the_pointee() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.allocate(Type::pointer(Type::int64())).save(0);
    m.constant(Type::float64(), 1.0).save(1);
    let (ptr, value) = (m.v(0), m.v(1));
    m.store(ptr, value);
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "Store operation must have destination operand type as pointer to value to store operand type"
    );
}

#[test]
fn if_requires_its_then_header() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::boolean(), true).save(0);
    let cond = m.v(0);
    m.op(OpKind::If).operand(cond);
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "If operation must have one operation (Then) or two operations (Then, Else) within body"
    );
}

#[test]
fn condition_terminator_must_be_bool() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.while_loop();
    let while_op = m.current();
    let condition = m.tree().op(while_op).body[0];
    {
        use pyrite_core::{Builder, ConstantOp};
        let tree = m.tree_mut();
        let mut b = Builder::at_body_end(tree, condition);
        ConstantOp::build(&mut b, Type::int64(), 1i64);
    }
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "Condition operation must have operation with one bool result as last within body"
    );
}

#[test]
fn empty_condition_is_an_error() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.while_loop();
    m.ret();
    m.end_body();
    assert_eq!(
        first_error(m),
        "Condition operation must have at least one operation within body"
    );
}

#[test]
fn print_accepts_zero_operands() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.print_values(&[]);
    m.ret();
    m.end_body();
    assert_verified(m);
}

#[test]
fn input_requires_a_pointer_destination() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 1i64).save(0);
    let v = m.v(0);
    m.input(v);
    m.ret();
    m.end_body();
    assert_eq!(first_error(m), "Input operation must have one pointer operand");
}

proptest::proptest! {
    /// Any constant whose attribute variant matches its result type
    /// verifies, whatever the payload.
    #[test]
    fn any_well_typed_constant_verifies(int_value in proptest::num::i64::ANY, float_value in -1e12f64..1e12) {
        let mut m = DeclarativeModule::new();
        m.function("test", Type::function(vec![], Type::none())).with_body();
        m.constant(Type::int64(), int_value);
        m.constant(Type::float64(), float_value);
        m.ret();
        m.end_body();
        let program = m.make_program();
        proptest::prop_assert!(Semantizer::process(&program).is_ok());
    }
}

#[test]
fn all_errors_are_collected() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::int64(), 1i64).save(0);
    let v = m.v(0);
    m.input(v);
    m.logic_unary(LogicUnaryOpKind::Not, v);
    m.ret();
    m.end_body();
    let program = m.make_program();
    let errors = Semantizer::process(&program).unwrap_err();
    assert_eq!(errors.len(), 2);
}
