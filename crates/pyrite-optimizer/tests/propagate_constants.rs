//! Store-to-load constant propagation tests.

mod common;

use common::run_cascaded;
use pyrite_core::{ArithBinOpKind, DeclarativeModule, LogicBinOpKind, OpKind, Type};
use pyrite_optimizer::create_propagate_constants;

#[test]
fn forwards_a_stored_constant_to_later_loads() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::float64())).with_body();
    m.allocate(Type::pointer(Type::float64())).save("z");
    m.constant(Type::float64(), 4.5).save(1);
    let (z, c) = (m.v("z"), m.v(1));
    m.store(z, c);
    m.load(z).save(8);
    let (c, l) = (m.v(1), m.v(8));
    m.arith_binary(ArithBinOpKind::AddF, c, l).save(9);
    let sum = m.v(9);
    m.ret_value(sum);
    m.end_body();

    let mut e = DeclarativeModule::new();
    e.function("test", Type::function(vec![], Type::float64())).with_body();
    e.allocate(Type::pointer(Type::float64())).save("z");
    e.constant(Type::float64(), 4.5).save(1);
    let (z, c) = (e.v("z"), e.v(1));
    e.store(z, c);
    e.load(z);
    e.arith_binary(ArithBinOpKind::AddF, c, c).save(9);
    let sum = e.v(9);
    e.ret_value(sum);
    e.end_body();

    assert_eq!(run_cascaded(m, create_propagate_constants()), e.dump());
}

#[test]
fn forwards_into_nested_branches() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::float64())).with_body();
    m.allocate(Type::pointer(Type::float64())).save("z");
    m.constant(Type::float64(), 4.5).save(1);
    let (z, c) = (m.v("z"), m.v(1));
    m.store(z, c);
    m.load(z).save(2);
    let (c, l) = (m.v(1), m.v(2));
    m.arith_binary(ArithBinOpKind::AddF, c, l).save(3);
    let (sum, c) = (m.v(3), m.v(1));
    m.logic_binary(LogicBinOpKind::GreaterEqualF, sum, c).save(4);
    let cond = m.v(4);
    m.op(OpKind::If).operand(cond).with_body();
    m.op(OpKind::Then).with_body();
    m.constant(Type::float64(), 9.10).save(5);
    let (c5, l) = (m.v(5), m.v(2));
    m.arith_binary(ArithBinOpKind::SubF, c5, l);
    m.end_body();
    m.op(OpKind::Else).with_body();
    m.constant(Type::float64(), 9.10).save(6);
    let (c6, l) = (m.v(6), m.v(2));
    m.arith_binary(ArithBinOpKind::SubF, c6, l);
    m.end_body();
    m.end_body();
    let sum = m.v(3);
    m.ret_value(sum);
    m.end_body();

    let mut e = DeclarativeModule::new();
    e.function("test", Type::function(vec![], Type::float64())).with_body();
    e.allocate(Type::pointer(Type::float64())).save("z");
    e.constant(Type::float64(), 4.5).save(1);
    let (z, c) = (e.v("z"), e.v(1));
    e.store(z, c);
    e.load(z);
    e.arith_binary(ArithBinOpKind::AddF, c, c).save(3);
    let (sum, c1) = (e.v(3), e.v(1));
    e.logic_binary(LogicBinOpKind::GreaterEqualF, sum, c1).save(4);
    let cond = e.v(4);
    e.op(OpKind::If).operand(cond).with_body();
    e.op(OpKind::Then).with_body();
    e.constant(Type::float64(), 9.10).save(5);
    let (c5, c1) = (e.v(5), e.v(1));
    e.arith_binary(ArithBinOpKind::SubF, c5, c1);
    e.end_body();
    e.op(OpKind::Else).with_body();
    e.constant(Type::float64(), 9.10).save(6);
    let (c6, c1) = (e.v(6), e.v(1));
    e.arith_binary(ArithBinOpKind::SubF, c6, c1);
    e.end_body();
    e.end_body();
    let sum = e.v(3);
    e.ret_value(sum);
    e.end_body();

    assert_eq!(run_cascaded(m, create_propagate_constants()), e.dump());
}

#[test]
fn propagates_within_branch_local_scopes() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.constant(Type::boolean(), true).save(0);
    let cond = m.v(0);
    m.op(OpKind::If).operand(cond).with_body();
    m.op(OpKind::Then).with_body();
    m.allocate(Type::pointer(Type::float64())).save("x");
    m.constant(Type::float64(), 9.10).save(1);
    let (x, c) = (m.v("x"), m.v(1));
    m.store(x, c);
    m.load(x).save(2);
    let (c, l) = (m.v(1), m.v(2));
    m.arith_binary(ArithBinOpKind::SubF, c, l);
    m.end_body();
    m.end_body();
    m.ret();
    m.end_body();

    let mut e = DeclarativeModule::new();
    e.function("test", Type::function(vec![], Type::none())).with_body();
    e.constant(Type::boolean(), true).save(0);
    let cond = e.v(0);
    e.op(OpKind::If).operand(cond).with_body();
    e.op(OpKind::Then).with_body();
    e.allocate(Type::pointer(Type::float64())).save("x");
    e.constant(Type::float64(), 9.10).save(1);
    let (x, c) = (e.v("x"), e.v(1));
    e.store(x, c);
    e.load(x);
    e.arith_binary(ArithBinOpKind::SubF, c, c);
    e.end_body();
    e.end_body();
    e.ret();
    e.end_body();

    assert_eq!(run_cascaded(m, create_propagate_constants()), e.dump());
}

#[test]
fn a_branch_store_invalidates_the_outer_binding() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![], Type::none())).with_body();
    m.allocate(Type::pointer(Type::int64())).save("z");
    m.constant(Type::int64(), 1i64).save(0);
    let (z, c1) = (m.v("z"), m.v(0));
    m.store(z, c1);
    m.constant(Type::boolean(), true).save(1);
    let cond = m.v(1);
    m.op(OpKind::If).operand(cond).with_body();
    m.op(OpKind::Then).with_body();
    m.constant(Type::int64(), 2i64).save(2);
    let (z, c2) = (m.v("z"), m.v(2));
    m.store(z, c2);
    m.end_body();
    m.end_body();
    // The conditional store above makes this load non-constant.
    m.load(z).save(3);
    let l = m.v(3);
    m.arith_binary(ArithBinOpKind::AddI, l, l);
    m.ret();
    m.end_body();
    let before = m.dump();

    assert_eq!(run_cascaded(m, create_propagate_constants()), before);
}

#[test]
fn a_nonconstant_store_invalidates_the_binding() {
    let mut m = DeclarativeModule::new();
    m.function("test", Type::function(vec![Type::int64()], Type::none()))
        .inward_at("a", 0)
        .with_body();
    m.allocate(Type::pointer(Type::int64())).save("z");
    m.constant(Type::int64(), 1i64).save(0);
    let (z, c1) = (m.v("z"), m.v(0));
    m.store(z, c1);
    let (z, a) = (m.v("z"), m.v("a"));
    m.store(z, a);
    m.load(z).save(1);
    let l = m.v(1);
    m.arith_binary(ArithBinOpKind::AddI, l, l);
    m.ret();
    m.end_body();
    let before = m.dump();

    assert_eq!(run_cascaded(m, create_propagate_constants()), before);
}
