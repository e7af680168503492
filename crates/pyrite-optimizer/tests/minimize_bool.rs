//! Boolean-minimization transform tests. The `x` and `y` operands are
//! function arguments, so nothing else can fold them away.

mod common;

use common::run_cascaded;
use pyrite_core::{DeclarativeModule, LogicBinOpKind, LogicUnaryOpKind, Type};
use pyrite_optimizer::create_minimize_bool_expression;

fn two_arg_function(m: &mut DeclarativeModule) {
    m.function(
        "test",
        Type::function(vec![Type::int64(), Type::int64()], Type::none()),
    )
    .inward_at("x", 0)
    .inward_at("y", 1)
    .with_body();
}

#[test]
fn minimize_or() {
    let mut m = DeclarativeModule::new();
    two_arg_function(&mut m);
    m.constant(Type::boolean(), false).save(2);
    m.constant(Type::boolean(), true).save(3);
    let (x, y) = (m.v("x"), m.v("y"));
    m.logic_binary(LogicBinOpKind::OrI, x, y).save(4);
    m.logic_binary(LogicBinOpKind::OrI, x, x).save(5);
    let v5 = m.v(5);
    m.logic_binary(LogicBinOpKind::GreaterI, v5, y).save(6);
    let t = m.v(3);
    m.logic_binary(LogicBinOpKind::OrI, t, x).save(7);
    let v7 = m.v(7);
    m.logic_binary(LogicBinOpKind::GreaterI, v7, x).save(8);
    let f = m.v(2);
    m.logic_binary(LogicBinOpKind::OrI, f, x).save(9);
    let v9 = m.v(9);
    m.logic_binary(LogicBinOpKind::GreaterI, v9, x).save(10);
    m.logic_unary(LogicUnaryOpKind::Not, x).save(11);
    let v11 = m.v(11);
    m.logic_binary(LogicBinOpKind::OrI, v11, x).save(12);
    let v12 = m.v(12);
    m.logic_binary(LogicBinOpKind::GreaterI, v12, x).save(13);
    m.ret();
    m.end_body();

    let mut e = DeclarativeModule::new();
    two_arg_function(&mut e);
    e.constant(Type::boolean(), false);
    e.constant(Type::boolean(), true);
    let (x, y) = (e.v("x"), e.v("y"));
    e.logic_binary(LogicBinOpKind::OrI, x, y);
    // Idempotent or collapsed onto x.
    e.logic_binary(LogicBinOpKind::GreaterI, x, y);
    // `true or x` is the annihilator.
    e.constant(Type::boolean(), true).save(7);
    let v7 = e.v(7);
    e.logic_binary(LogicBinOpKind::GreaterI, v7, x);
    // `false or x` is the identity.
    e.logic_binary(LogicBinOpKind::GreaterI, x, x);
    // Complementation: `!x or x` is constant true; the Not survives.
    e.logic_unary(LogicUnaryOpKind::Not, x);
    e.constant(Type::boolean(), true).save(12);
    let v12 = e.v(12);
    e.logic_binary(LogicBinOpKind::GreaterI, v12, x);
    e.ret();
    e.end_body();

    assert_eq!(
        run_cascaded(m, create_minimize_bool_expression()),
        e.dump()
    );
}

#[test]
fn minimize_and() {
    let mut m = DeclarativeModule::new();
    two_arg_function(&mut m);
    m.constant(Type::boolean(), false).save(2);
    m.constant(Type::boolean(), true).save(3);
    let (x, y) = (m.v("x"), m.v("y"));
    m.logic_binary(LogicBinOpKind::AndI, x, y).save(4);
    m.logic_binary(LogicBinOpKind::AndI, x, x).save(5);
    let v5 = m.v(5);
    m.logic_binary(LogicBinOpKind::GreaterI, v5, y).save(6);
    let t = m.v(3);
    m.logic_binary(LogicBinOpKind::AndI, t, x).save(7);
    let v7 = m.v(7);
    m.logic_binary(LogicBinOpKind::GreaterI, v7, x).save(8);
    let f = m.v(2);
    m.logic_binary(LogicBinOpKind::AndI, f, x).save(9);
    let v9 = m.v(9);
    m.logic_binary(LogicBinOpKind::GreaterI, v9, x).save(10);
    m.logic_unary(LogicUnaryOpKind::Not, x).save(11);
    let v11 = m.v(11);
    m.logic_binary(LogicBinOpKind::AndI, v11, x).save(12);
    let v12 = m.v(12);
    m.logic_binary(LogicBinOpKind::GreaterI, v12, x).save(13);
    m.ret();
    m.end_body();

    let mut e = DeclarativeModule::new();
    two_arg_function(&mut e);
    e.constant(Type::boolean(), false);
    e.constant(Type::boolean(), true);
    let (x, y) = (e.v("x"), e.v("y"));
    e.logic_binary(LogicBinOpKind::AndI, x, y);
    // Idempotent and collapsed onto x.
    e.logic_binary(LogicBinOpKind::GreaterI, x, y);
    // `true and x` is the identity.
    e.logic_binary(LogicBinOpKind::GreaterI, x, x);
    // `false and x` is the annihilator.
    e.constant(Type::boolean(), false).save(9);
    let v9 = e.v(9);
    e.logic_binary(LogicBinOpKind::GreaterI, v9, x);
    // Complementation: `!x and x` is constant false.
    e.logic_unary(LogicUnaryOpKind::Not, x);
    e.constant(Type::boolean(), false).save(12);
    let v12 = e.v(12);
    e.logic_binary(LogicBinOpKind::GreaterI, v12, x);
    e.ret();
    e.end_body();

    assert_eq!(
        run_cascaded(m, create_minimize_bool_expression()),
        e.dump()
    );
}

#[test]
fn minimize_equal() {
    let mut m = DeclarativeModule::new();
    two_arg_function(&mut m);
    let (x, y) = (m.v("x"), m.v("y"));
    m.logic_binary(LogicBinOpKind::Equal, x, y).save(4);
    m.logic_binary(LogicBinOpKind::Equal, x, x).save(5);
    let v5 = m.v(5);
    m.logic_binary(LogicBinOpKind::GreaterI, v5, y).save(6);
    m.logic_unary(LogicUnaryOpKind::Not, x).save(11);
    let v11 = m.v(11);
    m.logic_binary(LogicBinOpKind::Equal, v11, x).save(12);
    let v12 = m.v(12);
    m.logic_binary(LogicBinOpKind::GreaterI, v12, x).save(13);
    m.ret();
    m.end_body();

    let mut e = DeclarativeModule::new();
    two_arg_function(&mut e);
    let (x, y) = (e.v("x"), e.v("y"));
    e.logic_binary(LogicBinOpKind::Equal, x, y);
    // `x == x` is constant true.
    e.constant(Type::boolean(), true).save(5);
    let v5 = e.v(5);
    e.logic_binary(LogicBinOpKind::GreaterI, v5, y);
    // `!x == x` is constant false.
    e.logic_unary(LogicUnaryOpKind::Not, x);
    e.constant(Type::boolean(), false).save(12);
    let v12 = e.v(12);
    e.logic_binary(LogicBinOpKind::GreaterI, v12, x);
    e.ret();
    e.end_body();

    assert_eq!(
        run_cascaded(m, create_minimize_bool_expression()),
        e.dump()
    );
}

#[test]
fn minimize_not_equal() {
    let mut m = DeclarativeModule::new();
    two_arg_function(&mut m);
    let (x, y) = (m.v("x"), m.v("y"));
    m.logic_binary(LogicBinOpKind::NotEqual, x, y).save(4);
    m.logic_binary(LogicBinOpKind::NotEqual, x, x).save(5);
    let v5 = m.v(5);
    m.logic_binary(LogicBinOpKind::GreaterI, v5, y).save(6);
    m.logic_unary(LogicUnaryOpKind::Not, x).save(11);
    let v11 = m.v(11);
    m.logic_binary(LogicBinOpKind::NotEqual, v11, x).save(12);
    let v12 = m.v(12);
    m.logic_binary(LogicBinOpKind::GreaterI, v12, x).save(13);
    m.ret();
    m.end_body();

    let mut e = DeclarativeModule::new();
    two_arg_function(&mut e);
    let (x, y) = (e.v("x"), e.v("y"));
    e.logic_binary(LogicBinOpKind::NotEqual, x, y);
    // `x != x` is constant false.
    e.constant(Type::boolean(), false).save(5);
    let v5 = e.v(5);
    e.logic_binary(LogicBinOpKind::GreaterI, v5, y);
    // `!x != x` is constant true.
    e.logic_unary(LogicUnaryOpKind::Not, x);
    e.constant(Type::boolean(), true).save(12);
    let v12 = e.v(12);
    e.logic_binary(LogicBinOpKind::GreaterI, v12, x);
    e.ret();
    e.end_body();

    assert_eq!(
        run_cascaded(m, create_minimize_bool_expression()),
        e.dump()
    );
}
