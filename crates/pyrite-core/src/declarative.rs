//! Fluent construction surface over an operation tree.
//!
//! [`DeclarativeModule`] owns a tree rooted at a `Module` and exposes a
//! chainable builder: raw assembly (`op`/`operand`/`attr`/`result`/
//! `inward`) plus typed shortcuts mirroring every adaptor constructor.
//! `with_body` descends into the body of the operation built last,
//! `end_body` climbs back out. Values are parked in a storage keyed by
//! either an integer or a name, so tests and the converter can refer to
//! them without threading handles around.

use indexmap::IndexMap;

use crate::adaptors::*;
use crate::attribute::Attribute;
use crate::builder::{InsertPoint, Inserter};
use crate::operation::{OpId, OpTree};
use crate::ops::{ArithBinOpKind, ArithCastOpKind, LogicBinOpKind, LogicUnaryOpKind, OpKind};
use crate::program::Program;
use crate::types::Type;
use crate::value::ValueId;

/// Storage key of the declarative value store: an integer or a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueKey {
    Num(i64),
    Name(String),
}

impl From<i64> for ValueKey {
    fn from(key: i64) -> Self {
        ValueKey::Num(key)
    }
}

impl From<i32> for ValueKey {
    fn from(key: i32) -> Self {
        ValueKey::Num(key as i64)
    }
}

impl From<&str> for ValueKey {
    fn from(key: &str) -> Self {
        ValueKey::Name(key.to_owned())
    }
}

impl From<String> for ValueKey {
    fn from(key: String) -> Self {
        ValueKey::Name(key)
    }
}

/// Chainable module builder.
#[derive(Debug)]
pub struct DeclarativeModule {
    tree: OpTree,
    root: OpId,
    current: OpId,
    point: InsertPoint,
    values: IndexMap<ValueKey, ValueId>,
}

impl Inserter for DeclarativeModule {
    fn tree(&self) -> &OpTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut OpTree {
        &mut self.tree
    }

    fn insert_op(&mut self, op: OpId) {
        self.tree
            .insert_into_body(self.point.parent, self.point.index, op);
        self.point.index += 1;
        self.current = op;
    }
}

impl DeclarativeModule {
    pub fn new() -> DeclarativeModule {
        let mut tree = OpTree::new();
        let root = ModuleOp::build_detached(&mut tree).op_id();
        let point = InsertPoint::at_body_end(&tree, root);
        DeclarativeModule {
            tree,
            root,
            current: root,
            point,
            values: IndexMap::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Shorthand types of the source language
    // -----------------------------------------------------------------------

    pub fn t_none(&self) -> Type {
        Type::none()
    }

    pub fn t_i64(&self) -> Type {
        Type::int64()
    }

    pub fn t_bool(&self) -> Type {
        Type::boolean()
    }

    pub fn t_f64(&self) -> Type {
        Type::float64()
    }

    pub fn t_str(&self) -> Type {
        Type::str8()
    }

    pub fn t_ptr(&self, pointee: Type) -> Type {
        Type::pointer(pointee)
    }

    pub fn t_func(&self, arguments: Vec<Type>, result: Type) -> Type {
        Type::function(arguments, result)
    }

    // -----------------------------------------------------------------------
    // Value storage
    // -----------------------------------------------------------------------

    /// Fetches a stored value.
    ///
    /// # Panics
    ///
    /// Panics when nothing was stored under the key.
    pub fn v(&self, key: impl Into<ValueKey>) -> ValueId {
        let key = key.into();
        *self
            .values
            .get(&key)
            .unwrap_or_else(|| panic!("no value stored under {key:?}"))
    }

    /// Stores the first result of the operation built last.
    pub fn save(&mut self, key: impl Into<ValueKey>) -> &mut Self {
        let value = self.tree.result(self.current, 0);
        self.values.insert(key.into(), value);
        self
    }

    // -----------------------------------------------------------------------
    // Raw assembly
    // -----------------------------------------------------------------------

    /// Inserts an empty operation of the given kind at the cursor.
    pub fn op(&mut self, kind: OpKind) -> &mut Self {
        let op = self.tree.new_op(kind);
        self.insert_op(op);
        self
    }

    pub fn operand(&mut self, value: ValueId) -> &mut Self {
        self.tree.add_operand(self.current, value);
        self
    }

    pub fn attr(&mut self, attr: impl Into<Attribute>) -> &mut Self {
        let attr = attr.into();
        self.tree.op_mut(self.current).attributes.push(attr);
        self
    }

    pub fn result(&mut self, ty: Type) -> &mut Self {
        self.tree.add_result(self.current, ty);
        self
    }

    /// Creates an inward on the current operation and stores it under `key`.
    pub fn inward(&mut self, key: impl Into<ValueKey>, ty: Type) -> &mut Self {
        let value = self.tree.add_inward(self.current, ty);
        self.values.insert(key.into(), value);
        self
    }

    /// Stores an existing inward of the current operation under `key`.
    pub fn inward_at(&mut self, key: impl Into<ValueKey>, index: usize) -> &mut Self {
        let value = self.tree.inward(self.current, index);
        self.values.insert(key.into(), value);
        self
    }

    /// Moves the cursor into the body of the operation built last (after a
    /// structural header child, if any).
    pub fn with_body(&mut self) -> &mut Self {
        self.point = InsertPoint::at_body_begin(&self.tree, self.current);
        self
    }

    /// Climbs out of the body entered last: the cursor lands after the
    /// parent of the operation built last, which becomes current.
    pub fn end_body(&mut self) -> &mut Self {
        let Some(parent) = self.tree.op(self.current).parent else {
            return self;
        };
        if self.tree.op(parent).parent.is_some() {
            self.point = InsertPoint::after(&self.tree, parent);
        } else {
            self.point = InsertPoint::at_body_end(&self.tree, parent);
        }
        self.current = parent;
        self
    }

    // -----------------------------------------------------------------------
    // Typed shortcuts (one per adaptor constructor)
    // -----------------------------------------------------------------------

    pub fn function(&mut self, name: &str, func_type: Type) -> &mut Self {
        FunctionOp::build(self, name, func_type);
        self
    }

    pub fn function_call(&mut self, name: &str, result_type: Type, arguments: &[ValueId]) -> &mut Self {
        FunctionCallOp::build(self, name, result_type, arguments);
        self
    }

    pub fn ret(&mut self) -> &mut Self {
        ReturnOp::build(self);
        self
    }

    pub fn ret_value(&mut self, value: ValueId) -> &mut Self {
        ReturnOp::build_value(self, value);
        self
    }

    pub fn constant(&mut self, ty: Type, value: impl Into<Attribute>) -> &mut Self {
        ConstantOp::build(self, ty, value);
        self
    }

    pub fn arith_binary(&mut self, kind: ArithBinOpKind, lhs: ValueId, rhs: ValueId) -> &mut Self {
        ArithBinaryOp::build_infer(self, kind, lhs, rhs);
        self
    }

    pub fn logic_binary(&mut self, kind: LogicBinOpKind, lhs: ValueId, rhs: ValueId) -> &mut Self {
        LogicBinaryOp::build(self, kind, lhs, rhs);
        self
    }

    pub fn arith_cast(&mut self, kind: ArithCastOpKind, result_type: Type, value: ValueId) -> &mut Self {
        ArithCastOp::build(self, kind, result_type, value);
        self
    }

    pub fn logic_unary(&mut self, kind: LogicUnaryOpKind, value: ValueId) -> &mut Self {
        LogicUnaryOp::build(self, kind, value);
        self
    }

    pub fn allocate(&mut self, pointer_type: Type) -> &mut Self {
        AllocateOp::build(self, pointer_type);
        self
    }

    pub fn load(&mut self, src: ValueId) -> &mut Self {
        LoadOp::build(self, src);
        self
    }

    pub fn store(&mut self, dst: ValueId, value: ValueId) -> &mut Self {
        StoreOp::build(self, dst, value);
        self
    }

    /// Typed `If` with its `Then` (and optional `Else`) pre-created.
    pub fn if_else(&mut self, cond: ValueId, with_else: bool) -> &mut Self {
        IfOp::build(self, cond, with_else);
        self
    }

    /// Typed `While` with its `Condition` header pre-created.
    pub fn while_loop(&mut self) -> &mut Self {
        WhileOp::build(self);
        self
    }

    /// Typed `For`; the iterator inward is stored under `key`.
    pub fn for_loop(
        &mut self,
        key: impl Into<ValueKey>,
        iterator_type: Type,
        start: ValueId,
        stop: ValueId,
        step: ValueId,
    ) -> &mut Self {
        let op = ForOp::build(self, iterator_type, start, stop, step);
        let iterator = op.iterator(&self.tree);
        self.values.insert(key.into(), iterator);
        self
    }

    pub fn input(&mut self, dst: ValueId) -> &mut Self {
        InputOp::build(self, dst);
        self
    }

    pub fn print_values(&mut self, values: &[ValueId]) -> &mut Self {
        PrintOp::build(self, values);
        self
    }

    // -----------------------------------------------------------------------
    // Results
    // -----------------------------------------------------------------------

    /// The operation built last.
    pub fn current(&self) -> OpId {
        self.current
    }

    pub fn root_op(&self) -> OpId {
        self.root
    }

    /// Nth child of the root module.
    pub fn child_op(&self, index: usize) -> OpId {
        self.tree.op(self.root).body[index]
    }

    pub fn dump(&self) -> String {
        self.tree.dump(self.root)
    }

    /// Hands the finished tree over as a program.
    pub fn make_program(self) -> Program {
        Program::from_parts(self.tree, self.root)
    }
}

impl Default for DeclarativeModule {
    fn default() -> Self {
        DeclarativeModule::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_create_module() {
        let m = DeclarativeModule::new();
        assert_eq!(m.dump(), "Module () -> ()\n");
    }

    #[test]
    fn can_insert_function_with_body() {
        let mut m = DeclarativeModule::new();
        let func_type = m.t_func(vec![m.t_i64(), m.t_f64()], m.t_none());
        m.op(OpKind::Function)
            .attr("myfunc")
            .attr(func_type)
            .inward(0, Type::int64())
            .inward(1, Type::float64())
            .with_body();
        m.op(OpKind::Constant).attr(123i64).result(Type::int64()).save(2);
        m.op(OpKind::Allocate)
            .result(Type::pointer(Type::int64()))
            .save(3);
        let (a, b) = (m.v(2), m.v(1));
        m.op(OpKind::ArithBinary)
            .attr(ArithBinOpKind::AddI)
            .operand(a)
            .operand(b)
            .result(Type::int64())
            .save(4);
        let (dst, stored) = (m.v(3), m.v(4));
        m.op(OpKind::Store).operand(dst).operand(stored);
        m.op(OpKind::Return);
        m.end_body();

        assert_eq!(
            m.dump(),
            "Module () -> ()\n\
             \x20 Function {str : myfunc, type : func((int(64), float(64)) -> none)} () -> () [#0 : int(64), #1 : float(64)]\n\
             \x20   Constant {int : 123} () -> (#2 : int(64))\n\
             \x20   Allocate () -> (#3 : ptr(int(64)))\n\
             \x20   ArithBinary {arith-binary : AddI} (#2 : int(64), #1 : float(64)) -> (#4 : int(64))\n\
             \x20   Store (#3 : ptr(int(64)), #4 : int(64)) -> ()\n\
             \x20   Return () -> ()\n"
        );
    }

    #[test]
    fn can_insert_nested_operations() {
        let mut m = DeclarativeModule::new();
        m.function("myfunc", m.t_func(vec![m.t_f64()], m.t_none()))
            .inward_at("arg", 0)
            .with_body();
        m.constant(m.t_f64(), 7.89).save(1);
        m.allocate(m.t_ptr(m.t_f64())).save(2);
        let (arg, threshold) = (m.v("arg"), m.v(1));
        m.logic_binary(LogicBinOpKind::GreaterEqualF, arg, threshold).save(3);
        let cond = m.v(3);
        m.op(OpKind::If).operand(cond).with_body();
        m.op(OpKind::Then).with_body();
        let (lhs, rhs) = (m.v(1), m.v("arg"));
        m.arith_binary(ArithBinOpKind::MulF, lhs, rhs).save(4);
        let (dst, stored) = (m.v(2), m.v(4));
        m.store(dst, stored);
        m.end_body();
        m.op(OpKind::Else).with_body();
        let (dst, stored) = (m.v(2), m.v("arg"));
        m.store(dst, stored);
        m.end_body();
        m.end_body();
        let src = m.v(2);
        m.load(src).save(5);
        let out = m.v(5);
        m.print_values(&[out]);
        m.ret();
        m.end_body();

        assert_eq!(
            m.dump(),
            "Module () -> ()\n\
             \x20 Function {str : myfunc, type : func((float(64)) -> none)} () -> () [#0 : float(64)]\n\
             \x20   Constant {float : 7.89} () -> (#1 : float(64))\n\
             \x20   Allocate () -> (#2 : ptr(float(64)))\n\
             \x20   LogicBinary {logic-binary : GreaterEqualF} (#0 : float(64), #1 : float(64)) -> (#3 : int(8))\n\
             \x20   If (#3 : int(8)) -> ()\n\
             \x20     Then () -> ()\n\
             \x20       ArithBinary {arith-binary : MulF} (#1 : float(64), #0 : float(64)) -> (#4 : float(64))\n\
             \x20       Store (#2 : ptr(float(64)), #4 : float(64)) -> ()\n\
             \x20     Else () -> ()\n\
             \x20       Store (#2 : ptr(float(64)), #0 : float(64)) -> ()\n\
             \x20   Load (#2 : ptr(float(64))) -> (#5 : float(64))\n\
             \x20   Print (#5 : float(64)) -> ()\n\
             \x20   Return () -> ()\n"
        );
    }

    #[test]
    fn typed_if_creates_branches() {
        let mut m = DeclarativeModule::new();
        m.function("test", m.t_func(vec![], m.t_none())).with_body();
        m.constant(m.t_bool(), true).save(0);
        let cond = m.v(0);
        m.if_else(cond, true);
        m.ret();
        m.end_body();

        assert_eq!(
            m.dump(),
            "Module () -> ()\n\
             \x20 Function {str : test, type : func(() -> none)} () -> ()\n\
             \x20   Constant {bool : true} () -> (#0 : int(8))\n\
             \x20   If (#0 : int(8)) -> ()\n\
             \x20     Then () -> ()\n\
             \x20     Else () -> ()\n\
             \x20   Return () -> ()\n"
        );
    }

    #[test]
    fn while_loop_with_condition_body() {
        let mut m = DeclarativeModule::new();
        m.function("test", m.t_func(vec![], m.t_none())).with_body();
        m.while_loop().with_body();
        // The cursor lands after the condition header; descend into it
        // explicitly to fill the test.
        let while_op = m.current();
        let condition = WhileOp::wrap(while_op).condition_op(m.tree()).unwrap();
        m.point = InsertPoint::at_body_end(&m.tree, condition.op_id());
        m.constant(m.t_bool(), false);
        m.end_body();
        m.end_body();
        m.ret();
        m.end_body();

        assert_eq!(
            m.dump(),
            "Module () -> ()\n\
             \x20 Function {str : test, type : func(() -> none)} () -> ()\n\
             \x20   While () -> ()\n\
             \x20     Condition () -> ()\n\
             \x20       Constant {bool : false} () -> (#0 : int(8))\n\
             \x20   Return () -> ()\n"
        );
    }

    #[test]
    fn value_storage_accepts_both_key_kinds() {
        let mut m = DeclarativeModule::new();
        m.function("test", m.t_func(vec![m.t_i64()], m.t_none()))
            .inward_at("x", 0)
            .with_body();
        m.constant(m.t_i64(), 5i64).save(0);
        assert_eq!(m.v("x"), m.v("x"));
        assert_ne!(m.v("x"), m.v(0));
    }

    #[test]
    #[should_panic(expected = "no value stored")]
    fn missing_key_panics() {
        let m = DeclarativeModule::new();
        m.v("nope");
    }
}
