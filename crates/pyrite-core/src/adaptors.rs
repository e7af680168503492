//! Typed adaptors over generic operations.
//!
//! An adaptor is a zero-cost façade wrapping an [`OpId`], exposing named
//! operand/result/attribute accessors for one operation kind. Kind identity
//! is established through [`OpAdaptor::kind_matches`]; the abstract
//! [`BinaryOp`] and [`UnaryOp`] groups match transitively, so
//! `tree.isa::<BinaryOp>(op)` holds for both arithmetic and logic binaries.
//!
//! Each concrete adaptor also carries its `build` constructor, which
//! creates the operation through an [`Inserter`] cursor and populates
//! operands, results, inwards, and attributes the way the catalogue
//! prescribes.

use crate::attribute::Attribute;
use crate::builder::Inserter;
use crate::operation::{OpId, OpTree};
use crate::ops::{ArithBinOpKind, ArithCastOpKind, LogicBinOpKind, LogicUnaryOpKind, OpKind};
use crate::types::{FunctionType, Type};
use crate::value::ValueId;

/// Typed view over a generic operation.
pub trait OpAdaptor: Copy {
    /// Spec-id gate, transitive over adaptor groups.
    fn kind_matches(kind: OpKind) -> bool;

    /// Wraps without checking; use [`OpTree::cast`] for the checked form.
    fn wrap(op: OpId) -> Self;

    fn op_id(self) -> OpId;
}

macro_rules! adaptor {
    ($(#[$doc:meta])* $name:ident, $($kind:pat_param)|+) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $name(OpId);

        impl OpAdaptor for $name {
            fn kind_matches(kind: OpKind) -> bool {
                matches!(kind, $($kind)|+)
            }

            fn wrap(op: OpId) -> Self {
                $name(op)
            }

            fn op_id(self) -> OpId {
                self.0
            }
        }
    };
}

adaptor!(ModuleOp, OpKind::Module);
adaptor!(FunctionOp, OpKind::Function);
adaptor!(FunctionCallOp, OpKind::FunctionCall);
adaptor!(ReturnOp, OpKind::Return);
adaptor!(ConstantOp, OpKind::Constant);
adaptor!(
    /// Abstract group: any two-operand, one-result computation.
    BinaryOp,
    OpKind::ArithBinary | OpKind::LogicBinary
);
adaptor!(ArithBinaryOp, OpKind::ArithBinary);
adaptor!(LogicBinaryOp, OpKind::LogicBinary);
adaptor!(
    /// Abstract group: any one-operand, one-result computation.
    UnaryOp,
    OpKind::ArithCast | OpKind::LogicUnary
);
adaptor!(ArithCastOp, OpKind::ArithCast);
adaptor!(LogicUnaryOp, OpKind::LogicUnary);
adaptor!(AllocateOp, OpKind::Allocate);
adaptor!(LoadOp, OpKind::Load);
adaptor!(StoreOp, OpKind::Store);
adaptor!(IfOp, OpKind::If);
adaptor!(ThenOp, OpKind::Then);
adaptor!(ElseOp, OpKind::Else);
adaptor!(WhileOp, OpKind::While);
adaptor!(ConditionOp, OpKind::Condition);
adaptor!(ForOp, OpKind::For);
adaptor!(InputOp, OpKind::Input);
adaptor!(PrintOp, OpKind::Print);

impl OpTree {
    /// Spec-id check, transitive over adaptor groups.
    pub fn isa<A: OpAdaptor>(&self, op: OpId) -> bool {
        A::kind_matches(self.op(op).kind)
    }

    /// Checked typed view.
    pub fn cast<A: OpAdaptor>(&self, op: OpId) -> Option<A> {
        self.isa::<A>(op).then(|| A::wrap(op))
    }

    /// Walks ancestors and returns the nearest one matching the adaptor.
    pub fn find_parent<A: OpAdaptor>(&self, op: OpId) -> Option<A> {
        let mut current = self.op(op).parent;
        while let Some(ancestor) = current {
            if let Some(found) = self.cast::<A>(ancestor) {
                return Some(found);
            }
            current = self.op(ancestor).parent;
        }
        None
    }

    /// Typed view over the operation that produces `value`.
    pub fn value_owner_as<A: OpAdaptor>(&self, value: ValueId) -> Option<A> {
        self.cast::<A>(self.value_owner(value))
    }
}

fn new_inserted(b: &mut dyn Inserter, kind: OpKind) -> OpId {
    let op = b.tree_mut().new_op(kind);
    b.insert_op(op);
    op
}

// ----------------------------------------------------------------------------
// Fundamental operations
// ----------------------------------------------------------------------------

impl ModuleOp {
    pub fn build_detached(tree: &mut OpTree) -> ModuleOp {
        ModuleOp(tree.new_op(OpKind::Module))
    }

    /// Finds a function child by its name attribute.
    pub fn lookup_function(self, tree: &OpTree, name: &str) -> Option<FunctionOp> {
        tree.op(self.0)
            .body
            .iter()
            .filter_map(|&child| tree.cast::<FunctionOp>(child))
            .find(|func| func.name(tree) == name)
    }
}

impl FunctionOp {
    /// Creates a function with one inward per argument of `func_type`.
    pub fn build(b: &mut dyn Inserter, name: &str, func_type: Type) -> FunctionOp {
        let op = new_inserted(b, OpKind::Function);
        let arguments = func_type
            .as_function()
            .map(|sig| sig.arguments.clone())
            .unwrap_or_default();
        let tree = b.tree_mut();
        tree.op_mut(op).attributes.push(Attribute::from(name));
        tree.op_mut(op).attributes.push(Attribute::TypeRef(func_type));
        for argument in arguments {
            tree.add_inward(op, argument);
        }
        FunctionOp(op)
    }

    pub fn name(self, tree: &OpTree) -> &str {
        tree.attr(self.0, 0)
            .as_str()
            .unwrap_or_else(|| panic!("Function operation without a name attribute"))
    }

    pub fn func_type(self, tree: &OpTree) -> &FunctionType {
        tree.attr(self.0, 1)
            .as_type()
            .and_then(Type::as_function)
            .unwrap_or_else(|| panic!("Function operation without a function type attribute"))
    }

    pub fn inward(self, tree: &OpTree, index: usize) -> ValueId {
        tree.inward(self.0, index)
    }
}

impl FunctionCallOp {
    pub fn build(
        b: &mut dyn Inserter,
        name: &str,
        result_type: Type,
        arguments: &[ValueId],
    ) -> FunctionCallOp {
        let op = new_inserted(b, OpKind::FunctionCall);
        let tree = b.tree_mut();
        for &argument in arguments {
            tree.add_operand(op, argument);
        }
        tree.add_result(op, result_type);
        tree.op_mut(op).attributes.push(Attribute::from(name));
        FunctionCallOp(op)
    }

    pub fn callee_name(self, tree: &OpTree) -> &str {
        tree.attr(self.0, 0)
            .as_str()
            .unwrap_or_else(|| panic!("FunctionCall operation without a callee name attribute"))
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

impl ReturnOp {
    pub fn build(b: &mut dyn Inserter) -> ReturnOp {
        ReturnOp(new_inserted(b, OpKind::Return))
    }

    pub fn build_value(b: &mut dyn Inserter, value: ValueId) -> ReturnOp {
        let op = new_inserted(b, OpKind::Return);
        b.tree_mut().add_operand(op, value);
        ReturnOp(op)
    }

    pub fn value(self, tree: &OpTree) -> Option<ValueId> {
        tree.op(self.0).operands.first().copied()
    }
}

impl ConstantOp {
    pub fn build(b: &mut dyn Inserter, ty: Type, value: impl Into<Attribute>) -> ConstantOp {
        let op = new_inserted(b, OpKind::Constant);
        let tree = b.tree_mut();
        tree.add_result(op, ty);
        tree.op_mut(op).attributes.push(value.into());
        ConstantOp(op)
    }

    pub fn value(self, tree: &OpTree) -> &Attribute {
        tree.attr(self.0, 0)
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

// ----------------------------------------------------------------------------
// Computation operations
// ----------------------------------------------------------------------------

impl BinaryOp {
    fn init(b: &mut dyn Inserter, kind: OpKind, result_type: Type, lhs: ValueId, rhs: ValueId) -> OpId {
        let op = new_inserted(b, kind);
        let tree = b.tree_mut();
        tree.add_result(op, result_type);
        tree.add_operand(op, lhs);
        tree.add_operand(op, rhs);
        op
    }

    pub fn lhs(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn rhs(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 1)
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

impl ArithBinaryOp {
    pub fn build(
        b: &mut dyn Inserter,
        kind: ArithBinOpKind,
        result_type: Type,
        lhs: ValueId,
        rhs: ValueId,
    ) -> ArithBinaryOp {
        let op = BinaryOp::init(b, OpKind::ArithBinary, result_type, lhs, rhs);
        b.tree_mut().op_mut(op).attributes.push(Attribute::from(kind));
        ArithBinaryOp(op)
    }

    /// Result type inferred from the left operand.
    pub fn build_infer(
        b: &mut dyn Inserter,
        kind: ArithBinOpKind,
        lhs: ValueId,
        rhs: ValueId,
    ) -> ArithBinaryOp {
        let result_type = b.tree().value_type(lhs).clone();
        ArithBinaryOp::build(b, kind, result_type, lhs, rhs)
    }

    pub fn kind(self, tree: &OpTree) -> ArithBinOpKind {
        tree.attr(self.0, 0)
            .as_arith_binary()
            .unwrap_or_else(|| panic!("ArithBinary operation without a kind attribute"))
    }

    pub fn lhs(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn rhs(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 1)
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

impl LogicBinaryOp {
    /// The result is always boolean.
    pub fn build(
        b: &mut dyn Inserter,
        kind: LogicBinOpKind,
        lhs: ValueId,
        rhs: ValueId,
    ) -> LogicBinaryOp {
        let op = BinaryOp::init(b, OpKind::LogicBinary, Type::boolean(), lhs, rhs);
        b.tree_mut().op_mut(op).attributes.push(Attribute::from(kind));
        LogicBinaryOp(op)
    }

    pub fn kind(self, tree: &OpTree) -> LogicBinOpKind {
        tree.attr(self.0, 0)
            .as_logic_binary()
            .unwrap_or_else(|| panic!("LogicBinary operation without a kind attribute"))
    }

    pub fn lhs(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn rhs(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 1)
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

impl UnaryOp {
    fn init(b: &mut dyn Inserter, kind: OpKind, result_type: Type, value: ValueId) -> OpId {
        let op = new_inserted(b, kind);
        let tree = b.tree_mut();
        tree.add_result(op, result_type);
        tree.add_operand(op, value);
        op
    }

    pub fn value(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

impl ArithCastOp {
    pub fn build(
        b: &mut dyn Inserter,
        kind: ArithCastOpKind,
        result_type: Type,
        value: ValueId,
    ) -> ArithCastOp {
        let op = UnaryOp::init(b, OpKind::ArithCast, result_type, value);
        b.tree_mut().op_mut(op).attributes.push(Attribute::from(kind));
        ArithCastOp(op)
    }

    pub fn kind(self, tree: &OpTree) -> ArithCastOpKind {
        tree.attr(self.0, 0)
            .as_arith_cast()
            .unwrap_or_else(|| panic!("ArithCast operation without a kind attribute"))
    }

    pub fn value(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

impl LogicUnaryOp {
    /// Boolean operand, boolean result.
    pub fn build(b: &mut dyn Inserter, kind: LogicUnaryOpKind, value: ValueId) -> LogicUnaryOp {
        let op = UnaryOp::init(b, OpKind::LogicUnary, Type::boolean(), value);
        b.tree_mut().op_mut(op).attributes.push(Attribute::from(kind));
        LogicUnaryOp(op)
    }

    pub fn kind(self, tree: &OpTree) -> LogicUnaryOpKind {
        tree.attr(self.0, 0)
            .as_logic_unary()
            .unwrap_or_else(|| panic!("LogicUnary operation without a kind attribute"))
    }

    pub fn value(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

// ----------------------------------------------------------------------------
// Memory access operations
// ----------------------------------------------------------------------------

impl AllocateOp {
    pub fn build(b: &mut dyn Inserter, pointer_type: Type) -> AllocateOp {
        let op = new_inserted(b, OpKind::Allocate);
        b.tree_mut().add_result(op, pointer_type);
        AllocateOp(op)
    }

    pub fn build_dynamic(b: &mut dyn Inserter, pointer_type: Type, size: ValueId) -> AllocateOp {
        let alloc = AllocateOp::build(b, pointer_type);
        b.tree_mut().add_operand(alloc.0, size);
        alloc
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }

    pub fn dynamic_size(self, tree: &OpTree) -> Option<ValueId> {
        tree.op(self.0).operands.first().copied()
    }
}

impl LoadOp {
    /// Result type inferred from the source pointer's pointee.
    pub fn build(b: &mut dyn Inserter, src: ValueId) -> LoadOp {
        let result_type = b
            .tree()
            .value_type(src)
            .pointee()
            .unwrap_or_else(|| panic!("Load source must have a pointer type"))
            .clone();
        LoadOp::build_typed(b, result_type, src, None)
    }

    pub fn build_typed(
        b: &mut dyn Inserter,
        result_type: Type,
        src: ValueId,
        offset: Option<ValueId>,
    ) -> LoadOp {
        let op = new_inserted(b, OpKind::Load);
        let tree = b.tree_mut();
        tree.add_operand(op, src);
        if let Some(offset) = offset {
            tree.add_operand(op, offset);
        }
        tree.add_result(op, result_type);
        LoadOp(op)
    }

    pub fn src(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn offset(self, tree: &OpTree) -> Option<ValueId> {
        tree.op(self.0).operands.get(1).copied()
    }

    pub fn result(self, tree: &OpTree) -> ValueId {
        tree.result(self.0, 0)
    }
}

impl StoreOp {
    pub fn build(b: &mut dyn Inserter, dst: ValueId, value: ValueId) -> StoreOp {
        StoreOp::build_offset(b, dst, value, None)
    }

    pub fn build_offset(
        b: &mut dyn Inserter,
        dst: ValueId,
        value: ValueId,
        offset: Option<ValueId>,
    ) -> StoreOp {
        let op = new_inserted(b, OpKind::Store);
        let tree = b.tree_mut();
        tree.add_operand(op, dst);
        tree.add_operand(op, value);
        if let Some(offset) = offset {
            tree.add_operand(op, offset);
        }
        StoreOp(op)
    }

    pub fn dst(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn value(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 1)
    }

    pub fn offset(self, tree: &OpTree) -> Option<ValueId> {
        tree.op(self.0).operands.get(2).copied()
    }
}

// ----------------------------------------------------------------------------
// Control flow operations
// ----------------------------------------------------------------------------

impl IfOp {
    /// Creates the `If` with its `Then` child, and an `Else` child when
    /// `with_else` is set.
    pub fn build(b: &mut dyn Inserter, cond: ValueId, with_else: bool) -> IfOp {
        let op = new_inserted(b, OpKind::If);
        let tree = b.tree_mut();
        tree.add_operand(op, cond);
        let then_op = tree.new_op(OpKind::Then);
        tree.add_to_body(op, then_op);
        if with_else {
            let else_op = tree.new_op(OpKind::Else);
            tree.add_to_body(op, else_op);
        }
        IfOp(op)
    }

    pub fn cond(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn then_op(self, tree: &OpTree) -> Option<ThenOp> {
        tree.op(self.0)
            .body
            .first()
            .and_then(|&child| tree.cast::<ThenOp>(child))
    }

    /// The `Else`, present only when the body has exactly two children.
    pub fn else_op(self, tree: &OpTree) -> Option<ElseOp> {
        let body = &tree.op(self.0).body;
        if body.len() == 2 {
            tree.cast::<ElseOp>(body[1])
        } else {
            None
        }
    }
}

impl ThenOp {
    pub fn build(b: &mut dyn Inserter) -> ThenOp {
        ThenOp(new_inserted(b, OpKind::Then))
    }
}

impl ElseOp {
    pub fn build(b: &mut dyn Inserter) -> ElseOp {
        ElseOp(new_inserted(b, OpKind::Else))
    }
}

impl WhileOp {
    /// Creates the `While` with its `Condition` header child.
    pub fn build(b: &mut dyn Inserter) -> WhileOp {
        let op = new_inserted(b, OpKind::While);
        let tree = b.tree_mut();
        let condition = tree.new_op(OpKind::Condition);
        tree.add_to_body(op, condition);
        WhileOp(op)
    }

    pub fn condition_op(self, tree: &OpTree) -> Option<ConditionOp> {
        tree.op(self.0)
            .body
            .first()
            .and_then(|&child| tree.cast::<ConditionOp>(child))
    }
}

impl ConditionOp {
    pub fn build(b: &mut dyn Inserter) -> ConditionOp {
        ConditionOp(new_inserted(b, OpKind::Condition))
    }

    /// The boolean value the loop dispatches on: first result of the last
    /// operation in the condition body.
    pub fn terminator(self, tree: &OpTree) -> Option<ValueId> {
        let &last = tree.op(self.0).body.last()?;
        tree.op(last).results.first().copied()
    }
}

impl ForOp {
    pub fn build(
        b: &mut dyn Inserter,
        iterator_type: Type,
        start: ValueId,
        stop: ValueId,
        step: ValueId,
    ) -> ForOp {
        let op = new_inserted(b, OpKind::For);
        let tree = b.tree_mut();
        tree.add_operand(op, start);
        tree.add_operand(op, stop);
        tree.add_operand(op, step);
        tree.add_inward(op, iterator_type);
        ForOp(op)
    }

    pub fn start(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }

    pub fn stop(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 1)
    }

    pub fn step(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 2)
    }

    pub fn iterator(self, tree: &OpTree) -> ValueId {
        tree.inward(self.0, 0)
    }
}

// ----------------------------------------------------------------------------
// Special operations
// ----------------------------------------------------------------------------

impl InputOp {
    pub fn build(b: &mut dyn Inserter, dst: ValueId) -> InputOp {
        let op = new_inserted(b, OpKind::Input);
        b.tree_mut().add_operand(op, dst);
        InputOp(op)
    }

    pub fn dst(self, tree: &OpTree) -> ValueId {
        tree.operand(self.0, 0)
    }
}

impl PrintOp {
    pub fn build(b: &mut dyn Inserter, values: &[ValueId]) -> PrintOp {
        let op = new_inserted(b, OpKind::Print);
        for &value in values {
            b.tree_mut().add_operand(op, value);
        }
        PrintOp(op)
    }
}
