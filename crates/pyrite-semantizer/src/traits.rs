//! Reusable verification rules and their accumulator.
//!
//! Each [`Rule`] checks one structural fact about an operation and pushes a
//! diagnostic on failure. The [`TraitVerifier`] chains rules for one
//! operation and stops evaluating after the first failure, so follow-up
//! rules never fire on an operation that is already known to be malformed.

use indexmap::IndexMap;

use pyrite_core::{ErrorBuffer, FunctionOp, OpId, OpTree, Type};

use crate::error::SemantizerError;

/// Shared state of one verification pass: the error buffer and the function
/// table, filled in traversal order so calls resolve against functions
/// already visited.
#[derive(Debug, Default)]
pub struct SemantizerContext {
    pub errors: ErrorBuffer<SemantizerError>,
    pub functions: IndexMap<String, FunctionOp>,
}

impl SemantizerContext {
    pub fn new() -> SemantizerContext {
        SemantizerContext::default()
    }

    pub fn find_function(&self, name: &str) -> Option<FunctionOp> {
        self.functions.get(name).copied()
    }

    /// Pushes `<op name> operation <message>`.
    pub fn push_op_error(&mut self, tree: &OpTree, op: OpId, message: impl Into<String>) {
        self.errors
            .push(SemantizerError::new(op, tree.op(op).name(), message));
    }
}

/// Attribute discriminator used by [`HasNthAttrOfKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Int,
    Bool,
    Float,
    Str,
    TypeRef,
    /// A type reference holding a function type.
    FunctionTypeRef,
    ArithBinary,
    ArithCast,
    LogicBinary,
    LogicUnary,
}

/// One verifiable structural fact about an operation.
pub trait Rule {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool;
}

pub struct HasOperands(pub usize);

impl Rule for HasOperands {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
        if tree.op(op).operands.len() == self.0 {
            return true;
        }
        ctx.push_op_error(tree, op, format!("must have {} operands", self.0));
        false
    }
}

pub struct HasOperandsOfType(pub usize, pub Type);

impl Rule for HasOperandsOfType {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
        let operands = &tree.op(op).operands;
        if operands.len() == self.0
            && operands.iter().all(|&v| tree.value_has_type(v, &self.1))
        {
            return true;
        }
        ctx.push_op_error(tree, op, format!("must have {} operands of {}", self.0, self.1));
        false
    }
}

pub struct HasResults(pub usize);

impl Rule for HasResults {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
        if tree.op(op).results.len() == self.0 {
            return true;
        }
        ctx.push_op_error(tree, op, format!("must have {} results", self.0));
        false
    }
}

pub struct HasResultOfType(pub Type);

impl Rule for HasResultOfType {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
        let results = &tree.op(op).results;
        if results.len() == 1 && tree.value_has_type(results[0], &self.0) {
            return true;
        }
        ctx.push_op_error(tree, op, format!("must have one result of {}", self.0));
        false
    }
}

pub struct HasInwards(pub usize);

impl Rule for HasInwards {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
        if tree.op(op).inwards.len() == self.0 {
            return true;
        }
        ctx.push_op_error(tree, op, format!("must have {} inwards", self.0));
        false
    }
}

pub struct HasInwardsOfType(pub usize, pub Type);

impl Rule for HasInwardsOfType {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
        let inwards = &tree.op(op).inwards;
        if inwards.len() == self.0 && inwards.iter().all(|&v| tree.value_has_type(v, &self.1)) {
            return true;
        }
        ctx.push_op_error(tree, op, format!("must have {} inwards of {}", self.0, self.1));
        false
    }
}

pub struct HasAttributes(pub usize);

impl Rule for HasAttributes {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
        if tree.op(op).attributes.len() == self.0 {
            return true;
        }
        ctx.push_op_error(tree, op, format!("must have {} attributes", self.0));
        false
    }
}

pub struct HasNthAttrOfKind(pub usize, pub AttrKind);

impl Rule for HasNthAttrOfKind {
    fn check(&self, tree: &OpTree, op: OpId, ctx: &mut SemantizerContext) -> bool {
        use pyrite_core::Attribute;
        let matched = match tree.op(op).attributes.get(self.0) {
            Some(attr) => match self.1 {
                AttrKind::Int => matches!(attr, Attribute::Int(_)),
                AttrKind::Bool => matches!(attr, Attribute::Bool(_)),
                AttrKind::Float => matches!(attr, Attribute::Float(_)),
                AttrKind::Str => matches!(attr, Attribute::Str(_)),
                AttrKind::TypeRef => matches!(attr, Attribute::TypeRef(_)),
                AttrKind::FunctionTypeRef => {
                    attr.as_type().is_some_and(Type::is_function)
                }
                AttrKind::ArithBinary => matches!(attr, Attribute::ArithBinary(_)),
                AttrKind::ArithCast => matches!(attr, Attribute::ArithCast(_)),
                AttrKind::LogicBinary => matches!(attr, Attribute::LogicBinary(_)),
                AttrKind::LogicUnary => matches!(attr, Attribute::LogicUnary(_)),
            },
            None => false,
        };
        if matched {
            return true;
        }
        ctx.push_op_error(tree, op, format!("must have attribute #{} of other type", self.0));
        false
    }
}

/// Accumulates rule outcomes for one operation; after the first failure
/// further rules are skipped.
pub struct TraitVerifier<'t> {
    tree: &'t OpTree,
    op: OpId,
    acc: bool,
}

impl<'t> TraitVerifier<'t> {
    pub fn new(tree: &'t OpTree, op: OpId) -> TraitVerifier<'t> {
        TraitVerifier { tree, op, acc: true }
    }

    pub fn verify(&mut self, rule: impl Rule, ctx: &mut SemantizerContext) -> &mut Self {
        if self.acc {
            self.acc &= rule.check(self.tree, self.op, ctx);
        }
        self
    }

    pub fn ok(&self) -> bool {
        self.acc
    }
}
