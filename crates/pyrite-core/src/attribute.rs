//! Attribute payloads attached to operations.
//!
//! An [`Attribute`] is a by-value tagged union over the native payload
//! types: 64-bit signed integers, booleans, 64-bit floats, strings, type
//! references, and the four operator-kind enums. Attributes compare by
//! exact variant and payload; a type reference compares by the structural
//! equality of the referenced type.

use std::cmp::Ordering;
use std::fmt;

use crate::ops::{ArithBinOpKind, ArithCastOpKind, LogicBinOpKind, LogicUnaryOpKind};
use crate::types::Type;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Empty,
    Int(i64),
    Bool(bool),
    Float(f64),
    Str(String),
    TypeRef(Type),
    ArithBinary(ArithBinOpKind),
    ArithCast(ArithCastOpKind),
    LogicBinary(LogicBinOpKind),
    LogicUnary(LogicUnaryOpKind),
}

impl Attribute {
    pub fn is_empty(&self) -> bool {
        matches!(self, Attribute::Empty)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Attribute::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Attribute::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Attribute::Float(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attribute::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Attribute::TypeRef(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn as_arith_binary(&self) -> Option<ArithBinOpKind> {
        match self {
            Attribute::ArithBinary(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_arith_cast(&self) -> Option<ArithCastOpKind> {
        match self {
            Attribute::ArithCast(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_logic_binary(&self) -> Option<LogicBinOpKind> {
        match self {
            Attribute::LogicBinary(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn as_logic_unary(&self) -> Option<LogicUnaryOpKind> {
        match self {
            Attribute::LogicUnary(kind) => Some(*kind),
            _ => None,
        }
    }

    /// `true` when the payload is a numeric or boolean constant that counts
    /// as "truthy" (non-zero, `true`).
    pub fn is_truthy(&self) -> Option<bool> {
        match self {
            Attribute::Bool(value) => Some(*value),
            Attribute::Int(value) => Some(*value != 0),
            Attribute::Float(value) => Some(*value != 0.0),
            _ => None,
        }
    }

    /// Payload ordering for same-variant attributes, used by commutative
    /// operand normalization. Mixed variants are unordered.
    pub fn payload_cmp(&self, other: &Attribute) -> Option<Ordering> {
        match (self, other) {
            (Attribute::Int(a), Attribute::Int(b)) => Some(a.cmp(b)),
            (Attribute::Bool(a), Attribute::Bool(b)) => Some(a.cmp(b)),
            (Attribute::Float(a), Attribute::Float(b)) => a.partial_cmp(b),
            (Attribute::Str(a), Attribute::Str(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Int(value)
    }
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Attribute::Bool(value)
    }
}

impl From<f64> for Attribute {
    fn from(value: f64) -> Self {
        Attribute::Float(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::Str(value.to_owned())
    }
}

impl From<String> for Attribute {
    fn from(value: String) -> Self {
        Attribute::Str(value)
    }
}

impl From<Type> for Attribute {
    fn from(ty: Type) -> Self {
        Attribute::TypeRef(ty)
    }
}

impl From<ArithBinOpKind> for Attribute {
    fn from(kind: ArithBinOpKind) -> Self {
        Attribute::ArithBinary(kind)
    }
}

impl From<ArithCastOpKind> for Attribute {
    fn from(kind: ArithCastOpKind) -> Self {
        Attribute::ArithCast(kind)
    }
}

impl From<LogicBinOpKind> for Attribute {
    fn from(kind: LogicBinOpKind) -> Self {
        Attribute::LogicBinary(kind)
    }
}

impl From<LogicUnaryOpKind> for Attribute {
    fn from(kind: LogicUnaryOpKind) -> Self {
        Attribute::LogicUnary(kind)
    }
}

impl fmt::Display for Attribute {
    /// Dump form: `<kind> : <value>`, or `empty`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Empty => write!(f, "empty"),
            Attribute::Int(value) => write!(f, "int : {value}"),
            Attribute::Bool(value) => write!(f, "bool : {value}"),
            Attribute::Float(value) => write!(f, "float : {value}"),
            Attribute::Str(value) => write!(f, "str : {value}"),
            Attribute::TypeRef(ty) => write!(f, "type : {ty}"),
            Attribute::ArithBinary(kind) => write!(f, "arith-binary : {kind}"),
            Attribute::ArithCast(kind) => write!(f, "arith-cast : {kind}"),
            Attribute::LogicBinary(kind) => write!(f, "logic-binary : {kind}"),
            Attribute::LogicUnary(kind) => write!(f, "logic-unary : {kind}"),
        }
    }
}
