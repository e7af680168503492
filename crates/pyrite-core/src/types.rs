//! The optree type lattice.
//!
//! Provides the value types of the intermediate representation: `None`,
//! `Bool`, sized integers and floats, strings, pointers, function signatures,
//! and tuples. Types are compared structurally, are immutable, and share
//! their interior through [`Rc`], so cloning a type is cheap.
//!
//! `Bool` is stored as an 8-bit integer (`bit_width() == 8`) and counts as an
//! integer for promotion purposes, but it is a distinct variant: only `Bool`
//! satisfies [`Type::is_bool`], and `Bool != Integer { width: 8 }`.

use std::fmt;
use std::rc::Rc;

/// A value type of the operation tree. Each variant represents a distinct
/// kind of type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// Absence of a value (function without a result).
    None,
    /// Boolean, stored as an 8-bit integer.
    Bool,
    /// Signed integer of the given bit width.
    Integer { width: u32 },
    /// IEEE-754 float of the given bit width.
    Float { width: u32 },
    /// String with the given character width in bits.
    Str { char_width: u32 },
    /// Pointer to a value of the pointee type.
    Pointer(Rc<Type>),
    /// Function signature.
    Function(Rc<FunctionType>),
    /// Ordered heterogeneous aggregate.
    Tuple(Rc<Vec<Type>>),
}

/// Argument and result types of a function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionType {
    pub arguments: Vec<Type>,
    pub result: Type,
}

impl Type {
    /// Canonical `None` type.
    pub fn none() -> Type {
        Type::None
    }

    /// Canonical boolean type.
    pub fn boolean() -> Type {
        Type::Bool
    }

    pub fn integer(width: u32) -> Type {
        Type::Integer { width }
    }

    /// The default 64-bit integer type of the source language.
    pub fn int64() -> Type {
        Type::Integer { width: 64 }
    }

    pub fn float(width: u32) -> Type {
        Type::Float { width }
    }

    /// The default 64-bit float type of the source language.
    pub fn float64() -> Type {
        Type::Float { width: 64 }
    }

    pub fn str(char_width: u32) -> Type {
        Type::Str { char_width }
    }

    /// The default 8-bit-character string type.
    pub fn str8() -> Type {
        Type::Str { char_width: 8 }
    }

    pub fn pointer(pointee: Type) -> Type {
        Type::Pointer(Rc::new(pointee))
    }

    pub fn function(arguments: Vec<Type>, result: Type) -> Type {
        Type::Function(Rc::new(FunctionType { arguments, result }))
    }

    pub fn tuple(members: Vec<Type>) -> Type {
        Type::Tuple(Rc::new(members))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Type::None)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Type::Bool)
    }

    /// `true` for `Integer` and for `Bool` (an 8-bit integer for storage and
    /// promotion purposes).
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Integer { .. } | Type::Bool)
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float { .. })
    }

    /// `true` for the numeric family: integers (including `Bool`) and floats.
    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Type::Str { .. })
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Type::Function(_))
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Type::Tuple(_))
    }

    /// Storage width in bits. Zero for types without a numeric storage width.
    pub fn bit_width(&self) -> u32 {
        match self {
            Type::Bool => 8,
            Type::Integer { width } | Type::Float { width } => *width,
            Type::Pointer(_) => 64,
            _ => 0,
        }
    }

    /// The pointee type, if this is a pointer.
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// The function signature, if this is a function type.
    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(func) => Some(func),
            _ => None,
        }
    }

    /// `true` if `self` is a pointer whose pointee equals `other`.
    pub fn can_point_to(&self, other: &Type) -> bool {
        self.pointee().is_some_and(|inner| inner == other)
    }
}

impl fmt::Display for Type {
    /// Canonical printer used by the operation-tree dump. `Bool` prints as
    /// its integer storage, `int(8)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::None => write!(f, "none"),
            Type::Bool => write!(f, "int(8)"),
            Type::Integer { width } => write!(f, "int({width})"),
            Type::Float { width } => write!(f, "float({width})"),
            Type::Str { char_width } => write!(f, "str({char_width})"),
            Type::Pointer(inner) => write!(f, "ptr({inner})"),
            Type::Function(func) => {
                write!(f, "func((")?;
                for (i, arg) in func.arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ") -> {})", func.result)
            }
            Type::Tuple(members) => {
                write!(f, "tuple(")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{member}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_equality() {
        assert_eq!(Type::int64(), Type::Integer { width: 64 });
        assert_eq!(
            Type::pointer(Type::float64()),
            Type::pointer(Type::float64())
        );
        assert_ne!(Type::integer(32), Type::integer(64));
        assert_ne!(Type::pointer(Type::int64()), Type::pointer(Type::float64()));
    }

    #[test]
    fn bool_is_a_distinct_eight_bit_integer() {
        assert!(Type::boolean().is_bool());
        assert!(Type::boolean().is_integer());
        assert_eq!(Type::boolean().bit_width(), 8);
        assert_ne!(Type::boolean(), Type::integer(8));
        assert!(!Type::integer(8).is_bool());
    }

    #[test]
    fn numeric_family() {
        assert!(Type::int64().is_numeric());
        assert!(Type::float64().is_numeric());
        assert!(Type::boolean().is_numeric());
        assert!(!Type::str8().is_numeric());
        assert!(!Type::pointer(Type::int64()).is_numeric());
    }

    #[test]
    fn printer_atomic_types() {
        assert_eq!(Type::none().to_string(), "none");
        assert_eq!(Type::int64().to_string(), "int(64)");
        assert_eq!(Type::boolean().to_string(), "int(8)");
        assert_eq!(Type::float64().to_string(), "float(64)");
        assert_eq!(Type::str8().to_string(), "str(8)");
    }

    #[test]
    fn printer_composite_types_snapshot() {
        insta::assert_snapshot!(
            Type::function(
                vec![Type::pointer(Type::int64()), Type::boolean()],
                Type::float64()
            )
            .to_string(),
            @"func((ptr(int(64)), int(8)) -> float(64))"
        );
    }

    #[test]
    fn printer_composite_types() {
        assert_eq!(Type::pointer(Type::int64()).to_string(), "ptr(int(64))");
        assert_eq!(
            Type::function(vec![Type::int64(), Type::float64()], Type::none()).to_string(),
            "func((int(64), float(64)) -> none)"
        );
        assert_eq!(Type::function(vec![], Type::int64()).to_string(), "func(() -> int(64))");
        assert_eq!(
            Type::tuple(vec![Type::int64(), Type::boolean()]).to_string(),
            "tuple(int(64), int(8))"
        );
    }

    #[test]
    fn pointer_introspection() {
        let ptr = Type::pointer(Type::float64());
        assert_eq!(ptr.pointee(), Some(&Type::float64()));
        assert!(ptr.can_point_to(&Type::float64()));
        assert!(!ptr.can_point_to(&Type::int64()));
        assert!(Type::int64().pointee().is_none());
    }

    #[test]
    fn function_introspection() {
        let func = Type::function(vec![Type::int64()], Type::boolean());
        let sig = func.as_function().unwrap();
        assert_eq!(sig.arguments, vec![Type::int64()]);
        assert_eq!(sig.result, Type::boolean());
    }
}
