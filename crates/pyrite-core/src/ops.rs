//! Operation vocabulary of the tree.
//!
//! [`OpKind`] is the spec id of an operation: a sealed tag that identifies
//! which adaptor a generic operation belongs to. The four operator-kind
//! enums are attribute payloads carried by the computational operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Spec id: the concrete kind of a generic operation.
///
/// One variant per operation in the catalogue. Adaptors check these tags
/// (transitively for abstract groups such as binary operations) to provide
/// typed views over a generic operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpKind {
    Module,
    Function,
    FunctionCall,
    Return,
    Constant,
    ArithBinary,
    LogicBinary,
    ArithCast,
    LogicUnary,
    Allocate,
    Load,
    Store,
    If,
    Then,
    Else,
    While,
    Condition,
    For,
    Input,
    Print,
}

impl OpKind {
    /// Stable operation name used by the textual dump.
    pub fn name(self) -> &'static str {
        match self {
            OpKind::Module => "Module",
            OpKind::Function => "Function",
            OpKind::FunctionCall => "FunctionCall",
            OpKind::Return => "Return",
            OpKind::Constant => "Constant",
            OpKind::ArithBinary => "ArithBinary",
            OpKind::LogicBinary => "LogicBinary",
            OpKind::ArithCast => "ArithCast",
            OpKind::LogicUnary => "LogicUnary",
            OpKind::Allocate => "Allocate",
            OpKind::Load => "Load",
            OpKind::Store => "Store",
            OpKind::If => "If",
            OpKind::Then => "Then",
            OpKind::Else => "Else",
            OpKind::While => "While",
            OpKind::Condition => "Condition",
            OpKind::For => "For",
            OpKind::Input => "Input",
            OpKind::Print => "Print",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary arithmetic operator kinds, split by operand family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArithBinOpKind {
    AddI,
    SubI,
    MulI,
    DivI,
    AddF,
    SubF,
    MulF,
    DivF,
}

impl ArithBinOpKind {
    /// Addition and multiplication commute; subtraction and division do not.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            ArithBinOpKind::AddI | ArithBinOpKind::AddF | ArithBinOpKind::MulI | ArithBinOpKind::MulF
        )
    }
}

/// Numeric cast kinds: family conversions and width changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArithCastOpKind {
    IntToFloat,
    FloatToInt,
    ExtI,
    TruncI,
    ExtF,
    TruncF,
}

/// Binary logic and comparison operator kinds.
///
/// Equality kinds apply to either numeric family; the ordered comparisons
/// carry the family in the kind the way the arithmetic kinds do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogicBinOpKind {
    Equal,
    NotEqual,
    AndI,
    OrI,
    LessI,
    GreaterI,
    LessEqualI,
    GreaterEqualI,
    LessF,
    GreaterF,
    LessEqualF,
    GreaterEqualF,
}

impl LogicBinOpKind {
    /// Equality, conjunction and disjunction commute; the ordered
    /// comparisons do not.
    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            LogicBinOpKind::Equal | LogicBinOpKind::NotEqual | LogicBinOpKind::AndI | LogicBinOpKind::OrI
        )
    }
}

/// Unary logic operator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicUnaryOpKind {
    Not,
}

impl fmt::Display for ArithBinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for ArithCastOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for LogicBinOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl fmt::Display for LogicUnaryOpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
