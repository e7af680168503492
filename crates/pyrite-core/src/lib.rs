pub mod adaptors;
pub mod attribute;
pub mod builder;
pub mod declarative;
pub mod diagnostics;
pub mod helpers;
pub mod operation;
pub mod ops;
pub mod printer;
pub mod program;
pub mod types;
pub mod value;

// Re-export commonly used types
pub use adaptors::{
    AllocateOp, ArithBinaryOp, ArithCastOp, BinaryOp, ConditionOp, ConstantOp, ElseOp, ForOp,
    FunctionCallOp, FunctionOp, IfOp, InputOp, LoadOp, LogicBinaryOp, LogicUnaryOp, ModuleOp,
    OpAdaptor, PrintOp, ReturnOp, StoreOp, ThenOp, UnaryOp, WhileOp,
};
pub use attribute::Attribute;
pub use builder::{Builder, InsertPoint, Inserter};
pub use declarative::{DeclarativeModule, ValueKey};
pub use diagnostics::{ErrorBuffer, SourceRef};
pub use helpers::{deduce_target_cast_type, insert_numeric_cast, similar};
pub use operation::{OpId, OpTree, Operation};
pub use ops::{ArithBinOpKind, ArithCastOpKind, LogicBinOpKind, LogicUnaryOpKind, OpKind};
pub use program::Program;
pub use types::{FunctionType, Type};
pub use value::{Use, Value, ValueId, ValueOrigin};
