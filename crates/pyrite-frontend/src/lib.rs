pub mod ast;
pub mod converter;
pub mod error;
pub mod language;

// Re-export commonly used types
pub use ast::{BinaryOpKind, Node, NodeKind, Payload, SyntaxTree, TypeName, UnaryOpKind};
pub use converter::Converter;
pub use error::ConverterError;
