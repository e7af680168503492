//! Syntax-tree shape consumed by the converter.
//!
//! A [`SyntaxTree`] is a rooted n-ary tree of [`Node`]s with a kind tag, an
//! optional payload, and a source reference. The lexer and parser live
//! outside this workspace; trees arrive already built, usually as JSON
//! (every type here derives serde traits).

use serde::{Deserialize, Serialize};

use pyrite_core::{SourceRef, Type};

/// Node kinds of the surface syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    ProgramRoot,
    FunctionDefinition,
    FunctionName,
    FunctionArguments,
    FunctionArgument,
    FunctionReturnType,
    BranchRoot,
    VariableDeclaration,
    TypeName,
    VariableName,
    Expression,
    IfStatement,
    ElifStatement,
    ElseStatement,
    WhileStatement,
    BinaryOperation,
    UnaryOperation,
    FunctionCall,
    ReturnStatement,
    IntegerLiteralValue,
    FloatingPointLiteralValue,
    BooleanLiteralValue,
    StringLiteralValue,
    TypeConversion,
}

/// Named types of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeName {
    Int,
    Float,
    Bool,
    Str,
    None,
}

impl TypeName {
    /// The optree type this source type lowers to.
    pub fn to_type(self) -> Type {
        match self {
            TypeName::Int => Type::int64(),
            TypeName::Float => Type::float64(),
            TypeName::Bool => Type::boolean(),
            TypeName::Str => Type::str8(),
            TypeName::None => Type::none(),
        }
    }
}

/// Binary operators of the source language. Family selection (integer vs
/// float flavor) happens during lowering, from the promoted operand types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOpKind {
    Add,
    Sub,
    Mult,
    Div,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Assign,
}

impl BinaryOpKind {
    pub fn is_assignment(self) -> bool {
        matches!(self, BinaryOpKind::Assign)
    }
}

/// Unary operators of the source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOpKind {
    Not,
}

/// Payload attached to a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Payload {
    #[default]
    None,
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    TypeName(TypeName),
    BinaryOp(BinaryOpKind),
    UnaryOp(UnaryOpKind),
}

/// One node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub source_ref: SourceRef,
}

impl Node {
    pub fn new(kind: NodeKind) -> Node {
        Node {
            kind,
            payload: Payload::None,
            children: Vec::new(),
            source_ref: SourceRef::default(),
        }
    }

    pub fn with_payload(kind: NodeKind, payload: Payload) -> Node {
        Node {
            kind,
            payload,
            children: Vec::new(),
            source_ref: SourceRef::default(),
        }
    }

    /// Builder-style child append.
    pub fn add(mut self, child: Node) -> Node {
        self.children.push(child);
        self
    }

    pub fn str(&self) -> Option<&str> {
        match &self.payload {
            Payload::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn int_num(&self) -> Option<i64> {
        match self.payload {
            Payload::Int(value) => Some(value),
            _ => None,
        }
    }

    pub fn fp_num(&self) -> Option<f64> {
        match self.payload {
            Payload::Float(value) => Some(value),
            _ => None,
        }
    }

    pub fn boolean(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn type_name(&self) -> Option<TypeName> {
        match self.payload {
            Payload::TypeName(value) => Some(value),
            _ => None,
        }
    }

    pub fn bin_op(&self) -> Option<BinaryOpKind> {
        match self.payload {
            Payload::BinaryOp(value) => Some(value),
            _ => None,
        }
    }

    pub fn first_child(&self) -> Option<&Node> {
        self.children.first()
    }

    pub fn last_child(&self) -> Option<&Node> {
        self.children.last()
    }
}

/// A rooted syntax tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntaxTree {
    pub root: Node,
}

impl SyntaxTree {
    pub fn new(root: Node) -> SyntaxTree {
        SyntaxTree { root }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_accessors() {
        let node = Node::with_payload(NodeKind::IntegerLiteralValue, Payload::Int(42));
        assert_eq!(node.int_num(), Some(42));
        assert_eq!(node.fp_num(), None);
        assert_eq!(node.str(), None);

        let name = Node::with_payload(NodeKind::VariableName, Payload::Str("x".into()));
        assert_eq!(name.str(), Some("x"));
    }

    #[test]
    fn type_names_lower_to_core_types() {
        assert_eq!(TypeName::Int.to_type(), Type::int64());
        assert_eq!(TypeName::Float.to_type(), Type::float64());
        assert_eq!(TypeName::Bool.to_type(), Type::boolean());
        assert_eq!(TypeName::Str.to_type(), Type::str8());
        assert_eq!(TypeName::None.to_type(), Type::none());
    }

    #[test]
    fn serde_roundtrip_tree() {
        let tree = SyntaxTree::new(
            Node::new(NodeKind::ProgramRoot).add(
                Node::new(NodeKind::FunctionDefinition)
                    .add(Node::with_payload(
                        NodeKind::FunctionName,
                        Payload::Str("main".into()),
                    ))
                    .add(Node::new(NodeKind::FunctionArguments))
                    .add(Node::with_payload(
                        NodeKind::FunctionReturnType,
                        Payload::TypeName(TypeName::None),
                    ))
                    .add(Node::new(NodeKind::BranchRoot)),
            ),
        );
        let json = serde_json::to_string(&tree).unwrap();
        let back: SyntaxTree = serde_json::from_str(&json).unwrap();
        assert_eq!(tree, back);
    }

    #[test]
    fn missing_fields_default_on_deserialize() {
        let json = r#"{"root":{"kind":"ProgramRoot"}}"#;
        let tree: SyntaxTree = serde_json::from_str(json).unwrap();
        assert_eq!(tree.root.kind, NodeKind::ProgramRoot);
        assert!(tree.root.children.is_empty());
        assert_eq!(tree.root.payload, Payload::None);
    }
}
