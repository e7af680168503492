//! Semantizer diagnostics.

use pyrite_core::OpId;
use thiserror::Error;

/// A single well-formedness violation, tied to the offending operation.
#[derive(Debug, Clone, Error)]
#[error("{op_name} operation {message}")]
pub struct SemantizerError {
    /// Handle of the offending operation.
    pub op: OpId,
    /// Stable name of the offending operation.
    pub op_name: &'static str,
    /// Human-readable description of the violated rule.
    pub message: String,
}

impl SemantizerError {
    pub fn new(op: OpId, op_name: &'static str, message: impl Into<String>) -> SemantizerError {
        SemantizerError {
            op,
            op_name,
            message: message.into(),
        }
    }
}
