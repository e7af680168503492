//! Converter diagnostics.

use pyrite_core::SourceRef;
use thiserror::Error;

/// A single lowering error with its source position.
#[derive(Debug, Clone, Error)]
#[error("{source_ref}: {message}")]
pub struct ConverterError {
    pub source_ref: SourceRef,
    pub message: String,
}

impl ConverterError {
    pub fn new(source_ref: SourceRef, message: impl Into<String>) -> ConverterError {
        ConverterError {
            source_ref,
            message: message.into(),
        }
    }
}
