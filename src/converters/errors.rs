//! Error types for the full QTI to Moodle conversion
//!
//! Wraps the stage errors: a fatal parse error, or a document-level render
//! failure that indicates a bug in the fixed templates.

use thiserror::Error;

use super::model_to_moodle::RenderError;
use super::qti_to_model::ParseError;

/// Top-level conversion error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Fatal QTI parsing error
    #[error("QTI parsing failed: {0}")]
    ParseError(#[from] ParseError),

    /// Document-level rendering failure (should not occur in normal operation)
    #[error("Moodle rendering failed: {0}")]
    RenderError(#[from] RenderError),
}
