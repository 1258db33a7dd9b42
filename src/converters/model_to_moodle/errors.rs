//! Error types for Moodle rendering

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rendering errors
///
/// `UnsupportedConstruct` is per question: the renderer records it in the
/// failure list and carries on with the remaining questions.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message")]
pub enum RenderError {
    /// The question uses something Moodle (or the current settings) cannot express
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// A fixed template failed to compile or render
    #[error("Template error: {0}")]
    TemplateError(String),
}

impl RenderError {
    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        RenderError::UnsupportedConstruct(message.into())
    }
}

impl From<mustache::Error> for RenderError {
    fn from(err: mustache::Error) -> Self {
        RenderError::TemplateError(err.to_string())
    }
}
