//! Error types for QTI parsing
//!
//! Every parse error is fatal for the whole document. Structural errors carry
//! the path of the offending element so the orchestration layer can point at
//! it.

use std::fmt;
use thiserror::Error;

/// Path of an element in the QTI document, e.g.
/// `qti-assessment-test[T1]/qti-test-part[P1]/qti-assessment-item[Q1]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementPath {
    segments: Vec<String>,
}

impl ElementPath {
    pub fn root(tag: &str, identifier: Option<&str>) -> Self {
        Self::default().child(tag, identifier)
    }

    /// Extend the path with one element
    pub fn child(&self, tag: &str, identifier: Option<&str>) -> Self {
        let segment = match identifier {
            Some(id) if !id.is_empty() => format!("{}[{}]", tag, id),
            _ => tag.to_string(),
        };
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "/");
        }
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Fatal QTI parsing errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Input is not well-formed XML
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Well-formed, but structurally invalid
    #[error("Schema violation at {path}: {message}")]
    SchemaViolation { path: ElementPath, message: String },

    /// A reference to an identifier that is not (uniquely) declared
    #[error("Referential integrity error at {path}: {message}")]
    ReferentialIntegrityError {
        path: ElementPath,
        identifier: String,
        message: String,
    },
}

impl ParseError {
    pub fn schema<S: Into<String>>(path: &ElementPath, message: S) -> Self {
        ParseError::SchemaViolation {
            path: path.clone(),
            message: message.into(),
        }
    }

    pub fn dangling<S: Into<String>>(path: &ElementPath, identifier: &str, message: S) -> Self {
        ParseError::ReferentialIntegrityError {
            path: path.clone(),
            identifier: identifier.to_string(),
            message: message.into(),
        }
    }

    /// Element path of the error (empty for malformed documents)
    pub fn path(&self) -> Option<&ElementPath> {
        match self {
            ParseError::MalformedDocument(_) => None,
            ParseError::SchemaViolation { path, .. }
            | ParseError::ReferentialIntegrityError { path, .. } => Some(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = ElementPath::root("qti-assessment-test", Some("T1"))
            .child("qti-test-part", Some("P1"))
            .child("qti-item-body", None);
        assert_eq!(
            path.to_string(),
            "qti-assessment-test[T1]/qti-test-part[P1]/qti-item-body"
        );
        assert_eq!(ElementPath::default().to_string(), "/");
    }

    #[test]
    fn test_error_messages_name_the_path() {
        let path = ElementPath::root("qti-assessment-test", Some("T1"));
        let err = ParseError::schema(&path, "missing required attribute 'title'");
        assert_eq!(
            err.to_string(),
            "Schema violation at qti-assessment-test[T1]: missing required attribute 'title'"
        );
        assert_eq!(err.path(), Some(&path));
        assert!(ParseError::MalformedDocument("eof".into()).path().is_none());
    }
}
