//! Assessment metamodel
//!
//! Typed, owned representation of a QTI assessment. The tree is built by
//! `converters::qti_to_model` and read by `converters::model_to_moodle`;
//! neither side keeps back-references into it.
//!
//! ```text
//! TestDefinition
//!   └─ TestPart (navigation / submission mode)
//!       └─ TestSection (visibility)
//!           ├─ TestSection ...
//!           └─ Question
//!               ├─ QuestionBody (content blocks)
//!               ├─ ResponseDeclaration*
//!               ├─ OutcomeDeclaration*
//!               └─ ModalFeedback*
//! ```

pub mod assessment;
pub mod question;
pub mod response;
pub mod feedback;

// Re-export commonly used types
pub use assessment::*;
pub use question::*;
pub use response::*;
pub use feedback::*;
