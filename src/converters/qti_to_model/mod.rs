//! QTI 3.0 to metamodel parser
//!
//! Reads a `qti-assessment-test` document and builds a validated
//! [`TestDefinition`](crate::models::TestDefinition).
//!
//! # Overview
//!
//! Parsing runs in three stages:
//! 1. **Prepare**: strip a BOM and DOCTYPE, parse with roxmltree
//! 2. **Build**: top-down structural walk into the metamodel
//! 3. **Validate**: identifier uniqueness and reference checks on the finished tree
//!
//! Every error is fatal for the document and carries the path of the
//! offending element.
//!
//! # Basic Usage
//!
//! ```ignore
//! use qti_moodle::converters::qti_to_model::parse;
//!
//! let test = parse(qti_xml)?;
//! for question in test.questions() {
//!     println!("{}: {}", question.identifier, question.title);
//! }
//! ```

pub mod errors;
pub mod parser;
pub mod builder;
pub mod body;
pub mod validate;
pub mod resolver;

pub use errors::{ElementPath, ParseError};
pub use resolver::ItemResolver;

use crate::models::TestDefinition;
use builder::{build_test_definition, BuildContext};

/// Parse a QTI assessment test.
///
/// Item references (`qti-assessment-item-ref`) cannot be resolved here and
/// are reported as schema violations; use [`parse_with_resolver`] for tests
/// that reference external items.
pub fn parse(xml: &str) -> Result<TestDefinition, ParseError> {
    parse_document(xml, None)
}

/// Parse a QTI assessment test, loading referenced items through `resolver`
pub fn parse_with_resolver(
    xml: &str,
    resolver: &dyn ItemResolver,
) -> Result<TestDefinition, ParseError> {
    parse_document(xml, Some(resolver))
}

fn parse_document(
    xml: &str,
    resolver: Option<&dyn ItemResolver>,
) -> Result<TestDefinition, ParseError> {
    let prepared = parser::prepare_input(xml);
    let doc = parser::parse_xml(&prepared)?;

    let ctx = BuildContext::new(resolver);
    let test = build_test_definition(doc.root_element(), &ctx)?;
    validate::validate_test(&test)?;

    log::info!(
        "Parsed QTI test '{}': {} part(s), {} question(s)",
        test.identifier,
        test.parts.len(),
        test.questions().len()
    );
    Ok(test)
}
