//! Format converters
//!
//! Two independent stages joined only by the metamodel:
//! - `qti_to_model`: QTI 3.0 XML → [`TestDefinition`](crate::models::TestDefinition)
//! - `model_to_moodle`: metamodel → Moodle quiz XML

pub mod errors;
pub mod qti_to_model;
pub mod model_to_moodle;

// Re-export for convenience
pub use errors::ConversionError;
pub use model_to_moodle::{render, RenderResult, RenderSettings};
pub use qti_to_model::{parse, parse_with_resolver, ItemResolver};

/// Convert a QTI assessment test to Moodle quiz XML.
///
/// # Arguments
///
/// * `qti_xml` - QTI 3.0 `qti-assessment-test` document
/// * `settings` - Optional render settings (uses defaults if None)
///
/// # Returns
///
/// * `Ok(RenderResult)` - Moodle XML plus per-question failures and warnings
/// * `Err(ConversionError)` - the document could not be parsed
pub fn convert_qti_to_moodle(
    qti_xml: &str,
    settings: Option<RenderSettings>,
) -> Result<RenderResult, ConversionError> {
    let settings = settings.unwrap_or_default();
    let test = parse(qti_xml)?;
    Ok(render(&test, &settings)?)
}

/// Like [`convert_qti_to_moodle`], loading referenced items through `resolver`
pub fn convert_qti_to_moodle_with_resolver(
    qti_xml: &str,
    resolver: &dyn ItemResolver,
    settings: Option<RenderSettings>,
) -> Result<RenderResult, ConversionError> {
    let settings = settings.unwrap_or_default();
    let test = parse_with_resolver(qti_xml, resolver)?;
    Ok(render(&test, &settings)?)
}
