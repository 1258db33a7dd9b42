//! Conversion operations for the WASM API

use wasm_bindgen::prelude::*;

use crate::converters::{self, RenderSettings};

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    log::error!("{}: {}", context, err);
    JsValue::from_str(&format!("{}: {}", context, err))
}

/// Parse a QTI assessment test into its metamodel (plain JS object)
#[wasm_bindgen(js_name = parseQti)]
pub fn parse_qti(qti_xml: &str) -> Result<JsValue, JsValue> {
    log::info!("parseQti called ({} bytes)", qti_xml.len());

    let test = converters::parse(qti_xml).map_err(|e| js_error("QTI parse error", e))?;

    serde_wasm_bindgen::to_value(&test).map_err(|e| js_error("Serialization error", e))
}

/// Convert a QTI assessment test to Moodle quiz XML
///
/// # Parameters
/// - `qti_xml`: QTI 3.0 document
/// - `settings`: render settings object, or `undefined` for defaults
///
/// # Returns
/// `{ moodle_xml, warnings, failures, rendered_questions }`
#[wasm_bindgen(js_name = convertQtiToMoodle)]
pub fn convert_qti_to_moodle(qti_xml: &str, settings: JsValue) -> Result<JsValue, JsValue> {
    log::info!("convertQtiToMoodle called ({} bytes)", qti_xml.len());

    let settings: Option<RenderSettings> = if settings.is_undefined() || settings.is_null() {
        None
    } else {
        Some(
            serde_wasm_bindgen::from_value(settings)
                .map_err(|e| js_error("Invalid render settings", e))?,
        )
    };

    let result = converters::convert_qti_to_moodle(qti_xml, settings)
        .map_err(|e| js_error("Conversion error", e))?;

    log::info!(
        "convertQtiToMoodle completed: {} question(s), {} failure(s)",
        result.rendered_questions,
        result.failures.len()
    );

    serde_wasm_bindgen::to_value(&result).map_err(|e| js_error("Serialization error", e))
}

/// Default render settings, for UIs that edit them
#[wasm_bindgen(js_name = defaultRenderSettings)]
pub fn default_render_settings() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&RenderSettings::default())
        .map_err(|e| js_error("Serialization error", e))
}
