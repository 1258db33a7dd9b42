//! QTI 3.0 to Moodle XML converter
//!
//! Parses QTI assessment tests into a typed metamodel and renders that
//! metamodel as a Moodle quiz XML document.

pub mod models;
pub mod converters;

#[cfg(feature = "wasm")]
pub mod api;

// Re-export commonly used types
pub use converters::{
    convert_qti_to_moodle, convert_qti_to_moodle_with_resolver, parse, parse_with_resolver, render,
    ConversionError, ItemResolver, RenderResult, RenderSettings,
};
pub use converters::model_to_moodle::{QuestionFailure, RenderError, RenderWarning};
pub use converters::qti_to_model::{ElementPath, ParseError};
pub use models::*;

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

// Entry point of the WASM module
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        return;
    }

    log::info!("QTI to Moodle WASM module initialized");
}
