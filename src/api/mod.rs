//! QTI to Moodle WASM API
//!
//! JavaScript-facing wrappers around the converters, available with the
//! `wasm` feature. Values cross the boundary through serde-wasm-bindgen;
//! errors become `JsValue` strings.
//!
//! # Module Structure
//!
//! - `convert`: parsing and conversion entry points

pub mod convert;

pub use convert::{convert_qti_to_moodle, default_render_settings, parse_qti};
