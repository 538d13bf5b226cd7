//! WebAssembly bindings for the mining.notify decoder.
//!
//! This crate provides JavaScript-accessible APIs for:
//! - Decoding mining.notify JSON text or objects
//! - Display-ready views of the job and its coinbase outputs

use wasm_bindgen::prelude::*;

pub mod decoder;
pub mod view;

// Re-export main types for JS access
pub use decoder::NotifyDecoder;
pub use view::{NotifyView, OutputView};

/// Initialize the WASM module with better panic messages.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Decode mining.notify JSON text with mainnet addresses.
#[wasm_bindgen(js_name = decodeNotify)]
pub fn decode_notify(input: &str) -> Result<JsValue, JsValue> {
    NotifyDecoder::default().decode(input)
}
