//! Decoder object exposed to JavaScript.

use notify_core::{decode_notify_value, decode_notify_with_network, Network, NotifyError};
use wasm_bindgen::prelude::*;

use crate::view::NotifyView;

/// Decodes mining.notify messages for one network.
#[wasm_bindgen]
pub struct NotifyDecoder {
    /// Network used to render payout addresses.
    network: Network,
}

#[wasm_bindgen]
impl NotifyDecoder {
    /// Create a decoder.
    ///
    /// # Arguments
    /// * `network` - The network ("mainnet" or "testnet4")
    #[wasm_bindgen(constructor)]
    pub fn new(network: &str) -> Result<NotifyDecoder, JsValue> {
        let net = Network::parse(network)
            .ok_or_else(|| JsValue::from_str(&format!("Invalid network: {}", network)))?;
        Ok(NotifyDecoder::for_network(net))
    }

    /// Decode mining.notify JSON text.
    ///
    /// Returns the decoded job as a plain object, or throws an `Error`
    /// carrying the failure message.
    #[wasm_bindgen]
    pub fn decode(&self, input: &str) -> Result<JsValue, JsValue> {
        self.decode_view(input).map_err(to_js_error)?.to_js()
    }

    /// Decode a mining.notify message that is already a JS object or array.
    #[wasm_bindgen(js_name = decodeValue)]
    pub fn decode_value(&self, message: JsValue) -> Result<JsValue, JsValue> {
        let value: serde_json::Value = serde_wasm_bindgen::from_value(message)
            .map_err(|e| to_js_error(NotifyError::InvalidFormat(e.to_string())))?;
        let result = decode_notify_value(value, self.network).map_err(to_js_error)?;
        NotifyView::from(&result).to_js()
    }

    /// Get the current network.
    #[wasm_bindgen(getter)]
    pub fn network(&self) -> String {
        self.network.name().to_string()
    }
}

impl NotifyDecoder {
    /// Create a decoder for a known network.
    pub fn for_network(network: Network) -> Self {
        NotifyDecoder { network }
    }

    /// Decode to a view without crossing into JavaScript.
    pub fn decode_view(&self, input: &str) -> Result<NotifyView, NotifyError> {
        let result = decode_notify_with_network(input, self.network)?;
        Ok(NotifyView::from(&result))
    }
}

impl Default for NotifyDecoder {
    fn default() -> Self {
        NotifyDecoder::for_network(Network::default())
    }
}

fn to_js_error(err: NotifyError) -> JsValue {
    let message = err.to_string();
    console_log(&format!("mining.notify decode failed: {}", message));
    js_sys::Error::new(&message).into()
}

/// Log to the browser console.
#[wasm_bindgen]
pub fn console_log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}
