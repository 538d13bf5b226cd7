//! Serializable views of decode results for the JavaScript side.

use notify_core::{printable_ascii, NotifyResult, TxOutput};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// One coinbase output, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputView {
    /// Value in satoshis.
    pub value_satoshis: u64,
    /// Value in BTC.
    pub value_btc: f64,
    /// Script type name (P2PKH, OP_RETURN, ...).
    pub script_type: String,
    /// Address, or a label when the script has none.
    pub address: String,
    /// Whether `address` is a real address that can be linked.
    pub payable: bool,
    /// Raw scriptPubKey hex.
    pub script_pubkey: String,
}

impl From<&TxOutput> for OutputView {
    fn from(output: &TxOutput) -> Self {
        OutputView {
            value_satoshis: output.value_satoshis,
            value_btc: output.value_btc(),
            script_type: output.script_type.name().to_string(),
            address: output.display_address().to_string(),
            payable: output.script_type.is_payable(),
            script_pubkey: hex::encode(&output.script_pubkey),
        }
    }
}

/// A decoded mining.notify, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotifyView {
    pub job_id: String,
    /// Block height (None if it could not be extracted).
    pub height: Option<u64>,
    /// Previous block hash (display format).
    pub prevhash: String,
    /// Coinbase scriptSig hex.
    pub script_sig: Option<String>,
    /// Coinbase scriptSig with non-printable bytes shown as `.`.
    pub script_sig_ascii: Option<String>,
    pub version: String,
    pub nbits: String,
    /// Difficulty as a number.
    pub difficulty: Option<f64>,
    /// Formatted difficulty string.
    pub difficulty_display: Option<String>,
    pub ntime: String,
    /// ntime as a UTC date.
    pub ntime_utc: Option<String>,
    pub clean_jobs: bool,
    pub outputs: Vec<OutputView>,
    /// Sum of output values in satoshis.
    pub total_value_satoshis: u64,
}

impl From<&NotifyResult> for NotifyView {
    fn from(result: &NotifyResult) -> Self {
        NotifyView {
            job_id: result.job_id.clone(),
            height: result.height,
            prevhash: result.prevhash.clone(),
            script_sig: result.extra_script_sig.as_deref().map(hex::encode),
            script_sig_ascii: result.extra_script_sig.as_deref().map(printable_ascii),
            version: result.version.clone(),
            nbits: result.nbits.clone(),
            difficulty: result.difficulty,
            difficulty_display: result.difficulty_display(),
            ntime: result.ntime.clone(),
            ntime_utc: result.ntime_utc.clone(),
            clean_jobs: result.clean_jobs,
            outputs: result.outputs.iter().map(OutputView::from).collect(),
            total_value_satoshis: result.total_output_value(),
        }
    }
}

impl NotifyView {
    /// Convert to JS value.
    pub fn to_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {:?}", e)))
    }

    /// Convert to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
