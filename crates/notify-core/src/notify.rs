//! Decoding of stratum `mining.notify` messages.
//!
//! The message is either a full JSON-RPC object with a `params` array or
//! just the array. Parameters by position:
//!
//! | index | field           |
//! |-------|-----------------|
//! | 0     | job id          |
//! | 1     | prevhash (word-reversed) |
//! | 2, 3  | coinbase1, coinbase2 |
//! | 4     | merkle branches |
//! | 5     | version         |
//! | 6     | nbits           |
//! | 7     | ntime           |
//! | 8     | clean jobs      |
//!
//! Anything after index 8 is ignored.

use serde::Deserialize;
use serde_json::Value;

use crate::bytes::reverse_words;
use crate::coinbase::{decode_coinbase, TxOutput};
use crate::difficulty::{format_difficulty, format_ntime, nbits_to_difficulty, parse_hex_u32};
use crate::error::NotifyError;
use crate::network::Network;

/// Number of parameters a mining.notify carries.
pub const NOTIFY_PARAM_COUNT: usize = 9;

/// Word size used when reversing the previous block hash.
const PREVHASH_WORD_SIZE: usize = 4;

/// Accepted message shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NotifyMessage {
    Envelope { params: Vec<Value> },
    Bare(Vec<Value>),
}

/// The positional mining.notify parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyParams {
    pub job_id: String,
    /// Previous block hash in stratum wire order.
    pub prevhash_le: String,
    pub coinbase1: String,
    pub coinbase2: String,
    /// Not used for decoding.
    pub merkle_branches: Vec<String>,
    pub version: String,
    pub nbits: String,
    pub ntime: String,
    pub clean_jobs: bool,
}

impl NotifyParams {
    /// Parse notify JSON text.
    pub fn from_json(input: &str) -> Result<Self, NotifyError> {
        let value: Value =
            serde_json::from_str(input).map_err(|e| NotifyError::MalformedJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Extract parameters from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Self, NotifyError> {
        let params = match serde_json::from_value::<NotifyMessage>(value) {
            Ok(NotifyMessage::Envelope { params }) | Ok(NotifyMessage::Bare(params)) => params,
            Err(_) => {
                return Err(NotifyError::InvalidFormat(
                    "expected 'params' in object or array".into(),
                ))
            }
        };
        Self::from_params(&params)
    }

    /// Map a positional parameter list.
    pub fn from_params(params: &[Value]) -> Result<Self, NotifyError> {
        if params.len() < NOTIFY_PARAM_COUNT {
            return Err(NotifyError::TooFewParams {
                expected: NOTIFY_PARAM_COUNT,
                got: params.len(),
            });
        }

        Ok(NotifyParams {
            job_id: opaque_string(&params[0]),
            prevhash_le: hex_param(params, 1, "prevhash")?,
            coinbase1: hex_param(params, 2, "coinbase1")?,
            coinbase2: hex_param(params, 3, "coinbase2")?,
            merkle_branches: merkle_branches(&params[4]),
            version: opaque_string(&params[5]),
            nbits: opaque_string(&params[6]),
            ntime: opaque_string(&params[7]),
            clean_jobs: bool_like(&params[8]),
        })
    }
}

/// A decoded mining.notify job.
#[derive(Debug, Clone, PartialEq)]
pub struct NotifyResult {
    pub job_id: String,
    /// Previous block hash in display order.
    pub prevhash: String,
    /// BIP34 block height from the coinbase scriptSig.
    pub height: Option<u64>,
    /// Raw coinbase scriptSig (height push plus miner data).
    pub extra_script_sig: Option<Vec<u8>>,
    pub version: String,
    pub nbits: String,
    pub ntime: String,
    pub clean_jobs: bool,
    pub outputs: Vec<TxOutput>,
    pub version_number: Option<u32>,
    pub nbits_value: Option<u32>,
    pub difficulty: Option<f64>,
    pub ntime_unix: Option<u32>,
    /// `ntime` as `YYYY-MM-DD HH:MM:SS UTC`.
    pub ntime_utc: Option<String>,
}

impl NotifyResult {
    /// Sum of all decoded output values, in satoshis.
    pub fn total_output_value(&self) -> u64 {
        self.outputs
            .iter()
            .fold(0u64, |acc, o| acc.saturating_add(o.value_satoshis))
    }

    /// Difficulty with a magnitude suffix, if `nbits` parsed.
    pub fn difficulty_display(&self) -> Option<String> {
        self.difficulty.map(format_difficulty)
    }
}

/// Decode notify JSON text using mainnet address encodings.
pub fn decode_notify(input: &str) -> Result<NotifyResult, NotifyError> {
    decode_notify_with_network(input, Network::Mainnet)
}

/// Decode notify JSON text, rendering addresses for `network`.
pub fn decode_notify_with_network(input: &str, network: Network) -> Result<NotifyResult, NotifyError> {
    let params = NotifyParams::from_json(input)?;
    Ok(decode_params(&params, network))
}

/// Decode an already parsed JSON value.
pub fn decode_notify_value(value: Value, network: Network) -> Result<NotifyResult, NotifyError> {
    let params = NotifyParams::from_value(value)?;
    Ok(decode_params(&params, network))
}

/// Decode validated parameters. Never fails; unreadable parts are absent
/// from the result.
pub fn decode_params(params: &NotifyParams, network: Network) -> NotifyResult {
    let coinbase = decode_coinbase(&params.coinbase1, &params.coinbase2, network);

    let nbits_value = parse_hex_u32(&params.nbits);
    let ntime_unix = parse_hex_u32(&params.ntime);

    tracing::debug!(
        job_id = %params.job_id,
        height = ?coinbase.height,
        outputs = coinbase.outputs.len(),
        "decoded mining.notify"
    );

    NotifyResult {
        job_id: params.job_id.clone(),
        prevhash: reverse_words(&params.prevhash_le, PREVHASH_WORD_SIZE),
        height: coinbase.height,
        extra_script_sig: coinbase.script_sig,
        version: params.version.clone(),
        nbits: params.nbits.clone(),
        ntime: params.ntime.clone(),
        clean_jobs: params.clean_jobs,
        outputs: coinbase.outputs,
        version_number: parse_hex_u32(&params.version),
        nbits_value,
        difficulty: nbits_value.map(nbits_to_difficulty),
        ntime_unix,
        ntime_utc: ntime_unix.and_then(format_ntime),
    }
}

/// Strings pass through; other JSON values use their JSON text.
fn opaque_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn hex_param(params: &[Value], index: usize, name: &'static str) -> Result<String, NotifyError> {
    params[index]
        .as_str()
        .map(str::to_owned)
        .ok_or(NotifyError::InvalidParam {
            index,
            name,
            reason: "expected a hex string",
        })
}

fn merkle_branches(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(opaque_string).collect(),
        _ => Vec::new(),
    }
}

fn bool_like(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "1"),
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_params() -> Value {
        json!([
            "job1",
            "00000000000000000000000000000000000000000000000000000000000000ff",
            "",
            "",
            ["aa", "bb"],
            "20000000",
            "1d00ffff",
            "6553f100",
            true
        ])
    }

    #[test]
    fn test_envelope_and_bare_are_equivalent() {
        let bare = NotifyParams::from_value(sample_params()).unwrap();
        let envelope = NotifyParams::from_value(json!({
            "id": null,
            "method": "mining.notify",
            "params": sample_params(),
        }))
        .unwrap();
        assert_eq!(bare, envelope);
        assert_eq!(bare.merkle_branches, vec!["aa", "bb"]);
        assert!(bare.clean_jobs);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            NotifyParams::from_json("not json"),
            Err(NotifyError::MalformedJson(_))
        ));
    }

    #[test]
    fn test_wrong_shape() {
        for value in [json!({"method": "mining.notify"}), json!("text"), json!(42)] {
            assert!(matches!(
                NotifyParams::from_value(value),
                Err(NotifyError::InvalidFormat(_))
            ));
        }
    }

    #[test]
    fn test_too_few_params() {
        let err = NotifyParams::from_value(json!({"params": [1, 2, 3, 4, 5]})).unwrap_err();
        assert_eq!(err, NotifyError::TooFewParams { expected: 9, got: 5 });
        assert!(err.to_string().contains("at least 9"));
        assert!(err.to_string().contains("got 5"));
    }

    #[test]
    fn test_extra_params_ignored() {
        let mut params = sample_params();
        params.as_array_mut().unwrap().push(json!("extra"));
        assert!(NotifyParams::from_value(params).is_ok());
    }

    #[test]
    fn test_non_string_coinbase_rejected() {
        let mut params = sample_params();
        params[2] = json!(12);
        assert_eq!(
            NotifyParams::from_value(params),
            Err(NotifyError::InvalidParam {
                index: 2,
                name: "coinbase1",
                reason: "expected a hex string",
            })
        );
    }

    #[test]
    fn test_bool_like() {
        assert!(bool_like(&json!(true)));
        assert!(bool_like(&json!("TRUE")));
        assert!(bool_like(&json!(1)));
        assert!(!bool_like(&json!(false)));
        assert!(!bool_like(&json!("false")));
        assert!(!bool_like(&json!(0)));
        assert!(!bool_like(&json!(null)));
    }

    #[test]
    fn test_header_fields() {
        let params = NotifyParams::from_value(sample_params()).unwrap();
        let result = decode_params(&params, Network::Mainnet);

        assert_eq!(
            result.prevhash,
            "000000ff00000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(result.version_number, Some(0x20000000));
        assert_eq!(result.nbits_value, Some(0x1d00ffff));
        assert_eq!(result.difficulty_display().as_deref(), Some("1.00"));
        assert_eq!(result.ntime_unix, Some(1_700_000_000));
        assert_eq!(result.ntime_utc.as_deref(), Some("2023-11-14 22:13:20 UTC"));

        // Empty coinbase fragments decode to nothing.
        assert_eq!(result.height, None);
        assert_eq!(result.extra_script_sig, None);
        assert!(result.outputs.is_empty());
        assert_eq!(result.total_output_value(), 0);
    }

    #[test]
    fn test_unparseable_header_fields() {
        let mut params = sample_params();
        params[6] = json!("xyz");
        params[7] = json!("");
        let result = decode_notify_value(params, Network::Mainnet).unwrap();
        assert_eq!(result.nbits, "xyz");
        assert_eq!(result.difficulty, None);
        assert_eq!(result.ntime_utc, None);
    }
}
