//! scriptPubKey classification and payout address derivation.
//!
//! Recognized patterns:
//! - P2PKH: `OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG` (25 bytes)
//! - P2SH: `OP_HASH160 <20> OP_EQUAL` (23 bytes)
//! - P2WPKH: `OP_0 <20>` (22 bytes)
//! - P2WSH: `OP_0 <32>` (34 bytes)
//! - OP_RETURN: anything starting with `0x6a`
//!
//! Anything else is [`ScriptType::Unknown`]. That is not an error.

use crate::base58::base58check_encode;
use crate::bech32::encode_segwit_address;
use crate::network::Network;

const OP_0: u8 = 0x00;
const OP_RETURN: u8 = 0x6a;
const OP_DUP: u8 = 0x76;
const OP_EQUAL: u8 = 0x87;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_HASH160: u8 = 0xa9;
const OP_CHECKSIG: u8 = 0xac;

/// Shown in place of an address for OP_RETURN outputs.
pub const NULL_DATA_LABEL: &str = "(Null Data)";

/// Shown in place of an address for unrecognized scripts.
pub const UNDECODABLE_LABEL: &str = "Unable to decode";

/// Output script type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    P2PKH,
    P2SH,
    P2WPKH,
    P2WSH,
    OpReturn,
    Unknown,
}

impl ScriptType {
    /// Get the display name for this script type.
    pub fn name(&self) -> &'static str {
        match self {
            ScriptType::P2PKH => "P2PKH",
            ScriptType::P2SH => "P2SH",
            ScriptType::P2WPKH => "P2WPKH",
            ScriptType::P2WSH => "P2WSH",
            ScriptType::OpReturn => "OP_RETURN",
            ScriptType::Unknown => "Unknown",
        }
    }

    /// Whether outputs of this type pay to an address.
    pub fn is_payable(&self) -> bool {
        matches!(
            self,
            ScriptType::P2PKH | ScriptType::P2SH | ScriptType::P2WPKH | ScriptType::P2WSH
        )
    }
}

impl core::fmt::Display for ScriptType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a scriptPubKey by its byte pattern.
pub fn classify_script(script: &[u8]) -> ScriptType {
    match script {
        [OP_DUP, OP_HASH160, 0x14, .., OP_EQUALVERIFY, OP_CHECKSIG] if script.len() == 25 => {
            ScriptType::P2PKH
        }
        [OP_HASH160, 0x14, .., OP_EQUAL] if script.len() == 23 => ScriptType::P2SH,
        [OP_0, 0x14, ..] if script.len() == 22 => ScriptType::P2WPKH,
        [OP_0, 0x20, ..] if script.len() == 34 => ScriptType::P2WSH,
        [OP_RETURN, ..] => ScriptType::OpReturn,
        _ => ScriptType::Unknown,
    }
}

/// Derive the address a scriptPubKey pays to.
///
/// Returns the script type and, for payable types, the encoded address.
pub fn script_to_address(script: &[u8], network: Network) -> (ScriptType, Option<String>) {
    let script_type = classify_script(script);
    let address = match script_type {
        ScriptType::P2PKH => Some(base58check_encode(&script[3..23], network.p2pkh_version())),
        ScriptType::P2SH => Some(base58check_encode(&script[2..22], network.p2sh_version())),
        ScriptType::P2WPKH | ScriptType::P2WSH => {
            match encode_segwit_address(network.bech32_hrp(), 0, &script[2..]) {
                Ok(address) => Some(address),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode witness program");
                    None
                }
            }
        }
        ScriptType::OpReturn | ScriptType::Unknown => None,
    };
    (script_type, address)
}
