//! Coinbase transaction parsing from stratum fragments.
//!
//! A pool sends the coinbase transaction as two hex fragments with the
//! miner's extranonce spliced in between. Concatenated they form the
//! serialized transaction:
//!
//! ```text
//! [version 4] [input count] [prev txid 32] [prev index 4]
//! [scriptSig len] [scriptSig ...] [sequence 4]
//! [output count] ([value 8] [script len] [scriptPubKey ...])* [locktime 4]
//! ```
//!
//! The split point is arbitrary, so nothing here assumes a field ends at
//! the fragment boundary. Each sub-extraction degrades on its own: a bad
//! height leaves the outputs alone and a truncated output keeps the ones
//! decoded before it.

use crate::address::{script_to_address, ScriptType, NULL_DATA_LABEL, UNDECODABLE_LABEL};
use crate::bytes::{hex_to_bytes, read_le, ByteCursor};
use crate::error::ParseError;
use crate::network::Network;

/// Version (4) + input count (1) + prev txid (32) + prev index (4).
pub const SCRIPT_SIG_OFFSET: usize = 41;

/// Smallest combined length the structural parse will look at.
const MIN_TRANSACTION_LEN: usize = 45;

const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;

const SATOSHIS_PER_BTC: f64 = 100_000_000.0;

/// A decoded transaction output.
#[derive(Debug, Clone, PartialEq)]
pub struct TxOutput {
    /// Output value in satoshis.
    pub value_satoshis: u64,
    /// Raw locking script.
    pub script_pubkey: Vec<u8>,
    /// Recognized script pattern.
    pub script_type: ScriptType,
    /// Payout address, present only for payable script types.
    pub address: Option<String>,
}

impl TxOutput {
    /// Output value in BTC.
    pub fn value_btc(&self) -> f64 {
        self.value_satoshis as f64 / SATOSHIS_PER_BTC
    }

    /// The address, or a label for outputs that have none.
    pub fn display_address(&self) -> &str {
        match (&self.address, self.script_type) {
            (Some(address), _) => address,
            (None, ScriptType::OpReturn) => NULL_DATA_LABEL,
            (None, _) => UNDECODABLE_LABEL,
        }
    }
}

/// The coinbase scriptSig and the BIP34 height it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSigInfo {
    /// Full scriptSig bytes, read across the fragment split.
    pub script_sig: Vec<u8>,
    /// Block height, if the leading push decoded.
    pub height: Option<u64>,
}

/// Everything recovered from a pair of coinbase fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoinbaseSummary {
    pub script_sig: Option<Vec<u8>>,
    pub height: Option<u64>,
    pub outputs: Vec<TxOutput>,
}

/// Decode both hex fragments and extract height, scriptSig and outputs.
///
/// Never fails. An unreadable `coinbase1` produces an empty summary; an
/// unreadable `coinbase2` only loses the outputs and whatever part of the
/// scriptSig it would have carried.
pub fn decode_coinbase(coinbase1: &str, coinbase2: &str, network: Network) -> CoinbaseSummary {
    let cb1 = match hex_to_bytes(coinbase1) {
        Ok(cb1) => cb1,
        Err(e) => {
            tracing::warn!(error = %e, "coinbase1 is not valid hex");
            return CoinbaseSummary::default();
        }
    };
    let cb2 = match hex_to_bytes(coinbase2) {
        Ok(cb2) => Some(cb2),
        Err(e) => {
            tracing::warn!(error = %e, "coinbase2 is not valid hex");
            None
        }
    };

    let script_sig = extract_script_sig(&cb1, cb2.as_deref().unwrap_or(&[]));
    let outputs = match &cb2 {
        Some(cb2) => extract_outputs(&cb1, cb2, network),
        None => Vec::new(),
    };

    CoinbaseSummary {
        height: script_sig.as_ref().and_then(|info| info.height),
        script_sig: script_sig.map(|info| info.script_sig),
        outputs,
    }
}

/// Read the scriptSig that follows the fixed 41-byte input prefix.
///
/// The prefix and the length byte must lie in `coinbase1`; the script
/// itself may continue into `coinbase2`. Returns `None` when `coinbase1`
/// is too short or the declared length is zero. The script is returned
/// even if the height push does not decode.
pub fn extract_script_sig(coinbase1: &[u8], coinbase2: &[u8]) -> Option<ScriptSigInfo> {
    let declared = *coinbase1.get(SCRIPT_SIG_OFFSET)? as usize;
    if declared < 1 {
        tracing::debug!("coinbase scriptSig is empty");
        return None;
    }

    let script_sig: Vec<u8> = coinbase1[SCRIPT_SIG_OFFSET + 1..]
        .iter()
        .chain(coinbase2)
        .take(declared)
        .copied()
        .collect();
    if script_sig.len() < declared {
        tracing::debug!(declared, available = script_sig.len(), "coinbase scriptSig is truncated");
    }

    let height = match decode_bip34_height(&script_sig) {
        Ok(height) => Some(height),
        Err(e) => {
            tracing::debug!(error = %e, "no BIP34 height in coinbase scriptSig");
            None
        }
    };

    Some(ScriptSigInfo { script_sig, height })
}

/// Decode the leading data push of a scriptSig as a little-endian integer.
///
/// Accepts direct pushes (1-75 bytes), `OP_PUSHDATA1` and `OP_PUSHDATA2`.
pub fn decode_bip34_height(script_sig: &[u8]) -> Result<u64, ParseError> {
    let mut cursor = ByteCursor::new(script_sig);
    let push_len = match cursor.read_u8()? {
        n @ 1..=75 => n as usize,
        OP_PUSHDATA1 => cursor.read_u8()? as usize,
        OP_PUSHDATA2 => cursor.read_u16_le()? as usize,
        op => return Err(ParseError::NotAPush(op)),
    };
    if push_len == 0 {
        return Err(ParseError::TooShort { len: 0, min: 1 });
    }
    let pushed = cursor.read_bytes(push_len)?;
    read_le(pushed, 0, push_len)
}

/// Whether `byte` can be a single-byte output count.
fn is_plausible_output_count(byte: u8) -> bool {
    (1..=253).contains(&byte)
}

/// One way of locating the end of the input's sequence field.
type BoundaryStrategy = fn(&[u8], &[u8]) -> Result<usize, ParseError>;

/// Strategies in the order they are tried. Both answer the same question:
/// the offset, in `coinbase1 ‖ coinbase2`, of the output count.
const BOUNDARY_STRATEGIES: [(&str, BoundaryStrategy); 2] = [
    ("split", sequence_end_at_split),
    ("structure", sequence_end_by_structure),
];

/// Find the offset just past the sequence field, i.e. where the output
/// count starts, in the concatenated fragments.
///
/// Both strategies are heuristics keyed on a plausible output count byte
/// (1-253). An unusual scriptSig can make either of them accept a wrong
/// offset.
pub fn find_sequence_end_offset(coinbase1: &[u8], coinbase2: &[u8]) -> Option<usize> {
    for (name, strategy) in BOUNDARY_STRATEGIES {
        match strategy(coinbase1, coinbase2) {
            Ok(offset) => {
                tracing::debug!(strategy = name, offset, "found sequence end");
                return Some(offset);
            }
            Err(e) => tracing::debug!(strategy = name, error = %e, "sequence end not found"),
        }
    }
    None
}

/// Assume the scriptSig ends exactly at the split, so `coinbase2` opens
/// with the 4-byte sequence followed by the output count.
pub fn sequence_end_at_split(coinbase1: &[u8], coinbase2: &[u8]) -> Result<usize, ParseError> {
    if coinbase2.len() < 5 {
        return Err(ParseError::TooShort {
            len: coinbase2.len(),
            min: 5,
        });
    }
    let count = coinbase2[4];
    if !is_plausible_output_count(count) {
        return Err(ParseError::ImplausibleOutputCount(count));
    }
    Ok(coinbase1.len() + 4)
}

/// Walk the transaction from its first byte to the sequence field.
pub fn sequence_end_by_structure(coinbase1: &[u8], coinbase2: &[u8]) -> Result<usize, ParseError> {
    let tx = [coinbase1, coinbase2].concat();
    if tx.len() < MIN_TRANSACTION_LEN {
        return Err(ParseError::TooShort {
            len: tx.len(),
            min: MIN_TRANSACTION_LEN,
        });
    }

    let mut cursor = ByteCursor::new(&tx);
    cursor.skip(4)?; // version

    if cursor.read_varint()? == 0 {
        return Err(ParseError::NoInputs);
    }
    cursor.skip(36)?; // prevout

    let script_len = cursor.read_compact_size()?;
    let script_len = usize::try_from(script_len).map_err(|_| ParseError::Truncated {
        offset: cursor.position(),
        needed: usize::MAX,
        available: cursor.remaining(),
    })?;
    cursor.skip(script_len)?;
    cursor.skip(4)?; // sequence

    let sequence_end = cursor.position();
    let count = cursor.read_u8()?;
    if !is_plausible_output_count(count) {
        return Err(ParseError::ImplausibleOutputCount(count));
    }
    Ok(sequence_end)
}

/// Decode the outputs of the coinbase transaction.
///
/// Returns an empty list when the output section cannot be located.
pub fn extract_outputs(coinbase1: &[u8], coinbase2: &[u8], network: Network) -> Vec<TxOutput> {
    if coinbase2.len() < 5 {
        tracing::debug!(len = coinbase2.len(), "coinbase2 too short to hold outputs");
        return Vec::new();
    }

    let Some(boundary) = find_sequence_end_offset(coinbase1, coinbase2) else {
        tracing::warn!("could not locate coinbase outputs");
        return Vec::new();
    };

    // A boundary inside coinbase1 is read as the start of coinbase2.
    let offset = boundary.saturating_sub(coinbase1.len());
    parse_outputs(coinbase2, offset, network)
}

/// Parse the output count and outputs starting at `offset` in `data`.
///
/// An optional segwit marker and flag in front of the count is skipped.
/// An output whose value or script length is cut off ends the list. One
/// whose script is cut off is kept with the bytes that are there,
/// classified by pattern, and ends the list after it.
pub fn parse_outputs(data: &[u8], offset: usize, network: Network) -> Vec<TxOutput> {
    let mut cursor = ByteCursor::at(data, offset);
    skip_witness_marker(&mut cursor);

    let count = match cursor.read_u8() {
        Ok(count) => count,
        Err(e) => {
            tracing::warn!(error = %e, "missing output count");
            return Vec::new();
        }
    };

    let mut outputs = Vec::with_capacity(count as usize);
    for index in 0..count {
        let (output, truncated) = match read_output(&mut cursor, network) {
            Ok(read) => read,
            Err(e) => {
                tracing::warn!(index, error = %e, "truncated coinbase output");
                break;
            }
        };
        if output.script_type == ScriptType::Unknown {
            tracing::debug!(index, "unrecognized output script");
        }
        outputs.push(output);
        if truncated {
            tracing::warn!(index, "coinbase output script runs past the data");
            break;
        }
    }
    outputs
}

/// Skip `00 00` or `00 01` at the cursor, if at least one byte follows it.
///
/// Returns whether a marker was skipped.
pub fn skip_witness_marker(cursor: &mut ByteCursor<'_>) -> bool {
    let is_marker = cursor.remaining() > 2
        && cursor.peek_at(0) == Some(0x00)
        && matches!(cursor.peek_at(1), Some(0x00 | 0x01));
    is_marker && cursor.skip(2).is_ok()
}

/// Read one output. The flag is set when the script was cut short.
fn read_output(
    cursor: &mut ByteCursor<'_>,
    network: Network,
) -> Result<(TxOutput, bool), ParseError> {
    let value_satoshis = cursor.read_u64_le()?;
    let script_len = cursor.read_u8()? as usize;
    let available = script_len.min(cursor.remaining());
    let script_pubkey = cursor.read_bytes(available)?.to_vec();
    let (script_type, address) = script_to_address(&script_pubkey, network);

    let output = TxOutput {
        value_satoshis,
        script_pubkey,
        script_type,
        address,
    };
    Ok((output, available < script_len))
}
