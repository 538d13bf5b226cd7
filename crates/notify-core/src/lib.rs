//! Decoder for stratum `mining.notify` job announcements.
//!
//! This crate provides pure Rust implementations of:
//! - Coinbase transaction parsing from the two stratum fragments
//! - BIP34 block height and miner scriptSig extraction
//! - Payout address derivation (P2PKH, P2SH, P2WPKH, P2WSH, OP_RETURN)
//! - Base58Check and Bech32 encoding
//! - nBits to difficulty conversion

pub mod address;
pub mod base58;
pub mod bech32;
pub mod bytes;
pub mod coinbase;
pub mod difficulty;
pub mod error;
pub mod hash;
pub mod network;
pub mod notify;
pub mod varint;

pub use address::{classify_script, script_to_address, ScriptType};
pub use bytes::{hex_to_bytes, printable_ascii, read_le, reverse_words, ByteCursor};
pub use coinbase::{decode_coinbase, find_sequence_end_offset, CoinbaseSummary, TxOutput};
pub use difficulty::{format_difficulty, nbits_to_difficulty};
pub use error::{EncodingError, NotifyError, ParseError};
pub use network::Network;
pub use notify::{
    decode_notify, decode_notify_value, decode_notify_with_network, decode_params, NotifyParams,
    NotifyResult,
};
pub use varint::{encode_varint, parse_varint, VarInt};
