//! Bech32 encoding for native SegWit v0 addresses (BIP173).
//!
//! Encodes witness programs for display. [`verify_checksum`] checks that
//! the six checksum characters of an expanded string match its data.

use crate::error::EncodingError;

const BECH32_CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

const GEN: [u32; 5] = [0x3b6a57b2, 0x26508e6d, 0x1ea119fa, 0x3d4233dd, 0x2a1462b3];

/// Expand the human-readable part for checksum computation: high bits of
/// each character, a zero separator, then low bits of each character.
pub fn hrp_expand(hrp: &str) -> Vec<u8> {
    let mut result = Vec::with_capacity(hrp.len() * 2 + 1);

    for c in hrp.bytes() {
        result.push(c >> 5);
    }
    result.push(0);
    for c in hrp.bytes() {
        result.push(c & 31);
    }

    result
}

/// BCH checksum remainder over 5-bit values.
pub fn polymod(values: &[u8]) -> u32 {
    let mut chk: u32 = 1;

    for &value in values {
        let top = chk >> 25;
        chk = ((chk & 0x1ffffff) << 5) ^ (value as u32);
        for (i, &g) in GEN.iter().enumerate() {
            if (top >> i) & 1 == 1 {
                chk ^= g;
            }
        }
    }

    chk
}

/// Compute the six 5-bit checksum groups for `data` under `hrp`.
pub fn create_checksum(hrp: &str, data: &[u8]) -> [u8; 6] {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    values.extend_from_slice(&[0u8; 6]);
    let pm = polymod(&values) ^ 1;

    let mut checksum = [0u8; 6];
    for (i, group) in checksum.iter_mut().enumerate() {
        *group = ((pm >> (5 * (5 - i))) & 31) as u8;
    }
    checksum
}

/// Check that `data` (including its trailing checksum) is valid Bech32
/// under `hrp`.
pub fn verify_checksum(hrp: &str, data: &[u8]) -> bool {
    let mut values = hrp_expand(hrp);
    values.extend_from_slice(data);
    polymod(&values) == 1
}

/// Regroup bits, most significant first.
///
/// With `pad` the final partial group is zero-filled. Without it, any
/// leftover group of `from_bits` or more, or nonzero leftover bits, is
/// [`EncodingError::InvalidPadding`].
pub fn convert_bits(data: &[u8], from_bits: u8, to_bits: u8, pad: bool) -> Result<Vec<u8>, EncodingError> {
    let mut acc: u32 = 0;
    let mut bits: u8 = 0;
    let mut result = Vec::with_capacity(data.len() * from_bits as usize / to_bits as usize + 1);
    let max_value = (1u32 << to_bits) - 1;
    let max_acc = (1u32 << (from_bits + to_bits - 1)) - 1;

    for &value in data {
        if (value as u32) >> from_bits != 0 {
            return Err(EncodingError::InvalidValue { value, bits: from_bits });
        }
        acc = ((acc << from_bits) | (value as u32)) & max_acc;
        bits += from_bits;

        while bits >= to_bits {
            bits -= to_bits;
            result.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            result.push(((acc << (to_bits - bits)) & max_value) as u8);
        }
    } else if bits >= from_bits || ((acc << (to_bits - bits)) & max_value) != 0 {
        return Err(EncodingError::InvalidPadding);
    }

    Ok(result)
}

/// Encode 5-bit `data` as `hrp + "1" + charset(data + checksum)`.
pub fn encode(hrp: &str, data: &[u8]) -> String {
    let checksum = create_checksum(hrp, data);
    let mut encoded = String::with_capacity(hrp.len() + 1 + data.len() + 6);
    encoded.push_str(hrp);
    encoded.push('1');
    for &d in data.iter().chain(checksum.iter()) {
        encoded.push(BECH32_CHARSET[(d & 31) as usize] as char);
    }
    encoded
}

/// Encode a witness program as a SegWit address.
pub fn encode_segwit_address(hrp: &str, witness_version: u8, program: &[u8]) -> Result<String, EncodingError> {
    if witness_version > 16 {
        return Err(EncodingError::InvalidValue {
            value: witness_version,
            bits: 5,
        });
    }
    let mut data = Vec::with_capacity(1 + (program.len() * 8 + 4) / 5);
    data.push(witness_version);
    data.extend(convert_bits(program, 8, 5, true)?);
    Ok(encode(hrp, &data))
}
