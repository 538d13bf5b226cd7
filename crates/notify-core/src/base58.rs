//! Base58 and Base58Check encoding for legacy (P2PKH, P2SH) addresses.

use crate::error::EncodingError;
use crate::hash::checksum;

const BASE58_ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Encode bytes as Base58.
///
/// The input is treated as one big-endian number and divided by 58 in
/// place, one byte column at a time. Each leading zero byte becomes a
/// leading `'1'`, since the numeric value alone would drop it.
pub fn base58_encode(input: &[u8]) -> String {
    let leading_zeros = input.iter().take_while(|&&b| b == 0).count();

    let mut number = input[leading_zeros..].to_vec();
    let mut digits = Vec::with_capacity(input.len() * 138 / 100 + 1);

    while !number.is_empty() {
        let mut remainder = 0u32;
        let mut quotient = Vec::with_capacity(number.len());

        for &byte in &number {
            let acc = (remainder << 8) | byte as u32;
            let q = (acc / 58) as u8;
            remainder = acc % 58;
            // Drop leading zeros of the quotient as they appear.
            if !quotient.is_empty() || q != 0 {
                quotient.push(q);
            }
        }

        digits.push(BASE58_ALPHABET[remainder as usize]);
        number = quotient;
    }

    let mut encoded = String::with_capacity(leading_zeros + digits.len());
    encoded.extend(core::iter::repeat('1').take(leading_zeros));
    encoded.extend(digits.iter().rev().map(|&d| d as char));
    encoded
}

/// Decode a Base58 string.
pub fn base58_decode(input: &str) -> Result<Vec<u8>, EncodingError> {
    let mut result: Vec<u8> = Vec::new();

    // Count leading '1's (they become leading zeros)
    let leading_zeros = input.chars().take_while(|&c| c == '1').count();

    for c in input.chars() {
        let value = BASE58_ALPHABET
            .iter()
            .position(|&x| x as char == c)
            .ok_or(EncodingError::InvalidBase58Char(c))? as u32;

        // Multiply result by 58 and add value
        let mut carry = value;
        for byte in result.iter_mut().rev() {
            let temp = (*byte as u32) * 58 + carry;
            *byte = (temp & 0xFF) as u8;
            carry = temp >> 8;
        }

        while carry > 0 {
            result.insert(0, (carry & 0xFF) as u8);
            carry >>= 8;
        }
    }

    let mut decoded = vec![0u8; leading_zeros];
    decoded.extend(result);
    Ok(decoded)
}

/// Encode a hash as a Base58Check address.
///
/// Layout before encoding: `[version][payload][checksum(4)]`, where the
/// checksum is the head of the double SHA256 over version and payload.
pub fn base58check_encode(payload: &[u8], version: u8) -> String {
    let mut data = Vec::with_capacity(payload.len() + 5);
    data.push(version);
    data.extend_from_slice(payload);
    let check = checksum(&data);
    data.extend_from_slice(&check);
    base58_encode(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_string() {
        assert_eq!(base58_encode(b"hello world"), "StV1DL6CwTryKyV");
    }

    #[test]
    fn test_encode_empty_and_zeros() {
        assert_eq!(base58_encode(&[]), "");
        assert_eq!(base58_encode(&[0]), "1");
        assert_eq!(base58_encode(&[0, 0, 0]), "111");
        assert_eq!(base58_encode(&[0, 57]), "1z");
        assert_eq!(base58_encode(&[58]), "21");
    }

    #[test]
    fn test_roundtrip_preserves_leading_zeros() {
        let samples: [&[u8]; 5] = [
            &[],
            &[0, 0, 1, 2, 3],
            &[0xff; 25],
            &[0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            &[0, 0x80, 0, 0x01],
        ];
        for bytes in samples {
            let encoded = base58_encode(bytes);
            assert_eq!(base58_decode(&encoded).unwrap(), bytes);

            let zero_bytes = bytes.iter().take_while(|&&b| b == 0).count();
            let ones = encoded.chars().take_while(|&c| c == '1').count();
            assert_eq!(zero_bytes, ones);
        }
    }

    #[test]
    fn test_base58check_zero_hash() {
        assert_eq!(
            base58check_encode(&[0u8; 20], 0x00),
            "1111111111111111111114oLvT2"
        );
    }

    #[test]
    fn test_base58check_matches_known_addresses() {
        for (address, version) in [
            ("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", 0x00),
            ("3J98t1WpEZ73CNmQviecrnyiWrnqRhWNLy", 0x05),
        ] {
            let decoded = base58_decode(address).unwrap();
            assert_eq!(decoded.len(), 25);
            assert_eq!(decoded[0], version);
            assert_eq!(base58check_encode(&decoded[1..21], version), address);
        }
    }

    #[test]
    fn test_decode_rejects_bad_char() {
        assert_eq!(
            base58_decode("10OIl"),
            Err(EncodingError::InvalidBase58Char('0'))
        );
    }
}
