//! SHA256 hashing.

use sha2::{Digest, Sha256};

/// Bitcoin's double SHA256: SHA256(SHA256(data)).
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// First four bytes of the double SHA256, as appended by Base58Check.
#[inline]
pub fn checksum(data: &[u8]) -> [u8; 4] {
    let hash = double_sha256(data);
    [hash[0], hash[1], hash[2], hash[3]]
}
