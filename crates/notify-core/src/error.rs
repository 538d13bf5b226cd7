//! Error types for notify decoding.
//!
//! Three families, scoped to where they can occur:
//! - [`NotifyError`] aborts a decode (bad JSON, wrong shape, too few params).
//! - [`ParseError`] is raised by the binary coinbase parser and is always
//!   collapsed into a partial result before it reaches the caller.
//! - [`EncodingError`] covers the Base58 and Bech32 codecs.

/// Fatal errors surfaced to the caller of a decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotifyError {
    /// Input text was not valid JSON.
    #[error("malformed JSON: {0}")]
    MalformedJson(String),

    /// JSON was valid but neither `{"params": [...]}` nor a bare array.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Fewer parameters than a mining.notify carries.
    #[error("invalid mining.notify: expected at least {expected} parameters, got {got}")]
    TooFewParams { expected: usize, got: usize },

    /// A positional parameter had the wrong JSON type.
    #[error("invalid parameter {index} ({name}): {reason}")]
    InvalidParam {
        index: usize,
        name: &'static str,
        reason: &'static str,
    },
}

/// Errors raised while walking the serialized coinbase transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// A read ran past the end of the available bytes.
    #[error("truncated data: need {needed} bytes at offset {offset}, {available} available")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A fragment contained non-hex characters.
    #[error("invalid hex: {0}")]
    InvalidHex(String),

    /// The transaction declares zero inputs.
    #[error("transaction has no inputs")]
    NoInputs,

    /// The byte after the sequence field cannot be an output count.
    #[error("implausible output count: {0}")]
    ImplausibleOutputCount(u8),

    /// The data is shorter than the fixed layout requires.
    #[error("data too short: {len} bytes (min {min})")]
    TooShort { len: usize, min: usize },

    /// The scriptSig does not start with a data push.
    #[error("expected a push opcode, found 0x{0:02x}")]
    NotAPush(u8),

    /// A pushed integer is wider than 8 bytes.
    #[error("pushed integer too wide: {0} bytes")]
    PushTooWide(usize),
}

/// Errors from the address codecs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodingError {
    /// Nonzero bits were left over when regrouping without padding.
    #[error("invalid padding")]
    InvalidPadding,

    /// An input value does not fit in the source bit width.
    #[error("value {value} does not fit in {bits} bits")]
    InvalidValue { value: u8, bits: u8 },

    /// A character outside the Base58 alphabet.
    #[error("invalid Base58 character: {0}")]
    InvalidBase58Char(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_few_params_message() {
        let err = NotifyError::TooFewParams { expected: 9, got: 5 };
        assert_eq!(
            err.to_string(),
            "invalid mining.notify: expected at least 9 parameters, got 5"
        );
    }

    #[test]
    fn test_truncated_message() {
        let err = ParseError::Truncated {
            offset: 10,
            needed: 8,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "truncated data: need 8 bytes at offset 10, 3 available"
        );
    }
}
