//! Bitcoin variable-length integers (CompactSize).

use crate::bytes::ByteCursor;
use crate::error::ParseError;

/// A decoded variable-length integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarInt {
    /// The decoded value.
    pub value: u64,
    /// How many bytes the encoding occupied (1, 3, 5 or 9).
    pub consumed: usize,
}

/// Parse a varint starting at `offset`.
///
/// The first byte selects the width: below `0xfd` it is the value itself,
/// `0xfd`/`0xfe`/`0xff` are followed by 2/4/8 little-endian bytes.
pub fn parse_varint(bytes: &[u8], offset: usize) -> Result<VarInt, ParseError> {
    let mut cursor = ByteCursor::at(bytes, offset);
    if cursor.position() != offset {
        return Err(ParseError::Truncated {
            offset,
            needed: 1,
            available: 0,
        });
    }
    let value = cursor.read_varint()?;
    Ok(VarInt {
        value,
        consumed: cursor.position() - offset,
    })
}

impl ByteCursor<'_> {
    /// Read a varint and advance past it.
    ///
    /// On failure the cursor is left where it was.
    pub fn read_varint(&mut self) -> Result<u64, ParseError> {
        let mut probe = self.clone();
        let value = match probe.read_u8()? {
            0xfd => probe.read_u16_le()? as u64,
            0xfe => probe.read_u32_le()? as u64,
            0xff => probe.read_u64_le()?,
            b => b as u64,
        };
        *self = probe;
        Ok(value)
    }

    /// Read a script length.
    ///
    /// Almost every script length fits in the single-byte form, which is
    /// handled here directly; wider prefixes go through [`read_varint`].
    ///
    /// [`read_varint`]: ByteCursor::read_varint
    pub fn read_compact_size(&mut self) -> Result<u64, ParseError> {
        match self.peek_at(0) {
            Some(b) if b < 0xfd => {
                self.skip(1)?;
                Ok(b as u64)
            }
            _ => self.read_varint(),
        }
    }
}

/// Encode a variable-length integer (Bitcoin varint).
pub fn encode_varint(value: u64, output: &mut Vec<u8>) {
    if value < 0xfd {
        output.push(value as u8);
    } else if value <= 0xffff {
        output.push(0xfd);
        output.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffffffff {
        output.push(0xfe);
        output.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        output.push(0xff);
        output.extend_from_slice(&value.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_boundaries() {
        let cases: [(u64, usize); 8] = [
            (0, 1),
            (252, 1),
            (253, 3),
            (255, 3),
            (65535, 3),
            (65536, 5),
            (0xffff_ffff, 5),
            (0x1_0000_0000, 9),
        ];

        for (value, width) in cases {
            let mut encoded = Vec::new();
            encode_varint(value, &mut encoded);
            assert_eq!(encoded.len(), width, "encoding width for {}", value);

            let parsed = parse_varint(&encoded, 0).unwrap();
            assert_eq!(parsed, VarInt { value, consumed: width });
        }
    }

    #[test]
    fn test_encode_varint() {
        let mut output = Vec::new();

        // Small value (< 0xfd)
        encode_varint(100, &mut output);
        assert_eq!(output, vec![100]);

        // Medium value (0xfd - 0xffff)
        output.clear();
        encode_varint(0x1234, &mut output);
        assert_eq!(output, vec![0xfd, 0x34, 0x12]);
    }

    #[test]
    fn test_parse_varint_at_offset() {
        let bytes = [0xaa, 0xfe, 0x01, 0x00, 0x01, 0x00];
        let parsed = parse_varint(&bytes, 1).unwrap();
        assert_eq!(parsed.value, 0x0001_0001);
        assert_eq!(parsed.consumed, 5);
    }

    #[test]
    fn test_parse_varint_truncated() {
        assert!(parse_varint(&[0xfd, 0x01], 0).is_err());
        assert!(parse_varint(&[0xfe, 0x01, 0x02, 0x03], 0).is_err());
        assert!(parse_varint(&[0xff; 8], 0).is_err());
        assert!(parse_varint(&[], 0).is_err());
        assert!(parse_varint(&[0x01], 5).is_err());
    }

    #[test]
    fn test_failed_varint_leaves_cursor() {
        let bytes = [0xfd, 0x01];
        let mut cursor = ByteCursor::new(&bytes);
        assert!(cursor.read_varint().is_err());
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_compact_size() {
        let bytes = [0x19, 0xfd, 0x00, 0x01];
        let mut cursor = ByteCursor::new(&bytes);
        assert_eq!(cursor.read_compact_size().unwrap(), 0x19);
        assert_eq!(cursor.read_compact_size().unwrap(), 0x100);
        assert!(cursor.is_empty());
    }
}
