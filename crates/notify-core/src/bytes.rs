//! Hex/byte conversions and a bounds-checked forward cursor.

use crate::error::ParseError;

/// Decode a hex string into bytes.
///
/// Surrounding whitespace is ignored. An odd-length string is left-padded
/// with a zero nibble instead of being rejected, so `"abc"` decodes as
/// `[0x0a, 0xbc]`.
pub fn hex_to_bytes(s: &str) -> Result<Vec<u8>, ParseError> {
    let trimmed = s.trim();
    let result = if trimmed.len() % 2 != 0 {
        let mut padded = String::with_capacity(trimmed.len() + 1);
        padded.push('0');
        padded.push_str(trimmed);
        hex::decode(padded)
    } else {
        hex::decode(trimmed)
    };
    result.map_err(|e| ParseError::InvalidHex(e.to_string()))
}

/// Reverse the order of fixed-size words in a hex string.
///
/// Byte order inside each word is untouched. Stratum sends the previous
/// block hash as eight 4-byte words in reverse order, so
/// `reverse_words(prevhash, 4)` yields the display hash. A trailing short
/// word stays at the end.
pub fn reverse_words(hex: &str, word_size: usize) -> String {
    let trimmed = hex.trim();
    let mut chars: Vec<char> = Vec::with_capacity(trimmed.len() + 1);
    if trimmed.chars().count() % 2 != 0 {
        chars.push('0');
    }
    chars.extend(trimmed.chars());

    let width = word_size * 2;
    if width == 0 {
        return chars.into_iter().collect();
    }

    let mut words: Vec<&[char]> = chars.chunks(width).collect();
    let tail = match words.last() {
        Some(last) if last.len() < width => words.pop(),
        _ => None,
    };
    words.reverse();

    let mut out: String = words.into_iter().flatten().collect();
    if let Some(tail) = tail {
        out.extend(tail);
    }
    out
}

/// Read `len` bytes at `offset` as a little-endian unsigned integer.
pub fn read_le(bytes: &[u8], offset: usize, len: usize) -> Result<u64, ParseError> {
    if len > 8 {
        return Err(ParseError::PushTooWide(len));
    }
    let end = offset
        .checked_add(len)
        .filter(|&end| end <= bytes.len())
        .ok_or(ParseError::Truncated {
            offset,
            needed: len,
            available: bytes.len().saturating_sub(offset),
        })?;

    Ok(bytes[offset..end]
        .iter()
        .rev()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64))
}

/// Render bytes as text, keeping printable ASCII and showing everything
/// else as `.`.
pub fn printable_ascii(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| if (32..=126).contains(&b) { b as char } else { '.' })
        .collect()
}

/// A forward-only read position over a byte slice.
///
/// The position never exceeds the slice length; every read that would run
/// past the end returns [`ParseError::Truncated`] and leaves the position
/// unchanged.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, pos: 0 }
    }

    /// Create a cursor at `pos`, clamped to the end of `data`.
    pub fn at(data: &'a [u8], pos: usize) -> Self {
        ByteCursor {
            data,
            pos: pos.min(data.len()),
        }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the byte `ahead` positions from the cursor without moving.
    pub fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.data.get(self.pos.checked_add(ahead)?).copied()
    }

    /// Read `n` bytes and advance.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], ParseError> {
        if n > self.remaining() {
            return Err(ParseError::Truncated {
                offset: self.pos,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Advance `n` bytes without reading them.
    pub fn skip(&mut self, n: usize) -> Result<(), ParseError> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, ParseError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, ParseError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ParseError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, ParseError> {
        let b = self.read_bytes(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(u64::from_le_bytes(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_bytes() {
        assert_eq!(hex_to_bytes("00ff10").unwrap(), vec![0x00, 0xff, 0x10]);
        assert_eq!(hex_to_bytes("ABcd").unwrap(), vec![0xab, 0xcd]);
        assert_eq!(hex_to_bytes("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_hex_to_bytes_odd_length_is_left_padded() {
        assert_eq!(hex_to_bytes("abc").unwrap(), vec![0x0a, 0xbc]);
        assert_eq!(hex_to_bytes("1").unwrap(), vec![0x01]);
    }

    #[test]
    fn test_hex_to_bytes_rejects_non_hex() {
        assert!(matches!(hex_to_bytes("zz"), Err(ParseError::InvalidHex(_))));
    }

    #[test]
    fn test_reverse_words_prevhash() {
        let wire = "11111111222222223333333344444444";
        assert_eq!(reverse_words(wire, 4), "44444444333333332222222211111111");
    }

    #[test]
    fn test_reverse_words_keeps_byte_order_within_words() {
        assert_eq!(reverse_words("0011223344556677", 4), "4455667700112233");
    }

    #[test]
    fn test_reverse_words_short_tail_stays_last() {
        assert_eq!(reverse_words("aaaaaaaabbbbbbbbcc", 4), "bbbbbbbbaaaaaaaacc");
        // Odd input is padded before splitting.
        assert_eq!(reverse_words("aaaaaaaabbbbbbbbc", 4), "abbbbbbb0aaaaaaabc");
    }

    #[test]
    fn test_read_le() {
        let bytes = [0xa1, 0xb2, 0x0c, 0xff];
        assert_eq!(read_le(&bytes, 0, 3).unwrap(), 0x0cb2a1);
        assert_eq!(read_le(&bytes, 3, 1).unwrap(), 0xff);
        assert_eq!(read_le(&bytes, 4, 0).unwrap(), 0);
        assert!(matches!(
            read_le(&bytes, 2, 3),
            Err(ParseError::Truncated { offset: 2, needed: 3, available: 2 })
        ));
        assert!(matches!(read_le(&[0u8; 9], 0, 9), Err(ParseError::PushTooWide(9))));
    }

    #[test]
    fn test_printable_ascii() {
        assert_eq!(printable_ascii(b"\x03\xa1/pool/\x00"), "../pool/.");
    }

    #[test]
    fn test_cursor_reads_and_bounds() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_u8().unwrap(), 0x01);
        assert_eq!(cursor.read_u32_le().unwrap(), 0x05040302);
        assert!(cursor.is_empty());

        let err = cursor.read_u8().unwrap_err();
        assert_eq!(
            err,
            ParseError::Truncated { offset: 5, needed: 1, available: 0 }
        );
        assert_eq!(cursor.position(), 5);
    }

    #[test]
    fn test_cursor_failed_read_does_not_move() {
        let data = [0u8; 6];
        let mut cursor = ByteCursor::at(&data, 2);
        assert!(cursor.read_u64_le().is_err());
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.peek_at(3), Some(0));
        assert_eq!(cursor.peek_at(4), None);
    }

    #[test]
    fn test_cursor_at_clamps() {
        let data = [0u8; 3];
        let cursor = ByteCursor::at(&data, 10);
        assert_eq!(cursor.position(), 3);
        assert_eq!(cursor.remaining(), 0);
    }
}
