//! Percent decoding for URL query values
//!
//! Mirrors what browsers do for `decodeURIComponent`: `%XX` escapes are
//! collected as bytes and must form valid UTF-8, `+` is left alone.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed escape at byte {0}")]
    MalformedEscape(usize),
    #[error("Escaped bytes are not valid UTF-8")]
    InvalidUtf8,
}

/// Decode a percent-encoded component
pub fn decode(s: &str) -> Result<String, DecodeError> {
    if !s.contains('%') {
        return Ok(s.to_string());
    }

    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = bytes.get(i + 1).and_then(|b| hex_value(*b));
            let lo = bytes.get(i + 2).and_then(|b| hex_value(*b));
            match (hi, lo) {
                (Some(hi), Some(lo)) => {
                    out.push(hi << 4 | lo);
                    i += 3;
                }
                _ => return Err(DecodeError::MalformedEscape(i)),
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|_| DecodeError::InvalidUtf8)
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_passthrough() {
        assert_eq!(decode("rust").unwrap(), "rust");
        assert_eq!(decode("a+b").unwrap(), "a+b");
    }

    #[test]
    fn test_decode_utf8() {
        assert_eq!(decode("%E3%83%86%E3%82%B9%E3%83%88").unwrap(), "テスト");
        assert_eq!(decode("caf%C3%A9").unwrap(), "café");
        assert_eq!(decode("a%2Bb%20c").unwrap(), "a+b c");
    }

    #[test]
    fn test_malformed_escape() {
        assert_eq!(decode("100%"), Err(DecodeError::MalformedEscape(3)));
        assert_eq!(decode("%zz"), Err(DecodeError::MalformedEscape(0)));
    }

    #[test]
    fn test_invalid_utf8() {
        assert_eq!(decode("%E3%83"), Err(DecodeError::InvalidUtf8));
    }
}
