//! Low-level byte reading utilities

use std::io::{BufRead, Read};

use super::error::{Result, RoffError};

/// Read a NUL-terminated token.
///
/// Returns `None` at a clean end of stream. A token cut off by the end of
/// the stream is a format error.
pub fn read_cstring(reader: &mut impl BufRead) -> Result<Option<String>> {
    let mut buf = Vec::new();
    let n = reader.read_until(0, &mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    if buf.last() != Some(&0) {
        return Err(RoffError::InvalidFormat(format!(
            "Unterminated string {:?} at end of stream",
            String::from_utf8_lossy(&buf)
        )));
    }
    buf.pop();
    Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
}

/// Read a token that must be present.
pub fn expect_cstring(reader: &mut impl BufRead, what: &str) -> Result<String> {
    read_cstring(reader)?.ok_or_else(|| {
        RoffError::InvalidFormat(format!("Stream ended while reading {}", what))
    })
}

/// Read exactly four raw bytes.
pub fn read_raw4(reader: &mut impl Read) -> Result<[u8; 4]> {
    let mut raw = [0u8; 4];
    reader.read_exact(&mut raw)?;
    Ok(raw)
}

/// Split a char-array payload into its NUL-terminated strings.
pub fn split_cstrings(payload: &[u8]) -> Vec<String> {
    payload
        .split(|&b| b == 0)
        .take(payload.iter().filter(|&&b| b == 0).count())
        .map(|s| String::from_utf8_lossy(s).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_consecutive_tokens() {
        let mut cur = Cursor::new(b"tag\0dimensions\0".to_vec());
        assert_eq!(read_cstring(&mut cur).unwrap().as_deref(), Some("tag"));
        assert_eq!(read_cstring(&mut cur).unwrap().as_deref(), Some("dimensions"));
        assert_eq!(read_cstring(&mut cur).unwrap(), None);
    }

    #[test]
    fn unterminated_token_is_an_error() {
        let mut cur = Cursor::new(b"endt".to_vec());
        assert!(read_cstring(&mut cur).is_err());
    }

    #[test]
    fn splits_char_payload() {
        assert_eq!(split_cstrings(b"a\0bc\0\0"), vec!["a", "bc", ""]);
        assert!(split_cstrings(b"").is_empty());
    }
}
