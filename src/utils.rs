//! Utility functions for archive text and timestamps.
//!
//! The chat export writes every string as UTF-8 bytes that were each
//! escaped as a separate code point (`"JosÃ©"` for `"José"`).
//! [`repair_mojibake`] reverses that by reading each code point back as a
//! byte and decoding the byte string as UTF-8.

use chrono::{DateTime, NaiveDateTime};

/// Reinterpret a mis-decoded archive string as the UTF-8 it was meant to be.
///
/// # Errors
///
/// Returns a description of the problem when a character lies outside the
/// single-byte range or when the recovered bytes are not valid UTF-8.
pub fn repair_mojibake(raw: &str) -> Result<String, String> {
    if raw.is_ascii() {
        return Ok(raw.to_owned());
    }

    let bytes = raw
        .chars()
        .map(|c| {
            u8::try_from(u32::from(c))
                .map_err(|_| format!("character {c:?} cannot be reinterpreted as a single byte"))
        })
        .collect::<Result<Vec<u8>, String>>()?;

    String::from_utf8(bytes).map_err(|e| format!("reinterpreted text is not valid UTF-8: {e}"))
}

/// Convert milliseconds since the Unix epoch into a naive instant.
///
/// No time zone conversion is applied; the wall time is the UTC wall time.
#[must_use]
pub fn millis_to_naive(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_ascii_untouched() {
        assert_eq!(repair_mojibake("hi there").unwrap(), "hi there");
    }

    #[test]
    fn test_repair_two_byte_sequence() {
        assert_eq!(repair_mojibake("Jos\u{00c3}\u{00a9}").unwrap(), "José");
    }

    #[test]
    fn test_repair_emoji() {
        // U+1F600 is F0 9F 98 80 in UTF-8
        let raw = "\u{00f0}\u{009f}\u{0098}\u{0080}";
        assert_eq!(repair_mojibake(raw).unwrap(), "😀");
    }

    #[test]
    fn test_repair_rejects_wide_chars() {
        assert!(repair_mojibake("already 😀 decoded").is_err());
    }

    #[test]
    fn test_repair_rejects_invalid_utf8() {
        assert!(repair_mojibake("\u{00c3}").is_err());
    }

    #[test]
    fn test_millis_to_naive() {
        let ts = millis_to_naive(1_704_103_200_000).unwrap();
        assert_eq!(ts.to_string(), "2024-01-01 10:00:00");
    }
}
