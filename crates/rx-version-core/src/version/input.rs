//! Parsing of raw form input.

/// Parse a whole number as typed into a form field.
///
/// Reads an optional sign and the leading run of digits after trimming;
/// anything after the digits is ignored, so `"2.5"` reads as 2 and `"1.0"`
/// as 1. Input with no leading digits, or too large for `i64`, is `None`.
pub fn parse_count(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Parse a count that must fit a non-negative `u32`.
pub fn parse_non_negative(raw: &str) -> Option<u32> {
    parse_count(raw).and_then(|n| u32::try_from(n).ok())
}

/// Parse a count that must be strictly positive.
pub fn parse_positive(raw: &str) -> Option<u32> {
    parse_non_negative(raw).filter(|n| *n > 0)
}
