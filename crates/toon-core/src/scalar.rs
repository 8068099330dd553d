//! Lexical rules shared by the encoder and decoder: number literals, key
//! syntax and string escaping.
//!
//! Keeping both directions on the same predicates is what makes the quoting
//! decisions of the encoder line up with the type inference of the decoder.

use serde_json::Number;

/// Strict number literal as the decoder accepts it:
/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
pub(crate) fn is_number_literal(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = 0;
    if b.first() == Some(&b'-') {
        i += 1;
    }
    match b.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            while b.get(i).is_some_and(u8::is_ascii_digit) {
                i += 1;
            }
        }
        _ => return false,
    }
    if b.get(i) == Some(&b'.') {
        i += 1;
        let start = i;
        while b.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    if matches!(b.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(b.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let start = i;
        while b.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        if i == start {
            return false;
        }
    }
    i == b.len()
}

/// Broader numeric shape used for quoting: also matches leading-zero forms like
/// `05` or `-007`, which decode as strings but read as numbers to humans.
pub(crate) fn looks_numeric(s: &str) -> bool {
    if is_number_literal(s) {
        return true;
    }
    let digits = s.strip_prefix('-').unwrap_or(s);
    digits.len() > 1
        && digits.starts_with('0')
        && digits
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
}

/// Convert a number literal (already validated by [`is_number_literal`]) into a
/// JSON number, preferring exact integer representations.
pub(crate) fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    if let Ok(u) = s.parse::<u64>() {
        return Some(Number::from(u));
    }
    let f = s.parse::<f64>().ok()?;
    // -0.0 and 0.0 are the same JSON number
    let f = if f == 0.0 { 0.0 } else { f };
    Number::from_f64(f)
}

/// Keys matching `^[A-Za-z_][A-Za-z0-9_.]*$` are written without quotes.
pub(crate) fn is_identifier_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

/// Append `s` wrapped in double quotes, escaping the five TOON escapes.
pub(crate) fn push_quoted(s: &str, out: &mut String) {
    out.reserve(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
}
