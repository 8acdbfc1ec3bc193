//! Encoding of extended header parameters (RFC 5987), as used by e.g.
//! `Content-Disposition: attachment; filename*=UTF-8''na%C3%AFve.txt`.

use std::fmt::Write;

use crate::http::error::HeaderError;

/// Encodes `input` into the `charset''percent-encoded-octets` form.
///
/// `US-ASCII` input is returned unchanged. `UTF-8` and `ISO-8859-1` are
/// encoded; any other charset is rejected. Charset names are matched
/// case-insensitively.
pub fn encode_header_field_param(input: &str, charset: &str) -> Result<String, HeaderError> {
    let (name, bytes) = if charset.eq_ignore_ascii_case("US-ASCII") {
        return Ok(input.to_string());
    } else if charset.eq_ignore_ascii_case("UTF-8") {
        ("UTF-8", input.as_bytes().to_vec())
    } else if charset.eq_ignore_ascii_case("ISO-8859-1") {
        ("ISO-8859-1", to_latin1(input))
    } else {
        return Err(HeaderError::UnsupportedCharset(charset.to_string()));
    };

    let mut out = String::with_capacity(name.len() + 2 + bytes.len() * 2);
    out.push_str(name);
    out.push_str("''");
    for b in bytes {
        if is_attr_char(b) {
            out.push(b as char);
        } else {
            // writing to a String cannot fail
            let _ = write!(out, "%{:02X}", b);
        }
    }
    Ok(out)
}

/// Chars outside Latin-1 become `?`.
fn to_latin1(input: &str) -> Vec<u8> {
    input
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn is_attr_char(b: u8) -> bool {
    b.is_ascii_alphanumeric()
        || matches!(
            b,
            b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
        )
}
