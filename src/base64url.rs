use base64::engine::{
    general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD as BASE64_URL},
    Engine,
};

use crate::error::{Error, Result};

/// Encodes bytes as unpadded, URL-safe base64.
pub fn encode(bytes: impl AsRef<[u8]>) -> String {
    BASE64_URL.encode(bytes)
}

/// Decodes unpadded, URL-safe base64 into bytes.
///
/// Padding and the standard alphabet are restored first, then the text is decoded as
/// standard base64. Input outside the URL-safe alphabet, a length that leaves a remainder of
/// one modulo four, and non-canonical trailing bits are all rejected.
pub fn decode(s: &str) -> Result<Vec<u8>> {
    let b64 = b64u_to_b64(s)?;
    let bytes = BASE64.decode(b64)?;

    Ok(bytes)
}

/// Encodes the UTF-8 bytes of `s` as base64url.
pub fn encode_str(s: &str) -> String {
    encode(s.as_bytes())
}

/// Decodes base64url into UTF-8 text.
pub fn decode_to_string(s: &str) -> Result<String> {
    let bytes = decode(s)?;
    let text = String::from_utf8(bytes)?;

    Ok(text)
}

/// Converts standard base64 into base64url by dropping padding and swapping `+`/`/` for `-`/`_`.
pub fn b64_to_b64u(s: &str) -> String {
    s.trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            c => c,
        })
        .collect()
}

/// Converts base64url into padded standard base64.
///
/// # Errors
/// Returns [`Error::Decode`] if `s` contains characters outside the URL-safe alphabet or its
/// length leaves a remainder of one modulo four.
pub fn b64u_to_b64(s: &str) -> Result<String> {
    if let Some(c) = s.chars().find(|c| !is_b64u_char(*c)) {
        return Err(Error::Decode(format!(
            "invalid base64url character '{}'",
            c.escape_default()
        )));
    }

    let padding = match s.len() % 4 {
        0 => "",
        2 => "==",
        3 => "=",
        _ => {
            return Err(Error::Decode(format!(
                "invalid base64url length {}",
                s.len()
            )))
        }
    };

    let mut b64 = String::with_capacity(s.len() + padding.len());
    b64.extend(s.chars().map(|c| match c {
        '-' => '+',
        '_' => '/',
        c => c,
    }));
    b64.push_str(padding);

    Ok(b64)
}

/// Returns `true` if `s` is non-empty and consists only of URL-safe base64 characters.
pub fn is_b64u(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_b64u_char)
}

fn is_b64u_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Lowercase hexadecimal encoding.
pub fn to_hex(bytes: impl AsRef<[u8]>) -> String {
    hex::encode(bytes)
}

/// Decodes a hexadecimal string.
pub fn from_hex(s: &str) -> Result<Vec<u8>> {
    let bytes = hex::decode(s)?;

    Ok(bytes)
}

/// Hex encoding of the UTF-8 bytes of `s`.
pub fn str_to_hex(s: &str) -> String {
    to_hex(s.as_bytes())
}

/// Re-encodes a hexadecimal string as base64url.
pub fn hex_to_b64u(s: &str) -> Result<String> {
    let bytes = from_hex(s)?;

    Ok(encode(bytes))
}

/// Re-encodes base64url as lowercase hexadecimal.
pub fn b64u_to_hex(s: &str) -> Result<String> {
    let bytes = decode(s)?;

    Ok(to_hex(bytes))
}
