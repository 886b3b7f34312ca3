//! Raw query-string splitting and percent decoding.

use std::borrow::Cow;
use std::str;

use crate::error::ParseError;

/// The payload of one `key[=value]` pair.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum PairValue<'qs> {
    /// `key=value`
    String(Cow<'qs, str>),
    /// `key=` with an explicitly empty value
    Null,
    /// bare `key` with no `=` at all
    NoValue,
}

/// Splits a raw query string on `&` and `=` and decodes each component.
///
/// Empty segments (`a=1&&b=2`) are skipped. Only the first `=` of a segment
/// separates; later ones belong to the value. Invalid UTF-8 after percent
/// decoding is a parse error carrying the byte offset of the component.
pub(crate) fn parse_pairs(input: &str) -> Result<Vec<(Cow<'_, str>, PairValue<'_>)>, ParseError> {
    let bytes = input.as_bytes();
    let mut pairs = Vec::new();
    let mut offset = 0;
    for segment in bytes.split(|&b| b == b'&') {
        if !segment.is_empty() {
            let (key, value) = match segment.iter().position(|&b| b == b'=') {
                Some(sep) => {
                    let raw_value = &segment[sep + 1..];
                    let value = if raw_value.is_empty() {
                        PairValue::Null
                    } else {
                        PairValue::String(decode_component(raw_value, offset + sep + 1)?)
                    };
                    (&segment[..sep], value)
                }
                None => (segment, PairValue::NoValue),
            };
            pairs.push((decode_component(key, offset)?, value));
        }
        offset += segment.len() + 1;
    }
    Ok(pairs)
}

/// Decodes one key or value component and checks the result is UTF-8.
fn decode_component(input: &[u8], position: usize) -> Result<Cow<'_, str>, ParseError> {
    match percent_decode(input) {
        Cow::Borrowed(bytes) => str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| ParseError::new("invalid UTF-8 in query string", position)),
        Cow::Owned(bytes) => String::from_utf8(bytes)
            .map(Cow::Owned)
            .map_err(|_| ParseError::new("invalid UTF-8 in percent-encoded sequence", position)),
    }
}

/// Replaces `+` with a space and resolves `%xx` escapes, borrowing the input
/// when nothing needs rewriting.
fn percent_decode(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.iter().any(|&b| b == b'%' || b == b'+') {
        return Cow::Borrowed(input);
    }
    let mut decoded = Vec::with_capacity(input.len());
    let mut rest = input;
    while let Some((&byte, tail)) = rest.split_first() {
        match byte {
            b'+' => {
                decoded.push(b' ');
                rest = tail;
            }
            b'%' => {
                if let [hi, lo, remainder @ ..] = tail {
                    if let (Some(hi), Some(lo)) = (hex_digit(*hi), hex_digit(*lo)) {
                        decoded.push(hi * 0x10 + lo);
                        rest = remainder;
                        continue;
                    }
                }
                // not a valid escape, keep the literal byte
                decoded.push(b'%');
                rest = tail;
            }
            _ => {
                decoded.push(byte);
                rest = tail;
            }
        }
    }
    Cow::Owned(decoded)
}

fn hex_digit(byte: u8) -> Option<u8> {
    char::from(byte).to_digit(16).map(|digit| digit as u8)
}
