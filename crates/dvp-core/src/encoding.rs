//! # Text/Byte Normalization
//!
//! Converts arbitrarily nested values between text and bytes so that data
//! crossing the engine boundary has one canonical representation.
//!
//! - [`to_bytes`] encodes every text leaf with one encoding (UTF-8 unless
//!   told otherwise).
//! - [`to_str`] decodes every byte leaf, trying each encoding of a list in
//!   order (utf-8, utf-16, latin-1, ascii unless told otherwise). When none
//!   succeeds the [`DecodeError`] names every encoding attempted.
//!
//! Map keys are left untouched; only values are converted. Leaves that are
//! neither text nor bytes pass through unchanged.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, DecodeError, EncodeError};

/// Encodings understood by the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Encoding {
    Utf8,
    /// UTF-16 with byte-order mark. Encoding emits a little-endian BOM;
    /// decoding honours a BOM and otherwise assumes little-endian.
    Utf16,
    /// ISO-8859-1. Every byte string decodes.
    Latin1,
    Ascii,
}

/// Decode order used when the caller supplies no encodings.
pub static DEFAULT_DECODE_ENCODINGS: [Encoding; 4] = [
    Encoding::Utf8,
    Encoding::Utf16,
    Encoding::Latin1,
    Encoding::Ascii,
];

/// Encoding used when the caller supplies none.
pub const DEFAULT_ENCODE_ENCODING: Encoding = Encoding::Utf8;

impl Encoding {
    /// Canonical lower-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16 => "utf-16",
            Self::Latin1 => "latin-1",
            Self::Ascii => "ascii",
        }
    }

    /// Encode a string.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, EncodeError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Utf16 => {
                let mut out = Vec::with_capacity(2 + text.len() * 2);
                out.extend_from_slice(&[0xFF, 0xFE]);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                Ok(out)
            }
            Self::Latin1 => encode_single_byte(text, 0xFF, *self),
            Self::Ascii => encode_single_byte(text, 0x7F, *self),
        }
    }

    /// Decode a byte string, or `None` if the bytes are not valid in this
    /// encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
            Self::Utf16 => decode_utf16(bytes),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Ascii => {
                if bytes.is_ascii() {
                    Some(bytes.iter().map(|&b| char::from(b)).collect())
                } else {
                    None
                }
            }
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Encoding {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-16" | "utf16" => Ok(Self::Utf16),
            "latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            _ => Err(CoreError::UnknownEncoding(s.to_string())),
        }
    }
}

fn encode_single_byte(text: &str, max: u32, encoding: Encoding) -> Result<Vec<u8>, EncodeError> {
    text.chars()
        .enumerate()
        .map(|(position, character)| {
            let code = u32::from(character);
            if code <= max {
                // `code <= 0xFF` so the cast is lossless.
                Ok(code as u8)
            } else {
                Err(EncodeError {
                    encoding,
                    character,
                    position,
                })
            }
        })
        .collect()
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    let (body, big_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (rest, false),
        [0xFE, 0xFF, rest @ ..] => (rest, true),
        _ => (bytes, false),
    };
    if body.len() % 2 != 0 {
        return None;
    }
    let units = body.chunks_exact(2).map(|pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// A nested value whose text/byte leaves can be normalized.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NestedValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<NestedValue>),
    Set(BTreeSet<NestedValue>),
    Map(BTreeMap<String, NestedValue>),
}

impl From<&str> for NestedValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for NestedValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<u8>> for NestedValue {
    fn from(b: Vec<u8>) -> Self {
        Self::Bytes(b)
    }
}

impl NestedValue {
    /// Borrow the text of a `Text` leaf.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the bytes of a `Bytes` leaf.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

/// Encode every text leaf of `value`.
///
/// `None` selects UTF-8.
///
/// # Errors
///
/// Returns [`EncodeError`] if a text leaf contains a character the
/// encoding cannot represent.
pub fn to_bytes(
    value: NestedValue,
    encoding: Option<Encoding>,
) -> Result<NestedValue, EncodeError> {
    let encoding = encoding.unwrap_or(DEFAULT_ENCODE_ENCODING);
    encode_nested(value, encoding)
}

fn encode_nested(value: NestedValue, encoding: Encoding) -> Result<NestedValue, EncodeError> {
    Ok(match value {
        NestedValue::Text(s) => NestedValue::Bytes(encoding.encode(&s)?),
        NestedValue::List(items) => NestedValue::List(
            items
                .into_iter()
                .map(|v| encode_nested(v, encoding))
                .collect::<Result<_, _>>()?,
        ),
        NestedValue::Set(items) => NestedValue::Set(
            items
                .into_iter()
                .map(|v| encode_nested(v, encoding))
                .collect::<Result<_, _>>()?,
        ),
        NestedValue::Map(entries) => NestedValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| Ok((k, encode_nested(v, encoding)?)))
                .collect::<Result<_, EncodeError>>()?,
        ),
        other => other,
    })
}

/// Decode every byte leaf of `value`.
///
/// Each leaf is decoded with the first encoding in `encodings` that
/// accepts it. `None` or an empty slice selects
/// [`DEFAULT_DECODE_ENCODINGS`].
///
/// # Errors
///
/// Returns [`DecodeError`] naming every attempted encoding if a byte leaf
/// cannot be decoded by any of them.
pub fn to_str(
    value: NestedValue,
    encodings: Option<&[Encoding]>,
) -> Result<NestedValue, DecodeError> {
    let encodings = match encodings {
        Some(list) if !list.is_empty() => list,
        _ => &DEFAULT_DECODE_ENCODINGS[..],
    };
    decode_nested(value, encodings)
}

fn decode_nested(value: NestedValue, encodings: &[Encoding]) -> Result<NestedValue, DecodeError> {
    Ok(match value {
        NestedValue::Bytes(b) => NestedValue::Text(decode_first(&b, encodings)?),
        NestedValue::List(items) => NestedValue::List(
            items
                .into_iter()
                .map(|v| decode_nested(v, encodings))
                .collect::<Result<_, _>>()?,
        ),
        NestedValue::Set(items) => NestedValue::Set(
            items
                .into_iter()
                .map(|v| decode_nested(v, encodings))
                .collect::<Result<_, _>>()?,
        ),
        NestedValue::Map(entries) => NestedValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| Ok((k, decode_nested(v, encodings)?)))
                .collect::<Result<_, DecodeError>>()?,
        ),
        other => other,
    })
}

fn decode_first(bytes: &[u8], encodings: &[Encoding]) -> Result<String, DecodeError> {
    encodings
        .iter()
        .find_map(|e| e.decode(bytes))
        .ok_or_else(|| DecodeError {
            attempted: encodings.to_vec(),
        })
}
