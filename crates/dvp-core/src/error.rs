//! # Error Types
//!
//! Errors raised by the foundational types. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.

use thiserror::Error;

use crate::encoding::Encoding;

/// Top-level error type for `dvp-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A plugin identifier did not match the accepted format.
    #[error("invalid plugin id {input:?}: {reason}")]
    InvalidPluginId {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An ingestion strategy name was not recognized.
    #[error("unknown plugin type {0:?} (expected DIRECT or STAGED)")]
    UnknownPluginType(String),

    /// A host type name was not recognized.
    #[error("unknown host type {0:?} (expected UNIX or WINDOWS)")]
    UnknownHostType(String),

    /// An encoding name was not recognized.
    #[error("unknown encoding {0:?}")]
    UnknownEncoding(String),

    /// Text could not be encoded.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Bytes could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Text contained a character that the target encoding cannot represent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot encode {character:?} at position {position} with encoding {encoding}")]
pub struct EncodeError {
    /// The encoding that was requested.
    pub encoding: Encoding,
    /// The offending character.
    pub character: char,
    /// Character index of the offending character.
    pub position: usize,
}

/// None of the attempted encodings could decode a byte string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not decode value with encodings {}", format_encodings(.attempted))]
pub struct DecodeError {
    /// Every encoding tried, in order.
    pub attempted: Vec<Encoding>,
}

fn format_encodings(encodings: &[Encoding]) -> String {
    let names: Vec<&str> = encodings.iter().map(|e| e.name()).collect();
    format!("[{}]", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_every_encoding() {
        let err = DecodeError {
            attempted: vec![Encoding::Utf8, Encoding::Ascii],
        };
        assert_eq!(
            err.to_string(),
            "could not decode value with encodings [utf-8, ascii]"
        );
    }

    #[test]
    fn encode_error_display() {
        let err = EncodeError {
            encoding: Encoding::Ascii,
            character: 'é',
            position: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("ascii"));
        assert!(msg.contains("position 3"));
    }

    #[test]
    fn unknown_plugin_type_display() {
        let err = CoreError::UnknownPluginType("HYBRID".to_string());
        assert!(err.to_string().contains("HYBRID"));
    }
}
