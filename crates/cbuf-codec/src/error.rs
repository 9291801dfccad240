//! Codec errors.

use thiserror::Error;

/// Codec result type.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors raised while sizing, encoding, or decoding messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),

    #[error("buffer too small: needed {needed} bytes, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    #[error("bad magic 0x{0:08x}")]
    BadMagic(u32),

    #[error("no schema registered for hash {0:#018x}")]
    HashNotFound(u64),

    #[error("framed size {size} exceeds buffer ({available} bytes available)")]
    SizeExceedsBuffer { size: usize, available: usize },

    #[error("frame declares {declared} bytes but decoding consumed {consumed}")]
    SizeMismatch { declared: usize, consumed: usize },

    #[error("unsupported value for '{field}': {detail}")]
    UnsupportedType { field: String, detail: String },
}

impl CodecError {
    /// Shorthand for the value-shape error.
    pub(crate) fn unsupported(field: &str, detail: impl Into<String>) -> Self {
        Self::UnsupportedType {
            field: field.to_owned(),
            detail: detail.into(),
        }
    }
}
