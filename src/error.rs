//! Unified error type for encode and decode operations.

use alloc::string::String;

use crate::pipeline::EntryPoint;

/// Errors from encoding, decoding, and writing WebP data.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CodecError {
    /// The output sink failed (file creation or write).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The codec rejected the pixels or the configuration.
    #[error("{entry} failed: {message}")]
    Encode { entry: EntryPoint, message: String },

    /// The input is not a decodable WebP bitstream.
    #[error("decode failed: {0}")]
    Decode(String),

    /// A pixel buffer was constructed from inconsistent parts.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl CodecError {
    /// Wrap a codec diagnostic for the given entry point.
    pub fn encode(entry: EntryPoint, message: impl Into<String>) -> Self {
        CodecError::Encode {
            entry,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_error_names_entry_point() {
        let err = CodecError::encode(EntryPoint::LosslessGray, "VP8_ENC_ERROR_BAD_DIMENSION");
        assert_eq!(
            err.to_string(),
            "lossless-gray failed: VP8_ENC_ERROR_BAD_DIMENSION"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: CodecError = io.into();
        assert!(matches!(err, CodecError::Io(_)));
        assert!(core::error::Error::source(&err).is_some());
        assert_eq!(err.to_string(), "i/o error: read-only");
    }
}
