//! Writer errors.

use std::io;
use thiserror::Error;

/// Failure opening, feeding, or finalizing a stem writer.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Format not compiled in, or a rate/channel combination the codec refuses
    #[error("Format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Bad writer options: {0}")]
    InvalidOptions(String),

    /// The codec rejected the stream
    #[error("Encoder failed: {0}")]
    Encoding(String),

    /// Interleaved block not a whole number of frames
    #[error("Malformed block: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;

// Codec errors are flattened to strings at the API boundary

#[cfg(feature = "wav")]
impl From<hound::Error> for ExportError {
    fn from(e: hound::Error) -> Self {
        match e {
            hound::Error::IoError(io) => ExportError::Io(io),
            other => ExportError::Encoding(other.to_string()),
        }
    }
}

#[cfg(feature = "vorbis")]
impl From<vorbis_rs::VorbisError> for ExportError {
    fn from(e: vorbis_rs::VorbisError) -> Self {
        ExportError::Encoding(format!("Vorbis: {e}"))
    }
}

#[cfg(feature = "opus")]
impl From<opus::Error> for ExportError {
    fn from(e: opus::Error) -> Self {
        ExportError::Encoding(format!("Opus: {e}"))
    }
}
