//! Error types for untracker-stems

use std::path::PathBuf;
use thiserror::Error;
use untracker_core::AudioFormat;
use untracker_export::ExportError;

/// Fatal extraction errors. Any of these aborts the run.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration or engine rejection of a render parameter
    #[error(transparent)]
    Core(#[from] untracker_core::Error),

    /// The engine offers no per-source mute control at all
    #[error("Muting is not available for this composition")]
    MutingUnavailable,

    /// The writer backend cannot produce the requested format
    #[error("Output format '{0}' is not supported by this build")]
    UnsupportedFormat(AudioFormat),

    /// Writer options could not be derived from the configuration
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Result type for extraction
pub type Result<T> = std::result::Result<T, Error>;

/// A failure confined to one stem. The run continues with the next source.
#[derive(Error, Debug)]
pub enum StemError {
    #[error("could not create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not open output file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: ExportError,
    },

    #[error("write to {} failed: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: ExportError,
    },

    #[error("short write to {}: {written} of {expected} frames", .path.display())]
    ShortWrite {
        path: PathBuf,
        written: usize,
        expected: usize,
    },

    #[error("could not finalize {}: {source}", .path.display())]
    Finalize {
        path: PathBuf,
        #[source]
        source: ExportError,
    },
}

impl StemError {
    /// Output path the failed stem would have been written to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            StemError::CreateDir { path, .. }
            | StemError::Open { path, .. }
            | StemError::Write { path, .. }
            | StemError::ShortWrite { path, .. }
            | StemError::Finalize { path, .. } => path,
        }
    }
}
