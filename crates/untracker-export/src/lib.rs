//! # Untracker Export
//!
//! Streaming stem writers for untracker.
//!
//! A [`WriterBackend`] opens an [`AudioWriter`] for a path and a
//! [`WriterSpec`]. Writers accept interleaved `f32` blocks as they are
//! rendered, so a stem never has to fit in memory (FLAC excepted, see
//! [`format::flac`]).
//!
//! ```ignore
//! use untracker_export::{FileBackend, WriterBackend, WriterSpec};
//!
//! let mut writer = FileBackend.open("001-kick.wav".as_ref(), &WriterSpec::default())?;
//! writer.write_frames(&block)?;
//! writer.finalize()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `wav` (default): WAV via hound (pure Rust)
//! - `flac` (default): FLAC via flacenc (pure Rust)
//! - `vorbis`: Ogg Vorbis via vorbis_rs
//! - `opus`: Ogg Opus via libopus and the ogg crate

pub mod error;
mod options;
mod writer;

pub mod format;

pub use error::{ExportError, Result};
pub use options::WriterSpec;
pub use writer::{AudioWriter, FileBackend, WriterBackend};
