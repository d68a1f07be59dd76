//! # untracker - Tracker Module Stem Extractor
//!
//! Renders every instrument or sample of a tracker module to its own audio
//! file, skipping sources that never sound.
//!
//! ## Architecture
//!
//! untracker is an umbrella crate that coordinates:
//! - **untracker-core** - Render configuration, sound sources, the `SynthesisSession` interface
//! - **untracker-mod** - Built-in ProTracker MOD engine (loader, sequencer, mixer)
//! - **untracker-stems** - Enumeration, solo muting, silence prescan, streaming render
//! - **untracker-export** - WAV, FLAC, Ogg Vorbis and Ogg Opus writers
//!
//! ## Quick Start
//!
//! ```ignore
//! use untracker::prelude::*;
//!
//! let report = Extraction::builder()
//!     .input("space_debris.mod")
//!     .output_dir("stems")
//!     .sample_rate(48_000)
//!     .run()?;
//!
//! for path in report.written() {
//!     println!("{}", path.display());
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - `wav` and `flac`
//! - `vorbis` - Ogg Vorbis output
//! - `opus` - Ogg Opus output
//! - `files` - Every output format

/// Re-export of untracker-core for direct access
pub use untracker_core as core;

/// Output writers
pub use untracker_export as export;

/// Built-in MOD engine
pub use untracker_mod as module;

/// Stem extraction
pub use untracker_stems as stems;

pub use untracker_core::{
    AudioFormat, BitDepth, ChannelLayout, Interpolation, LoadSession, RenderConfig, SoundSource,
    SourceKind, SynthesisSession,
};
pub use untracker_mod::ModSession;
pub use untracker_stems::{ExtractionReport, StemExtractor, StemOutcome, StemReport};

pub mod cli;
mod builder;
mod error;

pub use builder::{Extraction, ExtractionBuilder};
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{Extraction, ExtractionBuilder, ExtractionReport, StemOutcome};

    pub use crate::core::{AudioFormat, Interpolation, RenderConfig};

    pub use crate::core::{LoadSession, SynthesisSession};
    pub use crate::stems::StemExtractor;
    pub use crate::ModSession;

    pub use crate::export::FileBackend;
}
