//! # untracker-stems
//!
//! Per-source stem extraction for tracker modules.
//!
//! For every instrument or sample of a loaded composition the extractor
//! mutes everything else, prescans for signal, and streams the soloed render
//! into one audio file. Sources that never sound produce no file.
//!
//! ```ignore
//! use untracker_stems::StemExtractor;
//! use untracker_export::FileBackend;
//!
//! let mut extractor = StemExtractor::new(session, config, FileBackend::new())?;
//! let report = extractor.extract("song.mod", Path::new("stems"))?;
//! for path in report.written() {
//!     println!("{}", path.display());
//! }
//! ```

pub mod enumerator;
pub mod error;
mod extractor;
pub mod mute;
pub mod paths;
pub mod pipeline;
pub mod prescan;

#[cfg(test)]
mod testing;

pub use enumerator::enumerate_sources;
pub use error::{Error, Result, StemError};
pub use extractor::{ExtractionReport, StemExtractor, StemOutcome, StemPhase, StemReport};
pub use mute::{MuteController, MuteReport};
pub use paths::{sanitize_filename, stem_file_name, StemOutputDescriptor};
pub use pipeline::{render_stem, RenderStats, BLOCK_FRAMES};
pub use prescan::{prescan, Prescan};
