//! Builder for configuring and running one stem extraction.

use crate::{Error, Result};
use std::path::PathBuf;
use untracker_core::{AudioFormat, Interpolation, LoadSession, RenderConfig, SynthesisSession};
use untracker_export::FileBackend;
use untracker_mod::ModSession;
use untracker_stems::{ExtractionReport, StemExtractor};

/// Loads a module with the built-in engine and writes its stems to disk.
///
/// Settings not given keep the [`RenderConfig`] defaults, except that an
/// unset sample rate follows [`AudioFormat::default_sample_rate`] (48 kHz
/// for Opus). The whole configuration is validated before the input file
/// is opened.
///
/// # Example
///
/// ```ignore
/// use untracker::prelude::*;
///
/// let report = Extraction::builder()
///     .input("songs/space_debris.mod")
///     .output_dir("stems")
///     .format(AudioFormat::Flac)
///     .run()?;
///
/// println!("{} stems written", report.written().len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExtractionBuilder {
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    config: RenderConfig,
    rate_set: bool,
}

impl ExtractionBuilder {
    /// Module file to extract from. Required.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// Directory the per-composition stem folder is created in. Required.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Replaces every render setting at once, sample rate included.
    pub fn config(mut self, config: RenderConfig) -> Self {
        self.config = config;
        self.rate_set = true;
        self
    }

    /// Default: the output format's default rate
    pub fn sample_rate(mut self, hz: u32) -> Self {
        self.config.sample_rate = hz;
        self.rate_set = true;
        self
    }

    /// Default: 2
    pub fn channels(mut self, count: u16) -> Self {
        self.config.channels = count;
        self
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.config.interpolation = interpolation;
        self
    }

    /// Percent, 0 renders mono. Default: 100
    pub fn stereo_separation(mut self, percent: u32) -> Self {
        self.config.stereo_separation = percent;
        self
    }

    pub fn format(mut self, format: AudioFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Default: 16
    pub fn bit_depth(mut self, bits: u16) -> Self {
        self.config.bit_depth = bits;
        self
    }

    pub fn vorbis_quality(mut self, quality: u8) -> Self {
        self.config.vorbis_quality = quality;
        self
    }

    pub fn opus_bitrate(mut self, kbps: u32) -> Self {
        self.config.opus_bitrate_kbps = kbps;
        self
    }

    /// Settings the run will use.
    pub fn render_config(&self) -> RenderConfig {
        let mut config = self.config.clone();
        if !self.rate_set {
            config.sample_rate = config.format.default_sample_rate();
        }
        config
    }

    pub fn run(self) -> Result<ExtractionReport> {
        let config = self.render_config();
        let input = self.input.ok_or(Error::Missing("input file"))?;
        let output_dir = self.output_dir.ok_or(Error::Missing("output directory"))?;
        config.validate()?;

        let session = ModSession::load_file(&input)?;
        tracing::info!(
            "Loaded {} ({} channels, {:.2}s)",
            input.display(),
            session.num_channels(),
            session.duration_seconds()
        );

        let mut extractor = StemExtractor::new(session, config, FileBackend::new())?;
        let report = extractor.extract(&input.to_string_lossy(), &output_dir)?;
        Ok(report)
    }
}

/// Entry point for [`ExtractionBuilder`].
pub struct Extraction;

impl Extraction {
    pub fn builder() -> ExtractionBuilder {
        ExtractionBuilder::default()
    }
}
