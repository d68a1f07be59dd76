//! Command-line interface.

use crate::builder::{Extraction, ExtractionBuilder};
use clap::Parser;
use std::path::PathBuf;
use untracker_core::{AudioFormat, Interpolation, RenderConfig};

#[derive(Parser, Debug, Clone)]
#[command(name = "untracker", version)]
#[command(about = "Extract one audio stem per instrument or sample from a tracker module", long_about = None)]
pub struct Cli {
    /// Input module file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory (a subdirectory named after the module is created in it)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Sample rate in Hz, 8000-192000 (default: 44100, or 48000 for opus)
    #[arg(long)]
    pub sample_rate: Option<u32>,

    /// Output channels: 1, 2 or 4
    #[arg(long, default_value_t = 2)]
    pub channels: u16,

    /// Resampling: nearest, linear, cubic or sinc
    #[arg(long, default_value = "cubic")]
    pub resample: Interpolation,

    /// Output format: wav, flac, vorbis or opus
    #[arg(long, default_value = "wav")]
    pub format: AudioFormat,

    /// Bit depth for wav and flac: 16 or 24
    #[arg(long, default_value_t = 16)]
    pub bit_depth: u16,

    /// Opus bitrate in kbps, 16-512
    #[arg(long, default_value_t = 128)]
    pub opus_bitrate: u32,

    /// Vorbis quality, 0-10
    #[arg(long, default_value_t = 5)]
    pub vorbis_quality: u8,

    /// Stereo separation in percent, 0-200 (0 renders mono)
    #[arg(long, default_value_t = 100)]
    pub stereo_separation: u32,
}

impl Cli {
    /// Render settings as requested. Ranges are checked later by
    /// [`RenderConfig::validate`].
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            sample_rate: self
                .sample_rate
                .unwrap_or_else(|| self.format.default_sample_rate()),
            channels: self.channels,
            interpolation: self.resample,
            stereo_separation: self.stereo_separation,
            format: self.format,
            bit_depth: self.bit_depth,
            vorbis_quality: self.vorbis_quality,
            opus_bitrate_kbps: self.opus_bitrate,
        }
    }

    pub fn into_builder(self) -> ExtractionBuilder {
        let config = self.render_config();
        Extraction::builder()
            .input(self.input)
            .output_dir(self.output)
            .config(config)
    }
}
