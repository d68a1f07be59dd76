//! Ogg Vorbis encoder using vorbis_rs
//!
//! Quality 0-10 maps to the encoder's VBR target quality 0.0-1.0.

use crate::error::{ExportError, Result};
use crate::options::WriterSpec;
use crate::writer::{whole_frames, AudioWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::num::{NonZeroU32, NonZeroU8};
use std::path::Path;
use vorbis_rs::{VorbisBitrateManagementStrategy, VorbisEncoder, VorbisEncoderBuilder};

/// Streaming Ogg Vorbis writer.
pub struct VorbisStemWriter {
    encoder: VorbisEncoder<BufWriter<File>>,
    /// Planar scratch buffers reused across blocks.
    planar: Vec<Vec<f32>>,
}

impl VorbisStemWriter {
    pub fn create(path: &Path, spec: &WriterSpec) -> Result<Self> {
        let sample_rate = NonZeroU32::new(spec.sample_rate)
            .ok_or_else(|| ExportError::InvalidOptions("sample rate must be non-zero".into()))?;
        let channels = u8::try_from(spec.channels)
            .ok()
            .and_then(NonZeroU8::new)
            .ok_or_else(|| {
                ExportError::UnsupportedFormat(format!(
                    "Vorbis cannot encode {} channels",
                    spec.channels
                ))
            })?;

        let sink = BufWriter::new(File::create(path)?);
        let mut builder = VorbisEncoderBuilder::new(sample_rate, channels, sink)?;
        builder.bitrate_management_strategy(VorbisBitrateManagementStrategy::QualityVbr {
            target_quality: target_quality(spec.vorbis_quality),
        });
        let encoder = builder.build()?;

        Ok(Self {
            encoder,
            planar: vec![Vec::new(); spec.channel_count()],
        })
    }
}

impl AudioWriter for VorbisStemWriter {
    fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize> {
        let channels = self.planar.len();
        let frames = whole_frames(interleaved, channels)?;
        if frames == 0 {
            return Ok(0);
        }

        for (ch, plane) in self.planar.iter_mut().enumerate() {
            plane.clear();
            plane.extend(interleaved.iter().skip(ch).step_by(channels).copied());
        }
        self.encoder.encode_audio_block(&self.planar)?;
        Ok(frames)
    }

    fn finalize(self: Box<Self>) -> Result<()> {
        let mut sink = self.encoder.finish()?;
        sink.flush()?;
        Ok(())
    }
}

fn target_quality(quality: u8) -> f32 {
    f32::from(quality.min(10)) / 10.0
}
