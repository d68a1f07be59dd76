//! FLAC format encoder using flacenc
//!
//! flacenc encodes from a complete in-memory source, so frames are quantised
//! as they arrive and the stream is encoded when the writer is finalized.
//! The output file is created up front so that path and permission problems
//! surface when the writer is opened.

use crate::error::{ExportError, Result};
use crate::options::{quantize, WriterSpec};
use crate::writer::{whole_frames, AudioWriter};
use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config::Encoder as EncoderConfig;
use flacenc::encode_with_fixed_block_size;
use flacenc::error::Verify;
use flacenc::source::MemSource;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use untracker_core::BitDepth;

/// Samples per FLAC block.
pub const FLAC_BLOCK_SIZE: usize = 4096;

/// FLAC writer that encodes on finalize.
pub struct FlacStemWriter {
    file: BufWriter<File>,
    samples: Vec<i32>,
    channels: usize,
    bit_depth: BitDepth,
    sample_rate: u32,
}

impl FlacStemWriter {
    pub fn create(path: &Path, spec: &WriterSpec) -> Result<Self> {
        if spec.channels == 0 || spec.channels > 8 {
            return Err(ExportError::UnsupportedFormat(format!(
                "FLAC supports 1-8 channels, got {}",
                spec.channels
            )));
        }
        let file = BufWriter::new(File::create(path)?);
        Ok(Self {
            file,
            samples: Vec::new(),
            channels: spec.channel_count(),
            bit_depth: spec.bit_depth,
            sample_rate: spec.sample_rate,
        })
    }
}

impl AudioWriter for FlacStemWriter {
    fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize> {
        let frames = whole_frames(interleaved, self.channels)?;
        let bit_depth = self.bit_depth;
        self.samples
            .extend(interleaved.iter().map(|&s| quantize(s, bit_depth)));
        Ok(frames)
    }

    fn finalize(self: Box<Self>) -> Result<()> {
        let this = *self;
        let bytes = encode_flac(&this.samples, this.channels, this.bit_depth, this.sample_rate)?;
        let mut file = this.file;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }
}

/// Encode interleaved integer samples to a complete FLAC stream.
pub fn encode_flac(
    interleaved: &[i32],
    channels: usize,
    bit_depth: BitDepth,
    sample_rate: u32,
) -> Result<Vec<u8>> {
    let encoder_config = EncoderConfig::default()
        .into_verified()
        .map_err(|e| ExportError::Encoding(format!("Invalid FLAC config: {:?}", e)))?;

    let source = MemSource::from_samples(
        interleaved,
        channels,
        bit_depth.bits() as usize,
        sample_rate as usize,
    );

    let stream = encode_with_fixed_block_size(&encoder_config, source, FLAC_BLOCK_SIZE)
        .map_err(|e| ExportError::Encoding(format!("FLAC encoding failed: {:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| ExportError::Encoding(format!("Failed to write FLAC stream: {:?}", e)))?;

    Ok(sink.into_inner())
}
