//! Writer handles and the backend that opens them.

use crate::{ExportError, Result, WriterSpec};
use std::path::Path;
use untracker_core::AudioFormat;

/// An open output file accepting interleaved `f32` frames.
pub trait AudioWriter {
    /// Appends interleaved frames. Returns the number of whole frames accepted.
    fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize>;

    /// Flushes, writes trailers, and closes the file.
    fn finalize(self: Box<Self>) -> Result<()>;
}

/// Opens writers for a given path and spec.
pub trait WriterBackend {
    fn open(&self, path: &Path, spec: &WriterSpec) -> Result<Box<dyn AudioWriter>>;

    /// Whether `format` can be written by this backend at all.
    fn supports(&self, format: AudioFormat) -> bool;
}

/// Writes real files, dispatching on [`AudioFormat`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBackend;

impl FileBackend {
    pub fn new() -> Self {
        Self
    }

    /// Formats compiled into this build.
    pub fn enabled_formats() -> Vec<AudioFormat> {
        AudioFormat::ALL
            .into_iter()
            .filter(|f| FileBackend.supports(*f))
            .collect()
    }
}

impl WriterBackend for FileBackend {
    #[allow(unused_variables)]
    fn open(&self, path: &Path, spec: &WriterSpec) -> Result<Box<dyn AudioWriter>> {
        match spec.format {
            AudioFormat::Wav => {
                #[cfg(feature = "wav")]
                return Ok(Box::new(crate::format::wav::WavStemWriter::create(path, spec)?));
                #[cfg(not(feature = "wav"))]
                return Err(ExportError::UnsupportedFormat(
                    "WAV support not enabled".into(),
                ));
            }
            AudioFormat::Flac => {
                #[cfg(feature = "flac")]
                return Ok(Box::new(crate::format::flac::FlacStemWriter::create(path, spec)?));
                #[cfg(not(feature = "flac"))]
                return Err(ExportError::UnsupportedFormat(
                    "FLAC support not enabled".into(),
                ));
            }
            AudioFormat::Vorbis => {
                #[cfg(feature = "vorbis")]
                return Ok(Box::new(crate::format::vorbis::VorbisStemWriter::create(
                    path, spec,
                )?));
                #[cfg(not(feature = "vorbis"))]
                return Err(ExportError::UnsupportedFormat(
                    "Vorbis support not enabled".into(),
                ));
            }
            AudioFormat::Opus => {
                #[cfg(feature = "opus")]
                return Ok(Box::new(crate::format::opus::OpusStemWriter::create(path, spec)?));
                #[cfg(not(feature = "opus"))]
                return Err(ExportError::UnsupportedFormat(
                    "Opus support not enabled".into(),
                ));
            }
        }
    }

    fn supports(&self, format: AudioFormat) -> bool {
        match format {
            AudioFormat::Wav => cfg!(feature = "wav"),
            AudioFormat::Flac => cfg!(feature = "flac"),
            AudioFormat::Vorbis => cfg!(feature = "vorbis"),
            AudioFormat::Opus => cfg!(feature = "opus"),
        }
    }
}

/// Checks that the interleaved buffer holds whole frames only.
pub(crate) fn whole_frames(interleaved: &[f32], channels: usize) -> Result<usize> {
    if channels == 0 || interleaved.len() % channels != 0 {
        return Err(ExportError::InvalidData(format!(
            "{} samples is not a whole number of {}-channel frames",
            interleaved.len(),
            channels
        )));
    }
    Ok(interleaved.len() / channels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_frames() {
        assert_eq!(whole_frames(&[0.0; 8], 2).unwrap(), 4);
        assert_eq!(whole_frames(&[0.0; 8], 4).unwrap(), 2);
        assert!(whole_frames(&[0.0; 7], 2).is_err());
        assert!(whole_frames(&[0.0; 4], 0).is_err());
    }

    #[cfg(all(feature = "wav", feature = "flac"))]
    #[test]
    fn test_default_features_enabled() {
        let formats = FileBackend::enabled_formats();
        assert!(formats.contains(&AudioFormat::Wav));
        assert!(formats.contains(&AudioFormat::Flac));
    }

    #[cfg(not(feature = "opus"))]
    #[test]
    fn test_disabled_format_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let spec = WriterSpec {
            format: AudioFormat::Opus,
            ..Default::default()
        };
        let result = FileBackend.open(&dir.path().join("x.opus"), &spec);
        assert!(matches!(result, Err(ExportError::UnsupportedFormat(_))));
        assert!(!FileBackend.supports(AudioFormat::Opus));
    }
}
