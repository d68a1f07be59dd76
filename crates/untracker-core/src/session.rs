//! Interface to the module playback engine.
//!
//! The extraction algorithm only ever talks to the engine through
//! [`SynthesisSession`]. The engine owns the mute flags and the playback
//! cursor; callers read and reset them but never keep their own copy of the
//! cursor.

use crate::{ChannelLayout, Error, Interpolation, MuteError, Result};

/// Render parameters the session exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderParam {
    /// Interpolation filter length in taps (1, 2, 4 or 8).
    InterpolationFilterLength,
    /// Stereo separation in percent (0-200).
    StereoSeparation,
}

impl RenderParam {
    pub fn name(&self) -> &'static str {
        match self {
            RenderParam::InterpolationFilterLength => "interpolation_filter_length",
            RenderParam::StereoSeparation => "stereo_separation",
        }
    }
}

/// A loaded composition with a mutable mute state and playback cursor.
pub trait SynthesisSession {
    /// Number of first-class instruments (0 when the format has none).
    fn num_instruments(&self) -> usize;

    /// Number of sample slots.
    fn num_samples(&self) -> usize;

    /// Number of pattern/audio channels.
    fn num_channels(&self) -> usize;

    fn instrument_names(&self) -> Vec<String>;

    fn sample_names(&self) -> Result<Vec<String>>;

    /// Format family of the loaded composition (e.g. `"mod"`, `"xm"`).
    fn format_type(&self) -> String;

    /// Whether per-source muting is available at all.
    fn supports_muting(&self) -> bool;

    /// Mutes or unmutes a single source index.
    fn set_source_mute(&mut self, index: usize, muted: bool) -> std::result::Result<(), MuteError>;

    fn render_param(&self, param: RenderParam) -> i32;

    fn set_render_param(&mut self, param: RenderParam, value: i32) -> Result<()>;

    /// Moves the playback cursor. Seeking to 0 restarts the composition.
    fn seek(&mut self, seconds: f64);

    fn position_seconds(&self) -> f64;

    fn duration_seconds(&self) -> f64;

    /// Renders the next block of interleaved frames into `buffer`.
    ///
    /// The number of frames requested is `buffer.len() / layout.channels()`.
    /// Returns the number of frames produced; 0 means the composition has
    /// ended.
    fn read_interleaved(
        &mut self,
        sample_rate: u32,
        layout: ChannelLayout,
        buffer: &mut [f32],
    ) -> usize;

    /// Current interpolation, read through the render parameter.
    fn interpolation(&self) -> Interpolation {
        Interpolation::from_filter_length(self.render_param(RenderParam::InterpolationFilterLength))
            .unwrap_or_default()
    }

    fn set_interpolation(&mut self, interpolation: Interpolation) -> Result<()> {
        self.set_render_param(
            RenderParam::InterpolationFilterLength,
            interpolation.filter_length(),
        )
    }
}

/// Sessions that can be created from the raw bytes of a composition file.
pub trait LoadSession: SynthesisSession + Sized {
    fn load(data: &[u8]) -> Result<Self>;

    fn load_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            Error::Load(format!("could not open input file {}: {e}", path.display()))
        })?;
        Self::load(&data)
    }
}

impl<S: SynthesisSession + ?Sized> SynthesisSession for &mut S {
    fn num_instruments(&self) -> usize {
        (**self).num_instruments()
    }

    fn num_samples(&self) -> usize {
        (**self).num_samples()
    }

    fn num_channels(&self) -> usize {
        (**self).num_channels()
    }

    fn instrument_names(&self) -> Vec<String> {
        (**self).instrument_names()
    }

    fn sample_names(&self) -> Result<Vec<String>> {
        (**self).sample_names()
    }

    fn format_type(&self) -> String {
        (**self).format_type()
    }

    fn supports_muting(&self) -> bool {
        (**self).supports_muting()
    }

    fn set_source_mute(&mut self, index: usize, muted: bool) -> std::result::Result<(), MuteError> {
        (**self).set_source_mute(index, muted)
    }

    fn render_param(&self, param: RenderParam) -> i32 {
        (**self).render_param(param)
    }

    fn set_render_param(&mut self, param: RenderParam, value: i32) -> Result<()> {
        (**self).set_render_param(param, value)
    }

    fn seek(&mut self, seconds: f64) {
        (**self).seek(seconds)
    }

    fn position_seconds(&self) -> f64 {
        (**self).position_seconds()
    }

    fn duration_seconds(&self) -> f64 {
        (**self).duration_seconds()
    }

    fn read_interleaved(
        &mut self,
        sample_rate: u32,
        layout: ChannelLayout,
        buffer: &mut [f32],
    ) -> usize {
        (**self).read_interleaved(sample_rate, layout, buffer)
    }
}
