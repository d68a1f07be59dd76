//! Deterministic session for exercising the extraction algorithm without a
//! real engine.
//!
//! Every source renders a constant level while it is audible and inside its
//! active window. The session records every mute call, parameter change, and
//! the set of audible sources seen by each block read.

use crate::{ChannelLayout, Error, MuteError, RenderParam, Result, SynthesisSession};
use std::ops::Range;

/// How the session reports its sources to the enumerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedLayout {
    /// Sources are first-class instruments.
    Instruments,
    /// No instruments; sources are sample slots.
    Samples,
    /// Neither instruments nor samples are reported.
    Opaque,
}

#[derive(Debug, Clone)]
pub struct ScriptedSource {
    pub name: String,
    /// Level written to every channel while audible.
    pub amplitude: f32,
    /// Seconds during which the source sounds (`None` = whole composition).
    pub active: Option<Range<f64>>,
}

/// One `read_interleaved` call as observed by the session.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadRecord {
    pub audible: Vec<usize>,
    pub filter_length: i32,
    pub frames: usize,
    pub start_seconds: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MuteCall {
    pub index: usize,
    pub muted: bool,
    pub accepted: bool,
}

#[derive(Debug, Clone)]
pub struct ScriptedSession {
    sources: Vec<ScriptedSource>,
    layout: ScriptedLayout,
    format_type: String,
    channels: usize,
    duration: f64,
    muting: bool,
    names_fail: bool,
    failing_mute: Vec<usize>,

    muted: Vec<bool>,
    filter_length: i32,
    stereo_separation: i32,
    frames_rendered: u64,
    last_rate: u32,

    mute_calls: Vec<MuteCall>,
    param_log: Vec<(RenderParam, i32)>,
    reads: Vec<ReadRecord>,
    seeks: Vec<f64>,
}

impl ScriptedSession {
    /// A composition of `duration` seconds whose sources are instruments.
    pub fn instruments<I, S>(names: I, duration: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_layout(ScriptedLayout::Instruments, names, duration)
    }

    /// A composition of `duration` seconds whose sources are sample slots.
    pub fn samples<I, S>(names: I, duration: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_layout(ScriptedLayout::Samples, names, duration)
    }

    pub fn with_layout<I, S>(layout: ScriptedLayout, names: I, duration: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources: Vec<ScriptedSource> = names
            .into_iter()
            .map(|name| ScriptedSource {
                name: name.into(),
                amplitude: 0.5,
                active: None,
            })
            .collect();
        let count = sources.len();
        Self {
            sources,
            layout,
            format_type: "it".to_string(),
            channels: 4,
            duration,
            muting: true,
            names_fail: false,
            failing_mute: Vec::new(),
            muted: vec![false; count],
            filter_length: 4,
            stereo_separation: 100,
            frames_rendered: 0,
            last_rate: 44_100,
            mute_calls: Vec::new(),
            param_log: Vec::new(),
            reads: Vec::new(),
            seeks: Vec::new(),
        }
    }

    /// Makes a source render pure digital silence.
    pub fn silent(mut self, index: usize) -> Self {
        self.sources[index].amplitude = 0.0;
        self
    }

    pub fn amplitude(mut self, index: usize, amplitude: f32) -> Self {
        self.sources[index].amplitude = amplitude;
        self
    }

    /// Restricts a source to sound only between `range` seconds.
    pub fn active_between(mut self, index: usize, range: Range<f64>) -> Self {
        self.sources[index].active = Some(range);
        self
    }

    /// Every mute/unmute request for `index` is rejected.
    pub fn failing_mute(mut self, index: usize) -> Self {
        self.failing_mute.push(index);
        self
    }

    pub fn without_muting(mut self) -> Self {
        self.muting = false;
        self
    }

    pub fn failing_sample_names(mut self) -> Self {
        self.names_fail = true;
        self
    }

    pub fn with_format_type(mut self, format_type: impl Into<String>) -> Self {
        self.format_type = format_type.into();
        self
    }

    pub fn channels(mut self, channels: usize) -> Self {
        self.channels = channels;
        self
    }

    pub fn is_audible(&self, index: usize) -> bool {
        self.muted.get(index).map(|m| !m).unwrap_or(false)
    }

    pub fn audible_sources(&self) -> Vec<usize> {
        (0..self.sources.len())
            .filter(|&i| self.is_audible(i))
            .collect()
    }

    pub fn mute_calls(&self) -> &[MuteCall] {
        &self.mute_calls
    }

    pub fn param_log(&self) -> &[(RenderParam, i32)] {
        &self.param_log
    }

    pub fn reads(&self) -> &[ReadRecord] {
        &self.reads
    }

    pub fn seeks(&self) -> &[f64] {
        &self.seeks
    }

    fn total_frames(&self, sample_rate: u32) -> u64 {
        (self.duration * sample_rate as f64).round() as u64
    }

    fn level_at(&self, seconds: f64) -> f32 {
        self.sources
            .iter()
            .enumerate()
            .filter(|(i, _)| self.is_audible(*i))
            .filter(|(_, s)| s.active.as_ref().map_or(true, |r| r.contains(&seconds)))
            .map(|(_, s)| s.amplitude)
            .sum()
    }
}

impl SynthesisSession for ScriptedSession {
    fn num_instruments(&self) -> usize {
        match self.layout {
            ScriptedLayout::Instruments => self.sources.len(),
            _ => 0,
        }
    }

    fn num_samples(&self) -> usize {
        match self.layout {
            ScriptedLayout::Samples => self.sources.len(),
            _ => 0,
        }
    }

    fn num_channels(&self) -> usize {
        self.channels
    }

    fn instrument_names(&self) -> Vec<String> {
        match self.layout {
            ScriptedLayout::Instruments => self.sources.iter().map(|s| s.name.clone()).collect(),
            _ => Vec::new(),
        }
    }

    fn sample_names(&self) -> Result<Vec<String>> {
        if self.names_fail {
            return Err(Error::NamesUnavailable("scripted failure".into()));
        }
        match self.layout {
            ScriptedLayout::Samples => Ok(self.sources.iter().map(|s| s.name.clone()).collect()),
            _ => Ok(Vec::new()),
        }
    }

    fn format_type(&self) -> String {
        self.format_type.clone()
    }

    fn supports_muting(&self) -> bool {
        self.muting
    }

    fn set_source_mute(&mut self, index: usize, muted: bool) -> std::result::Result<(), MuteError> {
        let result = if index >= self.sources.len() {
            Err(MuteError::new(index, muted, "index out of range"))
        } else if self.failing_mute.contains(&index) {
            Err(MuteError::new(index, muted, "muting not supported for this source"))
        } else {
            self.muted[index] = muted;
            Ok(())
        };
        self.mute_calls.push(MuteCall {
            index,
            muted,
            accepted: result.is_ok(),
        });
        result
    }

    fn render_param(&self, param: RenderParam) -> i32 {
        match param {
            RenderParam::InterpolationFilterLength => self.filter_length,
            RenderParam::StereoSeparation => self.stereo_separation,
        }
    }

    fn set_render_param(&mut self, param: RenderParam, value: i32) -> Result<()> {
        match param {
            RenderParam::InterpolationFilterLength if [1, 2, 4, 8].contains(&value) => {
                self.filter_length = value
            }
            RenderParam::StereoSeparation if (0..=200).contains(&value) => {
                self.stereo_separation = value
            }
            _ => {
                return Err(Error::InvalidRenderParam {
                    param: param.name(),
                    value,
                })
            }
        }
        self.param_log.push((param, value));
        Ok(())
    }

    fn seek(&mut self, seconds: f64) {
        self.seeks.push(seconds);
        let seconds = seconds.clamp(0.0, self.duration);
        self.frames_rendered = (seconds * self.last_rate as f64).round() as u64;
    }

    fn position_seconds(&self) -> f64 {
        self.frames_rendered as f64 / self.last_rate as f64
    }

    fn duration_seconds(&self) -> f64 {
        self.duration
    }

    fn read_interleaved(
        &mut self,
        sample_rate: u32,
        layout: ChannelLayout,
        buffer: &mut [f32],
    ) -> usize {
        if sample_rate != self.last_rate {
            let seconds = self.position_seconds();
            self.last_rate = sample_rate;
            self.frames_rendered = (seconds * sample_rate as f64).round() as u64;
        }

        let channels = layout.channels();
        let requested = buffer.len() / channels;
        let remaining = self.total_frames(sample_rate).saturating_sub(self.frames_rendered);
        let frames = (requested as u64).min(remaining) as usize;
        let start_seconds = self.position_seconds();

        for (i, frame) in buffer.chunks_exact_mut(channels).take(frames).enumerate() {
            let t = (self.frames_rendered + i as u64) as f64 / sample_rate as f64;
            frame.fill(self.level_at(t));
        }

        self.frames_rendered += frames as u64;
        self.reads.push(ReadRecord {
            audible: self.audible_sources(),
            filter_length: self.filter_length,
            frames,
            start_seconds,
        });
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reads_until_exhausted() {
        let mut session = ScriptedSession::instruments(["a"], 1.0);
        let mut buffer = vec![0.0f32; 2 * 300];
        let mut total = 0;
        loop {
            let n = session.read_interleaved(1000, ChannelLayout::Stereo, &mut buffer);
            if n == 0 {
                break;
            }
            total += n;
        }
        assert_eq!(total, 1000);
        assert!((session.position_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_scripted_mute_silences_source() {
        let mut session = ScriptedSession::samples(["a", "b"], 1.0).amplitude(1, 0.25);
        session.set_source_mute(0, true).unwrap();

        let mut buffer = vec![0.0f32; 4];
        session.read_interleaved(1000, ChannelLayout::Mono, &mut buffer);
        assert_eq!(buffer, vec![0.25; 4]);
        assert_eq!(session.reads()[0].audible, vec![1]);
    }

    #[test]
    fn test_scripted_failing_mute() {
        let mut session = ScriptedSession::samples(["a", "b"], 1.0).failing_mute(1);
        assert!(session.set_source_mute(1, true).is_err());
        assert!(session.set_source_mute(5, true).is_err());
        assert!(session.set_source_mute(0, true).is_ok());
        assert!(session.is_audible(1));
        assert_eq!(session.mute_calls().len(), 3);
    }
}
