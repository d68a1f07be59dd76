//! [`SynthesisSession`] over a loaded MOD.

use crate::format::Module;
use crate::mixer::{apply_separation, interpolate, is_left, period_to_hz};
use crate::player::{song_duration, Player};
use untracker_core::{
    ChannelLayout, Error, Interpolation, LoadSession, MuteError, RenderParam, Result,
    SynthesisSession,
};

/// Render parameter limits.
const FILTER_LENGTHS: [i32; 4] = [1, 2, 4, 8];
const MAX_SEPARATION: i32 = 200;

/// Rate used to advance voices when seeking before any read.
const SEEK_RATE: u32 = 44_100;

/// A playable MOD with per-sample mutes.
#[derive(Debug, Clone)]
pub struct ModSession {
    module: Module,
    player: Player,
    muted: Vec<bool>,
    filter_length: i32,
    stereo_separation: i32,
    duration: f64,
    /// Output frames left in the current tick.
    tick_frames: f64,
    elapsed: f64,
    last_rate: u32,
    /// Per-channel resampling step for the current tick.
    steps: Vec<f64>,
}

impl ModSession {
    pub fn new(module: Module) -> Self {
        let duration = song_duration(&module);
        let channels = module.channels;
        let slots = module.samples.len();
        tracing::info!(
            "Module '{}': {} channels, {} sample slots, {:.2}s",
            module.title,
            channels,
            slots,
            duration
        );
        Self {
            player: Player::new(channels),
            muted: vec![false; slots],
            filter_length: Interpolation::default().filter_length(),
            stereo_separation: 100,
            duration,
            tick_frames: 0.0,
            elapsed: 0.0,
            last_rate: SEEK_RATE,
            steps: vec![0.0; channels],
            module,
        }
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn is_muted(&self, slot: usize) -> bool {
        self.muted.get(slot).copied().unwrap_or(false)
    }

    fn update_steps(&mut self, sample_rate: u32) {
        let rate = f64::from(sample_rate);
        for (step, channel) in self.steps.iter_mut().zip(self.player.channels()) {
            *step = period_to_hz(channel.output_period, channel.finetune) / rate;
        }
    }

    /// Renders `frames` frames of the current tick into `out`.
    fn mix(&mut self, out: &mut [f32], frames: usize, layout: ChannelLayout) {
        let gain = 2.0 / self.module.channels.max(1) as f32;
        let taps = self.filter_length;
        let separation = self.stereo_separation;
        let samples = &self.module.samples;
        let muted = &self.muted;
        let steps = &self.steps;

        for frame in out.chunks_exact_mut(layout.channels()).take(frames) {
            let (mut left, mut right) = (0.0f32, 0.0f32);
            for (index, channel) in self.player.channels_mut().iter_mut().enumerate() {
                if !channel.voice.playing {
                    continue;
                }
                let Some(slot) = channel.voice.sample else {
                    continue;
                };
                let sample = &samples[slot];
                if !muted[slot] && channel.output_volume > 0 {
                    let value = interpolate(sample, channel.voice.position, taps)
                        * f32::from(channel.output_volume)
                        / 64.0
                        * gain;
                    if is_left(index) {
                        left += value;
                    } else {
                        right += value;
                    }
                }
                channel.voice.advance(steps[index], sample);
            }

            let (left, right) = apply_separation(left, right, separation);
            match layout {
                ChannelLayout::Mono => frame[0] = (left + right) * 0.5,
                ChannelLayout::Stereo => {
                    frame[0] = left;
                    frame[1] = right;
                }
                ChannelLayout::Quad => {
                    frame[0] = left;
                    frame[1] = right;
                    frame[2] = left;
                    frame[3] = right;
                }
            }
        }
    }

    /// Advances `frames` frames of the current tick without mixing.
    fn skip(&mut self, frames: usize) {
        let samples = &self.module.samples;
        for (channel, &step) in self.player.channels_mut().iter_mut().zip(&self.steps) {
            if let Some(slot) = channel.voice.sample {
                channel.voice.skip(frames, step, &samples[slot]);
            }
        }
    }

    fn restart(&mut self) {
        self.player = Player::new(self.module.channels);
        self.tick_frames = 0.0;
        self.elapsed = 0.0;
    }
}

impl SynthesisSession for ModSession {
    fn num_instruments(&self) -> usize {
        0
    }

    fn num_samples(&self) -> usize {
        self.module.samples.len()
    }

    fn num_channels(&self) -> usize {
        self.module.channels
    }

    fn instrument_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn sample_names(&self) -> Result<Vec<String>> {
        Ok(self.module.samples.iter().map(|s| s.name.clone()).collect())
    }

    fn format_type(&self) -> String {
        "mod".to_string()
    }

    fn supports_muting(&self) -> bool {
        true
    }

    fn set_source_mute(&mut self, index: usize, muted: bool) -> std::result::Result<(), MuteError> {
        let slots = self.muted.len();
        match self.muted.get_mut(index) {
            Some(flag) => {
                *flag = muted;
                Ok(())
            }
            None => Err(MuteError::new(
                index,
                muted,
                format!("module has {slots} sample slots"),
            )),
        }
    }

    fn render_param(&self, param: RenderParam) -> i32 {
        match param {
            RenderParam::InterpolationFilterLength => self.filter_length,
            RenderParam::StereoSeparation => self.stereo_separation,
        }
    }

    fn set_render_param(&mut self, param: RenderParam, value: i32) -> Result<()> {
        let valid = match param {
            RenderParam::InterpolationFilterLength => FILTER_LENGTHS.contains(&value),
            RenderParam::StereoSeparation => (0..=MAX_SEPARATION).contains(&value),
        };
        if !valid {
            return Err(Error::InvalidRenderParam {
                param: param.name(),
                value,
            });
        }
        match param {
            RenderParam::InterpolationFilterLength => self.filter_length = value,
            RenderParam::StereoSeparation => self.stereo_separation = value,
        }
        Ok(())
    }

    fn seek(&mut self, seconds: f64) {
        self.restart();
        let target = seconds.clamp(0.0, self.duration);
        if target <= 0.0 {
            return;
        }

        let rate = self.last_rate;
        while !self.player.is_ended() {
            if !self.player.advance_tick(&self.module) {
                break;
            }
            self.update_steps(rate);
            let tick = self.player.tick_seconds();
            if self.elapsed + tick > target {
                let into = target - self.elapsed;
                let frames = (into * f64::from(rate)) as usize;
                self.skip(frames);
                self.tick_frames = (tick - into) * f64::from(rate);
                self.elapsed = target;
                break;
            }
            self.skip((tick * f64::from(rate)).round() as usize);
            self.elapsed += tick;
        }
    }

    fn position_seconds(&self) -> f64 {
        self.elapsed
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
        if sample_rate == 0 {
            return 0;
        }
        if sample_rate != self.last_rate {
            self.tick_frames *= f64::from(sample_rate) / f64::from(self.last_rate);
            self.last_rate = sample_rate;
        }
        let width = layout.channels();
        let frames = buffer.len() / width;
        let mut produced = 0;

        while produced < frames {
            if self.tick_frames < 1.0 {
                if !self.player.advance_tick(&self.module) {
                    break;
                }
                self.update_steps(sample_rate);
                self.tick_frames += self.player.tick_seconds() * f64::from(sample_rate);
                continue;
            }
            let n = (self.tick_frames as usize).min(frames - produced);
            self.mix(&mut buffer[produced * width..], n, layout);
            self.tick_frames -= n as f64;
            produced += n;
        }

        self.elapsed += produced as f64 / f64::from(sample_rate);
        produced
    }
}

impl LoadSession for ModSession {
    fn load(data: &[u8]) -> Result<Self> {
        Ok(Self::new(Module::parse(data)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::ModBuilder;
    use approx::assert_relative_eq;

    fn two_sample_song() -> ModSession {
        let bytes = ModBuilder::new("two", 4)
            .looped_sample(0, "lead", vec![60; 256], 64, 0, 256)
            .looped_sample(1, "bass", vec![200; 256], 64, 0, 256)
            .note(0, 0, 0, 1, 428)
            .note(0, 0, 1, 2, 428)
            .build();
        ModSession::load(&bytes).unwrap()
    }

    fn render_all(session: &mut ModSession, layout: ChannelLayout) -> Vec<f32> {
        let mut out = Vec::new();
        let mut buffer = vec![0.0; 1024 * layout.channels()];
        loop {
            let n = session.read_interleaved(8_000, layout, &mut buffer);
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buffer[..n * layout.channels()]);
        }
        out
    }

    #[test]
    fn test_reports_mod_shape() {
        let session = two_sample_song();
        assert_eq!(session.num_instruments(), 0);
        assert_eq!(session.num_samples(), 31);
        assert_eq!(session.num_channels(), 4);
        assert_eq!(session.format_type(), "mod");
        let names = session.sample_names().unwrap();
        assert_eq!(names[0], "lead");
        assert_eq!(names[1], "bass");
        assert_eq!(names[2], "");
    }

    #[test]
    fn test_load_rejects_garbage() {
        assert!(matches!(
            ModSession::load(&[1, 2, 3]),
            Err(Error::Load(_))
        ));
    }

    #[test]
    fn test_renders_full_duration() {
        let mut session = two_sample_song();
        let duration = session.duration_seconds();
        assert_relative_eq!(duration, 64.0 * 6.0 * 0.02, epsilon = 1e-9);

        let out = render_all(&mut session, ChannelLayout::Stereo);
        let frames = out.len() / 2;
        assert!((frames as f64 - duration * 8_000.0).abs() <= 2.0);
        assert!(session.position_seconds() >= duration - 1e-3);
    }

    #[test]
    fn test_hard_panning() {
        let mut session = two_sample_song();
        session.set_source_mute(1, true).unwrap();
        let out = render_all(&mut session, ChannelLayout::Stereo);
        // Channel 0 is left; right stays silent with channel 1's sample muted
        assert!(out.chunks(2).any(|f| f[0] != 0.0));
        assert!(out.chunks(2).all(|f| f[1] == 0.0));
    }

    #[test]
    fn test_all_muted_is_exact_silence() {
        let mut session = two_sample_song();
        for i in 0..session.num_samples() {
            session.set_source_mute(i, true).unwrap();
        }
        for layout in [ChannelLayout::Mono, ChannelLayout::Stereo, ChannelLayout::Quad] {
            session.seek(0.0);
            let out = render_all(&mut session, layout);
            assert!(!out.is_empty());
            assert!(out.iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn test_mute_out_of_range() {
        let mut session = two_sample_song();
        let err = session.set_source_mute(31, true).unwrap_err();
        assert_eq!(err.index, 31);
        assert!(err.muted);
    }

    #[test]
    fn test_quad_duplicates_front() {
        let mut session = two_sample_song();
        let out = render_all(&mut session, ChannelLayout::Quad);
        for f in out.chunks(4) {
            assert_eq!(f[0], f[2]);
            assert_eq!(f[1], f[3]);
        }
    }

    #[test]
    fn test_zero_separation_is_mono() {
        let mut session = two_sample_song();
        session.set_source_mute(1, true).unwrap();
        session
            .set_render_param(RenderParam::StereoSeparation, 0)
            .unwrap();
        let out = render_all(&mut session, ChannelLayout::Stereo);
        assert!(out.chunks(2).all(|f| f[0] == f[1]));
    }

    #[test]
    fn test_render_params_validated() {
        let mut session = two_sample_song();
        assert_eq!(
            session.render_param(RenderParam::InterpolationFilterLength),
            4
        );
        session.set_interpolation(Interpolation::Sinc).unwrap();
        assert_eq!(session.interpolation(), Interpolation::Sinc);
        assert!(session
            .set_render_param(RenderParam::InterpolationFilterLength, 3)
            .is_err());
        assert!(session
            .set_render_param(RenderParam::StereoSeparation, 201)
            .is_err());
        assert_eq!(session.render_param(RenderParam::StereoSeparation), 100);
    }

    #[test]
    fn test_seek_restarts() {
        let mut session = two_sample_song();
        let first = render_all(&mut session, ChannelLayout::Mono);
        session.seek(0.0);
        assert_eq!(session.position_seconds(), 0.0);
        let second = render_all(&mut session, ChannelLayout::Mono);
        assert_eq!(first, second);
    }

    #[test]
    fn test_seek_forward() {
        let mut session = two_sample_song();
        session.seek(3.0);
        assert_relative_eq!(session.position_seconds(), 3.0);
        let rest = render_all(&mut session, ChannelLayout::Mono);
        let expected = (session.duration_seconds() - 3.0) * 8_000.0;
        assert!((rest.len() as f64 - expected).abs() <= 2.0);
    }
}
