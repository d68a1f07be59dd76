//! Sample voices, interpolation and channel panning.

use crate::format::Sample;
use std::f64::consts::PI;

/// PAL Amiga clock divided by two, in Hz per period unit.
pub const PAL_CLOCK: f64 = 3_546_894.6;

/// Playback state of one sample on one channel.
#[derive(Debug, Clone, Default)]
pub struct Voice {
    /// 0-based sample slot.
    pub sample: Option<usize>,
    /// Position in sample frames.
    pub position: f64,
    pub playing: bool,
}

impl Voice {
    /// Starts `slot` from `offset` frames.
    pub fn trigger(&mut self, slot: usize, sample: &Sample, offset: usize) {
        self.sample = Some(slot);
        if offset < sample.len() {
            self.position = offset as f64;
            self.playing = true;
        } else if sample.is_looped() {
            self.position = sample.loop_start as f64;
            self.playing = true;
        } else {
            self.playing = false;
        }
    }

    pub fn restart(&mut self) {
        if self.sample.is_some() {
            self.position = 0.0;
            self.playing = true;
        }
    }

    /// Moves the position forward by `step`, wrapping into the loop or stopping.
    #[inline]
    pub fn advance(&mut self, step: f64, sample: &Sample) {
        self.position += step;
        let end = if sample.is_looped() {
            sample.loop_end()
        } else {
            sample.len()
        } as f64;
        if self.position >= end {
            if sample.is_looped() {
                let loop_len = sample.loop_len as f64;
                self.position = sample.loop_start as f64 + (self.position - end) % loop_len;
            } else {
                self.playing = false;
            }
        }
    }

    /// Advances by `frames` output frames without producing audio.
    pub fn skip(&mut self, frames: usize, step: f64, sample: &Sample) {
        if !self.playing {
            return;
        }
        self.advance(step * frames as f64, sample);
    }
}

/// Playback frequency in Hz of `period` with `finetune` (1/8 semitones).
pub fn period_to_hz(period: u16, finetune: i8) -> f64 {
    if period == 0 {
        return 0.0;
    }
    PAL_CLOCK / f64::from(period) * 2f64.powf(f64::from(finetune) / 96.0)
}

/// Whether `channel` is routed hard left in the Amiga LRRL layout.
pub fn is_left(channel: usize) -> bool {
    matches!(channel % 4, 0 | 3)
}

/// Sample value at integer index, honouring the loop and reading silence
/// past the end of one-shot samples.
#[inline]
fn tap(sample: &Sample, index: isize) -> f32 {
    if index < 0 {
        return 0.0;
    }
    let index = index as usize;
    if index < sample.len() && (!sample.is_looped() || index < sample.loop_end()) {
        return sample.data[index];
    }
    if sample.is_looped() {
        let wrapped = sample.loop_start + (index - sample.loop_end()) % sample.loop_len;
        return sample.data[wrapped];
    }
    0.0
}

/// Interpolated sample value at fractional `position` with `taps` filter length.
pub fn interpolate(sample: &Sample, position: f64, taps: i32) -> f32 {
    let base = position.floor() as isize;
    let frac = (position - position.floor()) as f32;
    match taps {
        t if t <= 1 => tap(sample, (position + 0.5).floor() as isize),
        2 | 3 => {
            let a = tap(sample, base);
            let b = tap(sample, base + 1);
            a + (b - a) * frac
        }
        4..=7 => {
            // Catmull-Rom
            let p0 = tap(sample, base - 1);
            let p1 = tap(sample, base);
            let p2 = tap(sample, base + 1);
            let p3 = tap(sample, base + 2);
            let a = -0.5 * p0 + 1.5 * p1 - 1.5 * p2 + 0.5 * p3;
            let b = p0 - 2.5 * p1 + 2.0 * p2 - 0.5 * p3;
            let c = -0.5 * p0 + 0.5 * p2;
            ((a * frac + b) * frac + c) * frac + p1
        }
        _ => windowed_sinc(sample, base, f64::from(frac)),
    }
}

/// 8-tap Hann-windowed sinc, normalised to unity DC gain.
fn windowed_sinc(sample: &Sample, base: isize, frac: f64) -> f32 {
    const HALF: isize = 4;
    let mut acc = 0.0f64;
    let mut weight_sum = 0.0f64;
    for k in (1 - HALF)..=HALF {
        let x = k as f64 - frac;
        let sinc = if x.abs() < 1e-9 {
            1.0
        } else {
            (PI * x).sin() / (PI * x)
        };
        let window = 0.5 + 0.5 * (PI * x / HALF as f64).cos();
        let w = sinc * window;
        acc += w * f64::from(tap(sample, base + k));
        weight_sum += w;
    }
    if weight_sum.abs() < 1e-9 {
        return 0.0;
    }
    (acc / weight_sum) as f32
}

/// Applies stereo separation (percent, 0-200) to a hard-panned pair.
#[inline]
pub fn apply_separation(left: f32, right: f32, separation: i32) -> (f32, f32) {
    if separation == 100 {
        return (left, right);
    }
    let mid = (left + right) * 0.5;
    let side = (left - right) * 0.5 * separation as f32 / 100.0;
    (mid + side, mid - side)
}
