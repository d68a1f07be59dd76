//! Silence prescan.
//!
//! Renders from the start with the cheapest interpolation until the first
//! non-zero sample, so that a soloed source that never sounds produces no
//! file. The comparison is exact: any sample that is not `0.0` counts.

use untracker_core::{ChannelLayout, Interpolation, RenderParam, SynthesisSession};

/// Fraction of the duration after which the scan gives up.
pub const DURATION_TOLERANCE: f64 = 0.99;

/// Outcome of one prescan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prescan {
    pub audible: bool,
    /// Blocks read before the decision.
    pub blocks: usize,
}

/// Scans the currently audible sources for signal.
///
/// On return the interpolation setting is restored and the playback
/// position is back at 0.
pub fn prescan<S: SynthesisSession + ?Sized>(
    session: &mut S,
    sample_rate: u32,
    layout: ChannelLayout,
    buffer: &mut [f32],
) -> Prescan {
    session.seek(0.0);

    let original_taps = session.render_param(RenderParam::InterpolationFilterLength);
    if let Err(e) = session.set_interpolation(Interpolation::CHEAPEST) {
        tracing::debug!("Prescan keeps current interpolation: {}", e);
    }

    let width = layout.channels();
    let duration = session.duration_seconds();
    let limit = duration * DURATION_TOLERANCE;
    let mut blocks = 0;
    let mut audible = false;

    loop {
        if duration > 0.0 && session.position_seconds() >= limit {
            break;
        }
        let frames = session.read_interleaved(sample_rate, layout, buffer);
        if frames == 0 {
            break;
        }
        blocks += 1;
        if buffer[..frames * width].iter().any(|&s| s != 0.0) {
            audible = true;
            break;
        }
    }

    if let Err(e) = session.set_render_param(RenderParam::InterpolationFilterLength, original_taps)
    {
        tracing::warn!("Could not restore interpolation after prescan: {}", e);
    }
    session.seek(0.0);

    tracing::debug!("Prescan read {} blocks, audible = {}", blocks, audible);
    Prescan { audible, blocks }
}
