//! Source enumeration.
//!
//! Engines disagree on what a "source" is. The chain below picks the first
//! answer the session can give: instruments, then samples, then the fixed
//! slot count of the MOD family, then the channel count.

use untracker_core::{SoundSource, SourceKind, SynthesisSession};

/// Sample slots in a 31-sample MOD.
pub const MOD_SAMPLE_SLOTS: usize = 31;

/// Format type reported for ProTracker-family modules.
pub const MOD_FORMAT_TYPE: &str = "mod";

/// Lists the soloable sources of `session` in index order.
pub fn enumerate_sources<S: SynthesisSession + ?Sized>(session: &S) -> Vec<SoundSource> {
    let instruments = session.num_instruments();
    if instruments > 0 {
        tracing::debug!("Enumerating {} instruments", instruments);
        return build(instruments, session.instrument_names(), SourceKind::Instrument);
    }

    let samples = session.num_samples();
    if samples > 0 {
        tracing::debug!("Enumerating {} samples", samples);
        let names = session.sample_names().unwrap_or_else(|e| {
            tracing::warn!("Could not read sample names, using generated names: {}", e);
            Vec::new()
        });
        return build(samples, names, SourceKind::Sample);
    }

    if session.format_type().eq_ignore_ascii_case(MOD_FORMAT_TYPE) {
        tracing::debug!("MOD without sample count, assuming {} slots", MOD_SAMPLE_SLOTS);
        return build(MOD_SAMPLE_SLOTS, Vec::new(), SourceKind::Sample);
    }

    let channels = session.num_channels();
    tracing::debug!("Falling back to {} channels as sources", channels);
    build(channels, Vec::new(), SourceKind::Instrument)
}

/// Pairs `count` indices with `names`, padding missing names with empty
/// strings (which [`SoundSource::new`] replaces with synthetic names).
fn build(count: usize, names: Vec<String>, kind: SourceKind) -> Vec<SoundSource> {
    let mut names = names.into_iter();
    (0..count)
        .map(|index| SoundSource::new(index, names.next().unwrap_or_default(), kind))
        .collect()
}
