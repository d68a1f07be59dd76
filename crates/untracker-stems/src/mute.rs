//! Exclusive solo state against the engine's per-source mute flags.
//!
//! Only per-index toggles are used. A rejected toggle is recorded and logged,
//! never propagated: it degrades isolation of one stem but not the run.

use untracker_core::{MuteError, SynthesisSession};

/// Mute/unmute requests the engine rejected during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MuteReport {
    pub rejected: Vec<MuteError>,
}

impl MuteReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    /// Distinct source indices with at least one rejected request.
    pub fn rejected_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.rejected.iter().map(|e| e.index).collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// Drives the mute flags of `count` sources.
#[derive(Debug)]
pub struct MuteController {
    count: usize,
    report: MuteReport,
}

impl MuteController {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            report: MuteReport::default(),
        }
    }

    /// Mutes every source, tolerating per-index failures.
    pub fn mute_all<S: SynthesisSession + ?Sized>(&mut self, session: &mut S) {
        for index in 0..self.count {
            self.set(session, index, true);
        }
    }

    /// Makes `index` audible. All other sources stay as `mute_all` left them.
    pub fn solo<S: SynthesisSession + ?Sized>(&mut self, session: &mut S, index: usize) {
        self.set(session, index, false);
    }

    /// Re-mutes `index` once its stem is done.
    pub fn release<S: SynthesisSession + ?Sized>(&mut self, session: &mut S, index: usize) {
        self.set(session, index, true);
    }

    /// Restores the all-audible baseline. Best effort.
    pub fn unmute_all<S: SynthesisSession + ?Sized>(&mut self, session: &mut S) {
        for index in 0..self.count {
            self.set(session, index, false);
        }
    }

    pub fn report(&self) -> &MuteReport {
        &self.report
    }

    pub fn into_report(self) -> MuteReport {
        self.report
    }

    fn set<S: SynthesisSession + ?Sized>(&mut self, session: &mut S, index: usize, muted: bool) {
        if let Err(e) = session.set_source_mute(index, muted) {
            tracing::warn!("{}", e);
            self.report.rejected.push(e);
        }
    }
}
