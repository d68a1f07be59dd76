//! Stem extraction run.
//!
//! One run walks every source in index order:
//!
//! ```text
//! Idle -> Prescanning -> Deciding -> Rendering -> Closed
//!                           \-----------------------/  (silent)
//! ```
//!
//! Output files are only ever opened in [`StemPhase::Rendering`], which is
//! only reachable from a prescan that found signal.

use crate::enumerator::enumerate_sources;
use crate::error::{Error, Result};
use crate::mute::{MuteController, MuteReport};
use crate::paths::{composition_name, StemOutputDescriptor};
use crate::pipeline::{render_stem, BLOCK_FRAMES};
use crate::prescan::prescan;
use std::path::{Path, PathBuf};
use untracker_core::{ChannelLayout, RenderConfig, RenderParam, SoundSource, SynthesisSession};
use untracker_export::{WriterBackend, WriterSpec};

/// Per-source processing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StemPhase {
    Idle,
    Prescanning,
    Deciding,
    Rendering,
    Closed,
}

impl StemPhase {
    /// Whether moving from `self` to `next` is a legal step.
    pub fn can_advance_to(self, next: StemPhase) -> bool {
        use StemPhase::*;
        matches!(
            (self, next),
            (Idle, Prescanning)
                | (Prescanning, Deciding)
                | (Deciding, Rendering)
                | (Deciding, Closed)
                | (Rendering, Closed)
                | (Closed, Idle)
        )
    }
}

/// What happened to one source.
#[derive(Debug, Clone, PartialEq)]
pub enum StemOutcome {
    Written(PathBuf),
    /// Prescan found no signal; no file was created.
    Silent,
    /// The stem was abandoned; the run continued.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StemReport {
    pub source: SoundSource,
    pub outcome: StemOutcome,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionReport {
    /// `<output dir>/<composition name>`; may not exist if nothing was written.
    pub stem_dir: PathBuf,
    pub stems: Vec<StemReport>,
    pub mutes: MuteReport,
}

impl ExtractionReport {
    pub fn sources(&self) -> usize {
        self.stems.len()
    }

    pub fn written(&self) -> Vec<&Path> {
        self.stems
            .iter()
            .filter_map(|s| match &s.outcome {
                StemOutcome::Written(path) => Some(path.as_path()),
                _ => None,
            })
            .collect()
    }

    pub fn silent(&self) -> Vec<&SoundSource> {
        self.stems
            .iter()
            .filter(|s| s.outcome == StemOutcome::Silent)
            .map(|s| &s.source)
            .collect()
    }

    pub fn failed(&self) -> Vec<&StemReport> {
        self.stems
            .iter()
            .filter(|s| matches!(s.outcome, StemOutcome::Failed { .. }))
            .collect()
    }
}

/// Extracts one stem per audible source of a loaded composition.
pub struct StemExtractor<S, B> {
    session: S,
    backend: B,
    config: RenderConfig,
    layout: ChannelLayout,
    spec: WriterSpec,
    /// Shared by prescan and render for every source.
    buffer: Vec<f32>,
    phase: StemPhase,
}

impl<S: SynthesisSession, B: WriterBackend> StemExtractor<S, B> {
    /// Validates the configuration against the session and backend and
    /// applies the render parameters.
    pub fn new(mut session: S, config: RenderConfig, backend: B) -> Result<Self> {
        config.validate()?;
        if !backend.supports(config.format) {
            return Err(Error::UnsupportedFormat(config.format));
        }
        if !session.supports_muting() {
            return Err(Error::MutingUnavailable);
        }

        session.set_interpolation(config.interpolation)?;
        session.set_render_param(
            RenderParam::StereoSeparation,
            config.stereo_separation as i32,
        )?;

        let layout = config.effective_layout()?;
        if layout != config.channel_layout()? {
            tracing::info!("Stereo separation is 0, rendering mono stems");
        }
        let spec = WriterSpec::from_config(&config, layout)?;

        Ok(Self {
            buffer: vec![0.0; BLOCK_FRAMES * layout.channels()],
            session,
            backend,
            config,
            layout,
            spec,
            phase: StemPhase::Idle,
        })
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Channel layout actually rendered.
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn phase(&self) -> StemPhase {
        self.phase
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// Runs the extraction. `input_name` names the stem subdirectory.
    pub fn extract(&mut self, input_name: &str, output_dir: &Path) -> Result<ExtractionReport> {
        let sources = enumerate_sources(&self.session);
        tracing::info!("Found {} sources", sources.len());

        let stem_dir = output_dir.join(composition_name(input_name));
        let mut mutes = MuteController::new(sources.len());
        mutes.mute_all(&mut self.session);

        let mut stems = Vec::with_capacity(sources.len());
        for source in &sources {
            let outcome = self.process(source, &stem_dir, &mut mutes);
            stems.push(StemReport {
                source: source.clone(),
                outcome,
            });
        }

        mutes.unmute_all(&mut self.session);

        let report = ExtractionReport {
            stem_dir,
            stems,
            mutes: mutes.into_report(),
        };
        tracing::info!(
            "Extracted {} stems ({} silent, {} failed)",
            report.written().len(),
            report.silent().len(),
            report.failed().len()
        );
        Ok(report)
    }

    fn process(
        &mut self,
        source: &SoundSource,
        stem_dir: &Path,
        mutes: &mut MuteController,
    ) -> StemOutcome {
        tracing::info!("Processing {}", source);
        mutes.solo(&mut self.session, source.index);

        self.enter(StemPhase::Prescanning);
        let scan = prescan(
            &mut self.session,
            self.spec.sample_rate,
            self.layout,
            &mut self.buffer,
        );

        self.enter(StemPhase::Deciding);
        let outcome = if !scan.audible {
            tracing::info!("Skipping silent {}", source);
            StemOutcome::Silent
        } else {
            self.enter(StemPhase::Rendering);
            let descriptor = StemOutputDescriptor::new(stem_dir, source, &self.spec);
            match render_stem(
                &mut self.session,
                &self.backend,
                &descriptor,
                &self.spec,
                self.layout,
                &mut self.buffer,
            ) {
                Ok(_) => {
                    tracing::info!("Extracted {}", descriptor.path.display());
                    StemOutcome::Written(descriptor.path)
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", source, e);
                    StemOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            }
        };

        mutes.release(&mut self.session, source.index);
        self.enter(StemPhase::Closed);
        self.enter(StemPhase::Idle);
        outcome
    }

    fn enter(&mut self, next: StemPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal stem phase change {:?} -> {:?}",
            self.phase,
            next
        );
        tracing::trace!("phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}
