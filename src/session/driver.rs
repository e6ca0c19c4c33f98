use std::time::Instant;

use crate::assets::icons::{IconCache, IconProvider, load_icons};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PipevizError, PipevizResult};
use crate::foundation::rng::Rng64;
use crate::layout::config::Diagram;
use crate::particle::{Particle, build_pool};
use crate::render::backend::FrameRGBA;
use crate::render::frame::FrameRenderer;
use crate::render::surface::FrameTarget;
use crate::session::cancel::CancelToken;

/// Options applied when a session starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionOpts {
    /// Particle seed override; the diagram's seed is used when `None`.
    pub seed: Option<u64>,
}

/// How [`AnimationSession::run`] spaces frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep until each frame's deadline at this rate.
    Realtime(Fps),
    /// Render back-to-back.
    Unpaced,
}

/// Loop bounds and pacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopOpts {
    /// Stop after this many frames; `None` runs until cancelled.
    pub frames: Option<u64>,
    /// Frame spacing.
    pub pacing: Pacing,
}

/// Summary of one [`AnimationSession::run`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Frames pushed to the sink.
    pub frames: u64,
    /// Frames that finished after their realtime deadline.
    pub late_frames: u64,
    /// Whether the loop stopped because the session was cancelled.
    pub cancelled: bool,
}

/// One running animation of one diagram.
///
/// Owns the particle pool, the loaded icons and the drawing target. Constructed by
/// [`AnimationSession::start`] and dropped on teardown; nothing is shared between sessions.
pub struct AnimationSession<T: FrameTarget> {
    diagram: Diagram,
    icons: IconCache,
    icons_settled: usize,
    icons_failed: usize,
    particles: Vec<Particle>,
    surface: T,
    cancel: CancelToken,
    next_frame: FrameIndex,
}

impl<T: FrameTarget> AnimationSession<T> {
    /// Load the font and every icon, then build the particle pool.
    ///
    /// Blocks until all icon requests settle. Returns `Ok(None)` when `cancel` trips before that,
    /// in which case no pool is built and no frame can ever be produced.
    #[tracing::instrument(skip_all, fields(icons = diagram.icon_sources().len()))]
    pub fn start(
        diagram: Diagram,
        provider: &dyn IconProvider,
        mut surface: T,
        opts: SessionOpts,
        cancel: CancelToken,
    ) -> PipevizResult<Option<Self>> {
        let (w, h) = surface.device_size();
        if w == 0 || h == 0 {
            return Err(PipevizError::render("frame target has an empty pixel grid"));
        }

        if let Some(source) = diagram.font() {
            let loaded = provider
                .load_font(source)
                .and_then(|bytes| surface.load_font(bytes));
            if let Err(e) = loaded {
                tracing::warn!(font = source, error = %e, "font unavailable; text will not be drawn");
            }
        }

        let Some(report) = load_icons(provider, diagram.icon_sources(), &cancel) else {
            return Ok(None);
        };

        let mut rng = Rng64::new(opts.seed.unwrap_or(diagram.seed()));
        let particles = build_pool(
            diagram.layout().connections().len(),
            diagram.tuning(),
            &mut rng,
        );
        tracing::info!(
            settled = report.settled,
            failed = report.failed,
            particles = particles.len(),
            "animation session started"
        );

        Ok(Some(Self {
            diagram,
            icons: report.cache,
            icons_settled: report.settled,
            icons_failed: report.failed,
            particles,
            surface,
            cancel,
            next_frame: FrameIndex(0),
        }))
    }

    /// Draw one frame and advance every particle by one tick.
    ///
    /// Returns `None`, without touching the surface, once the session is cancelled.
    pub fn render_frame(&mut self) -> PipevizResult<Option<FrameRGBA>> {
        if self.cancel.is_cancelled() {
            return Ok(None);
        }
        self.surface.begin_frame();
        FrameRenderer::new(&self.diagram, &self.icons)
            .draw_frame(&mut self.surface, &mut self.particles);
        let frame = self.surface.finish_frame()?;
        self.next_frame.0 += 1;
        Ok(Some(frame))
    }

    /// Advance particles by `ticks` without drawing. Stops early if cancelled.
    pub fn advance(&mut self, ticks: u64) {
        for _ in 0..ticks {
            if self.cancel.is_cancelled() {
                return;
            }
            for p in &mut self.particles {
                p.update();
            }
            self.next_frame.0 += 1;
        }
    }

    /// Render frames into `sink` until `opts.frames` is reached or the session is cancelled.
    ///
    /// `sink.end()` is called in both cases.
    pub fn run(&mut self, sink: &mut dyn FrameSink, opts: LoopOpts) -> PipevizResult<LoopStats> {
        let (width, height) = self.surface.device_size();
        sink.begin(SinkConfig {
            width,
            height,
            fps: self.diagram.fps(),
        })?;

        let period = match opts.pacing {
            Pacing::Realtime(fps) => Some(fps.frame_duration()),
            Pacing::Unpaced => None,
        };
        let started = Instant::now();
        let mut stats = LoopStats::default();

        while opts.frames.is_none_or(|limit| stats.frames < limit) {
            let idx = self.next_frame;
            let Some(frame) = self.render_frame()? else {
                tracing::debug!(frame = idx.0, "animation cancelled");
                stats.cancelled = true;
                break;
            };
            sink.push_frame(idx, &frame)?;
            stats.frames += 1;
            tracing::debug!(frame = idx.0, "frame rendered");

            if let Some(period) = period {
                let deadline = started + period.mul_f64(stats.frames as f64);
                match deadline.checked_duration_since(Instant::now()) {
                    Some(wait) => std::thread::sleep(wait),
                    None => stats.late_frames += 1,
                }
            }
        }

        sink.end()?;
        Ok(stats)
    }

    /// A handle that tears this session down from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Stop producing frames.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// The diagram being animated.
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Icons that loaded.
    pub fn icons(&self) -> &IconCache {
        &self.icons
    }

    /// Icon requests that settled, and how many of those failed.
    pub fn icon_counts(&self) -> (usize, usize) {
        (self.icons_settled, self.icons_failed)
    }

    /// The particle pool.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Index the next rendered frame will carry.
    pub fn frame_index(&self) -> FrameIndex {
        self.next_frame
    }

    /// The drawing target.
    pub fn surface(&self) -> &T {
        &self.surface
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/driver.rs"]
mod tests;
