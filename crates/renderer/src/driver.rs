//! Lifecycle of a mounted backdrop.
//!
//! [`Backdrop`] owns the uniforms, the clock, and one render surface. It does
//! not know how frames reach the screen: the window loop, the software
//! rasterizer, and tests all plug in through [`RenderSurface`] and
//! [`TickScheduler`].
//!
//! ```text
//!   mount ──▶ Running ──tick──▶ render ──▶ schedule_next ──▶ tick ...
//!     │          │
//!     │          └─ fatal frame error ─▶ Degraded (surface dropped)
//!     └─ surface creation failed ──────▶ Degraded
//!   unmount (any state) ──▶ Unmounted (terminal)
//! ```

use std::time::{Duration, Instant};

use gradient::{ColorStops, SurfaceUniforms};
use tracing::{debug, info, trace, warn};

use crate::runtime::TimeSource;
use crate::schedule::TickScheduler;
use crate::types::{BackdropOptions, SurfaceGeometry};

/// Why a frame could not be presented.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("surface is outdated and must be reconfigured")]
    Outdated,
    #[error("timed out waiting for the next surface texture")]
    Timeout,
    #[error("surface failed: {0}")]
    Fatal(String),
}

/// Something the backdrop can draw into.
///
/// Implementations own every GPU or CPU resource tied to the surface and
/// release them when dropped.
pub trait RenderSurface {
    fn resize(&mut self, geometry: SurfaceGeometry);
    fn render(&mut self, uniforms: &SurfaceUniforms) -> Result<(), FrameError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackdropState {
    Running,
    /// Surface creation or presentation failed; nothing is drawn and the
    /// host page keeps working.
    Degraded,
    Unmounted,
}

/// Result of a single [`Backdrop::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    /// The frame was dropped but the loop keeps going.
    Skipped,
    /// The surface failed during this tick and was released.
    Degraded,
    /// No surface to draw into.
    Idle,
}

pub struct Backdrop<S: RenderSurface> {
    state: BackdropState,
    stops: ColorStops,
    options: BackdropOptions,
    geometry: SurfaceGeometry,
    uniforms: SurfaceUniforms,
    surface: Option<S>,
    clock: Box<dyn TimeSource>,
    scheduler: Box<dyn TickScheduler>,
    frames_rendered: u64,
    stats: FrameStats,
}

impl<S: RenderSurface> Backdrop<S> {
    /// Creates the surface and requests the first tick.
    ///
    /// Mounting never fails: when `create_surface` errors the backdrop comes
    /// up [`BackdropState::Degraded`] and simply draws nothing.
    pub fn mount<F>(
        stops: ColorStops,
        options: BackdropOptions,
        geometry: SurfaceGeometry,
        create_surface: F,
        clock: impl TimeSource + 'static,
        scheduler: impl TickScheduler + 'static,
    ) -> Self
    where
        F: FnOnce(&SurfaceGeometry) -> anyhow::Result<S>,
    {
        let uniforms = SurfaceUniforms::new(&options.color_space.prepare_stops(&stops));
        let mut backdrop = Self {
            state: BackdropState::Degraded,
            stops,
            options,
            geometry,
            uniforms,
            surface: None,
            clock: Box::new(clock),
            scheduler: Box::new(scheduler),
            frames_rendered: 0,
            stats: FrameStats::default(),
        };

        match create_surface(&geometry) {
            Ok(surface) => {
                backdrop.surface = Some(surface);
                backdrop.state = BackdropState::Running;
                info!(
                    width = geometry.render.0,
                    height = geometry.render.1,
                    pixel_ratio = geometry.pixel_ratio,
                    color_space = %options.color_space,
                    stops = %stops,
                    "backdrop mounted"
                );
                backdrop.scheduler.schedule_next();
            }
            Err(err) => {
                let message = format!("{err:#}");
                warn!(error = %message, "backdrop surface unavailable; rendering nothing");
            }
        }
        backdrop
    }

    /// Renders one frame at the clock's current time and asks for the next.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != BackdropState::Running {
            return TickOutcome::Idle;
        }
        let Some(surface) = self.surface.as_mut() else {
            return TickOutcome::Idle;
        };

        let sample = self.clock.sample();
        self.uniforms.set_elapsed_time(sample.seconds);

        let outcome = match surface.render(&self.uniforms) {
            Ok(()) => {
                self.frames_rendered += 1;
                self.stats
                    .record(Instant::now(), self.frames_rendered, sample.seconds);
                TickOutcome::Rendered
            }
            Err(FrameError::Outdated) => {
                debug!("surface outdated; reconfiguring");
                surface.resize(self.geometry);
                TickOutcome::Skipped
            }
            Err(FrameError::Timeout) => {
                debug!("surface timeout; retrying next frame");
                TickOutcome::Skipped
            }
            Err(FrameError::Fatal(reason)) => {
                warn!(%reason, frames = self.frames_rendered, "backdrop surface lost; rendering nothing");
                self.release(BackdropState::Degraded);
                return TickOutcome::Degraded;
            }
        };

        self.scheduler.schedule_next();
        outcome
    }

    /// Replaces the colors. Returns `false` when the new stops equal the
    /// current ones, in which case nothing changes.
    ///
    /// The clock and the surface are left alone either way, so the animation
    /// continues from the same phase with the new colors.
    pub fn set_color_stops(&mut self, stops: ColorStops) -> bool {
        if self.state == BackdropState::Unmounted {
            return false;
        }
        if stops == self.stops {
            trace!("color stops unchanged");
            return false;
        }
        self.stops = stops;
        self.uniforms
            .set_colors(&self.options.color_space.prepare_stops(&stops));
        debug!(stops = %stops, "color stops updated");
        true
    }

    /// Forwards a new geometry to the surface. Zero-area geometries (a
    /// minimized window) are ignored and the surface keeps its last size.
    pub fn resize(&mut self, geometry: SurfaceGeometry) {
        if self.state == BackdropState::Unmounted || geometry == self.geometry {
            return;
        }
        if geometry.is_empty() {
            trace!(
                width = geometry.window.0,
                height = geometry.window.1,
                "ignoring zero-area resize"
            );
            return;
        }
        self.geometry = geometry;
        if let Some(surface) = self.surface.as_mut() {
            debug!(
                window_width = geometry.window.0,
                window_height = geometry.window.1,
                render_width = geometry.render.0,
                render_height = geometry.render.1,
                "resizing backdrop"
            );
            surface.resize(geometry);
        }
    }

    /// Cancels the pending tick and releases the surface. Terminal.
    pub fn unmount(&mut self) {
        if self.state == BackdropState::Unmounted {
            return;
        }
        self.release(BackdropState::Unmounted);
        info!(frames = self.frames_rendered, "backdrop unmounted");
    }

    pub fn state(&self) -> BackdropState {
        self.state
    }

    pub fn uniforms(&self) -> &SurfaceUniforms {
        &self.uniforms
    }

    pub fn color_stops(&self) -> ColorStops {
        self.stops
    }

    pub fn geometry(&self) -> SurfaceGeometry {
        self.geometry
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    fn release(&mut self, next: BackdropState) {
        self.scheduler.cancel();
        self.surface = None;
        self.state = next;
    }
}

impl<S: RenderSurface> Drop for Backdrop<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Once-per-second frame rate log.
#[derive(Debug, Default)]
struct FrameStats {
    window_start: Option<Instant>,
    frames: u32,
}

impl FrameStats {
    fn record(&mut self, now: Instant, total_frames: u64, time: f32) {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        let elapsed = now.saturating_duration_since(start);
        if elapsed >= Duration::from_secs(1) {
            let fps = self.frames as f32 / elapsed.as_secs_f32();
            debug!(fps = fps.round(), frame_count = total_frames, time, "render stats");
            self.window_start = Some(now);
            self.frames = 0;
        }
    }
}
