//! Renderer crate for the Aurora backdrop.
//!
//! The crate drives the gradient field from the `gradient` crate onto a
//! window or an image. The overall flow is:
//!
//! ```text
//!   aurora CLI
//!        │ RendererConfig + WindowHost
//!        ▼
//!   Renderer::run ──▶ winit event loop ──▶ Backdrop::tick() ──▶ GpuSurface
//!        │                  ▲                    │
//!        │                  └── RedrawFlag ◀─────┘ schedule_next()
//!        │
//!        └─ Renderer::export_still ──▶ Backdrop<SoftwareSurface> ──▶ PNG
//! ```
//!
//! [`Backdrop`] is the surface-agnostic state machine. It owns the uniforms
//! and the clock, writes the elapsed time every frame, and only touches the
//! colors when the host hands over different stops. Surfaces implement
//! [`RenderSurface`]; the GPU path lives in `gpu`, the CPU path in
//! `software`.

mod compile;
mod driver;
mod gpu;
mod runtime;
mod schedule;
mod software;
mod types;
mod window;

use std::path::{Path, PathBuf};

use anyhow::Result;

pub use driver::{Backdrop, BackdropState, FrameError, RenderSurface, TickOutcome};
pub use gpu::GpuSurface;
pub use runtime::{
    FixedTimeSource, ManualClock, ManualTimeSource, SystemTimeSource, TimeSample, TimeSource,
};
pub use schedule::{FramePacer, RedrawFlag, TickScheduler};
pub use software::{export_still, SoftwareSurface, MAX_EXPORT_DIMENSION};
pub use types::{
    BackdropOptions, ColorSpaceMode, GpuPowerPreference, PixelRatioRange, RendererConfig,
    SurfaceGeometry,
};
pub use window::{run_window, HostInput, HostKey, HostView, WindowHost};

/// Entry point used by the binary.
pub struct Renderer {
    config: RendererConfig,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Opens the window and blocks until it closes.
    pub fn run<H>(self, host: H) -> Result<()>
    where
        H: WindowHost + 'static,
    {
        tracing::info!(
            title = %self.config.title,
            width = self.config.logical_size.0,
            height = self.config.logical_size.1,
            "opening backdrop window"
        );
        run_window(self.config, host)
    }

    /// Writes one frame of the configured backdrop at `time` seconds.
    pub fn export_still(&self, path: &Path, size: (u32, u32), time: f32) -> Result<PathBuf> {
        export_still(
            path,
            self.config.color_stops,
            self.config.backdrop,
            size,
            time,
        )
    }
}
