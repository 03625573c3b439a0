//! CPU rendering path.
//!
//! `SoftwareSurface` evaluates the same field as the GPU shader into an RGB8
//! image. It backs still export and works on machines without an adapter.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use gradient::{rasterize, ColorStops, SampleWindow, SurfaceUniforms};
use image::RgbImage;
use tracing::info;

use crate::driver::{Backdrop, BackdropState, FrameError, RenderSurface, TickOutcome};
use crate::runtime::FixedTimeSource;
use crate::schedule::TickScheduler;
use crate::types::{BackdropOptions, ColorSpaceMode, SurfaceGeometry};

/// Largest edge accepted for still exports.
pub const MAX_EXPORT_DIMENSION: u32 = 16_384;

pub struct SoftwareSurface {
    image: RgbImage,
    window: SampleWindow,
    color_space: ColorSpaceMode,
}

impl SoftwareSurface {
    pub fn new(geometry: &SurfaceGeometry, options: &BackdropOptions) -> Self {
        let (width, height) = geometry.render;
        Self {
            image: RgbImage::new(width.max(1), height.max(1)),
            window: options.window,
            color_space: options.color_space,
        }
    }

    /// The most recently rendered frame.
    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

impl RenderSurface for SoftwareSurface {
    fn resize(&mut self, geometry: SurfaceGeometry) {
        let (width, height) = geometry.render;
        if self.image.dimensions() != (width, height) {
            self.image = RgbImage::new(width.max(1), height.max(1));
        }
    }

    fn render(&mut self, uniforms: &SurfaceUniforms) -> Result<(), FrameError> {
        let (width, height) = self.image.dimensions();
        let color_space = self.color_space;
        let image = &mut self.image;
        rasterize(width, height, &self.window, uniforms, |x, y, color| {
            image.put_pixel(x, y, image::Rgb(color_space.encode_output(color).to_rgb8()));
        });
        Ok(())
    }
}

/// Scheduler for one-shot renders: the caller ticks explicitly.
#[derive(Debug, Default)]
struct ManualTicks;

impl TickScheduler for ManualTicks {
    fn schedule_next(&mut self) {}

    fn cancel(&mut self) {}
}

/// Renders a single frame of the backdrop at `time` seconds and writes it to
/// `path` as a PNG.
pub fn export_still(
    path: &Path,
    stops: ColorStops,
    options: BackdropOptions,
    size: (u32, u32),
    time: f32,
) -> Result<PathBuf> {
    let (width, height) = size;
    if width == 0 || height == 0 {
        anyhow::bail!("export size must be non-zero (got {width}x{height})");
    }
    if width > MAX_EXPORT_DIMENSION || height > MAX_EXPORT_DIMENSION {
        anyhow::bail!(
            "export size {width}x{height} exceeds the {MAX_EXPORT_DIMENSION} pixel limit"
        );
    }
    if !time.is_finite() || time < 0.0 {
        anyhow::bail!("export time must be a non-negative number of seconds (got {time})");
    }

    let geometry = SurfaceGeometry::fixed(width, height);
    let mut backdrop = Backdrop::mount(
        stops,
        options,
        geometry,
        |geometry| Ok(SoftwareSurface::new(geometry, &options)),
        FixedTimeSource::new(time),
        ManualTicks,
    );
    if backdrop.tick() != TickOutcome::Rendered {
        anyhow::bail!("software backdrop did not produce a frame");
    }
    let image = match (backdrop.state(), backdrop.surface()) {
        (BackdropState::Running, Some(surface)) => surface.image().clone(),
        _ => anyhow::bail!("software backdrop is not running"),
    };
    backdrop.unmount();

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export directory {}", parent.display()))?;
    }
    image
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("failed to write still frame to {}", path.display()))?;
    info!(path = %path.display(), width, height, time, "still frame exported");
    Ok(path.to_path_buf())
}
