use anyhow::Result;
use gradient::{ColorStops, Rgb, SampleWindow};

/// Bounds applied to the display's device pixel ratio before sizing the
/// render target, so high-density displays cannot blow up the per-frame cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRatioRange {
    pub min: f64,
    pub max: f64,
}

impl PixelRatioRange {
    pub const DEFAULT: PixelRatioRange = PixelRatioRange { min: 1.0, max: 2.0 };

    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) || min <= 0.0 {
            anyhow::bail!("pixel ratio bounds must be positive numbers (got {min}..{max})");
        }
        if min > max {
            anyhow::bail!("pixel ratio minimum {min} exceeds maximum {max}");
        }
        Ok(Self { min, max })
    }

    pub fn clamp(&self, device_ratio: f64) -> f64 {
        if !device_ratio.is_finite() || device_ratio <= 0.0 {
            return self.min;
        }
        device_ratio.clamp(self.min, self.max)
    }
}

impl Default for PixelRatioRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Window size plus the size the gradient is actually rendered at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceGeometry {
    /// Surface size in physical pixels as reported by the window; zero while
    /// minimized.
    pub window: (u32, u32),
    /// Size of the gradient render target after the pixel-ratio cap.
    pub render: (u32, u32),
    /// Effective pixel ratio used for `render`.
    pub pixel_ratio: f64,
}

impl SurfaceGeometry {
    pub fn new(physical: (u32, u32), scale_factor: f64, range: PixelRatioRange) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 {
            scale_factor
        } else {
            1.0
        };
        let pixel_ratio = range.clamp(scale);
        let to_render = |physical: u32| {
            let logical = f64::from(physical.max(1)) / scale;
            (logical * pixel_ratio).round().max(1.0) as u32
        };
        Self {
            window: physical,
            render: (to_render(physical.0), to_render(physical.1)),
            pixel_ratio,
        }
    }

    /// A zero-area surface cannot be configured or presented.
    pub fn is_empty(&self) -> bool {
        self.window.0 == 0 || self.window.1 == 0
    }

    /// Geometry where the render target equals the surface, e.g. still export.
    pub fn fixed(width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        Self {
            window: size,
            render: size,
            pixel_ratio: 1.0,
        }
    }
}

/// Output color handling for the backdrop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpaceMode {
    /// Same as `Gamma`.
    #[default]
    Auto,
    /// Blend the stop values as written and present them untouched.
    Gamma,
    /// Decode stops to linear light, blend there, and encode on output.
    Linear,
}

impl ColorSpaceMode {
    pub fn is_linear(self) -> bool {
        matches!(self, ColorSpaceMode::Linear)
    }

    /// Stops as the shading step should see them.
    pub fn prepare_stops(self, stops: &ColorStops) -> ColorStops {
        if self.is_linear() {
            stops.to_linear()
        } else {
            *stops
        }
    }

    /// Converts a shaded color into the encoding stored in 8-bit images.
    pub fn encode_output(self, color: Rgb) -> Rgb {
        if self.is_linear() {
            // Negative channels have no sRGB encoding; clamp them first.
            Rgb::new(color.r.max(0.0), color.g.max(0.0), color.b.max(0.0)).linear_to_srgb()
        } else {
            color
        }
    }
}

impl std::fmt::Display for ColorSpaceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorSpaceMode::Auto => f.write_str("auto"),
            ColorSpaceMode::Gamma => f.write_str("gamma"),
            ColorSpaceMode::Linear => f.write_str("linear"),
        }
    }
}

/// GPU adapter preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GpuPowerPreference {
    Low,
    #[default]
    High,
}

/// Settings that shape how the backdrop renders, independent of the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackdropOptions {
    pub color_space: ColorSpaceMode,
    pub pixel_ratio: PixelRatioRange,
    /// Part of the field that the surface shows.
    pub window: SampleWindow,
    /// Optional frame cap; `None` renders on every display refresh.
    pub max_fps: Option<f32>,
}

impl Default for BackdropOptions {
    fn default() -> Self {
        Self {
            color_space: ColorSpaceMode::default(),
            pixel_ratio: PixelRatioRange::default(),
            window: SampleWindow::FULL,
            max_fps: None,
        }
    }
}

/// Immutable configuration for the windowed runtime.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub title: String,
    /// Initial window size in logical pixels.
    pub logical_size: (u32, u32),
    /// Stops the backdrop mounts with.
    pub color_stops: ColorStops,
    pub backdrop: BackdropOptions,
    pub power: GpuPowerPreference,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            title: "Aurora".to_string(),
            logical_size: (1280, 800),
            color_stops: ColorStops::default(),
            backdrop: BackdropOptions::default(),
            power: GpuPowerPreference::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_ratio_is_clamped_to_range() {
        let range = PixelRatioRange::DEFAULT;
        assert_eq!(range.clamp(0.5), 1.0);
        assert_eq!(range.clamp(1.5), 1.5);
        assert_eq!(range.clamp(3.0), 2.0);
        assert_eq!(range.clamp(f64::NAN), 1.0);
    }

    #[test]
    fn rejects_inverted_or_non_positive_bounds() {
        assert!(PixelRatioRange::new(2.0, 1.0).is_err());
        assert!(PixelRatioRange::new(0.0, 1.0).is_err());
        assert!(PixelRatioRange::new(1.0, f64::INFINITY).is_err());
        assert!(PixelRatioRange::new(0.5, 0.5).is_ok());
    }

    #[test]
    fn high_density_display_renders_at_capped_ratio() {
        let geometry = SurfaceGeometry::new((3840, 2160), 3.0, PixelRatioRange::DEFAULT);
        assert_eq!(geometry.window, (3840, 2160));
        assert_eq!(geometry.render, (2560, 1440));
        assert_eq!(geometry.pixel_ratio, 2.0);
    }

    #[test]
    fn standard_display_renders_at_native_size() {
        let geometry = SurfaceGeometry::new((1920, 1080), 1.0, PixelRatioRange::DEFAULT);
        assert_eq!(geometry.render, (1920, 1080));
    }

    #[test]
    fn minimized_surface_keeps_zero_window_size() {
        let geometry = SurfaceGeometry::new((0, 0), 2.0, PixelRatioRange::DEFAULT);
        assert_eq!(geometry.window, (0, 0));
        assert!(geometry.is_empty());
        assert!(geometry.render.0 >= 1 && geometry.render.1 >= 1);
        assert!(SurfaceGeometry::new((800, 0), 1.0, PixelRatioRange::DEFAULT).is_empty());
        assert!(!SurfaceGeometry::fixed(0, 0).is_empty());
    }

    #[test]
    fn linear_mode_decodes_stops() {
        let stops = ColorStops::default();
        assert_eq!(ColorSpaceMode::Gamma.prepare_stops(&stops), stops);
        assert_eq!(ColorSpaceMode::Auto.prepare_stops(&stops), stops);
        let linear = ColorSpaceMode::Linear.prepare_stops(&stops);
        assert!(linear.base().r < stops.base().r);
        let encoded = ColorSpaceMode::Linear.encode_output(linear.base());
        assert_eq!(encoded.to_rgb8(), stops.base().to_rgb8());
    }
}
