use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use gradient::{ColorStops, SampleWindow};
use renderer::{
    BackdropOptions, ColorSpaceMode, GpuPowerPreference, PixelRatioRange, RendererConfig,
    MAX_EXPORT_DIMENSION,
};
use serde::{Deserialize, Serialize};

use crate::cli::{BackdropArgs, RunArgs};
use crate::shell::PAGE_COLORS;

/// Smallest non-zero frame cap: one frame every 1000 seconds.
const MIN_FPS_CAP: f32 = 1.0e-3;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpaceSetting {
    #[default]
    Auto,
    Gamma,
    Linear,
}

impl From<ColorSpaceSetting> for ColorSpaceMode {
    fn from(value: ColorSpaceSetting) -> Self {
        match value {
            ColorSpaceSetting::Auto => ColorSpaceMode::Auto,
            ColorSpaceSetting::Gamma => ColorSpaceMode::Gamma,
            ColorSpaceSetting::Linear => ColorSpaceMode::Linear,
        }
    }
}

impl From<ColorSpaceMode> for ColorSpaceSetting {
    fn from(value: ColorSpaceMode) -> Self {
        match value {
            ColorSpaceMode::Auto => ColorSpaceSetting::Auto,
            ColorSpaceMode::Gamma => ColorSpaceSetting::Gamma,
            ColorSpaceMode::Linear => ColorSpaceSetting::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PowerSetting {
    Low,
    #[default]
    High,
}

impl From<PowerSetting> for GpuPowerPreference {
    fn from(value: PowerSetting) -> Self {
        match value {
            PowerSetting::Low => GpuPowerPreference::Low,
            PowerSetting::High => GpuPowerPreference::High,
        }
    }
}

impl From<GpuPowerPreference> for PowerSetting {
    fn from(value: GpuPowerPreference) -> Self {
        match value {
            GpuPowerPreference::Low => PowerSetting::Low,
            GpuPowerPreference::High => PowerSetting::High,
        }
    }
}

/// Contents of `aurora.toml`. Every field is optional in the file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuroraConfig {
    pub window: WindowSection,
    pub backdrop: BackdropSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub title: String,
    pub size: (u32, u32),
    /// Frame cap; absent or `0` renders on every display refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<f32>,
    pub gpu_power: PowerSetting,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "Aurora".to_string(),
            size: (1280, 800),
            fps: None,
            gpu_power: PowerSetting::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackdropSection {
    /// Base, mid, and accent colors. The page colors are used when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorStops>,
    pub color_space: ColorSpaceSetting,
    pub min_pixel_ratio: f64,
    pub max_pixel_ratio: f64,
    pub sample_origin: [f32; 2],
    pub sample_extent: [f32; 2],
}

impl Default for BackdropSection {
    fn default() -> Self {
        Self {
            colors: None,
            color_space: ColorSpaceSetting::default(),
            min_pixel_ratio: PixelRatioRange::DEFAULT.min,
            max_pixel_ratio: PixelRatioRange::DEFAULT.max,
            sample_origin: SampleWindow::FULL.origin,
            sample_extent: SampleWindow::FULL.extent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    pub size: (u32, u32),
    pub time: f32,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            size: (1920, 1080),
            time: 0.0,
        }
    }
}

impl AuroraConfig {
    /// Reads `path`, returning defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no configuration file; using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AuroraConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = self.window.size;
        if width == 0 || height == 0 {
            return Err(ConfigError::Invalid(
                "window.size must be greater than zero".into(),
            ));
        }
        if let Some(fps) = self.window.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "window.fps must be a non-negative number (got {fps})"
                )));
            }
            if fps > 0.0 && fps < MIN_FPS_CAP {
                return Err(ConfigError::Invalid(format!(
                    "window.fps must be 0 (uncapped) or at least {MIN_FPS_CAP} (got {fps})"
                )));
            }
        }
        self.pixel_ratio()?;
        let extent = self.backdrop.sample_extent;
        let origin = self.backdrop.sample_origin;
        if !extent
            .iter()
            .chain(origin.iter())
            .all(|value| value.is_finite())
            || extent.iter().any(|value| *value == 0.0)
        {
            return Err(ConfigError::Invalid(
                "backdrop.sample_extent must be finite and non-zero".into(),
            ));
        }
        let (export_w, export_h) = self.export.size;
        if export_w == 0
            || export_h == 0
            || export_w > MAX_EXPORT_DIMENSION
            || export_h > MAX_EXPORT_DIMENSION
        {
            return Err(ConfigError::Invalid(format!(
                "export.size must be between 1 and {MAX_EXPORT_DIMENSION} per side"
            )));
        }
        if !self.export.time.is_finite() {
            return Err(ConfigError::Invalid("export.time must be finite".into()));
        }
        Ok(())
    }

    pub fn apply_run_args(&mut self, args: &RunArgs) -> Result<(), ConfigError> {
        self.apply_backdrop_args(&args.backdrop)?;
        if let Some(title) = &args.title {
            self.window.title = title.clone();
        }
        if let Some(size) = args.size {
            self.window.size = size;
        }
        if let Some(fps) = args.fps {
            self.window.fps = Some(fps);
        }
        if let Some(max) = args.max_pixel_ratio {
            self.backdrop.max_pixel_ratio = max;
            if self.backdrop.min_pixel_ratio > max {
                self.backdrop.min_pixel_ratio = max;
            }
        }
        if let Some(power) = args.gpu_power {
            self.window.gpu_power = power.into();
        }
        self.validate()
    }

    pub fn apply_backdrop_args(&mut self, args: &BackdropArgs) -> Result<(), ConfigError> {
        if let Some(colors) = &args.colors {
            let stops = ColorStops::parse(&colors.0)
                .map_err(|err| ConfigError::Invalid(format!("--colors: {err}")))?;
            self.backdrop.colors = Some(stops);
        }
        if let Some(mode) = args.color_space {
            self.backdrop.color_space = mode.into();
        }
        Ok(())
    }

    /// Color literals the page hands to the backdrop on every render.
    pub fn page_colors(&self) -> Vec<String> {
        match self.backdrop.colors {
            Some(stops) => stops.into(),
            None => PAGE_COLORS.iter().map(|color| color.to_string()).collect(),
        }
    }

    pub fn color_stops(&self) -> Result<ColorStops, ConfigError> {
        ColorStops::parse(&self.page_colors())
            .map_err(|err| ConfigError::Invalid(format!("backdrop.colors: {err}")))
    }

    pub fn pixel_ratio(&self) -> Result<PixelRatioRange, ConfigError> {
        PixelRatioRange::new(self.backdrop.min_pixel_ratio, self.backdrop.max_pixel_ratio)
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    pub fn backdrop_options(&self) -> Result<BackdropOptions, ConfigError> {
        let max_fps = self.window.fps.filter(|fps| *fps > 0.0);
        Ok(BackdropOptions {
            color_space: self.backdrop.color_space.into(),
            pixel_ratio: self.pixel_ratio()?,
            window: SampleWindow::new(self.backdrop.sample_origin, self.backdrop.sample_extent),
            max_fps,
        })
    }

    pub fn renderer_config(&self) -> Result<RendererConfig, ConfigError> {
        Ok(RendererConfig {
            title: self.window.title.clone(),
            logical_size: self.window.size,
            color_stops: self.color_stops()?,
            backdrop: self.backdrop_options()?,
            power: self.window.gpu_power.into(),
        })
    }

    /// Copy with every implicit default spelled out, for `config show`.
    pub fn effective(&self) -> Result<Self, ConfigError> {
        let mut effective = self.clone();
        effective.backdrop.colors = Some(self.color_stops()?);
        Ok(effective)
    }
}
