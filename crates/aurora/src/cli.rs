use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use renderer::{ColorSpaceMode, GpuPowerPreference};

#[derive(Parser, Debug)]
#[command(
    name = "aurora",
    author,
    version,
    about = "Animated aurora gradient backdrop",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Configuration file to load instead of `<config dir>/aurora.toml`.
    #[arg(long, global = true, value_name = "FILE", env = "AURORA_CONFIG")]
    pub config: Option<PathBuf>,
    #[command(flatten)]
    pub run: RunArgs,
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Settings shared by the window and still export.
#[derive(Args, Debug, Clone, Default)]
pub struct BackdropArgs {
    /// Backdrop colors as `BASE,MID,ACCENT` (hex or `rgb(r, g, b)`).
    #[arg(long, value_name = "COLORS", value_parser = parse_color_list)]
    pub colors: Option<ColorList>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub backdrop: BackdropArgs,

    /// Initial window size in logical pixels (e.g. `1280x800`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_dimensions)]
    pub size: Option<(u32, u32)>,

    /// Window title.
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Optional FPS cap (0 = every display refresh).
    #[arg(long, value_name = "FPS")]
    pub fps: Option<f32>,

    /// Upper bound for the device pixel ratio used to size the render target.
    #[arg(long, value_name = "RATIO")]
    pub max_pixel_ratio: Option<f64>,

    /// GPU adapter preference: `low` or `high`.
    #[arg(long, value_name = "POWER", value_parser = parse_gpu_power)]
    pub gpu_power: Option<GpuPowerPreference>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a single frame to a PNG file.
    Export(ExportArgs),
    /// Inspect configuration paths and values.
    Config(ConfigCommand),
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Destination PNG path.
    #[arg(value_name = "PATH", value_parser = parse_export_path)]
    pub path: PathBuf,

    /// Timestamp (seconds) to evaluate the animation at.
    #[arg(long, value_name = "SECONDS")]
    pub time: Option<f32>,

    /// Output size in pixels (e.g. `1920x1080`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_dimensions)]
    pub size: Option<(u32, u32)>,

    #[command(flatten)]
    pub backdrop: BackdropArgs,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the resolved configuration directory and file.
    Where,
    /// Print the effective configuration as TOML.
    Show,
}

/// Three validated color literals, kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorList(pub Vec<String>);

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_color_list(value: &str) -> Result<ColorList, String> {
    let colors = split_colors(value);
    gradient::ColorStops::parse(&colors).map_err(|err| err.to_string())?;
    Ok(ColorList(colors))
}

/// Splits on commas that are not inside `rgb(...)`.
fn split_colors(value: &str) -> Vec<String> {
    let mut colors = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for ch in value.chars() {
        match ch {
            '(' => {
                depth += 1;
                current.push(ch);
            }
            ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                colors.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() || !colors.is_empty() {
        colors.push(current.trim().to_string());
    }
    colors
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_gpu_power(value: &str) -> Result<GpuPowerPreference, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" | "integrated" => Ok(GpuPowerPreference::Low),
        "high" | "high-performance" | "discrete" => Ok(GpuPowerPreference::High),
        other => Err(format!("unknown GPU power preference '{other}'; expected low or high")),
    }
}

pub fn parse_export_path(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => Ok(path),
        None => Err("export path has no extension; expected .png".to_string()),
        Some(other) => Err(format!(
            "unsupported export format '.{other}'; expected .png"
        )),
    }
}

pub fn parse_dimensions(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height".to_string())?;
    if width == 0 || height == 0 {
        return Err("dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_color_lists_with_functional_notation() {
        let colors = parse_color_list("#951515, rgb(19, 29, 124),#1b0553").unwrap();
        assert_eq!(colors.0, vec!["#951515", "rgb(19, 29, 124)", "#1b0553"]);
        assert!(parse_color_list("#951515,#131d7c").is_err());
        assert!(parse_color_list("#951515,#131d7c,nope").is_err());
    }

    #[test]
    fn parses_dimensions() {
        assert_eq!(parse_dimensions("1920x1080").unwrap(), (1920, 1080));
        assert_eq!(parse_dimensions("64X32").unwrap(), (64, 32));
        assert!(parse_dimensions("0x10").is_err());
        assert!(parse_dimensions("1920").is_err());
    }

    #[test]
    fn export_path_requires_png() {
        assert!(parse_export_path("still.png").is_ok());
        assert!(parse_export_path("still.PNG").is_ok());
        assert!(parse_export_path("still.exr").is_err());
        assert!(parse_export_path("still").is_err());
    }

    #[test]
    fn parses_enums_case_insensitively() {
        assert_eq!(parse_color_space("Linear").unwrap(), ColorSpaceMode::Linear);
        assert!(parse_color_space("").is_err());
        assert_eq!(parse_gpu_power("LOW").unwrap(), GpuPowerPreference::Low);
        assert!(parse_gpu_power("medium").is_err());
    }

    #[test]
    fn cli_accepts_export_subcommand() {
        let cli = Cli::try_parse_from([
            "aurora",
            "export",
            "out.png",
            "--time",
            "5",
            "--size",
            "64x32",
            "--colors",
            "#000,#fff,#f00",
        ])
        .unwrap();
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.path, PathBuf::from("out.png"));
                assert_eq!(args.time, Some(5.0));
                assert_eq!(args.size, Some((64, 32)));
                assert_eq!(args.backdrop.colors.map(|c| c.0.len()), Some(3));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
