use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::Renderer;
use tracing_subscriber::EnvFilter;

use crate::cli::{ExportArgs, RunArgs};
use crate::config::AuroraConfig;
use crate::paths::AppPaths;
use crate::shell::PageShell;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Resolves the configuration file: `--config` wins over the discovered path.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(AppPaths::discover()?.config_file()),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<AuroraConfig> {
    let path = config_path(explicit)?;
    let config = AuroraConfig::load(&path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::debug!(path = %path.display(), "resolved aurora configuration");
    Ok(config)
}

pub fn run(config_file: Option<&Path>, args: RunArgs) -> Result<()> {
    let mut config = load_config(config_file)?;
    config.apply_run_args(&args)?;
    let renderer_config = config.renderer_config()?;

    tracing::info!(
        colors = %renderer_config.color_stops,
        color_space = %renderer_config.backdrop.color_space,
        fps = ?renderer_config.backdrop.max_fps,
        "starting aurora"
    );

    let shell = PageShell::new(
        config.page_colors(),
        f64::from(renderer_config.logical_size.1),
    );
    Renderer::new(renderer_config).run(shell)
}

pub fn export(config_file: Option<&Path>, args: ExportArgs) -> Result<()> {
    let mut config = load_config(config_file)?;
    config.apply_backdrop_args(&args.backdrop)?;
    if let Some(size) = args.size {
        config.export.size = size;
    }
    if let Some(time) = args.time {
        config.export.time = time;
    }
    config.validate()?;

    let renderer = Renderer::new(config.renderer_config()?);
    let written = renderer.export_still(&args.path, config.export.size, config.export.time)?;
    println!("{}", written.display());
    Ok(())
}

pub fn config_where(config_file: Option<&Path>) -> Result<()> {
    let paths = AppPaths::discover()?;
    let file = config_path(config_file)?;
    println!("Configuration:");
    println!("  config dir: {}", paths.config_dir().display());
    println!(
        "  file:       {}{}",
        file.display(),
        if file.exists() { "" } else { " (missing)" }
    );
    Ok(())
}

pub fn config_show(config_file: Option<&Path>) -> Result<()> {
    let config = load_config(config_file)?;
    let effective = config.effective()?;
    let rendered =
        toml::to_string_pretty(&effective).context("failed to serialise configuration")?;
    print!("{rendered}");
    Ok(())
}
