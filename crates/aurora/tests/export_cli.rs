use std::fs;
use std::process::Command;

use tempfile::TempDir;

fn aurora(config_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_aurora"));
    command
        .env("AURORA_CONFIG_DIR", config_dir)
        .env_remove("AURORA_CONFIG")
        .env("RUST_LOG", "warn");
    command
}

#[test]
fn export_writes_png_of_requested_size() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    let output = root.path().join("stills/frame.png");

    let status = aurora(&config_dir)
        .arg("export")
        .arg(&output)
        .args(["--size", "64x36", "--time", "2.5"])
        .status()
        .expect("failed to run aurora export");
    assert!(status.success());

    let image = image::open(&output).expect("export is a readable PNG");
    assert_eq!((image.width(), image.height()), (64, 36));
}

#[test]
fn export_uses_colors_from_config_file() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("aurora.toml"),
        "[backdrop]\ncolors = [\"#336699\", \"#336699\", \"#336699\"]\n\n[export]\nsize = [8, 4]\n",
    )
    .unwrap();
    let output = root.path().join("flat.png");

    let status = aurora(&config_dir)
        .arg("export")
        .arg(&output)
        .status()
        .expect("failed to run aurora export");
    assert!(status.success());

    let image = image::open(&output).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (8, 4));
    assert!(image.pixels().all(|pixel| pixel.0 == [0x33, 0x66, 0x99]));
}

#[test]
fn export_rejects_non_png_paths() {
    let root = TempDir::new().unwrap();
    let status = aurora(&root.path().join("config"))
        .arg("export")
        .arg(root.path().join("frame.jpg"))
        .status()
        .expect("failed to run aurora export");
    assert!(!status.success());
    assert!(!root.path().join("frame.jpg").exists());
}

#[test]
fn config_where_reports_override_directory() {
    let root = TempDir::new().unwrap();
    let config_dir = root.path().join("config");

    let output = aurora(&config_dir)
        .args(["config", "where"])
        .output()
        .expect("failed to run aurora config where");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&config_dir.display().to_string()));
    assert!(stdout.contains("aurora.toml"));
    assert!(stdout.contains("(missing)"));
}

#[test]
fn config_show_prints_effective_colors() {
    let root = TempDir::new().unwrap();
    let output = aurora(&root.path().join("config"))
        .args(["config", "show"])
        .output()
        .expect("failed to run aurora config show");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[backdrop]"));
    assert!(stdout.contains("#951515"));
    assert!(stdout.contains("#131d7c"));
    assert!(stdout.contains("#1b0553"));
}
