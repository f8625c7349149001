//! Check system capabilities.

use std::path::Path;
use std::process::ExitCode;

use retrocast_common::config::{AppConfig, API_KEY_ENV};
use retrocast_common::error::RetrocastError;
use retrocast_render_engine::command_exists;
use retrocast_render_engine::theme::{discover_font, load_font};

pub fn run(
    config: &AppConfig,
    config_path: &Path,
    config_error: Option<&RetrocastError>,
) -> anyhow::Result<ExitCode> {
    println!("Retrocast System Check");
    println!("{}", "=".repeat(50));

    let mut ready = true;

    if command_exists("ffmpeg") {
        println!("[OK]   ffmpeg found");
    } else {
        println!("[FAIL] ffmpeg not found in PATH (required for encoding)");
        ready = false;
    }

    if command_exists("ffprobe") {
        println!("[OK]   ffprobe found");
    } else {
        println!("[WARN] ffprobe not found; encoded videos will not be verified");
    }

    if config.require_api_key().is_ok() {
        println!("[OK]   {API_KEY_ENV} is set");
    } else {
        println!("[FAIL] {API_KEY_ENV} is not set");
        ready = false;
    }

    match discover_font(config.font_path.as_deref()) {
        Some(path) => match load_font(&path) {
            Ok(_) => println!("[OK]   Font: {}", path.display()),
            Err(e) => {
                println!("[FAIL] Font {}: {e}", path.display());
                ready = false;
            }
        },
        None => {
            println!("[FAIL] No usable font (set font_path in the config file)");
            ready = false;
        }
    }

    let (config_ok, line) = config_status(config_path, config_error);
    println!("{line}");
    ready &= config_ok;

    println!("       Output directory: {}", config.output_dir.display());
    println!(
        "       Video: {}x{} @ {} fps, {} s",
        config.video.width,
        config.video.height,
        config.video.fps,
        config.video.duration_secs()
    );
    println!("       Locations:");
    for location in &config.locations {
        println!(
            "         {} {} {} ({:.4}, {:.4}) {} -> {}",
            location.code,
            location.name,
            location.region,
            location.lat,
            location.lon,
            location.units.as_query(),
            location.output_file_name()
        );
    }

    println!();
    if ready {
        println!("All required capabilities are available. Retrocast is ready.");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Some required capabilities are missing. See above for fixes.");
        Ok(ExitCode::FAILURE)
    }
}

fn config_status(path: &Path, error: Option<&RetrocastError>) -> (bool, String) {
    match error {
        Some(e) => (false, format!("[FAIL] Config: {e}")),
        None if path.exists() => (true, format!("[OK]   Config: {}", path.display())),
        None => (
            true,
            format!("[OK]   Config: defaults ({} not found)", path.display()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_config_is_reported_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "output_dir": 42, broken"#).unwrap();
        let error = AppConfig::load_or_default(&path).unwrap_err();

        let (ok, line) = config_status(&path, Some(&error));
        assert!(!ok);
        assert!(line.starts_with("[FAIL] Config:"));
        assert!(line.contains("config.json"));
    }

    #[test]
    fn test_present_and_missing_config_are_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let (ok, line) = config_status(&path, None);
        assert!(ok);
        assert!(line.contains("defaults"));

        std::fs::write(&path, "{}").unwrap();
        let (ok, line) = config_status(&path, None);
        assert!(ok);
        assert!(line.starts_with("[OK]   Config:"));
        assert!(!line.contains("defaults"));
    }
}
