//! Render stills without encoding.

use std::path::PathBuf;
use std::process::ExitCode;

use retrocast_common::config::AppConfig;
use retrocast_pipeline::preview_location;
use retrocast_render_engine::theme::find_font;
use retrocast_render_engine::FrameRenderer;
use retrocast_weather::WeatherClient;

use super::{prepare, EXIT_LOCATION_FAILED};

pub fn run(
    mut config: AppConfig,
    locations: Vec<String>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let selected = prepare(&mut config, &locations, output_dir)?;
    let api_key = config.require_api_key()?;

    let font = find_font(config.font_path.as_deref());
    if font.is_none() {
        tracing::warn!("No usable font found, stills will contain shapes only");
    }

    let client = WeatherClient::new(&config.provider, api_key)?;
    let renderer = FrameRenderer::new(config.video.clone(), font);

    let mut failed = false;
    for location in &selected {
        match preview_location(&client, &renderer, location, &config.output_dir) {
            Ok(stills) => {
                println!("[OK]   {}: {} stills", location.code, stills.len());
                for still in stills {
                    println!("       {}", still.display());
                }
            }
            Err(e) => {
                tracing::error!(code = %location.code, error = %e, "Preview failed");
                println!("[FAIL] {}: {e}", location.code);
                failed = true;
            }
        }
    }

    Ok(if failed {
        ExitCode::from(EXIT_LOCATION_FAILED)
    } else {
        ExitCode::SUCCESS
    })
}
