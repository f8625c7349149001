pub mod check;
pub mod generate;
pub mod preview;

use std::path::PathBuf;

use retrocast_common::config::AppConfig;
use retrocast_forecast_model::LocationConfig;

/// At least one location failed.
pub const EXIT_LOCATION_FAILED: u8 = 1;

/// Configuration or environment problem; nothing was fetched.
pub const EXIT_CONFIG: u8 = 2;

/// Apply the `--output-dir` flag and resolve `--location` filters.
fn prepare(
    config: &mut AppConfig,
    locations: &[String],
    output_dir: Option<PathBuf>,
) -> anyhow::Result<Vec<LocationConfig>> {
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    Ok(config.select_locations(locations)?)
}
