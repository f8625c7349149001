//! Fetch, render and encode one video per location.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;

use retrocast_common::config::AppConfig;
use retrocast_pipeline::Pipeline;
use retrocast_render_engine::theme::find_font;
use retrocast_render_engine::{
    ExportProgress, ExportStage, FfmpegBackend, FrameRenderer, RenderBackend,
};
use retrocast_weather::WeatherClient;

use super::{prepare, EXIT_LOCATION_FAILED};

pub fn run(
    mut config: AppConfig,
    locations: Vec<String>,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<ExitCode> {
    let selected = prepare(&mut config, &locations, output_dir)?;
    let api_key = config.require_api_key()?;

    let font = find_font(config.font_path.as_deref()).context(
        "no usable font found; set font_path in the config file to a TrueType font",
    )?;

    let backend = FfmpegBackend::new();
    if !backend.is_available() {
        anyhow::bail!("ffmpeg was not found in PATH");
    }

    let client = WeatherClient::new(&config.provider, api_key)?;
    let renderer = FrameRenderer::new(config.video.clone(), Some(font));
    let mut pipeline = Pipeline::new(
        Box::new(client),
        renderer,
        Box::new(backend),
        &config.output_dir,
    )
    .with_progress(Arc::new(print_progress));

    println!(
        "Generating {} forecast video(s) in {}",
        selected.len(),
        config.output_dir.display()
    );

    let report = pipeline.run(&selected);

    println!();
    for outcome in &report.outcomes {
        match &outcome.error {
            None => println!(
                "[OK]   {}: {} ({:.1}s)",
                outcome.code,
                outcome.output_path.display(),
                outcome.elapsed_secs
            ),
            Some(e) => println!("[FAIL] {}: {} ({e})", outcome.code, outcome.stage),
        }
    }

    if report.all_succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_LOCATION_FAILED))
    }
}

fn print_progress(code: &str, p: &ExportProgress) {
    match p.stage {
        ExportStage::Encoding => print!(
            "\r  {code}: {:.1}% ({}/{} frames, ETA: {:.0}s)  ",
            p.progress * 100.0,
            p.frames_encoded,
            p.total_frames,
            p.eta_secs,
        ),
        ExportStage::Verifying => print!("\r  {code}: verifying{:30}", ""),
        ExportStage::Complete => println!("\r  {code}: done{:40}", ""),
        ExportStage::Preparing => {}
    }
}
