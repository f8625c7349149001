//! Sequential fetch → render → assemble → write run over the configured locations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use retrocast_common::clock::Stopwatch;
use retrocast_common::error::{RetrocastError, RetrocastResult};
use retrocast_forecast_model::LocationConfig;
use retrocast_render_engine::{
    encode_staged, write_stills, ExportJob, ExportProgress, FrameRenderer, ProgressCallback,
    RenderBackend,
};
use retrocast_weather::ForecastSource;

use crate::report::{LocationOutcome, RunReport, Stage, Step};

/// Progress observer shared by every location: receives the location code.
pub type LocationProgress = Arc<dyn Fn(&str, &ExportProgress) + Send + Sync>;

/// Owns the three collaborators of a run.
pub struct Pipeline {
    source: Box<dyn ForecastSource>,
    renderer: FrameRenderer,
    backend: Box<dyn RenderBackend>,
    output_dir: PathBuf,
    progress: Option<LocationProgress>,
}

impl Pipeline {
    pub fn new(
        source: Box<dyn ForecastSource>,
        renderer: FrameRenderer,
        backend: Box<dyn RenderBackend>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            renderer,
            backend,
            output_dir: output_dir.into(),
            progress: None,
        }
    }

    pub fn with_progress(mut self, progress: LocationProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run every location in order. A failing location never stops the run.
    pub fn run(&mut self, locations: &[LocationConfig]) -> RunReport {
        let watch = Stopwatch::start();
        let mut report = RunReport::default();

        for location in locations {
            let outcome = self.run_location(location);
            report.outcomes.push(outcome);
        }

        tracing::info!(
            locations = report.outcomes.len(),
            failed = report.failures().count(),
            elapsed_secs = watch.elapsed_secs(),
            "Run finished"
        );
        report
    }

    /// Fetch, render and assemble one location.
    pub fn run_location(&mut self, location: &LocationConfig) -> LocationOutcome {
        let watch = Stopwatch::start();
        let mut outcome = LocationOutcome::new(&location.code, location.output_path(&self.output_dir));
        tracing::info!(code = %location.code, city = %location.name, "Generating forecast video");

        let step = self.generate(location, &mut outcome);
        outcome.elapsed_secs = watch.elapsed_secs();

        match step {
            Ok(()) => {
                tracing::info!(
                    code = %location.code,
                    output = %outcome.output_path.display(),
                    elapsed_secs = outcome.elapsed_secs,
                    "Forecast video written"
                );
            }
            Err((step, error)) => {
                tracing::error!(code = %location.code, %step, error = %error, "Location failed");
                if outcome.output_path.exists() {
                    tracing::warn!(
                        code = %location.code,
                        output = %outcome.output_path.display(),
                        "Previous video left in place and is now stale"
                    );
                }
                outcome.fail(step, error);
            }
        }
        outcome
    }

    fn generate(
        &mut self,
        location: &LocationConfig,
        outcome: &mut LocationOutcome,
    ) -> Result<(), (Step, RetrocastError)> {
        let record = self.source.fetch(location).map_err(|e| (Step::Fetch, e))?;
        outcome.advance(Stage::Fetched);

        let frames = self.renderer.render(&record).map_err(|e| (Step::Render, e))?;
        outcome.advance(Stage::Rendered);

        let job = ExportJob::new(&outcome.output_path, self.renderer.settings());
        let progress = self.progress_for(&location.code);
        let staged = encode_staged(&frames, &job, self.backend.as_mut(), progress)
            .map_err(|e| (Step::Assemble, e))?;
        outcome.advance(Stage::Assembled);

        staged.commit().map_err(|e| (Step::Write, e))?;
        outcome.advance(Stage::Written);
        Ok(())
    }

    fn progress_for(&self, code: &str) -> Option<ProgressCallback> {
        let observer = self.progress.clone()?;
        let code = code.to_string();
        Some(Box::new(move |p: ExportProgress| observer(&code, &p)))
    }
}

/// Fetch and render one location, then write its stills as PNGs under
/// `dir/<CODE>/` without encoding.
pub fn preview_location(
    source: &dyn ForecastSource,
    renderer: &FrameRenderer,
    location: &LocationConfig,
    dir: &Path,
) -> RetrocastResult<Vec<PathBuf>> {
    let record = source.fetch(location)?;
    let frames = renderer.render(&record)?;
    let stills = write_stills(&frames, &dir.join(&location.code))?;
    tracing::info!(code = %location.code, stills = stills.len(), "Wrote preview stills");
    Ok(stills)
}
