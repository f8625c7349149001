//! Per-location outcomes of a run.

use std::fmt;
use std::path::PathBuf;

use retrocast_common::error::RetrocastError;

/// Step of the per-location pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Fetch,
    Render,
    Assemble,
    Write,
}

/// How far a location got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    NotStarted,
    Fetched,
    Rendered,
    Assembled,
    Written,
    Failed(Step),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Fetch => write!(f, "fetch"),
            Step::Render => write!(f, "render"),
            Step::Assemble => write!(f, "assemble"),
            Step::Write => write!(f, "write"),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::NotStarted => write!(f, "not started"),
            Stage::Fetched => write!(f, "fetched"),
            Stage::Rendered => write!(f, "rendered"),
            Stage::Assembled => write!(f, "assembled"),
            Stage::Written => write!(f, "written"),
            Stage::Failed(step) => write!(f, "failed during {step}"),
        }
    }
}

/// Result of one location.
#[derive(Debug)]
pub struct LocationOutcome {
    pub code: String,

    /// Where the video is (or would have been) written.
    pub output_path: PathBuf,

    pub stage: Stage,

    /// Set when `stage` is `Failed`.
    pub error: Option<RetrocastError>,

    pub elapsed_secs: f64,
}

impl LocationOutcome {
    pub fn new(code: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            code: code.into(),
            output_path,
            stage: Stage::NotStarted,
            error: None,
            elapsed_secs: 0.0,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.stage == Stage::Written
    }

    pub(crate) fn advance(&mut self, stage: Stage) {
        tracing::debug!(code = %self.code, from = %self.stage, to = %stage, "Location stage");
        self.stage = stage;
    }

    pub(crate) fn fail(&mut self, step: Step, error: RetrocastError) {
        self.stage = Stage::Failed(step);
        self.error = Some(error);
    }
}

/// Outcomes of every location in run order.
#[derive(Debug, Default)]
pub struct RunReport {
    pub outcomes: Vec<LocationOutcome>,
}

impl RunReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(LocationOutcome::succeeded)
    }

    pub fn failures(&self) -> impl Iterator<Item = &LocationOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }

    pub fn get(&self, code: &str) -> Option<&LocationOutcome> {
        self.outcomes.iter().find(|o| o.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_labels() {
        assert_eq!(Stage::Written.to_string(), "written");
        assert_eq!(
            Stage::Failed(Step::Fetch).to_string(),
            "failed during fetch"
        );
        assert_eq!(
            Stage::Failed(Step::Write).to_string(),
            "failed during write"
        );
    }

    #[test]
    fn test_report_summary() {
        let mut ok = LocationOutcome::new("ATX", PathBuf::from("output/ATXweather.mp4"));
        ok.advance(Stage::Written);
        let mut bad = LocationOutcome::new("LDN", PathBuf::from("output/LDNweather.mp4"));
        bad.fail(Step::Render, RetrocastError::render("boom"));

        let report = RunReport {
            outcomes: vec![ok, bad],
        };
        assert!(!report.all_succeeded());
        assert!(report.get("ATX").unwrap().succeeded());
        let failed: Vec<_> = report.failures().map(|o| o.code.as_str()).collect();
        assert_eq!(failed, vec!["LDN"]);
        assert_eq!(report.get("LDN").unwrap().stage, Stage::Failed(Step::Render));
    }

    #[test]
    fn test_empty_report_succeeds() {
        assert!(RunReport::default().all_succeeded());
    }
}
