//! Retrocast Pipeline
//!
//! Runs the per-location pipeline sequentially:
//!
//! ```text
//! LocationConfig ─▶ ForecastSource::fetch ─▶ FrameRenderer::render ─▶ encode_staged ─▶ commit ─▶ <CODE>weather.mp4
//! ```
//!
//! Each location is isolated: its failure is recorded in the [`RunReport`]
//! and the next location still runs.

pub mod report;
pub mod run;

pub use report::{LocationOutcome, RunReport, Stage, Step};
pub use run::{preview_location, LocationProgress, Pipeline};
