//! Retrocast Forecast Model
//!
//! Defines the data contracts shared by every stage of the pipeline:
//! - **Locations:** Static per-run configuration (coordinates, units, map)
//! - **Conditions:** Provider condition groups and their icon/description
//! - **Forecast:** The normalized per-location record handed to the renderer
//!
//! Nothing here performs I/O; records are created by the fetcher and
//! discarded after rendering.

pub mod condition;
pub mod forecast;
pub mod location;
pub mod units;

pub use condition::*;
pub use forecast::*;
pub use location::*;
pub use units::*;
