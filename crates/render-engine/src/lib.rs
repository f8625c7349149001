//! Retrocast Render Engine
//!
//! Turns a normalized forecast record into a retro weather-channel video:
//! the ordered stills of both segments, then an H.264 encode.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ForecastRecord ──┬── cards still (held 10 s) ──┐
//!                  │                             ├── FrameSequence
//!                  └── map stills (10 × 1 s) ────┘         │
//!                                                          ▼
//!                                            PNG stills + concat script
//!                                                          │
//!                                                          ▼
//!                                            ffmpeg (libx264, yuv420p)
//!                                                          │
//!                                                          ▼
//!                                        staging file ── ffprobe ──▶ <CODE>weather.mp4
//! ```

pub mod cards;
pub mod chrome;
pub mod export;
pub mod frames;
pub mod icons;
pub mod map;
pub mod text;
pub mod theme;

pub use export::*;
pub use frames::{Frame, FrameRenderer, FrameSequence, Segment};
pub use rusttype::Font;
