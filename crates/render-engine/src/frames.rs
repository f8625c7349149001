//! Frame sequence: the ordered stills of one video and how long each is held.
//!
//! The renderer never produces one image per encoded frame. Each distinct
//! still is produced once with its start offset and hold duration; the
//! encoder expands holds onto the fixed frame grid.

use std::fmt;
use std::ops::Range;

use image::imageops::{self, FilterType};
use image::RgbImage;
use rusttype::Font;

use retrocast_common::clock::FrameClock;
use retrocast_common::config::VideoSettings;
use retrocast_common::error::{RetrocastError, RetrocastResult};
use retrocast_forecast_model::ForecastRecord;

use crate::cards::draw_cards_frame;
use crate::map::draw_map_frame;
use crate::theme::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Visual mode of a time range of the video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Cards,
    Map,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Cards => write!(f, "cards"),
            Segment::Map => write!(f, "map"),
        }
    }
}

/// One still and where it sits on the video timeline.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub segment: Segment,

    /// Offset from the start of the video.
    pub start_secs: f64,

    /// How long the still is shown.
    pub duration_secs: f64,
}

impl Frame {
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }
}

/// Ordered stills of one video.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    clock: FrameClock,
}

impl FrameSequence {
    pub fn new(fps: u32) -> Self {
        Self {
            frames: Vec::new(),
            clock: FrameClock::new(fps),
        }
    }

    /// Append a still held for `duration_secs`, starting where the last one ends.
    pub fn push(&mut self, image: RgbImage, segment: Segment, duration_secs: f64) {
        let start_secs = self.total_duration_secs();
        self.frames.push(Frame {
            image,
            segment,
            start_secs,
            duration_secs,
        });
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.frames.last().map(Frame::end_secs).unwrap_or(0.0)
    }

    /// Time range covered by a segment, `None` if it has no stills.
    pub fn segment_range(&self, segment: Segment) -> Option<Range<f64>> {
        let mut stills = self.frames.iter().filter(|f| f.segment == segment);
        let first = stills.next()?;
        let end = stills.last().unwrap_or(first).end_secs();
        Some(first.start_secs..end)
    }

    /// Frames the encoder emits once holds are expanded onto the frame grid.
    pub fn encoded_frame_count(&self) -> u64 {
        self.clock.frames_in(self.total_duration_secs())
    }

    /// Fail when any still does not have the given resolution.
    pub fn check_geometry(&self, width: u32, height: u32) -> RetrocastResult<()> {
        for (i, frame) in self.frames.iter().enumerate() {
            let (w, h) = frame.image.dimensions();
            if (w, h) != (width, height) {
                return Err(RetrocastError::render(format!(
                    "frame {i} is {w}x{h}, expected {width}x{height}"
                )));
            }
        }
        Ok(())
    }
}

/// Draws both segments of a forecast video.
pub struct FrameRenderer {
    settings: VideoSettings,
    font: Option<Font<'static>>,
}

impl FrameRenderer {
    /// Without a font only shapes are drawn.
    pub fn new(settings: VideoSettings, font: Option<Font<'static>>) -> Self {
        Self { settings, font }
    }

    pub fn settings(&self) -> &VideoSettings {
        &self.settings
    }

    /// Render the card still followed by the map stills.
    pub fn render(&self, record: &ForecastRecord) -> RetrocastResult<FrameSequence> {
        record
            .validate()
            .map_err(|e| RetrocastError::render(e.to_string()))?;

        let settings = &self.settings;
        let mut sequence = FrameSequence::new(settings.fps);

        sequence.push(
            self.render_cards(record),
            Segment::Cards,
            settings.card_segment_secs as f64,
        );
        for i in 0..settings.map_frame_count() as usize {
            sequence.push(
                self.render_map(record, i),
                Segment::Map,
                settings.map_frame_secs as f64,
            );
        }

        sequence.check_geometry(settings.width, settings.height)?;

        tracing::debug!(
            code = %record.code,
            stills = sequence.len(),
            duration_secs = sequence.total_duration_secs(),
            "Rendered frame sequence"
        );
        Ok(sequence)
    }

    /// The forecast-card still.
    pub fn render_cards(&self, record: &ForecastRecord) -> RgbImage {
        let mut canvas = RgbImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        draw_cards_frame(&mut canvas, self.font.as_ref(), record);
        self.fit(canvas)
    }

    /// Map still `index`.
    pub fn render_map(&self, record: &ForecastRecord, index: usize) -> RgbImage {
        let mut canvas = RgbImage::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        draw_map_frame(&mut canvas, self.font.as_ref(), record, index);
        self.fit(canvas)
    }

    fn fit(&self, canvas: RgbImage) -> RgbImage {
        let (width, height) = (self.settings.width, self.settings.height);
        if canvas.dimensions() == (width, height) {
            canvas
        } else {
            imageops::resize(&canvas, width, height, FilterType::Triangle)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_record;

    fn renderer() -> FrameRenderer {
        FrameRenderer::new(VideoSettings::default(), None)
    }

    #[test]
    fn test_sequence_has_one_card_still_and_ten_map_stills() {
        let sequence = renderer().render(&sample_record()).unwrap();
        assert_eq!(sequence.len(), 11);
        assert_eq!(sequence.frames()[0].segment, Segment::Cards);
        assert!(sequence.frames()[1..]
            .iter()
            .all(|f| f.segment == Segment::Map && f.duration_secs == 1.0));
    }

    #[test]
    fn test_segment_boundaries() {
        let sequence = renderer().render(&sample_record()).unwrap();
        assert_eq!(sequence.segment_range(Segment::Cards), Some(0.0..10.0));
        assert_eq!(sequence.segment_range(Segment::Map), Some(10.0..20.0));
        assert_eq!(sequence.total_duration_secs(), 20.0);
        assert_eq!(sequence.encoded_frame_count(), 600);
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let record = sample_record();
        let a = renderer().render(&record).unwrap();
        let b = renderer().render(&record).unwrap();
        for (x, y) in a.frames().iter().zip(b.frames()) {
            assert_eq!(x.image.as_raw(), y.image.as_raw());
        }
    }

    #[test]
    fn test_map_stills_differ_only_when_highlight_moves() {
        let record = sample_record();
        let r = renderer();
        // Without a font the highlight (text color) is invisible.
        assert_eq!(
            r.render_map(&record, 1).as_raw(),
            r.render_map(&record, 2).as_raw()
        );
        assert_ne!(
            r.render_cards(&record).as_raw(),
            r.render_map(&record, 0).as_raw()
        );
    }

    #[test]
    fn test_short_forecast_is_a_render_error() {
        let mut record = sample_record();
        record.days.truncate(2);
        let err = renderer().render(&record).unwrap_err();
        assert!(matches!(err, RetrocastError::Render { .. }));
        assert!(err.to_string().contains("2 day(s)"));
    }

    #[test]
    fn test_frames_scale_to_configured_resolution() {
        let settings = VideoSettings {
            width: 320,
            height: 240,
            ..VideoSettings::default()
        };
        let sequence = FrameRenderer::new(settings, None)
            .render(&sample_record())
            .unwrap();
        assert!(sequence.check_geometry(320, 240).is_ok());
        assert!(sequence.check_geometry(640, 480).is_err());
    }

    #[test]
    fn test_empty_sequence() {
        let sequence = FrameSequence::new(30);
        assert!(sequence.is_empty());
        assert_eq!(sequence.total_duration_secs(), 0.0);
        assert_eq!(sequence.segment_range(Segment::Map), None);
        assert_eq!(sequence.encoded_frame_count(), 0);
    }
}
