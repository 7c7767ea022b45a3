//! # Clock
//!
//! Three-hand clock. The face (outer ring plus hour ticks) sits on a base
//! layer; the second, minute and hour hands sit on the three layers above.
//! The whole stack slowly bobs up and down through the available layers.
//!
//! ```text
//!   layer base+3   hour hand   (red,   shorter)
//!   layer base+2   minute hand (green)
//!   layer base+1   second hand (blue)
//!   layer base     face        (white ring, 12 tick marks)
//! ```

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use pov_core::{Frame, Geometry, Pixel};

use super::{coord, Cadence, Scene, SceneId};

const BOB_INTERVAL: Duration = Duration::from_millis(1925);
const STACK_HEIGHT: usize = 4;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Time of day, as time since midnight.
pub type TimeSource = Box<dyn FnMut() -> Duration + Send>;

fn utc_time_of_day() -> Duration {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    Duration::from_secs(since_epoch.as_secs() % SECONDS_PER_DAY)
}

/// Analog clock scene.
pub struct ClockScene {
    geometry: Geometry,
    time_source: TimeSource,
    now: Duration,
    bob: Cadence,
    base_layer: usize,
    rising: bool,
}

impl ClockScene {
    /// Creates a clock showing UTC wall time.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self::with_time_source(geometry, Box::new(utc_time_of_day))
    }

    /// Creates a clock reading its time from `time_source`.
    #[must_use]
    pub fn with_time_source(geometry: Geometry, mut time_source: TimeSource) -> Self {
        let now = time_source();
        Self {
            geometry,
            time_source,
            now,
            bob: Cadence::new(BOB_INTERVAL),
            base_layer: 0,
            rising: true,
        }
    }

    /// Layer the face is drawn on.
    #[must_use]
    pub fn base_layer(&self) -> usize {
        self.base_layer
    }

    fn max_base_layer(&self) -> usize {
        self.geometry.layers.saturating_sub(STACK_HEIGHT)
    }

    fn bob_step(&mut self) {
        let max = self.max_base_layer();
        if self.rising {
            if self.base_layer >= max {
                self.rising = false;
                self.base_layer = self.base_layer.saturating_sub(1);
            } else {
                self.base_layer += 1;
            }
        } else if self.base_layer == 0 {
            self.rising = true;
            self.base_layer = 1.min(max);
        } else {
            self.base_layer -= 1;
        }
    }

    fn hand(&self, frame: &mut Frame, index: usize, length: usize, layer: usize, color: Pixel) {
        for row in 0..length.min(self.geometry.rows) {
            frame.set_pixel(coord(index), coord(row), coord(layer), color);
        }
    }
}

impl fmt::Debug for ClockScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClockScene")
            .field("now", &self.now)
            .field("base_layer", &self.base_layer)
            .field("rising", &self.rising)
            .finish_non_exhaustive()
    }
}

impl Scene for ClockScene {
    fn id(&self) -> SceneId {
        SceneId::Clock
    }

    fn reset(&mut self) {
        self.bob.reset();
        self.base_layer = 0;
        self.rising = true;
        self.now = (self.time_source)();
    }

    fn update(&mut self, elapsed: Duration) {
        self.now = (self.time_source)();
        for _ in 0..self.bob.advance(elapsed) {
            self.bob_step();
        }
    }

    fn render(&self, frame: &mut Frame) {
        let Geometry { columns, rows, .. } = self.geometry;
        let base = self.base_layer;
        let secs = self.now.as_secs();
        let tick_spacing = (columns / 12).max(1);

        // Face
        for column in 0..columns {
            frame.set_pixel(coord(column), coord(rows) - 1, coord(base), Pixel::WHITE);
            if column % tick_spacing == 0 {
                frame.set_pixel(coord(column), coord(rows) - 2, coord(base), Pixel::WHITE);
                frame.set_pixel(coord(column), coord(rows) - 3, coord(base), Pixel::WHITE);
            }
        }

        let second = usize::try_from(secs % 60).unwrap_or(0);
        let minute = usize::try_from((secs / 60) % 60).unwrap_or(0);
        let hour = usize::try_from((secs / 3600) % 12).unwrap_or(0);

        let long = rows.saturating_sub(2);
        let short = rows.saturating_sub(4);
        self.hand(frame, second * columns / 60, long, base + 1, Pixel::BLUE);
        self.hand(frame, minute * columns / 60, long, base + 2, Pixel::GREEN);
        self.hand(frame, hour * columns / 12, short, base + 3, Pixel::RED);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(h: u64, m: u64, s: u64) -> TimeSource {
        Box::new(move || Duration::from_secs(h * 3600 + m * 60 + s))
    }

    #[test]
    fn test_hands_point_at_time() {
        let scene = ClockScene::with_time_source(Geometry::POV, fixed(8, 15, 30));
        let mut frame = Frame::new(Geometry::POV);
        scene.render(&mut frame);

        // 30s -> column 48, 15min -> column 24, 8h -> column 64.
        assert_eq!(frame.pixel(48, 0, 1), Some(Pixel::BLUE));
        assert_eq!(frame.pixel(48, 5, 1), Some(Pixel::BLUE));
        assert_eq!(frame.pixel(48, 6, 1), Some(Pixel::BLACK));
        assert_eq!(frame.pixel(24, 0, 2), Some(Pixel::GREEN));
        assert_eq!(frame.pixel(64, 3, 3), Some(Pixel::RED));
        assert_eq!(frame.pixel(64, 4, 3), Some(Pixel::BLACK));
    }

    #[test]
    fn test_face_ring_and_ticks() {
        let scene = ClockScene::with_time_source(Geometry::POV, fixed(0, 0, 0));
        let mut frame = Frame::new(Geometry::POV);
        scene.render(&mut frame);

        assert_eq!(frame.pixel(3, 7, 0), Some(Pixel::WHITE));
        assert_eq!(frame.pixel(8, 5, 0), Some(Pixel::WHITE));
        assert_eq!(frame.pixel(9, 5, 0), Some(Pixel::BLACK));
    }

    #[test]
    fn test_stack_bobs_within_layers() {
        let mut scene = ClockScene::with_time_source(Geometry::POV, fixed(1, 2, 3));
        let mut seen = Vec::new();
        for _ in 0..6 {
            scene.update(BOB_INTERVAL);
            seen.push(scene.base_layer());
        }
        assert_eq!(seen, vec![1, 2, 1, 0, 1, 2]);

        scene.reset();
        assert_eq!(scene.base_layer(), 0);
    }

    #[test]
    fn test_shallow_display_does_not_bob() {
        let geometry = Geometry::new(96, 8, 4);
        let mut scene = ClockScene::with_time_source(geometry, fixed(1, 2, 3));
        for _ in 0..4 {
            scene.update(BOB_INTERVAL);
            assert_eq!(scene.base_layer(), 0);
        }
    }
}
