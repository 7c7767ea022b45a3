//! Two copies of a message scrolling in opposite directions on different
//! layers. CROSS pauses and resumes.

use std::time::Duration;

use pov_core::{ButtonEvent, Frame, Geometry, Pixel};
use pov_shared::Key;

use super::{coord, default_navigation, Cadence, Scene, SceneId, Transition};
use crate::text::{text_width, write_text, BlockFont};

const SCROLL_INTERVAL: Duration = Duration::from_millis(50);
const FORWARD_LAYER: i32 = 1;
const BACKWARD_LAYER: i32 = 4;
const FORWARD_COLOR: Pixel = Pixel::new(50, 0, 255);
const BACKWARD_COLOR: Pixel = Pixel::new(0, 255, 100);

/// Scrolling text.
#[derive(Debug, Clone)]
pub struct MarqueeScene {
    geometry: Geometry,
    message: String,
    cadence: Cadence,
    forward: i32,
    backward: i32,
    paused: bool,
}

impl MarqueeScene {
    /// Creates the scene. Lowercase letters are shown as uppercase.
    #[must_use]
    pub fn new(geometry: Geometry, message: &str) -> Self {
        let mut scene = Self {
            geometry,
            message: message.to_ascii_uppercase(),
            cadence: Cadence::new(SCROLL_INTERVAL),
            forward: 0,
            backward: 0,
            paused: false,
        };
        scene.reset();
        scene
    }

    /// Column offsets of the forward and backward copies.
    #[must_use]
    pub fn offsets(&self) -> (i32, i32) {
        (self.forward, self.backward)
    }

    /// Whether scrolling is paused.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    fn entry_offset(&self) -> i32 {
        -coord(text_width(&self.message))
    }

    fn step(&mut self) {
        let columns = coord(self.geometry.columns);
        let entry = self.entry_offset();

        self.forward += 1;
        if self.forward >= columns {
            self.forward = entry;
        }

        self.backward -= 1;
        if self.backward <= entry {
            self.backward = columns;
        }
    }
}

impl Scene for MarqueeScene {
    fn id(&self) -> SceneId {
        SceneId::Marquee
    }

    fn reset(&mut self) {
        self.cadence.reset();
        self.forward = self.entry_offset();
        self.backward = coord(self.geometry.columns);
        self.paused = false;
    }

    fn on_event(&mut self, event: ButtonEvent) -> Transition {
        if event.is_press_of(Key::Cross) {
            self.paused = !self.paused;
            return Transition::Stay;
        }
        default_navigation(event)
    }

    fn update(&mut self, elapsed: Duration) {
        let steps = self.cadence.advance(elapsed);
        if self.paused {
            return;
        }
        for _ in 0..steps {
            self.step();
        }
    }

    fn render(&self, frame: &mut Frame) {
        write_text(frame, &BlockFont, &self.message, self.forward, FORWARD_LAYER, FORWARD_COLOR);
        write_text(frame, &BlockFont, &self.message, self.backward, BACKWARD_LAYER, BACKWARD_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> MarqueeScene {
        MarqueeScene::new(Geometry::POV, "hi")
    }

    #[test]
    fn test_starts_offscreen() {
        let scene = scene();
        assert_eq!(scene.offsets(), (-16, 96));

        let mut frame = Frame::new(Geometry::POV);
        scene.render(&mut frame);
        assert_eq!(frame.lit_count(), 0);
    }

    #[test]
    fn test_scrolls_both_ways() {
        let mut scene = scene();
        scene.update(Duration::from_millis(150));
        assert_eq!(scene.offsets(), (-13, 93));

        let mut frame = Frame::new(Geometry::POV);
        scene.render(&mut frame);
        assert!(frame.lit_count() > 0);
    }

    #[test]
    fn test_wraps_around() {
        let mut scene = scene();
        // Forward copy crosses 96 + 16 columns before re-entering.
        for _ in 0..112 {
            scene.update(SCROLL_INTERVAL);
        }
        assert_eq!(scene.offsets().0, -16);
        assert_eq!(scene.offsets().1, 96);
    }

    #[test]
    fn test_cross_pauses() {
        let mut scene = scene();
        let cross = ButtonEvent::press(Key::Cross.index());

        assert_eq!(scene.on_event(cross), Transition::Stay);
        assert!(scene.is_paused());
        scene.update(Duration::from_millis(500));
        assert_eq!(scene.offsets(), (-16, 96));

        scene.on_event(cross);
        scene.update(SCROLL_INTERVAL);
        assert_eq!(scene.offsets(), (-15, 95));
    }

    #[test]
    fn test_reset_restores_offsets() {
        let mut scene = scene();
        scene.on_event(ButtonEvent::press(Key::Cross.index()));
        scene.on_event(ButtonEvent::press(Key::Cross.index()));
        scene.update(Duration::from_millis(200));
        scene.reset();
        assert_eq!(scene.offsets(), (-16, 96));
        assert!(!scene.is_paused());
    }
}
