//! Blank display with a slow heartbeat dot.

use std::time::Duration;

use pov_core::{Frame, Geometry, Pixel};

use super::{coord, Cadence, Scene, SceneId};

const BLINK_INTERVAL: Duration = Duration::from_millis(500);
const DOT: Pixel = Pixel::new(0, 0, 64);

/// Shows one dim dot on the outermost LED, toggling twice a second.
#[derive(Debug, Clone)]
pub struct IdleScene {
    geometry: Geometry,
    blink: Cadence,
    lit: bool,
}

impl IdleScene {
    /// Creates the scene.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            blink: Cadence::new(BLINK_INTERVAL),
            lit: true,
        }
    }

    /// Whether the heartbeat dot is currently on.
    #[must_use]
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl Scene for IdleScene {
    fn id(&self) -> SceneId {
        SceneId::Idle
    }

    fn reset(&mut self) {
        self.blink.reset();
        self.lit = true;
    }

    fn update(&mut self, elapsed: Duration) {
        if self.blink.advance(elapsed) % 2 == 1 {
            self.lit = !self.lit;
        }
    }

    fn render(&self, frame: &mut Frame) {
        if self.lit {
            frame.set_pixel(0, coord(self.geometry.rows) - 1, 0, DOT);
        }
    }
}
