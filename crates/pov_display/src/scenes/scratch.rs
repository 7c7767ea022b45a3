//! Sweep test pattern.
//!
//! ```text
//!   row 7  R . . . . . . . . .      R: sweep marker, one column per step
//!   row 2  . . G . . . . . G .      G: diagonal, shifts one row per step
//!   row 1  . G . . . . . . . G
//!   row 0  G G . . . . G G . .      every 6th column: layer gradient
//! ```

use std::time::Duration;

use pov_core::{Frame, Geometry, Pixel};

use super::{coord, Cadence, Scene, SceneId};

const STEP_INTERVAL: Duration = Duration::from_millis(95);
const GRADIENT_SPACING: usize = 6;
const PATTERN_LAYER: usize = 3;

/// Diagonal stripes sliding down the arm with a marker orbiting the edge.
#[derive(Debug, Clone)]
pub struct ScratchScene {
    geometry: Geometry,
    cadence: Cadence,
    phase: usize,
}

impl ScratchScene {
    /// Creates the scene.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            cadence: Cadence::new(STEP_INTERVAL),
            phase: 0,
        }
    }

    /// Steps taken since activation.
    #[must_use]
    pub fn phase(&self) -> usize {
        self.phase
    }

    fn gradient(&self, layer: usize) -> Pixel {
        let layers = self.geometry.layers;
        let step = 255 / layers.max(1);
        let up = u8::try_from(step * layer).unwrap_or(u8::MAX);
        let down = u8::try_from(step * (layers - 1 - layer)).unwrap_or(u8::MAX);
        Pixel::new(up, 0, down)
    }
}

impl Scene for ScratchScene {
    fn id(&self) -> SceneId {
        SceneId::Scratch
    }

    fn reset(&mut self) {
        self.cadence.reset();
        self.phase = 0;
    }

    fn update(&mut self, elapsed: Duration) {
        let steps = self.cadence.advance(elapsed);
        self.phase = self.phase.wrapping_add(steps as usize);
    }

    fn render(&self, frame: &mut Frame) {
        if self.geometry.is_empty() {
            return;
        }
        let Geometry { columns, rows, layers } = self.geometry;
        let layer = coord(PATTERN_LAYER.min(layers - 1));

        for column in 0..columns {
            if column % GRADIENT_SPACING == 0 {
                for k in 0..layers {
                    frame.set_pixel(coord(column), 0, coord(k), self.gradient(k));
                }
            }
            let row = (column + self.phase) % rows;
            frame.set_pixel(coord(column), coord(row), layer, Pixel::GREEN);
        }
        frame.set_pixel(coord(self.phase % columns), coord(rows - 1), layer, Pixel::RED);
    }
}
