//! # Space Game
//!
//! Rocks fall from the outer edge of the arm towards the hub; the ship
//! circles the hub and shoots outward.
//!
//! ```text
//!   row 7   . . * . . . . . .    * rock (spawns on the outer row)
//!   row 4   . . . . | . . . .    | shot (travels outward)
//!   row 1   . . . . A . . . .
//!   row 0   . . . A A A . . .    ship (wraps around the revolution)
//! ```
//!
//! Controls: LEFT / RIGHT steer (held keys keep moving), CROSS fires and
//! restarts after game over. Spawns come from a seeded ChaCha stream, so
//! the same seed and the same inputs replay the same game.

use std::time::Duration;

use pov_core::{ButtonEvent, ButtonEventKind, Frame, Geometry, Pixel};
use pov_shared::Key;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{coord, default_navigation, Cadence, Scene, SceneId, Transition};
use crate::text::{write_text, BlockFont};

const STEER_INTERVAL: Duration = Duration::from_millis(40);
const SHOT_INTERVAL: Duration = Duration::from_millis(20);
const FALL_INTERVAL: Duration = Duration::from_millis(120);
const SPAWN_INTERVAL: Duration = Duration::from_millis(300);
const SPAWN_CHANCE: f64 = 0.6;

const MAX_SHOTS: usize = 4;
const MAX_ROCKS: usize = 8;
const START_LIVES: u8 = 3;

const GAME_LAYER: usize = 2;
const HUD_LAYER: i32 = 0;

const SHIP_COLOR: Pixel = Pixel::GREEN;
const SHOT_COLOR: Pixel = Pixel::new(255, 255, 0);
const ROCK_COLOR: Pixel = Pixel::RED;

/// Whether the three-column ship centred on `ship` covers `column`.
fn covers(ship: usize, column: usize, columns: usize) -> bool {
    let distance = column.abs_diff(ship);
    distance <= 1 || distance + 1 == columns
}

/// Decimal digits of `n` without allocating.
fn decimal(mut n: u32, buf: &mut [u8; 10]) -> &str {
    let mut start = buf.len();
    loop {
        start -= 1;
        buf[start] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    std::str::from_utf8(&buf[start..]).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entity {
    column: usize,
    row: i32,
}

/// Button-driven shooter.
#[derive(Debug, Clone)]
pub struct SpaceGameScene {
    geometry: Geometry,
    seed: u64,
    rng: ChaCha8Rng,
    ship: usize,
    steer_left: bool,
    steer_right: bool,
    shots: Vec<Entity>,
    rocks: Vec<Entity>,
    score: u32,
    lives: u8,
    game_over: bool,
    steer: Cadence,
    shot_clock: Cadence,
    fall: Cadence,
    spawn: Cadence,
}

impl SpaceGameScene {
    /// Creates the game. Every activation replays from `seed`.
    #[must_use]
    pub fn new(geometry: Geometry, seed: u64) -> Self {
        let mut scene = Self {
            geometry,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            ship: 0,
            steer_left: false,
            steer_right: false,
            shots: Vec::with_capacity(MAX_SHOTS),
            rocks: Vec::with_capacity(MAX_ROCKS),
            score: 0,
            lives: START_LIVES,
            game_over: false,
            steer: Cadence::new(STEER_INTERVAL),
            shot_clock: Cadence::new(SHOT_INTERVAL),
            fall: Cadence::new(FALL_INTERVAL),
            spawn: Cadence::new(SPAWN_INTERVAL),
        };
        scene.reset();
        scene
    }

    /// Rocks destroyed.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Remaining lives.
    #[must_use]
    pub fn lives(&self) -> u8 {
        self.lives
    }

    /// Ship column.
    #[must_use]
    pub fn ship_column(&self) -> usize {
        self.ship
    }

    /// Whether the last life was lost.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    fn wrap_column(&self, column: usize, delta: isize) -> usize {
        let columns = self.geometry.columns;
        if columns == 0 {
            return column;
        }
        // columns fits in isize for any allocatable frame
        let shifted = column as isize + delta;
        shifted.rem_euclid(columns as isize) as usize
    }

    fn fire(&mut self) {
        if self.shots.len() < MAX_SHOTS {
            self.shots.push(Entity { column: self.ship, row: 2 });
        }
    }

    fn steer_step(&mut self) {
        match (self.steer_left, self.steer_right) {
            (true, false) => self.ship = self.wrap_column(self.ship, -1),
            (false, true) => self.ship = self.wrap_column(self.ship, 1),
            _ => {}
        }
    }

    fn collide(&mut self) {
        let mut hits = 0;
        self.shots.retain(|shot| {
            let hit = self
                .rocks
                .iter()
                .position(|rock| rock.column == shot.column && rock.row <= shot.row);
            match hit {
                Some(i) => {
                    self.rocks.swap_remove(i);
                    hits += 1;
                    false
                }
                None => true,
            }
        });
        self.score += hits;
    }

    fn advance_shots(&mut self) {
        let rows = coord(self.geometry.rows);
        for shot in &mut self.shots {
            shot.row += 1;
        }
        self.shots.retain(|shot| shot.row < rows);
        self.collide();
    }

    fn advance_rocks(&mut self) {
        for rock in &mut self.rocks {
            rock.row -= 1;
        }

        let ship = self.ship;
        let columns = self.geometry.columns;
        let mut crashes = 0u8;
        self.rocks.retain(|rock| {
            if rock.row == 0 && covers(ship, rock.column, columns) {
                crashes = crashes.saturating_add(1);
                return false;
            }
            rock.row >= 0
        });
        self.collide();

        self.lives = self.lives.saturating_sub(crashes);
        if self.lives == 0 && !self.game_over {
            self.game_over = true;
            tracing::info!("Space game over, score {}", self.score);
        }
    }

    fn spawn_rock(&mut self) {
        if self.geometry.is_empty() {
            return;
        }
        if self.rocks.len() < MAX_ROCKS && self.rng.gen_bool(SPAWN_CHANCE) {
            let column = self.rng.gen_range(0..self.geometry.columns);
            self.rocks.push(Entity {
                column,
                row: coord(self.geometry.rows) - 1,
            });
        }
    }
}

impl Scene for SpaceGameScene {
    fn id(&self) -> SceneId {
        SceneId::SpaceGame
    }

    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.ship = self.geometry.columns / 2;
        self.steer_left = false;
        self.steer_right = false;
        self.shots.clear();
        self.rocks.clear();
        self.score = 0;
        self.lives = START_LIVES;
        self.game_over = false;
        self.steer.reset();
        self.shot_clock.reset();
        self.fall.reset();
        self.spawn.reset();
    }

    fn on_event(&mut self, event: ButtonEvent) -> Transition {
        let pressed = event.kind == ButtonEventKind::Press;
        match event.key() {
            Some(Key::DLeft) => {
                self.steer_left = pressed;
                if pressed && !self.game_over {
                    self.ship = self.wrap_column(self.ship, -1);
                }
            }
            Some(Key::DRight) => {
                self.steer_right = pressed;
                if pressed && !self.game_over {
                    self.ship = self.wrap_column(self.ship, 1);
                }
            }
            Some(Key::Cross) if pressed => {
                if self.game_over {
                    self.reset();
                } else {
                    self.fire();
                }
            }
            _ => return default_navigation(event),
        }
        Transition::Stay
    }

    fn update(&mut self, elapsed: Duration) {
        if self.game_over {
            return;
        }
        for _ in 0..self.steer.advance(elapsed) {
            self.steer_step();
        }
        for _ in 0..self.shot_clock.advance(elapsed) {
            self.advance_shots();
        }
        for _ in 0..self.fall.advance(elapsed) {
            self.advance_rocks();
            if self.game_over {
                return;
            }
        }
        for _ in 0..self.spawn.advance(elapsed) {
            self.spawn_rock();
        }
    }

    fn render(&self, frame: &mut Frame) {
        let layer = coord(GAME_LAYER.min(self.geometry.layers.saturating_sub(1)));

        if self.game_over {
            let mut buf = [0u8; 10];
            write_text(frame, &BlockFont, decimal(self.score, &mut buf), 0, layer, Pixel::WHITE);
            return;
        }

        let ship = coord(self.ship);
        frame.set_pixel(coord(self.wrap_column(self.ship, -1)), 0, layer, SHIP_COLOR);
        frame.set_pixel(ship, 0, layer, SHIP_COLOR);
        frame.set_pixel(coord(self.wrap_column(self.ship, 1)), 0, layer, SHIP_COLOR);
        frame.set_pixel(ship, 1, layer, SHIP_COLOR);

        for shot in &self.shots {
            frame.set_pixel(coord(shot.column), shot.row, layer, SHOT_COLOR);
        }
        for rock in &self.rocks {
            frame.set_pixel(coord(rock.column), rock.row, layer, ROCK_COLOR);
        }

        // Lives on the outer edge of the HUD layer.
        let outer = coord(self.geometry.rows) - 1;
        for life in 0..self.lives {
            frame.set_pixel(i32::from(life) * 2, outer, HUD_LAYER, Pixel::WHITE);
        }
    }
}
