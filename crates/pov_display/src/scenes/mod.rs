//! # Scenes
//!
//! Animations the dispatcher can activate. Each scene owns its state
//! privately; nothing is shared between scenes and nothing survives a
//! switch.
//!
//! ## Lifecycle
//!
//! ```text
//!            activate
//!   ┌──────────────────────┐
//!   │                      ▼
//!   │   reset() ──> on_event()* ──> update() ──> render()
//!   │                  │                          │
//!   │                  │ Transition::Switch/Next  │ next tick
//!   │                  ▼                          │
//!   └──────── dispatcher picks target <───────────┘
//! ```
//!
//! ## Registry
//!
//! One instance per [`SceneId`], built once at startup and indexed by the
//! tag. Switching never allocates.

mod clock;
mod idle;
mod marquee;
mod scratch;
mod space_game;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use pov_core::{ButtonEvent, Frame, Geometry};
use pov_shared::Key;

use crate::error::{PovError, PovResult};

pub use button_test::ButtonTestScene;
pub use clock::{ClockScene, TimeSource};
pub use idle::IdleScene;
pub use marquee::MarqueeScene;
pub use scratch::ScratchScene;
pub use space_game::SpaceGameScene;

/// Tag of every built-in scene, in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SceneId {
    /// Blank display with a heartbeat dot.
    Idle,
    /// Sweeping diagonal test pattern.
    Scratch,
    /// Two scrolling messages.
    Marquee,
    /// Lights the band of every held button.
    ButtonTest,
    /// Three-hand clock.
    Clock,
    /// Button-driven shooter.
    SpaceGame,
}

impl SceneId {
    /// Number of scenes.
    pub const COUNT: usize = 6;

    /// All scenes in navigation order.
    pub const ALL: [SceneId; Self::COUNT] = [
        SceneId::Idle,
        SceneId::Scratch,
        SceneId::Marquee,
        SceneId::ButtonTest,
        SceneId::Clock,
        SceneId::SpaceGame,
    ];

    /// Position in [`SceneId::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Name used in config files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SceneId::Idle => "idle",
            SceneId::Scratch => "scratch",
            SceneId::Marquee => "marquee",
            SceneId::ButtonTest => "button_test",
            SceneId::Clock => "clock",
            SceneId::SpaceGame => "space_game",
        }
    }

    /// Following scene, wrapping at the end.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::COUNT]
    }

    /// Preceding scene, wrapping at the start.
    #[must_use]
    pub const fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::COUNT - 1) % Self::COUNT]
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SceneId {
    type Err = PovError;

    fn from_str(s: &str) -> PovResult<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PovError::UnknownScene(s.to_owned()))
    }
}

/// What a scene asks the dispatcher to do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Keep the active scene.
    Stay,
    /// Activate a specific scene.
    Switch(SceneId),
    /// Activate the next scene in navigation order.
    Next,
    /// Activate the previous scene in navigation order.
    Previous,
}

/// Navigation shared by all scenes: OPTIONS goes forward, SHARE goes back.
#[must_use]
pub fn default_navigation(event: ButtonEvent) -> Transition {
    if event.is_press_of(Key::Options) {
        Transition::Next
    } else if event.is_press_of(Key::Share) {
        Transition::Previous
    } else {
        Transition::Stay
    }
}

/// One animation.
///
/// The dispatcher calls, per tick: [`Scene::on_event`] for each queued
/// event, then [`Scene::update`] once, then [`Scene::render`] unless the
/// write frame was busy.
pub trait Scene: Send {
    /// Registry slot of this scene.
    fn id(&self) -> SceneId;

    /// Restores the initial state. Called on every activation.
    fn reset(&mut self);

    /// Reacts to one button event.
    fn on_event(&mut self, event: ButtonEvent) -> Transition {
        default_navigation(event)
    }

    /// Advances the animation by `elapsed`.
    fn update(&mut self, elapsed: Duration);

    /// Draws the current state. The frame arrives cleared.
    fn render(&self, frame: &mut Frame);
}

/// Content settings for the built-in scenes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSettings {
    /// Display extents.
    pub geometry: Geometry,
    /// Marquee message.
    pub marquee_text: String,
    /// Space game seed.
    pub seed: u64,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            geometry: Geometry::POV,
            marquee_text: "HI NOLAN".to_owned(),
            seed: 7,
        }
    }
}

/// Fixed set of scene instances, one per [`SceneId`].
pub struct SceneRegistry {
    scenes: [Box<dyn Scene>; SceneId::COUNT],
}

impl SceneRegistry {
    /// Builds the built-in scenes. Any geometry is accepted: on one with a
    /// zero extent every scene runs but draws nothing.
    #[must_use]
    pub fn new(settings: &SceneSettings) -> Self {
        let geometry = settings.geometry;
        Self {
            scenes: [
                Box::new(IdleScene::new(geometry)),
                Box::new(ScratchScene::new(geometry)),
                Box::new(MarqueeScene::new(geometry, &settings.marquee_text)),
                Box::new(ButtonTestScene::new(geometry)),
                Box::new(ClockScene::new(geometry)),
                Box::new(SpaceGameScene::new(geometry, settings.seed)),
            ],
        }
    }

    /// Replaces the instance in `scene`'s slot.
    pub fn replace(&mut self, scene: Box<dyn Scene>) {
        let slot = scene.id().index();
        self.scenes[slot] = scene;
    }

    /// Scene in `id`'s slot.
    #[must_use]
    pub fn get(&self, id: SceneId) -> &dyn Scene {
        self.scenes[id.index()].as_ref()
    }

    /// Mutable scene in `id`'s slot.
    pub fn get_mut(&mut self, id: SceneId) -> &mut dyn Scene {
        self.scenes[id.index()].as_mut()
    }
}

impl Default for SceneRegistry {
    fn default() -> Self {
        Self::new(&SceneSettings::default())
    }
}

impl fmt::Debug for SceneRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.scenes.iter().map(|s| s.id()))
            .finish()
    }
}

/// Fixed-interval stepper driven by tick elapsed time.
///
/// Returns how many steps fit into the accumulated time. After a stall the
/// backlog is capped instead of replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Cadence {
    interval: Duration,
    accumulated: Duration,
}

impl Cadence {
    const MAX_STEPS: u32 = 4;

    pub(crate) const fn new(interval: Duration) -> Self {
        Self { interval, accumulated: Duration::ZERO }
    }

    pub(crate) fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulated += elapsed;
        let mut steps = 0;
        while self.accumulated >= self.interval && !self.interval.is_zero() {
            self.accumulated -= self.interval;
            steps += 1;
            if steps == Self::MAX_STEPS {
                self.accumulated = Duration::ZERO;
                break;
            }
        }
        steps
    }

    pub(crate) fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }
}

/// Converts a display extent to a signed coordinate.
#[inline]
pub(crate) fn coord(extent: usize) -> i32 {
    i32::try_from(extent).unwrap_or(i32::MAX)
}
