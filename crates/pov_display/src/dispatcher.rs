//! # Scene Dispatcher
//!
//! Owns the scene registry and the active scene tag. Once per tick it
//! routes the drained button events, advances the active scene and lets it
//! draw.
//!
//! ```text
//!   events ──> active.on_event() ──> Transition ──> activate + reset target
//!                   │                                       │
//!                   └──── remaining events go to the new ───┘
//!                         active scene
//!
//!   then: active.update(elapsed) ──> active.render(frame)   (if frame free)
//! ```

use std::time::Duration;

use pov_core::{ButtonEvent, Frame};

use crate::scenes::{Scene, SceneId, SceneRegistry, Transition};

/// Dispatcher counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatcherStats {
    /// Ticks processed.
    pub ticks: u64,
    /// Scene activations after the initial one.
    pub switches: u64,
    /// Events handed to scenes.
    pub events_routed: u64,
    /// Ticks whose render was skipped because no frame was available.
    pub renders_skipped: u64,
}

/// Scene state machine.
#[derive(Debug)]
pub struct SceneDispatcher {
    registry: SceneRegistry,
    active: SceneId,
    stats: DispatcherStats,
}

impl SceneDispatcher {
    /// Creates a dispatcher and activates `initial` from a clean state.
    #[must_use]
    pub fn new(mut registry: SceneRegistry, initial: SceneId) -> Self {
        registry.get_mut(initial).reset();
        tracing::info!("Scene dispatcher started in {}", initial);
        Self {
            registry,
            active: initial,
            stats: DispatcherStats::default(),
        }
    }

    /// Tag of the active scene.
    #[inline]
    #[must_use]
    pub fn active(&self) -> SceneId {
        self.active
    }

    /// The active scene.
    #[must_use]
    pub fn active_scene(&self) -> &dyn Scene {
        self.registry.get(self.active)
    }

    /// The registry.
    #[must_use]
    pub fn registry(&self) -> &SceneRegistry {
        &self.registry
    }

    /// Counters since construction.
    #[must_use]
    pub fn stats(&self) -> DispatcherStats {
        self.stats
    }

    /// Activates `target` and resets it, even if it is already active.
    pub fn switch_to(&mut self, target: SceneId) {
        let from = self.active;
        self.registry.get_mut(target).reset();
        self.active = target;
        self.stats.switches += 1;
        tracing::info!("Scene switch: {} -> {}", from, target);
    }

    /// Applies a transition returned by a scene.
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Stay => {}
            Transition::Switch(target) => self.switch_to(target),
            Transition::Next => self.switch_to(self.active.next()),
            Transition::Previous => self.switch_to(self.active.previous()),
        }
    }

    /// Runs one tick.
    ///
    /// Events are delivered in order to whichever scene is active when each
    /// one arrives. `frame` is `None` when the write buffer was busy: the
    /// scene still updates but does not draw.
    pub fn tick<I>(&mut self, elapsed: Duration, events: I, frame: Option<&mut Frame>)
    where
        I: IntoIterator<Item = ButtonEvent>,
    {
        self.stats.ticks += 1;

        for event in events {
            self.stats.events_routed += 1;
            let transition = self.registry.get_mut(self.active).on_event(event);
            self.apply(transition);
        }

        let scene = self.registry.get_mut(self.active);
        scene.update(elapsed);
        match frame {
            Some(frame) => scene.render(frame),
            None => self.stats.renders_skipped += 1,
        }
    }
}
