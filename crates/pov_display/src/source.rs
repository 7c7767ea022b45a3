//! # Input Sources
//!
//! Where raw button masks come from. The producer polls exactly once per
//! tick; the source reports the level of every button at that moment.

use std::fmt;
use std::str::FromStr;

use crossbeam_channel::{Receiver, Sender};
use pov_core::ButtonMask;
use pov_shared::Key;
use serde::{Deserialize, Serialize};

use crate::error::PovError;

/// Platform input, sampled once per tick.
pub trait InputSource: Send {
    /// Current level of every button.
    fn poll_mask(&mut self) -> ButtonMask;
}

impl<S: InputSource + ?Sized> InputSource for Box<S> {
    fn poll_mask(&mut self) -> ButtonMask {
        (**self).poll_mask()
    }
}

// =============================================================================
// SCRIPTED
// =============================================================================

/// A key held for a number of ticks, written `KEY@TICK` or
/// `KEY@TICK+HOLD` (e.g. `OPTIONS@200+10`) on the command line and as
/// `{ key = "OPTIONS", at_tick = 200, hold_ticks = 10 }` in config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedPress {
    /// Key pressed.
    pub key: Key,
    /// Tick the key goes down.
    pub at_tick: u64,
    /// Ticks the key stays down (at least one).
    #[serde(default = "default_hold")]
    pub hold_ticks: u64,
}

impl ScriptedPress {
    /// Default hold when none is given.
    pub const DEFAULT_HOLD: u64 = 4;

    /// First tick after the key is released.
    #[must_use]
    pub fn release_tick(&self) -> u64 {
        self.at_tick.saturating_add(self.hold_ticks)
    }

    /// Whether the key is down during `tick`.
    #[must_use]
    pub fn is_held_at(&self, tick: u64) -> bool {
        (self.at_tick..self.release_tick()).contains(&tick)
    }
}

fn default_hold() -> u64 {
    ScriptedPress::DEFAULT_HOLD
}

impl fmt::Display for ScriptedPress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}+{}", self.key.label(), self.at_tick, self.hold_ticks)
    }
}

impl FromStr for ScriptedPress {
    type Err = PovError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PovError::InvalidConfig(format!("invalid press `{s}`, expected KEY@TICK[+HOLD]"));

        let (label, timing) = s.split_once('@').ok_or_else(invalid)?;
        let key = Key::from_label(label.trim())
            .ok_or_else(|| PovError::InvalidConfig(format!("unknown key `{label}`")))?;
        let (at, hold) = match timing.split_once('+') {
            Some((at, hold)) => (at, Some(hold)),
            None => (timing, None),
        };
        let at_tick = at.trim().parse().map_err(|_| invalid())?;
        let hold_ticks = match hold {
            Some(h) => h.trim().parse().map_err(|_| invalid())?,
            None => Self::DEFAULT_HOLD,
        };
        if hold_ticks == 0 {
            return Err(invalid());
        }
        Ok(Self { key, at_tick, hold_ticks })
    }
}

/// Replays a scripted controller, one sample per poll.
///
/// A mask script holds its last mask after it runs out (or nothing, for an
/// empty script). A press script works out each tick's mask from the
/// presses on demand, so presses far in the future cost nothing until
/// their tick comes.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    script: Script,
    tick: u64,
}

#[derive(Debug, Clone)]
enum Script {
    Masks(Vec<ButtonMask>),
    Presses { presses: Vec<ScriptedPress>, end: u64 },
}

impl ScriptedInput {
    /// Plays `masks` in order.
    #[must_use]
    pub fn new(masks: impl IntoIterator<Item = ButtonMask>) -> Self {
        Self { script: Script::Masks(masks.into_iter().collect()), tick: 0 }
    }

    /// Plays a set of key presses.
    ///
    /// One all-up sample follows the last release so every press is also
    /// seen going up.
    #[must_use]
    pub fn from_presses(presses: &[ScriptedPress]) -> Self {
        let end = presses
            .iter()
            .map(ScriptedPress::release_tick)
            .max()
            .map_or(0, |last| last.saturating_add(1));
        Self {
            script: Script::Presses { presses: presses.to_vec(), end },
            tick: 0,
        }
    }

    /// Samples not yet polled.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        let len = match &self.script {
            Script::Masks(masks) => u64::try_from(masks.len()).unwrap_or(u64::MAX),
            Script::Presses { end, .. } => *end,
        };
        len.saturating_sub(self.tick)
    }
}

impl Default for ScriptedInput {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl InputSource for ScriptedInput {
    fn poll_mask(&mut self) -> ButtonMask {
        let tick = self.tick;
        self.tick = self.tick.saturating_add(1);

        match &self.script {
            Script::Masks(masks) => usize::try_from(tick)
                .ok()
                .and_then(|i| masks.get(i))
                .or_else(|| masks.last())
                .copied()
                .unwrap_or(ButtonMask::EMPTY),
            Script::Presses { presses, .. } => presses
                .iter()
                .filter(|press| press.is_held_at(tick))
                .fold(ButtonMask::EMPTY, |mask, press| mask | ButtonMask::from_key(press.key)),
        }
    }
}

// =============================================================================
// CHANNEL-FED
// =============================================================================

/// Masks pushed from another thread (a HID reader, a test driver).
///
/// Each poll takes the newest mask sent since the previous poll; if none
/// was sent the previous level is held. Intermediate masks sent between two
/// polls are never seen, just as a physical sampler would miss them.
#[derive(Debug)]
pub struct ChannelInput {
    rx: Receiver<ButtonMask>,
    current: ButtonMask,
}

impl ChannelInput {
    /// Creates the input and the sender feeding it.
    #[must_use]
    pub fn pair() -> (Sender<ButtonMask>, Self) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (tx, Self { rx, current: ButtonMask::EMPTY })
    }

    /// Level reported by the last poll.
    #[must_use]
    pub fn current(&self) -> ButtonMask {
        self.current
    }
}

impl InputSource for ChannelInput {
    fn poll_mask(&mut self) -> ButtonMask {
        if let Some(latest) = self.rx.try_iter().last() {
            self.current = latest;
        }
        self.current
    }
}
