//! # Display Configuration
//!
//! TOML configuration, loaded once at startup. Every field is optional;
//! missing values fall back to the production constants in `pov_shared`.
//!
//! ```toml
//! [display]
//! columns = 96
//! rows = 8
//! layers = 6
//!
//! [tick]
//! period_ms = 5
//! max_lag_ticks = 8
//! spin_margin_us = 200
//!
//! [input]
//! buttons = 16
//! queue_capacity = 32
//!
//! # Optional scripted presses for the simulator.
//! [[input.script]]
//! key = "OPTIONS"
//! at_tick = 200
//! hold_ticks = 10
//!
//! [scenes]
//! default = "marquee"
//! marquee_text = "HI NOLAN"
//! seed = 7
//!
//! [presenter]
//! kind = "ascii"
//! interval_ms = 100
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use pov_core::Geometry;
use pov_shared::{
    DISPLAY_COLUMNS, DISPLAY_LAYERS, DISPLAY_ROWS, EVENT_QUEUE_CAPACITY, MAX_BUTTONS, NUM_KEYS,
    TICK_PERIOD_MS,
};
use serde::{Deserialize, Serialize};

use crate::error::{PovError, PovResult};
use crate::scenes::{SceneId, SceneSettings};
use crate::source::ScriptedPress;
use crate::tick::SchedulerConfig;

// =============================================================================
// SECTIONS
// =============================================================================

/// `[display]`: fixed frame extents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    /// Angular positions.
    pub columns: usize,
    /// Radial LEDs.
    pub rows: usize,
    /// Depth tiers.
    pub layers: usize,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            columns: DISPLAY_COLUMNS,
            rows: DISPLAY_ROWS,
            layers: DISPLAY_LAYERS,
        }
    }
}

/// `[tick]`: producer cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TickSection {
    /// Tick period in milliseconds.
    pub period_ms: u64,
    /// Periods of lag tolerated before the schedule is rebased.
    pub max_lag_ticks: u32,
    /// Final part of each wait that is spun instead of slept.
    pub spin_margin_us: u64,
    /// Stop after this many ticks. Unset runs until stopped.
    pub max_ticks: Option<u64>,
}

impl Default for TickSection {
    fn default() -> Self {
        Self {
            period_ms: TICK_PERIOD_MS,
            max_lag_ticks: 8,
            spin_margin_us: 200,
            max_ticks: None,
        }
    }
}

/// `[input]`: button sampling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Buttons tracked by the edge detector.
    pub buttons: usize,
    /// Event queue capacity.
    pub queue_capacity: usize,
    /// Key presses replayed by the simulator, before any given on the
    /// command line.
    pub script: Vec<ScriptedPress>,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            buttons: NUM_KEYS,
            queue_capacity: EVENT_QUEUE_CAPACITY,
            script: Vec::new(),
        }
    }
}

/// `[scenes]`: scene selection and content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenesSection {
    /// Scene active at startup.
    pub default: String,
    /// Message scrolled by the marquee.
    pub marquee_text: String,
    /// Seed for the space game.
    pub seed: u64,
}

impl Default for ScenesSection {
    fn default() -> Self {
        Self {
            default: SceneId::Marquee.name().to_owned(),
            marquee_text: "HI NOLAN".to_owned(),
            seed: 7,
        }
    }
}

/// Output backend used by the simulator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenterKind {
    /// Text dump of the frame.
    #[default]
    Ascii,
    /// Raw RGB bytes, one frame after another.
    Bytes,
    /// Frames are read and discarded.
    Null,
}

impl PresenterKind {
    /// Name used in config files and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascii => "ascii",
            Self::Bytes => "bytes",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for PresenterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresenterKind {
    type Err = PovError;

    fn from_str(s: &str) -> PovResult<Self> {
        [Self::Ascii, Self::Bytes, Self::Null]
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PovError::InvalidConfig(format!("unknown presenter kind: {s}")))
    }
}

/// `[presenter]`: consumer side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterSection {
    /// Backend.
    pub kind: PresenterKind,
    /// Time between two reads of the published frame.
    pub interval_ms: u64,
}

impl Default for PresenterSection {
    fn default() -> Self {
        Self {
            kind: PresenterKind::Ascii,
            interval_ms: 100,
        }
    }
}

// =============================================================================
// TOP LEVEL
// =============================================================================

/// Complete pipeline configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PovConfig {
    /// Frame extents.
    pub display: DisplaySection,
    /// Producer cadence.
    pub tick: TickSection,
    /// Button sampling.
    pub input: InputSection,
    /// Scene selection.
    pub scenes: ScenesSection,
    /// Consumer side.
    pub presenter: PresenterSection,
}

impl PovConfig {
    /// Parses and validates TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML or a value fails
    /// [`PovConfig::validate`].
    pub fn from_toml_str(text: &str) -> PovResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its content is invalid.
    pub fn load(path: impl AsRef<Path>) -> PovResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| PovError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> PovResult<String> {
        toml::to_string_pretty(self).map_err(|e| PovError::InvalidConfig(e.to_string()))
    }

    /// Checks every value the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> PovResult<()> {
        let display = &self.display;
        if display.columns == 0 || display.rows == 0 || display.layers == 0 {
            return Err(PovError::InvalidConfig(format!(
                "display extents must be non-zero, got {}x{}x{}",
                display.columns, display.rows, display.layers
            )));
        }
        if i32::try_from(display.columns).is_err()
            || i32::try_from(display.rows).is_err()
            || i32::try_from(display.layers).is_err()
        {
            return Err(PovError::InvalidConfig("display extents too large".to_owned()));
        }
        if self.tick.period_ms == 0 {
            return Err(PovError::InvalidConfig("tick period must be non-zero".to_owned()));
        }
        if self.tick.max_lag_ticks == 0 {
            return Err(PovError::InvalidConfig("max_lag_ticks must be non-zero".to_owned()));
        }
        if self.input.buttons > MAX_BUTTONS {
            return Err(PovError::InvalidConfig(format!(
                "at most {MAX_BUTTONS} buttons supported, got {}",
                self.input.buttons
            )));
        }
        if self.input.queue_capacity == 0 {
            return Err(PovError::InvalidConfig("queue capacity must be non-zero".to_owned()));
        }
        if let Some(press) = self.input.script.iter().find(|p| p.hold_ticks == 0) {
            return Err(PovError::InvalidConfig(format!(
                "scripted press of {} at tick {} must be held at least one tick",
                press.key.label(),
                press.at_tick
            )));
        }
        if self.presenter.interval_ms == 0 {
            return Err(PovError::InvalidConfig("presenter interval must be non-zero".to_owned()));
        }
        self.default_scene()?;
        Ok(())
    }

    /// Frame geometry.
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.display.columns, self.display.rows, self.display.layers)
    }

    /// Scheduler settings.
    #[must_use]
    pub fn scheduler(&self) -> SchedulerConfig {
        SchedulerConfig {
            period: Duration::from_millis(self.tick.period_ms),
            max_lag_ticks: self.tick.max_lag_ticks,
            max_ticks: self.tick.max_ticks,
        }
    }

    /// Spin margin of the production clock.
    #[must_use]
    pub fn spin_margin(&self) -> Duration {
        Duration::from_micros(self.tick.spin_margin_us)
    }

    /// Button count as the edge detector takes it.
    ///
    /// Saturates for unvalidated configs; [`PovConfig::validate`] rejects
    /// anything above 32.
    #[must_use]
    pub fn button_count(&self) -> u8 {
        u8::try_from(self.input.buttons).unwrap_or(u8::MAX)
    }

    /// Scene active at startup.
    ///
    /// # Errors
    ///
    /// Returns [`PovError::UnknownScene`] if the name matches no scene.
    pub fn default_scene(&self) -> PovResult<SceneId> {
        self.scenes.default.parse()
    }

    /// Content settings for the built-in scenes.
    #[must_use]
    pub fn scene_settings(&self) -> SceneSettings {
        SceneSettings {
            geometry: self.geometry(),
            marquee_text: self.scenes.marquee_text.clone(),
            seed: self.scenes.seed,
        }
    }

    /// Presenter read interval.
    #[must_use]
    pub fn presenter_interval(&self) -> Duration {
        Duration::from_millis(self.presenter.interval_ms)
    }
}
