//! # POV Display
//!
//! The running side of a persistence-of-vision display: a fixed-period
//! producer renders the active scene into a double-buffered frame store,
//! a presenter thread ships the latest complete frame at its own pace.
//!
//! ## Architecture
//!
//! ```text
//!  InputSource ─mask─> EdgeDetector ─events─> EventQueue (drop-oldest)
//!                                                   │
//!  TickScheduler (5 ms, absolute schedule) ─────────┤
//!                                                   ▼
//!                                           SceneDispatcher
//!                                        (Idle, Scratch, Marquee,
//!                                         ButtonTest, Clock, SpaceGame)
//!                                                   │ render
//!                                                   ▼
//!                                       FrameStore (write │ read)
//!                                                   │ latest frame
//!                                                   ▼
//!                                     Presenter (ascii, bytes, recording)
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use pov_display::{NullPresenter, Pipeline, PovConfig, ScriptedInput};
//!
//! let mut config = PovConfig::default();
//! config.tick.max_ticks = Some(200);
//!
//! let handle = Pipeline::spawn(&config, ScriptedInput::default(), NullPresenter)?;
//! let report = handle.join()?;
//! println!("{} overruns", report.tick.overruns);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pipeline;
pub mod presenter;
pub mod scenes;
pub mod source;
pub mod text;
pub mod tick;

pub use config::{
    DisplaySection, InputSection, PovConfig, PresenterKind, PresenterSection, ScenesSection,
    TickSection,
};
pub use dispatcher::{DispatcherStats, SceneDispatcher};
pub use error::{PovError, PovResult};
pub use pipeline::{
    run_presenter, ConsumerStats, Pipeline, PipelineHandle, PipelineReport, Producer,
    ProducerStats,
};
pub use presenter::{
    AsciiPresenter, ByteStreamPresenter, NullPresenter, Presenter, RecordingPresenter,
};
pub use scenes::{
    default_navigation, ButtonTestScene, ClockScene, IdleScene, MarqueeScene, Scene, SceneId,
    SceneRegistry, SceneSettings, ScratchScene, SpaceGameScene, TimeSource, Transition,
};
pub use source::{ChannelInput, InputSource, ScriptedInput, ScriptedPress};
pub use text::{text_width, write_text, BlockFont, Glyph, GlyphSource};
pub use tick::{
    ManualClock, MonotonicClock, SchedulerConfig, StopSignal, TickClock, TickInfo, TickScheduler,
    TickStats,
};
