//! # POV Shared
//!
//! Constants and key names shared by the frame pipeline, the scenes and the
//! simulator.
//!
//! ## CRITICAL RULE
//!
//! Values here describe the physical display. Changing them means the
//! firmware and every recorded frame dump disagree with the hardware.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod keys;

pub use constants::{
    DISPLAY_COLUMNS, DISPLAY_LAYERS, DISPLAY_ROWS, EVENT_QUEUE_CAPACITY, GLYPH_WIDTH,
    MAX_BUTTONS, NUM_KEYS, TICK_PERIOD_MS,
};
pub use keys::Key;
