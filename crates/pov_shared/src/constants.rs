//! # Display & Timing Constants
//!
//! Production values for the rotating display.
//!
//! **CRITICAL:** These values are baked into the firmware image.
//! Changes require a firmware rebuild.

// =============================================================================
// GEOMETRY
// =============================================================================

/// Angular positions per revolution.
pub const DISPLAY_COLUMNS: usize = 96;

/// Radial LEDs per arm.
pub const DISPLAY_ROWS: usize = 8;

/// Depth tiers stacked along the spin axis.
pub const DISPLAY_LAYERS: usize = 6;

// =============================================================================
// TIMING
// =============================================================================

/// Producer tick period in milliseconds (200 Hz).
pub const TICK_PERIOD_MS: u64 = 5;

// =============================================================================
// INPUT
// =============================================================================

/// Logical buttons on the controller.
pub const NUM_KEYS: usize = 16;

/// Widest button mask the edge detector accepts.
pub const MAX_BUTTONS: usize = 32;

const _: () = assert!(NUM_KEYS <= MAX_BUTTONS);

/// Default capacity of the per-tick button event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 32;

// =============================================================================
// TEXT
// =============================================================================

/// Columns per character cell of the block font.
pub const GLYPH_WIDTH: usize = 8;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_row_bits_cover_display_rows() {
        // One glyph column byte lights exactly one arm of LEDs.
        assert_eq!(DISPLAY_ROWS, u8::BITS as usize);
    }
}
