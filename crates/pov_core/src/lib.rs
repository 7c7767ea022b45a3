//! # POV Core
//!
//! Hot-path primitives for a rotating persistence-of-vision display:
//! - A fixed-geometry RGB pixel grid
//! - A two-buffer frame store with a single atomic publish
//! - Edge detection from raw button masks into press/release events
//! - A bounded drop-oldest event queue
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations in hot path** - frames and queues are sized once
//! 2. **No blocking in hot path** - the producer only ever try-locks
//! 3. **Bad coordinates are not errors** - they are ignored
//!
//! ## Example
//!
//! ```rust,ignore
//! use pov_core::{FrameStore, Geometry, Pixel};
//!
//! let store = FrameStore::new(Geometry::POV);
//! if let Some(mut frame) = store.begin_write() {
//!     frame.clear();
//!     frame.set_pixel(5, 2, 1, Pixel::RED);
//! }
//! store.swap();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod frame;
pub mod input;
pub mod sync;

pub use frame::{Frame, Geometry, Pixel};
pub use input::{
    ButtonEvent, ButtonEventKind, ButtonMask, EdgeDetector, EdgeEvents, EventChannel,
    EventChannelReceiver, EventChannelSender, EventQueue,
};
pub use sync::{FrameReadHandle, FrameStore, FrameStoreStats, FrameWriteHandle};
