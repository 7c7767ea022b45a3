//! # Button Input
//!
//! From raw controller bits to ordered press/release events.
//!
//! ```text
//!   InputSource ──mask──> EdgeDetector ──events──> EventQueue ──drain──> Scene
//!    (per tick)           (prev mask)              (drop-oldest)
//! ```
//!
//! Everything here runs on the tick thread. [`EventChannel`] is the
//! synchronized variant for when sampling lives on its own thread.

mod channel;
mod edge;
mod queue;

pub use channel::{EventChannel, EventChannelReceiver, EventChannelSender};
pub use edge::{ButtonEvent, ButtonEventKind, ButtonMask, EdgeDetector, EdgeEvents};
pub use queue::EventQueue;
