//! # Frame Handoff Between Producer and Presenter
//!
//! No torn frames. No blocking. Exactly two buffers.
//!
//! ## The Problem
//!
//! ```text
//! Producer (tick thread):   WRITE pixels for the next frame
//! Consumer (LED driver):    READ pixels of the current frame
//!
//! Without synchronization: TORN FRAME  -> half old / half new image on the arm
//! With Mutex:              LOCK STALL  -> tick misses its 5 ms slot
//! ```
//!
//! ## The Solution: Double Buffering
//!
//! ```text
//! Tick N:
//!   Producer writes Buffer A
//!   Presenter reads Buffer B (last published frame)
//!
//! Tick N+1:
//!   SWAP (atomic index flip)
//!   Producer writes Buffer B
//!   Presenter reads Buffer A
//! ```
//!
//! Both sides only ever *try* to lock a buffer, so neither waits on the
//! other. See [`FrameStore`] for the contention rule.

mod double_buffer;

pub use double_buffer::{FrameReadHandle, FrameStore, FrameStoreStats, FrameWriteHandle};
