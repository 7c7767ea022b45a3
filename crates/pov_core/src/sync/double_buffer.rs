//! # Double-Buffered Frame Store
//!
//! Tear-free frame handoff between the tick thread and the presenter.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │         FrameStore          │
//!                    │                             │
//!                    │  ┌─────────┐  ┌─────────┐  │
//!                    │  │ Frame A │  │ Frame B │  │
//!                    │  └────┬────┘  └────┬────┘  │
//!                    │       │            │       │
//!                    │  ┌────┴────────────┴────┐  │
//!                    │  │ Atomic read index 0/1│  │
//!                    │  └──────────────────────┘  │
//!                    └─────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!      ┌──────────────┐ ┌────────────┐ ┌────────────┐
//!      │ WriteHandle  │ │ ReadHandle │ │   swap()   │
//!      │ (tick thread)│ │ (presenter)│ │ (publish)  │
//!      └──────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! - `FrameWriteHandle`: exclusive access to the write buffer (one at a time)
//! - `FrameReadHandle`: shared access to the published buffer (many allowed)
//! - `swap()`: one atomic index flip; never copies pixels
//!
//! ## Contention Rule
//!
//! A reader that grabbed the published frame just before a swap keeps that
//! frame pinned until it is done. After the swap that same buffer is the
//! write buffer. Rather than wait for the reader (stalling the tick) or
//! write underneath it (tearing), [`FrameStore::begin_write`] returns `None`
//! and counts a skipped write. The producer drops that tick's render and
//! does not swap; the presenter keeps showing a complete frame.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::frame::{Frame, Geometry};

/// Double-buffered frame storage for lock-free producer/presenter handoff.
///
/// ## Usage
///
/// ```rust,ignore
/// let store = Arc::new(FrameStore::new(Geometry::POV));
///
/// // Tick thread
/// if let Some(mut frame) = store.begin_write() {
///     frame.clear();
///     scene.render(&mut frame);
///     frame.publish(); // drops the handle, then swaps
/// }
///
/// // Presenter thread (own cadence)
/// let frame = store.read();
/// driver.push(frame.as_bytes());
/// ```
pub struct FrameStore {
    /// The two frame buffers.
    buffers: [RwLock<Frame>; 2],

    /// Index of the published (read) buffer. Write buffer is `read_index ^ 1`.
    read_index: AtomicUsize,

    /// Whether a write handle is currently held.
    write_locked: AtomicBool,

    /// Number of active read handles.
    read_count: AtomicUsize,

    /// Swaps performed.
    frame_count: AtomicU64,

    /// `begin_write` calls refused because a reader still pinned the buffer.
    skipped_writes: AtomicU64,

    geometry: Geometry,
}

/// Point-in-time counters of a [`FrameStore`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStoreStats {
    /// Frames published by `swap()`.
    pub frames_published: u64,
    /// Writes skipped because the write buffer was still being read.
    pub skipped_writes: u64,
    /// Read handles alive at the time of the snapshot.
    pub active_readers: usize,
}

impl FrameStore {
    /// Creates a store with two black frames.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            buffers: [
                RwLock::new(Frame::new(geometry)),
                RwLock::new(Frame::new(geometry)),
            ],
            read_index: AtomicUsize::new(0),
            write_locked: AtomicBool::new(false),
            read_count: AtomicUsize::new(0),
            frame_count: AtomicU64::new(0),
            skipped_writes: AtomicU64::new(0),
            geometry,
        }
    }

    /// Returns the geometry of both frames.
    #[inline]
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Returns the number of swaps performed.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count.load(Ordering::Relaxed)
    }

    /// Returns whether a write handle is currently active.
    #[inline]
    #[must_use]
    pub fn is_write_locked(&self) -> bool {
        self.write_locked.load(Ordering::Acquire)
    }

    /// Returns the number of active read handles.
    #[inline]
    #[must_use]
    pub fn read_handle_count(&self) -> usize {
        self.read_count.load(Ordering::Acquire)
    }

    /// Returns a snapshot of the store counters.
    #[must_use]
    pub fn stats(&self) -> FrameStoreStats {
        FrameStoreStats {
            frames_published: self.frame_count(),
            skipped_writes: self.skipped_writes.load(Ordering::Relaxed),
            active_readers: self.read_handle_count(),
        }
    }

    /// Gets exclusive access to the write frame.
    ///
    /// Returns `None` without waiting if a reader that started before the
    /// previous swap is still holding this buffer (see the module docs).
    ///
    /// # Panics
    ///
    /// Panics if a write handle is already held (only one allowed).
    #[must_use]
    pub fn begin_write(&self) -> Option<FrameWriteHandle<'_>> {
        let was_locked = self.write_locked.swap(true, Ordering::AcqRel);
        assert!(!was_locked, "Double write handle! Only one write handle allowed at a time.");

        let write_idx = self.read_index.load(Ordering::Acquire) ^ 1;

        if let Some(guard) = self.buffers[write_idx].try_write() {
            Some(FrameWriteHandle {
                store: self,
                frame: guard,
                buffer_index: write_idx,
            })
        } else {
            self.write_locked.store(false, Ordering::Release);
            self.skipped_writes.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Tries once to get a read handle on the published frame.
    ///
    /// Returns `None` only when a swap raced this call; retrying succeeds.
    #[must_use]
    pub fn try_read(&self) -> Option<FrameReadHandle<'_>> {
        let read_idx = self.read_index.load(Ordering::Acquire);
        let guard = self.buffers[read_idx].try_read()?;

        // The buffer may have been demoted between the load and the lock.
        // Holding the lock freezes its content, so the index check is final.
        if self.read_index.load(Ordering::Acquire) != read_idx {
            return None;
        }

        self.read_count.fetch_add(1, Ordering::AcqRel);
        Some(FrameReadHandle {
            store: self,
            frame: guard,
            buffer_index: read_idx,
        })
    }

    /// Gets a read handle on the most recently published frame.
    ///
    /// Never waits on the producer: a failed attempt means the index just
    /// flipped, and the newly published buffer is free.
    #[must_use]
    pub fn read(&self) -> FrameReadHandle<'_> {
        loop {
            if let Some(handle) = self.try_read() {
                return handle;
            }
            std::hint::spin_loop();
        }
    }

    /// Publishes the write frame by flipping the buffer roles.
    ///
    /// O(1): one atomic XOR, no pixel copy.
    ///
    /// # Panics
    ///
    /// Panics if a write handle is still active.
    pub fn swap(&self) {
        assert!(
            !self.write_locked.load(Ordering::Acquire),
            "Cannot swap buffers while write handle is active!"
        );

        self.read_index.fetch_xor(1, Ordering::AcqRel);
        self.frame_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new(Geometry::POV)
    }
}

/// Exclusive access to the write frame.
///
/// Derefs to [`Frame`], so `set_pixel` and `clear` act on the write buffer
/// only. Dropping the handle releases the buffer without publishing.
pub struct FrameWriteHandle<'a> {
    store: &'a FrameStore,
    frame: RwLockWriteGuard<'a, Frame>,
    buffer_index: usize,
}

impl FrameWriteHandle<'_> {
    /// Returns the buffer index this handle writes to (for debugging).
    #[inline]
    #[must_use]
    pub fn buffer_index(&self) -> usize {
        self.buffer_index
    }

    /// Releases the write frame and swaps it in as the published frame.
    pub fn publish(self) {
        let store = self.store;
        drop(self);
        store.swap();
    }
}

impl Deref for FrameWriteHandle<'_> {
    type Target = Frame;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.frame
    }
}

impl DerefMut for FrameWriteHandle<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.frame
    }
}

impl Drop for FrameWriteHandle<'_> {
    fn drop(&mut self) {
        self.store.write_locked.store(false, Ordering::Release);
    }
}

/// Shared access to a published frame.
///
/// The frame behind a read handle never changes while the handle is alive,
/// even across swaps.
pub struct FrameReadHandle<'a> {
    store: &'a FrameStore,
    frame: RwLockReadGuard<'a, Frame>,
    buffer_index: usize,
}

impl FrameReadHandle<'_> {
    /// Returns the buffer index this handle reads from (for debugging).
    #[inline]
    #[must_use]
    pub fn buffer_index(&self) -> usize {
        self.buffer_index
    }
}

impl Deref for FrameReadHandle<'_> {
    type Target = Frame;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.frame
    }
}

impl Drop for FrameReadHandle<'_> {
    fn drop(&mut self) {
        self.store.read_count.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Pixel;

    fn small() -> FrameStore {
        FrameStore::new(Geometry::new(8, 4, 2))
    }

    #[test]
    fn test_store_creation() {
        let store = small();
        assert_eq!(store.frame_count(), 0);
        assert!(!store.is_write_locked());
        assert_eq!(store.read_handle_count(), 0);
        assert_eq!(store.read().lit_count(), 0);
    }

    #[test]
    fn test_write_handle() {
        let store = small();

        {
            let mut write = store.begin_write().unwrap();
            assert!(store.is_write_locked());
            write.set_pixel(1, 1, 0, Pixel::BLUE);
        }

        assert!(!store.is_write_locked());
        // Not published yet.
        assert_eq!(store.read().pixel(1, 1, 0), Some(Pixel::BLACK));
    }

    #[test]
    fn test_read_handles_coexist() {
        let store = small();

        let read1 = store.read();
        let read2 = store.read();
        assert_eq!(store.read_handle_count(), 2);
        assert_eq!(read1.buffer_index(), read2.buffer_index());

        drop(read1);
        assert_eq!(store.read_handle_count(), 1);
        drop(read2);
        assert_eq!(store.read_handle_count(), 0);
    }

    #[test]
    fn test_swap_publishes_write_frame() {
        let store = small();

        let write_idx = {
            let mut write = store.begin_write().unwrap();
            write.set_pixel(3, 2, 1, Pixel::RED);
            write.buffer_index()
        };

        store.swap();
        assert_eq!(store.frame_count(), 1);

        let read = store.read();
        assert_eq!(read.buffer_index(), write_idx);
        assert_eq!(read.pixel(3, 2, 1), Some(Pixel::RED));
    }

    #[test]
    fn test_clear_acts_on_write_frame() {
        let store = small();
        let mut write = store.begin_write().unwrap();
        write.set_pixel(5, 2, 1, Pixel::new(255, 0, 0));
        write.clear();
        assert_eq!(write.pixel(5, 2, 1), Some(Pixel::new(0, 0, 0)));
    }

    #[test]
    fn test_publish_helper() {
        let store = small();
        let mut write = store.begin_write().unwrap();
        write.fill(Pixel::GREEN);
        write.publish();

        assert!(!store.is_write_locked());
        assert_eq!(store.frame_count(), 1);
        assert!(store.read().pixels().iter().all(|p| *p == Pixel::GREEN));
    }

    #[test]
    fn test_reader_before_swap_keeps_its_frame() {
        let store = small();

        let mut write = store.begin_write().unwrap();
        write.fill(Pixel::RED);
        write.publish();

        // Reader pins the red frame.
        let reader = store.read();

        let mut write = store.begin_write().unwrap();
        write.fill(Pixel::BLUE);
        write.publish();

        // Swap happened; the old reader still sees red.
        assert!(reader.pixels().iter().all(|p| *p == Pixel::RED));

        // The pinned buffer is now the write buffer: refuse, don't tear.
        assert!(store.begin_write().is_none());
        assert_eq!(store.stats().skipped_writes, 1);
        assert!(!store.is_write_locked());

        // A reader starting after the swap sees the blue frame.
        let fresh = store.read();
        assert!(fresh.pixels().iter().all(|p| *p == Pixel::BLUE));

        drop(reader);
        assert!(store.begin_write().is_some());
    }

    #[test]
    fn test_stats_snapshot() {
        let store = small();
        let _read = store.read();
        store.begin_write().unwrap().publish();

        let stats = store.stats();
        assert_eq!(stats.frames_published, 1);
        assert_eq!(stats.active_readers, 1);
        assert_eq!(stats.skipped_writes, 0);
    }

    #[test]
    #[should_panic(expected = "Double write handle")]
    fn test_double_write_panics() {
        let store = small();

        let _write1 = store.begin_write();
        let _write2 = store.begin_write(); // Should panic
    }

    #[test]
    #[should_panic(expected = "Cannot swap buffers while write handle is active")]
    fn test_swap_during_write_panics() {
        let store = small();

        let _write = store.begin_write();
        store.swap(); // Should panic
    }
}
