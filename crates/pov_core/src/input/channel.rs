//! Cross-thread event queue.
//!
//! Used when input sampling runs on its own thread. Keeps the exact
//! [`EventQueue`] semantics (FIFO, drop-oldest, eviction count) behind a
//! short critical section that is never held across anything but a push or
//! a drain.

use std::sync::Arc;

use parking_lot::Mutex;

use super::edge::ButtonEvent;
use super::queue::EventQueue;

/// Factory for a connected single-producer / single-consumer pair.
pub struct EventChannel;

impl EventChannel {
    /// Creates a sender/receiver pair sharing one bounded queue.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn create_pair(capacity: usize) -> (EventChannelSender, EventChannelReceiver) {
        let queue = Arc::new(Mutex::new(EventQueue::new(capacity)));
        (
            EventChannelSender { queue: Arc::clone(&queue) },
            EventChannelReceiver { queue },
        )
    }
}

/// Producer half (input thread).
pub struct EventChannelSender {
    queue: Arc<Mutex<EventQueue>>,
}

impl EventChannelSender {
    /// Sends an event, evicting the oldest queued one on overflow.
    ///
    /// Returns true if an older event was evicted.
    #[inline]
    pub fn send(&self, event: ButtonEvent) -> bool {
        self.queue.lock().push(event).is_some()
    }

    /// Sends every event from `events` under a single lock.
    pub fn send_all(&self, events: impl IntoIterator<Item = ButtonEvent>) {
        self.queue.lock().push_all(events);
    }
}

/// Consumer half (tick thread).
pub struct EventChannelReceiver {
    queue: Arc<Mutex<EventQueue>>,
}

impl EventChannelReceiver {
    /// Receives all pending events in arrival order (non-blocking on the
    /// producer beyond the push it may be doing right now).
    #[must_use]
    pub fn drain(&self) -> Vec<ButtonEvent> {
        let mut events = Vec::new();
        self.drain_into(&mut events);
        events
    }

    /// Appends all pending events to `out`, reusing its allocation.
    pub fn drain_into(&self, out: &mut Vec<ButtonEvent>) {
        out.extend(self.queue.lock().drain());
    }

    /// Returns the number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.queue.lock().len()
    }

    /// Events evicted by overflow since creation.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.queue.lock().dropped()
    }
}
