//! Bounded drop-oldest FIFO of button events.
//!
//! A live control surface cares about the latest transitions, so when the
//! queue is full the oldest event is evicted to admit the new one. Evictions
//! are counted, never reported as errors.

use std::collections::vec_deque::{self, VecDeque};

use super::edge::ButtonEvent;

/// Fixed-capacity event FIFO.
///
/// Storage is reserved once at construction; `push` and `drain` never
/// reallocate.
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<ButtonEvent>,
    capacity: usize,
    dropped: u64,
}

impl EventQueue {
    /// Creates an empty queue holding at most `capacity` events.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Event queue capacity must be non-zero");
        Self {
            events: VecDeque::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Appends an event, evicting the oldest one if the queue is full.
    ///
    /// Returns the evicted event, if any.
    pub fn push(&mut self, event: ButtonEvent) -> Option<ButtonEvent> {
        let evicted = if self.events.len() == self.capacity {
            self.dropped += 1;
            self.events.pop_front()
        } else {
            None
        };
        self.events.push_back(event);
        evicted
    }

    /// Pushes every event from `events` in order.
    pub fn push_all(&mut self, events: impl IntoIterator<Item = ButtonEvent>) {
        for event in events {
            let _ = self.push(event);
        }
    }

    /// Removes and yields all queued events in arrival order.
    ///
    /// The queue is empty once the iterator is dropped.
    pub fn drain(&mut self) -> vec_deque::Drain<'_, ButtonEvent> {
        self.events.drain(..)
    }

    /// Queued events, oldest first, without removing them.
    pub fn iter(&self) -> impl Iterator<Item = &ButtonEvent> {
        self.events.iter()
    }

    /// Number of queued events.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing is queued.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Maximum number of queued events.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Events evicted by overflow since creation.
    #[inline]
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = EventQueue::new(8);
        queue.push_all([ButtonEvent::press(1), ButtonEvent::release(1), ButtonEvent::press(3)]);

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(
            drained,
            vec![ButtonEvent::press(1), ButtonEvent::release(1), ButtonEvent::press(3)]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_overflow_keeps_most_recent() {
        let mut queue = EventQueue::new(3);
        for button in 0..7u8 {
            let _ = queue.push(ButtonEvent::press(button));
        }

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.dropped(), 4);
        let drained: Vec<_> = queue.drain().map(|e| e.button).collect();
        assert_eq!(drained, vec![4, 5, 6]);
    }

    #[test]
    fn test_push_reports_evicted_event() {
        let mut queue = EventQueue::new(1);
        assert_eq!(queue.push(ButtonEvent::press(0)), None);
        assert_eq!(queue.push(ButtonEvent::press(1)), Some(ButtonEvent::press(0)));
    }

    #[test]
    fn test_drain_empty_queue() {
        let mut queue = EventQueue::new(4);
        assert_eq!(queue.drain().count(), 0);
        assert_eq!(queue.capacity(), 4);
    }

    #[test]
    fn test_reusable_after_drain() {
        let mut queue = EventQueue::new(2);
        queue.push_all([ButtonEvent::press(0), ButtonEvent::press(1), ButtonEvent::press(2)]);
        queue.drain().for_each(drop);
        let _ = queue.push(ButtonEvent::release(2));

        assert_eq!(queue.iter().copied().collect::<Vec<_>>(), vec![ButtonEvent::release(2)]);
        assert_eq!(queue.dropped(), 1);
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn test_zero_capacity_panics() {
        let _ = EventQueue::new(0);
    }
}
