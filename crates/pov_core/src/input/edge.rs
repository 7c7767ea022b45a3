//! Edge detection on sampled button masks.
//!
//! The input is sampled once per tick at an arbitrary phase relative to the
//! physical presses, so only level *changes* between consecutive samples are
//! meaningful. No debouncing happens here.

use std::fmt;
use std::ops::BitOr;

use pov_shared::{Key, MAX_BUTTONS};

/// Raw button levels, bit `n` = button `n` held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ButtonMask(u32);

impl ButtonMask {
    /// No button held.
    pub const EMPTY: Self = Self(0);

    /// Wraps raw bits.
    #[inline]
    #[must_use]
    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Mask with only `key` held.
    #[inline]
    #[must_use]
    pub const fn from_key(key: Key) -> Self {
        Self(key.bit())
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if button `index` is held. Indices past 31 are never held.
    #[inline]
    #[must_use]
    pub const fn is_held(self, index: u8) -> bool {
        index < 32 && self.0 & (1 << index) != 0
    }

    /// Returns a copy with button `index` held.
    #[inline]
    #[must_use]
    pub const fn with(self, index: u8) -> Self {
        if index < 32 {
            Self(self.0 | (1 << index))
        } else {
            self
        }
    }
}

impl From<u32> for ButtonMask {
    fn from(bits: u32) -> Self {
        Self(bits)
    }
}

impl BitOr for ButtonMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Direction of a level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonEventKind {
    /// 0 -> 1.
    Press,
    /// 1 -> 0.
    Release,
}

/// One level change of one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonEvent {
    /// Press or release.
    pub kind: ButtonEventKind,
    /// Bit index of the button.
    pub button: u8,
}

impl ButtonEvent {
    /// A press of `button`.
    #[inline]
    #[must_use]
    pub const fn press(button: u8) -> Self {
        Self { kind: ButtonEventKind::Press, button }
    }

    /// A release of `button`.
    #[inline]
    #[must_use]
    pub const fn release(button: u8) -> Self {
        Self { kind: ButtonEventKind::Release, button }
    }

    /// Returns true for presses.
    #[inline]
    #[must_use]
    pub const fn is_press(&self) -> bool {
        matches!(self.kind, ButtonEventKind::Press)
    }

    /// Returns true if this is a press of `key`.
    #[inline]
    #[must_use]
    pub const fn is_press_of(&self, key: Key) -> bool {
        self.is_press() && self.button == key.index()
    }

    /// Controller key for this button, if it has a name.
    #[must_use]
    pub fn key(&self) -> Option<Key> {
        Key::from_index(self.button)
    }
}

impl fmt::Display for ButtonEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            ButtonEventKind::Press => "Press",
            ButtonEventKind::Release => "Release",
        };
        match self.key() {
            Some(key) => write!(f, "{verb}({})", key.label()),
            None => write!(f, "{verb}({})", self.button),
        }
    }
}

/// Converts consecutive mask samples into press/release events.
///
/// Owns the previous sample exclusively. The first sample only establishes
/// the baseline and yields no events.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    previous: Option<ButtonMask>,
    valid: u32,
    button_count: u8,
}

impl EdgeDetector {
    /// Creates a detector for `button_count` buttons (bits `0..button_count`).
    ///
    /// # Panics
    ///
    /// Panics if `button_count` exceeds 32.
    #[must_use]
    pub fn new(button_count: u8) -> Self {
        assert!(
            usize::from(button_count) <= MAX_BUTTONS,
            "Edge detector supports at most {MAX_BUTTONS} buttons, got {button_count}"
        );
        let valid = if button_count == 32 {
            u32::MAX
        } else {
            (1u32 << button_count) - 1
        };
        Self { previous: None, valid, button_count }
    }

    /// Number of buttons tracked.
    #[inline]
    #[must_use]
    pub fn button_count(&self) -> u8 {
        self.button_count
    }

    /// The retained previous sample, `None` before the first call.
    #[inline]
    #[must_use]
    pub fn previous(&self) -> Option<ButtonMask> {
        self.previous
    }

    /// Compares `raw` against the previous sample and returns the
    /// transitions, ordered by ascending button index.
    ///
    /// The previous sample is replaced immediately, whether or not the
    /// returned iterator is consumed.
    pub fn sample(&mut self, raw: ButtonMask) -> EdgeEvents {
        let current = raw.bits() & self.valid;
        let changed = match self.previous.replace(ButtonMask(current)) {
            Some(prev) => prev.bits() ^ current,
            None => 0,
        };
        EdgeEvents { changed, current }
    }

    /// Forgets the baseline; the next sample emits nothing.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// Transitions found by one [`EdgeDetector::sample`] call.
///
/// Allocation-free: walks the changed bits lowest first.
#[derive(Debug, Clone)]
pub struct EdgeEvents {
    changed: u32,
    current: u32,
}

impl Iterator for EdgeEvents {
    type Item = ButtonEvent;

    fn next(&mut self) -> Option<Self::Item> {
        if self.changed == 0 {
            return None;
        }
        // trailing_zeros of a non-zero u32 is at most 31
        let button = self.changed.trailing_zeros() as u8;
        self.changed &= self.changed - 1;

        if self.current & (1 << button) != 0 {
            Some(ButtonEvent::press(button))
        } else {
            Some(ButtonEvent::release(button))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.changed.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for EdgeEvents {}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(detector: &mut EdgeDetector, masks: &[u32]) -> Vec<ButtonEvent> {
        masks
            .iter()
            .flat_map(|&m| detector.sample(ButtonMask::new(m)).collect::<Vec<_>>())
            .collect()
    }

    #[test]
    fn test_first_sample_is_baseline() {
        let mut detector = EdgeDetector::new(16);
        assert_eq!(detector.sample(ButtonMask::new(0xFFFF)).count(), 0);
        assert_eq!(detector.previous(), Some(ButtonMask::new(0xFFFF)));
    }

    #[test]
    fn test_press_then_release() {
        let mut detector = EdgeDetector::new(4);
        let events = run(&mut detector, &[0b0000, 0b0100, 0b0000]);
        assert_eq!(events, vec![ButtonEvent::press(2), ButtonEvent::release(2)]);
    }

    #[test]
    fn test_two_button_sequence() {
        let mut detector = EdgeDetector::new(2);
        let events = run(&mut detector, &[0b01, 0b01, 0b00, 0b10]);
        assert_eq!(
            events,
            vec![ButtonEvent::press(0), ButtonEvent::release(0), ButtonEvent::press(1)]
        );
    }

    #[test]
    fn test_simultaneous_changes_ordered_by_index() {
        let mut detector = EdgeDetector::new(8);
        let _ = detector.sample(ButtonMask::new(0b1000_0001));
        let events: Vec<_> = detector.sample(ButtonMask::new(0b0010_0100)).collect();
        assert_eq!(
            events,
            vec![
                ButtonEvent::release(0),
                ButtonEvent::press(2),
                ButtonEvent::press(5),
                ButtonEvent::release(7),
            ]
        );
    }

    #[test]
    fn test_bits_above_button_count_ignored() {
        let mut detector = EdgeDetector::new(2);
        let events = run(&mut detector, &[0, 0b1100, 0b1101]);
        assert_eq!(events, vec![ButtonEvent::press(0)]);
    }

    #[test]
    fn test_full_width_mask() {
        let mut detector = EdgeDetector::new(32);
        let events = run(&mut detector, &[0, 1 << 31]);
        assert_eq!(events, vec![ButtonEvent::press(31)]);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let masks = [0u32, 3, 1, 0, 0xF, 0xA, 0xA, 0x5, 0];
        let first = run(&mut EdgeDetector::new(4), &masks);
        let second = run(&mut EdgeDetector::new(4), &masks);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_unconsumed_sample_still_updates_baseline() {
        let mut detector = EdgeDetector::new(4);
        let _ = detector.sample(ButtonMask::new(0));
        let _ = detector.sample(ButtonMask::new(1));
        // Nothing changed relative to the unconsumed sample above.
        assert_eq!(detector.sample(ButtonMask::new(1)).count(), 0);
    }

    #[test]
    fn test_reset_reestablishes_baseline() {
        let mut detector = EdgeDetector::new(4);
        let _ = detector.sample(ButtonMask::new(0));
        detector.reset();
        assert_eq!(detector.sample(ButtonMask::new(0b11)).len(), 0);
    }

    #[test]
    fn test_event_display_uses_key_names() {
        assert_eq!(ButtonEvent::press(Key::Cross.index()).to_string(), "Press(CROSS)");
        assert_eq!(ButtonEvent::release(20).to_string(), "Release(20)");
    }

    #[test]
    #[should_panic(expected = "at most 32 buttons")]
    fn test_too_many_buttons_panics() {
        let _ = EdgeDetector::new(33);
    }
}
