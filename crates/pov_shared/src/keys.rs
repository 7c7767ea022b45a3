//! Controller key naming.
//!
//! The display is driven from a DS4-style pad. Bit `n` of a raw button mask
//! is the key whose [`Key::index`] is `n`.

use serde::{Deserialize, Serialize};

use crate::constants::NUM_KEYS;

/// Logical controller keys, in mask bit order.
///
/// Serialized by [`Key::label`], so config files and the command line spell
/// keys the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Key {
    /// Triangle face button.
    #[serde(rename = "TRIANGLE")]
    Triangle = 0,
    /// Square face button.
    #[serde(rename = "SQUARE")]
    Square,
    /// Cross face button.
    #[serde(rename = "CROSS")]
    Cross,
    /// Circle face button.
    #[serde(rename = "CIRCLE")]
    Circle,
    /// Left bumper.
    #[serde(rename = "L1")]
    LBump,
    /// Right bumper.
    #[serde(rename = "R1")]
    RBump,
    /// Left stick click.
    #[serde(rename = "L3")]
    LStick,
    /// Right stick click.
    #[serde(rename = "R3")]
    RStick,
    /// Share button.
    #[serde(rename = "SHARE")]
    Share,
    /// Options button.
    #[serde(rename = "OPTIONS")]
    Options,
    /// D-pad up.
    #[serde(rename = "UP")]
    DUp,
    /// D-pad left.
    #[serde(rename = "LEFT")]
    DLeft,
    /// D-pad down.
    #[serde(rename = "DOWN")]
    DDown,
    /// D-pad right.
    #[serde(rename = "RIGHT")]
    DRight,
    /// Stick X axis pushed past threshold.
    #[serde(rename = "DX")]
    DX,
    /// Stick Y axis pushed past threshold.
    #[serde(rename = "DY")]
    DY,
}

impl Key {
    /// Every key, ordered by mask bit.
    pub const ALL: [Key; NUM_KEYS] = [
        Key::Triangle,
        Key::Square,
        Key::Cross,
        Key::Circle,
        Key::LBump,
        Key::RBump,
        Key::LStick,
        Key::RStick,
        Key::Share,
        Key::Options,
        Key::DUp,
        Key::DLeft,
        Key::DDown,
        Key::DRight,
        Key::DX,
        Key::DY,
    ];

    /// Bit position of this key in a raw mask.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Single-bit mask for this key.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << self as u32
    }

    /// Looks up the key for a mask bit.
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// Short label used by text dumps and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Key::Triangle => "TRIANGLE",
            Key::Square => "SQUARE",
            Key::Cross => "CROSS",
            Key::Circle => "CIRCLE",
            Key::LBump => "L1",
            Key::RBump => "R1",
            Key::LStick => "L3",
            Key::RStick => "R3",
            Key::Share => "SHARE",
            Key::Options => "OPTIONS",
            Key::DUp => "UP",
            Key::DLeft => "LEFT",
            Key::DDown => "DOWN",
            Key::DRight => "RIGHT",
            Key::DX => "DX",
            Key::DY => "DY",
        }
    }

    /// Looks up a key by its [`Key::label`], ignoring ASCII case.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.label().eq_ignore_ascii_case(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_table_order() {
        for (i, key) in Key::ALL.iter().enumerate() {
            assert_eq!(usize::from(key.index()), i);
            assert_eq!(Key::from_index(key.index()), Some(*key));
        }
        assert_eq!(Key::from_index(NUM_KEYS as u8), None);
    }

    #[test]
    fn test_bits_are_disjoint() {
        let combined = Key::ALL.iter().fold(0u32, |acc, k| {
            assert_eq!(acc & k.bit(), 0);
            acc | k.bit()
        });
        assert_eq!(combined, 0xFFFF);
    }

    #[test]
    fn test_label_lookup() {
        assert_eq!(Key::from_label("CROSS"), Some(Key::Cross));
        assert_eq!(Key::from_label("options"), Some(Key::Options));
        assert_eq!(Key::from_label("l1"), Some(Key::LBump));
        assert_eq!(Key::from_label("START"), None);
    }
}
