//! Input decoding
//!
//! Turns raw pin samples into discrete events:
//!
//! ```text
//! sample word ──┬──▶ EncoderBank ──▶ EncoderTick { channel, direction }
//!               └──▶ ButtonBank  ──▶ ButtonEdge  { channel, pressed }
//! ```
//!
//! Both banks are owned by the interrupt-side bridge; tasks only ever see
//! the resulting notification words.

pub mod button;
pub mod quadrature;

pub use button::{ButtonBank, ButtonChannel};
pub use quadrature::{EncoderBank, EncoderChannel, TRANSITIONS};

use crate::config::{BUTTON_SLOTS, ENCODER_SLOTS};

/// Encoder slot within a sample word
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderId(u8);

impl EncoderId {
    /// Panics if `slot` is not a valid encoder slot
    pub const fn new(slot: u8) -> Self {
        assert!((slot as usize) < ENCODER_SLOTS, "encoder slot out of range");
        Self(slot)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Button slot within a sample word
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonId(u8);

impl ButtonId {
    /// Panics if `slot` is not a valid button slot
    pub const fn new(slot: u8) -> Self {
        assert!((slot as usize) < BUTTON_SLOTS, "button slot out of range");
        Self(slot)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Bit of this button in a held-button mask
    pub const fn mask(self) -> u8 {
        1 << self.0
    }
}

/// Rotation direction of one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    /// Signed step, +1 for clockwise
    pub const fn delta(self) -> i32 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// A decoded input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    EncoderTick {
        channel: EncoderId,
        direction: Direction,
    },
    ButtonEdge {
        channel: ButtonId,
        pressed: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_in_range() {
        assert_eq!(EncoderId::new(3).index(), 3);
        assert_eq!(ButtonId::new(7).mask(), 0x80);
    }

    #[test]
    #[should_panic(expected = "encoder slot out of range")]
    fn test_encoder_id_out_of_range() {
        EncoderId::new(ENCODER_SLOTS as u8);
    }

    #[test]
    #[should_panic(expected = "button slot out of range")]
    fn test_button_id_out_of_range() {
        ButtonId::new(BUTTON_SLOTS as u8);
    }

    #[test]
    fn test_direction_delta() {
        assert_eq!(Direction::Clockwise.delta(), 1);
        assert_eq!(Direction::CounterClockwise.delta(), -1);
    }
}
