//! Configuration types
//!
//! Fixed capacities of the navigation core plus the board description
//! parsed from `device.toml`.

pub mod device;
pub mod toml;

pub use device::*;
pub use toml::parse_device;

/// Encoder slots in one sample word (2 pins each)
pub const ENCODER_SLOTS: usize = 4;

/// Button slots in one sample word (1 pin each)
pub const BUTTON_SLOTS: usize = 8;

/// Navigation stack capacity
pub const STACK_DEPTH: usize = 10;

/// Maximum items in one menu
pub const MAX_MENU_ITEMS: usize = 16;

/// Maximum cursors in one menu
pub const MAX_CURSORS: usize = 3;

/// Number of preview LEDs
pub const LED_COUNT: usize = 3;

/// Colors in the note palette
pub const PALETTE_SIZE: usize = 12;

/// Note names, in palette order
pub const NOTE_NAMES: [&str; PALETTE_SIZE] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

/// Maximum encoder label length in characters
pub const MAX_LABEL_LEN: usize = 8;

/// Raw quadrature transitions per detent
pub const DEFAULT_DIVISOR: i8 = 4;

/// Encoder label text
pub type Label = heapless::String<MAX_LABEL_LEN>;

/// Build a label, panicking if it does not fit
///
/// Labels are set while contexts are constructed, so an overlong label is a
/// construction-time capacity error.
pub fn label(text: &str) -> Label {
    let mut l = Label::new();
    if l.push_str(text).is_err() {
        panic!("label {:?} exceeds {} characters", text, MAX_LABEL_LEN);
    }
    l
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value has the wrong type or is out of range
    InvalidValue,
    /// Key not valid in its section
    UnknownKey,
    /// Slot index beyond the sample word
    SlotOutOfRange,
    /// Two channels share a slot
    DuplicateSlot,
    /// A role is configured twice
    DuplicateRole,
    /// A required role is not configured
    MissingRole,
    /// Divisor must be 1..=16
    InvalidDivisor,
    /// Label longer than [`MAX_LABEL_LEN`]
    LabelTooLong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_fits() {
        assert_eq!(label("Green").as_str(), "Green");
        assert_eq!(label("12345678").len(), 8);
    }

    #[test]
    #[should_panic(expected = "exceeds 8 characters")]
    fn test_label_too_long() {
        label("123456789");
    }
}
