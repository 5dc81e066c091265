//! Board description
//!
//! Which sample-word slot each physical control sits in, and what it does.
//! The defaults describe the reference board:
//!
//! ```text
//!  encoder pins  GPIO2..9    slots 0 (red), 1 (green), 2 (blue)
//!  button pins   GPIO10..17  slots 0 (upper), 1 (lower),
//!                            2..4 (red, green, blue encoder switches)
//! ```

use heapless::Vec;

use super::{
    label, ConfigError, Label, BUTTON_SLOTS, DEFAULT_DIVISOR, ENCODER_SLOTS, MAX_LABEL_LEN,
    PALETTE_SIZE,
};
use crate::input::{ButtonBank, ButtonId, EncoderBank, EncoderId};

/// What an encoder edits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncoderRole {
    Red,
    Green,
    Blue,
}

impl EncoderRole {
    pub const ALL: [EncoderRole; 3] = [EncoderRole::Red, EncoderRole::Green, EncoderRole::Blue];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "red" => Some(EncoderRole::Red),
            "green" => Some(EncoderRole::Green),
            "blue" => Some(EncoderRole::Blue),
            _ => None,
        }
    }

    /// Label used when the board description gives none
    pub fn default_label(self) -> Label {
        label(match self {
            EncoderRole::Red => "Red",
            EncoderRole::Green => "Green",
            EncoderRole::Blue => "Blue",
        })
    }

    /// The push switch that belongs to this encoder
    pub const fn switch(self) -> ButtonRole {
        match self {
            EncoderRole::Red => ButtonRole::Red,
            EncoderRole::Green => ButtonRole::Green,
            EncoderRole::Blue => ButtonRole::Blue,
        }
    }
}

/// What a button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonRole {
    /// Back
    Upper,
    /// Forward
    Lower,
    /// Push switch of the red encoder
    Red,
    Green,
    Blue,
}

impl ButtonRole {
    pub const ALL: [ButtonRole; 5] = [
        ButtonRole::Upper,
        ButtonRole::Lower,
        ButtonRole::Red,
        ButtonRole::Green,
        ButtonRole::Blue,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "upper" => Some(ButtonRole::Upper),
            "lower" => Some(ButtonRole::Lower),
            "red" => Some(ButtonRole::Red),
            "green" => Some(ButtonRole::Green),
            "blue" => Some(ButtonRole::Blue),
            _ => None,
        }
    }
}

/// One rotary encoder
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderConfig {
    pub role: EncoderRole,
    /// Slot in the encoder sample word (pins 2*slot and 2*slot+1)
    pub slot: u8,
    /// Swap the A and B pins
    pub inverted: bool,
    /// Text shown under the encoder
    pub label: Label,
}

/// One push button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    pub role: ButtonRole,
    /// Slot in the button sample word
    pub slot: u8,
}

/// Settings shared by all inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputConfig {
    /// Raw quadrature transitions per tick
    pub divisor: i8,
    /// Buttons pull the line low when pressed
    pub active_low: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_DIVISOR,
            active_low: true,
        }
    }
}

/// Full board description
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    pub input: InputConfig,
    pub encoders: Vec<EncoderConfig, 3>,
    pub buttons: Vec<ButtonConfig, 5>,
    /// Palette colors replacing the defaults, by note index
    pub palette: [Option<u32>; PALETTE_SIZE],
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let mut encoders = Vec::new();
        for (slot, role) in EncoderRole::ALL.into_iter().enumerate() {
            let _ = encoders.push(EncoderConfig {
                role,
                slot: slot as u8,
                inverted: false,
                label: role.default_label(),
            });
        }

        let mut buttons = Vec::new();
        for (slot, role) in ButtonRole::ALL.into_iter().enumerate() {
            let _ = buttons.push(ButtonConfig {
                role,
                slot: slot as u8,
            });
        }

        Self {
            input: InputConfig::default(),
            encoders,
            buttons,
            palette: [None; PALETTE_SIZE],
        }
    }
}

/// Resolved channel ids for building the UI
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Controls {
    /// Back button
    pub upper: ButtonId,
    /// Forward button
    pub lower: ButtonId,
    /// Encoders in red, green, blue order
    pub encoders: [EncoderId; 3],
    /// Push switches of `encoders`, same order
    pub switches: [ButtonId; 3],
    /// Labels of `encoders`, same order
    pub labels: [Label; 3],
}

impl DeviceConfig {
    /// Check slots, roles and values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=16).contains(&self.input.divisor) {
            return Err(ConfigError::InvalidDivisor);
        }

        let mut used = 0u32;
        for (i, e) in self.encoders.iter().enumerate() {
            if e.slot as usize >= ENCODER_SLOTS {
                return Err(ConfigError::SlotOutOfRange);
            }
            if used & (1 << e.slot) != 0 {
                return Err(ConfigError::DuplicateSlot);
            }
            used |= 1 << e.slot;
            if self.encoders[..i].iter().any(|o| o.role == e.role) {
                return Err(ConfigError::DuplicateRole);
            }
            if e.label.len() > MAX_LABEL_LEN {
                return Err(ConfigError::LabelTooLong);
            }
        }

        let mut used = 0u32;
        for (i, b) in self.buttons.iter().enumerate() {
            if b.slot as usize >= BUTTON_SLOTS {
                return Err(ConfigError::SlotOutOfRange);
            }
            if used & (1 << b.slot) != 0 {
                return Err(ConfigError::DuplicateSlot);
            }
            used |= 1 << b.slot;
            if self.buttons[..i].iter().any(|o| o.role == b.role) {
                return Err(ConfigError::DuplicateRole);
            }
        }

        if EncoderRole::ALL.iter().any(|r| self.encoder(*r).is_none())
            || ButtonRole::ALL.iter().any(|r| self.button(*r).is_none())
        {
            return Err(ConfigError::MissingRole);
        }

        if self.palette.iter().flatten().any(|&c| c > 0x00FF_FFFF) {
            return Err(ConfigError::InvalidValue);
        }

        Ok(())
    }

    pub fn encoder(&self, role: EncoderRole) -> Option<&EncoderConfig> {
        self.encoders.iter().find(|e| e.role == role)
    }

    pub fn button(&self, role: ButtonRole) -> Option<&ButtonConfig> {
        self.buttons.iter().find(|b| b.role == role)
    }

    /// Channel ids by role, after validation
    pub fn controls(&self) -> Result<Controls, ConfigError> {
        self.validate()?;

        let button = |role: ButtonRole| {
            self.button(role)
                .map(|b| ButtonId::new(b.slot))
                .ok_or(ConfigError::MissingRole)
        };
        let encoder = |role: EncoderRole| self.encoder(role).ok_or(ConfigError::MissingRole);

        let red = encoder(EncoderRole::Red)?;
        let green = encoder(EncoderRole::Green)?;
        let blue = encoder(EncoderRole::Blue)?;

        Ok(Controls {
            upper: button(ButtonRole::Upper)?,
            lower: button(ButtonRole::Lower)?,
            encoders: [red, green, blue].map(|e| EncoderId::new(e.slot)),
            switches: [
                button(red.role.switch())?,
                button(green.role.switch())?,
                button(blue.role.switch())?,
            ],
            labels: [red.label.clone(), green.label.clone(), blue.label.clone()],
        })
    }

    /// Encoder decoder state for the interrupt-side bridge
    pub fn encoder_bank(&self) -> EncoderBank {
        let mut bank = EncoderBank::new();
        for e in &self.encoders {
            bank.register(EncoderId::new(e.slot), e.inverted, self.input.divisor);
        }
        bank
    }

    /// Button edge detector state for the interrupt-side bridge
    pub fn button_bank(&self) -> ButtonBank {
        let mut bank = ButtonBank::new(self.input.active_low);
        for b in &self.buttons {
            bank.enable(ButtonId::new(b.slot));
        }
        bank
    }
}
