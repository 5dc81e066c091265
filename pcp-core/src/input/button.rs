//! Button edge detection
//!
//! Pure edge detection on the prior/current pin levels carried by each
//! sample word. Debouncing is left to the sampling hardware.

use pcp_hal::input::{current_levels, prior_levels};

use super::{ButtonId, Event};
use crate::config::BUTTON_SLOTS;

/// State of one button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonChannel {
    id: ButtonId,
    enabled: bool,
    pressed: bool,
}

impl ButtonChannel {
    pub const fn new(id: ButtonId) -> Self {
        Self {
            id,
            enabled: false,
            pressed: false,
        }
    }

    pub const fn id(&self) -> ButtonId {
        self.id
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last known state
    pub const fn is_pressed(&self) -> bool {
        self.pressed
    }
}

/// All button channels of one sample word
#[derive(Debug, Clone)]
pub struct ButtonBank {
    channels: [ButtonChannel; BUTTON_SLOTS],
    /// A pressed button pulls its line low
    active_low: bool,
}

impl Default for ButtonBank {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ButtonBank {
    pub const fn new(active_low: bool) -> Self {
        let mut channels = [ButtonChannel::new(ButtonId::new(0)); BUTTON_SLOTS];
        let mut i = 0;
        while i < BUTTON_SLOTS {
            channels[i] = ButtonChannel::new(ButtonId::new(i as u8));
            i += 1;
        }
        Self {
            channels,
            active_low,
        }
    }

    /// Start reporting edges for a button slot
    pub fn enable(&mut self, id: ButtonId) {
        self.channels[id.index()].enabled = true;
    }

    pub fn channel(&self, id: ButtonId) -> &ButtonChannel {
        &self.channels[id.index()]
    }

    /// Decode one sample word, reporting edges in ascending slot order
    pub fn decode(&mut self, word: u32, mut emit: impl FnMut(Event)) {
        let prior = prior_levels(word);
        let current = current_levels(word);

        for (slot, channel) in self.channels.iter_mut().enumerate() {
            if !channel.enabled {
                continue;
            }

            let was = (prior >> slot) & 1 != 0;
            let now = (current >> slot) & 1 != 0;
            if was == now {
                continue;
            }

            channel.pressed = now != self.active_low;
            emit(Event::ButtonEdge {
                channel: channel.id,
                pressed: channel.pressed,
            });
        }
    }
}
