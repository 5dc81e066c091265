//! Context payloads
//!
//! What a context carries besides its callbacks. The variant is fixed when
//! the context is built; asking for the wrong one means the navigation state
//! is corrupt, and that halts.

use alloc::boxed::Box;
use core::any::Any;

use portable_atomic::Ordering;

use crate::input::{ButtonId, Direction, EncoderId};
use crate::leds::ColorCell;
use crate::menu::Menu;

/// Step per tick with the encoder's switch released
pub const COARSE_STEP: u8 = 0x11;

/// Step per tick with the encoder's switch held
pub const FINE_STEP: u8 = 1;

/// Application data attached to a context
pub enum Payload {
    None,
    Menu(Menu),
    Encoders(EncoderTriplet),
    Leaf(Box<dyn Any + Send>),
}

impl Default for Payload {
    fn default() -> Self {
        Payload::None
    }
}

impl Payload {
    /// Variant name, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::None => "none",
            Payload::Menu(_) => "menu",
            Payload::Encoders(_) => "encoders",
            Payload::Leaf(_) => "leaf",
        }
    }

    pub fn menu(&self) -> &Menu {
        match self {
            Payload::Menu(m) => m,
            other => panic!("expected menu payload, found {}", other.kind()),
        }
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        match self {
            Payload::Menu(m) => m,
            other => panic!("expected menu payload, found {}", other.kind()),
        }
    }

    pub fn encoders(&self) -> &EncoderTriplet {
        match self {
            Payload::Encoders(t) => t,
            other => panic!("expected encoders payload, found {}", other.kind()),
        }
    }

    pub fn encoders_mut(&mut self) -> &mut EncoderTriplet {
        match self {
            Payload::Encoders(t) => t,
            other => panic!("expected encoders payload, found {}", other.kind()),
        }
    }

    /// Downcast leaf data
    pub fn leaf_mut<T: Any>(&mut self) -> &mut T {
        match self {
            Payload::Leaf(data) => match data.downcast_mut::<T>() {
                Some(t) => t,
                None => panic!("leaf payload has unexpected type"),
            },
            other => panic!("expected leaf payload, found {}", other.kind()),
        }
    }
}

/// One 8-bit field of a packed color, driven by one encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TripletChannel {
    pub encoder: EncoderId,
    /// Held for fine steps
    pub switch: ButtonId,
    /// Bit position within the packed color
    pub shift: u8,
    pub value: u8,
}

/// Three encoders editing the red, green and blue fields of one color
#[derive(Debug)]
pub struct EncoderTriplet {
    channels: [TripletChannel; 3],
    target: Option<&'static ColorCell>,
}

impl EncoderTriplet {
    /// Channels in red, green, blue order
    pub fn new(controls: [(EncoderId, ButtonId); 3]) -> Self {
        let shifts = [16, 8, 0];
        let mut i = 0;
        let channels = controls.map(|(encoder, switch)| {
            let ch = TripletChannel {
                encoder,
                switch,
                shift: shifts[i],
                value: 0,
            };
            i += 1;
            ch
        });
        Self {
            channels,
            target: None,
        }
    }

    /// Start editing `cell`, loading its current value
    pub fn attach(&mut self, cell: &'static ColorCell) {
        let color = cell.load(Ordering::Relaxed);
        for ch in &mut self.channels {
            ch.value = (color >> ch.shift) as u8;
        }
        self.target = Some(cell);
    }

    pub fn target(&self) -> Option<&'static ColorCell> {
        self.target
    }

    pub fn channels(&self) -> &[TripletChannel; 3] {
        &self.channels
    }

    /// Index of the channel driven by `encoder`
    pub fn channel_for(&self, encoder: EncoderId) -> Option<usize> {
        self.channels.iter().position(|c| c.encoder == encoder)
    }

    /// Combined `0xRRGGBB` value
    pub fn packed(&self) -> u32 {
        self.channels
            .iter()
            .fold(0, |acc, c| acc | (c.value as u32) << c.shift)
    }

    /// Move one channel by one tick and write the result to the target
    ///
    /// Values saturate at 0 and 255.
    pub fn step(&mut self, channel: usize, direction: Direction, fine: bool) -> u8 {
        let amount = if fine { FINE_STEP } else { COARSE_STEP };
        let ch = &mut self.channels[channel];
        ch.value = match direction {
            Direction::Clockwise => ch.value.saturating_add(amount),
            Direction::CounterClockwise => ch.value.saturating_sub(amount),
        };
        let value = ch.value;
        if let Some(cell) = self.target {
            cell.store(self.packed(), Ordering::Relaxed);
        }
        value
    }
}
