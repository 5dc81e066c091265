//! Note colors
//!
//! One color per note of the chromatic scale. The cells are shared: the
//! color menu, the chord picker and the LED task all hold references to
//! them, so an edit in the RGB editor shows everywhere at once.

use portable_atomic::Ordering;

use crate::config::{NOTE_NAMES, PALETTE_SIZE};
use crate::leds::ColorCell;

/// Colors the palette starts with, `C` first
pub const DEFAULT_COLORS: [u32; PALETTE_SIZE] = [
    0xFF0000, 0xCC1100, 0xBB2200, 0xCC5500, 0xFFCC00, 0x33FF00, 0x00CD71, 0x008AA1, 0x2161B0,
    0x2200FF, 0x860E90, 0xB8154A,
];

/// Twelve shared note colors
pub struct Palette {
    colors: [ColorCell; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

impl Palette {
    pub const fn new() -> Self {
        let c = DEFAULT_COLORS;
        Self {
            colors: [
                ColorCell::new(c[0]),
                ColorCell::new(c[1]),
                ColorCell::new(c[2]),
                ColorCell::new(c[3]),
                ColorCell::new(c[4]),
                ColorCell::new(c[5]),
                ColorCell::new(c[6]),
                ColorCell::new(c[7]),
                ColorCell::new(c[8]),
                ColorCell::new(c[9]),
                ColorCell::new(c[10]),
                ColorCell::new(c[11]),
            ],
        }
    }

    /// Name of a note, e.g. `"C#/Db"`
    pub fn name(note: usize) -> &'static str {
        NOTE_NAMES[note]
    }

    pub fn cell(&'static self, note: usize) -> &'static ColorCell {
        &self.colors[note]
    }

    pub fn color(&self, note: usize) -> u32 {
        self.colors[note].load(Ordering::Relaxed)
    }

    pub fn set(&self, note: usize, color: u32) {
        self.colors[note].store(color & 0x00FF_FFFF, Ordering::Relaxed);
    }

    /// Replace the colors the board description overrides
    pub fn apply(&self, overrides: &[Option<u32>; PALETTE_SIZE]) {
        for (note, color) in overrides.iter().enumerate() {
            if let Some(color) = color {
                self.set(note, *color);
            }
        }
    }
}
