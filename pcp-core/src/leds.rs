//! LED color references
//!
//! A context does not hand colors to the LED task, it hands it references to
//! color cells. The LED task re-reads the cells on every refresh, so editing
//! a color in place shows up on the next output without republishing.

use portable_atomic::{AtomicU32, Ordering};

use crate::config::LED_COUNT;

/// A shared, mutable 24-bit color (`0xRRGGBB`)
pub type ColorCell = AtomicU32;

/// Off
static DARK: ColorCell = ColorCell::new(0);

/// One color reference per preview LED
#[derive(Clone, Copy)]
pub struct LedRefs {
    cells: [&'static ColorCell; LED_COUNT],
}

impl Default for LedRefs {
    fn default() -> Self {
        Self::dark()
    }
}

impl core::fmt::Debug for LedRefs {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list().entries(self.colors().iter()).finish()
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for LedRefs {
    fn format(&self, f: defmt::Formatter) {
        let c = self.colors();
        defmt::write!(f, "[{=u32:06x}, {=u32:06x}, {=u32:06x}]", c[0], c[1], c[2]);
    }
}

impl LedRefs {
    pub const fn new(cells: [&'static ColorCell; LED_COUNT]) -> Self {
        Self { cells }
    }

    /// All LEDs off
    pub fn dark() -> Self {
        Self::new([&DARK; LED_COUNT])
    }

    /// Point one LED at a color cell
    pub fn set(&mut self, led: usize, cell: &'static ColorCell) {
        self.cells[led] = cell;
    }

    /// Point every LED at the same cell
    pub fn fill(&mut self, cell: &'static ColorCell) {
        self.cells = [cell; LED_COUNT];
    }

    /// Whether `led` currently shows `cell`
    pub fn points_at(&self, led: usize, cell: &ColorCell) -> bool {
        core::ptr::eq(self.cells[led], cell)
    }

    /// Current values of the referenced colors
    pub fn colors(&self) -> [u32; LED_COUNT] {
        self.cells.map(|c| c.load(Ordering::Relaxed) & 0x00FF_FFFF)
    }
}
