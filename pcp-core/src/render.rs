//! Screen layout
//!
//! The render pass clears the surface, lets the current context paint its
//! pane, then draws the chrome around it:
//!
//! ```text
//!  0                                 120 128
//!  ┌──────────────────────────────────┬───┐ 0
//!  │                                  │ « │   upper button glyph
//!  │               pane               │   │
//!  │                                  │ » │   lower button glyph
//!  ├──────────────────────────────────┴───┤ 54
//!  │ label 0       label 1      label 2   │
//!  └──────────────────────────────────────┘ 64
//! ```

use pcp_hal::{Font, Offset, Point, Rect, Surface};

use crate::config::Controls;
use crate::input::{ButtonId, EncoderId};
use crate::nav::Navigator;

/// Width of the glyph column on the right
pub const GLYPH_COLUMN: u32 = Font::Medium.glyph_size().width + 2;

/// Height of the label band along the bottom
pub const LABEL_BAND: u32 = Font::Small.glyph_size().height + 2;

/// Which channels the chrome shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Layout {
    /// Buttons whose glyphs sit at the top and bottom of the right column
    pub glyph_buttons: [ButtonId; 2],
    /// Encoders labelled left, centre and right
    pub label_encoders: [EncoderId; 3],
}

impl Layout {
    pub fn new(controls: &Controls) -> Self {
        Self {
            glyph_buttons: [controls.upper, controls.lower],
            label_encoders: controls.encoders,
        }
    }

    /// Area handed to the current context
    pub fn pane(&self, surface: &dyn Surface) -> Rect {
        let size = surface.size();
        Rect::new(
            0,
            0,
            size.width.saturating_sub(GLYPH_COLUMN),
            size.height.saturating_sub(LABEL_BAND),
        )
    }

    /// Draw the whole screen for the current context
    ///
    /// An empty navigation stack leaves the surface blank.
    pub fn render(&self, nav: &mut Navigator, surface: &mut dyn Surface) {
        surface.clear();
        if nav.depth() == 0 {
            return;
        }

        let pane = self.pane(surface);
        nav.render_current(&mut Offset::new(&mut *surface, pane));

        let size = surface.size();
        let chrome = nav.current_context().chrome();

        let label_y = size.height.saturating_sub(Font::Small.glyph_size().height) as i32;
        for (slot, &encoder) in self.label_encoders.iter().enumerate() {
            let text = chrome.label(encoder);
            if text.is_empty() {
                continue;
            }
            let free = size.width.saturating_sub(Font::Small.text_width(text));
            let x = match slot {
                0 => 0,
                1 => free / 2,
                _ => free,
            };
            surface.draw_string(Point::new(x as i32, label_y), Font::Small, text);
        }

        let glyph = Font::Medium.glyph_size();
        let glyph_x = size.width.saturating_sub(glyph.width) as i32;
        let rows = [0, pane.size.height.saturating_sub(glyph.height) as i32];
        for (&button, y) in self.glyph_buttons.iter().zip(rows) {
            if let Some(ch) = chrome.glyph(button) {
                surface.draw_char(Point::new(glyph_x, y), Font::Medium, ch);
            }
        }
    }
}
