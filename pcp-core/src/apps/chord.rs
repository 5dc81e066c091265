//! Chord picker
//!
//! Three cursors over the twelve notes, one per encoder. Each LED shows the
//! color of the note under its cursor.

use pcp_hal::{Font, Point};

use super::palette::Palette;
use crate::config::{Controls, PALETTE_SIZE};
use crate::context::Context;
use crate::menu::{MenuBuilder, MenuItem};

/// Notes the cursors start on (a C major triad)
pub const START: [usize; 3] = [0, 4, 7];

pub fn build(palette: &'static Palette, controls: &Controls) -> Context {
    let mut m = MenuBuilder::init("chord", 3, PALETTE_SIZE);
    for note in 0..PALETTE_SIZE {
        m.set_item(note, MenuItem::new(Palette::name(note)).with_value(note as u32));
    }

    let labels = ["Note 1", "Note 2", "Note 3"];
    for (i, text) in labels.into_iter().enumerate() {
        m.set_cursor(i, controls.encoders[i], None, text)
            .set_start(i, START[i]);
    }

    m.set_back_button(controls.upper)
        .set_render_item(|surface, item, slot| {
            let font = Font::Medium;
            let x = slot.size.width.saturating_sub(font.text_width(item.name)) / 2;
            let y = slot.size.height.saturating_sub(font.glyph_size().height) / 2;
            surface.draw_string(Point::new(x as i32, y as i32), font, item.name);
        })
        .set_selection_changed(move |sel, leds| {
            for led in 0..sel.cursor_count() {
                leds.set(led, palette.cell(sel.position(led)));
            }
        });

    m.finalize()
}
