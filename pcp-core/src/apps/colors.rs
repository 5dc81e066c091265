//! Note color menu
//!
//! Lists the twelve palette entries with their current value. The LEDs show
//! the previous, selected and next note; entering a note opens the RGB
//! editor on it.

use core::fmt::Write;

use pcp_hal::{Font, Point};

use super::palette::Palette;
use crate::config::{Controls, PALETTE_SIZE};
use crate::context::{Context, ContextId, FrameData};
use crate::menu::{MenuBuilder, MenuItem};

/// Build the color menu; `editor` is opened with the note index as frame data
pub fn build(palette: &'static Palette, controls: &Controls, editor: ContextId) -> Context {
    let mut m = MenuBuilder::init("colors", 1, PALETTE_SIZE);
    for note in 0..PALETTE_SIZE {
        let item = MenuItem::new(Palette::name(note))
            .entering(editor, Some(FrameData(note as u32)))
            .with_value(note as u32);
        m.set_item(note, item);
    }

    m.set_cursor(0, controls.encoders[0], Some(controls.switches[0]), "Note")
        .set_back_button(controls.upper)
        .set_forward_button(controls.lower)
        .set_render_item(move |surface, item, slot| {
            let mut line: heapless::String<16> = heapless::String::new();
            let _ = write!(line, "{:<5} #{:06x}", item.name, palette.color(item.value as usize));
            let y = slot.size.height.saturating_sub(Font::Medium.glyph_size().height) / 2;
            surface.draw_string(Point::new(2, y as i32), Font::Medium, &line);
        })
        .set_selection_changed(move |sel, leds| {
            for (led, offset) in [-1, 0, 1].into_iter().enumerate() {
                leds.set(led, palette.cell(sel.index(0, offset)));
            }
        });

    m.finalize()
}
