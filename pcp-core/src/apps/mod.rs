//! The device's screens
//!
//! ```text
//! main ──▶ Colors ──▶ rgb editor (palette index as frame data)
//!     └──▶ Chord
//! ```

pub mod chord;
pub mod colors;
pub mod editor;
pub mod palette;

pub use palette::Palette;

use crate::config::Controls;
use crate::context::{Context, ContextId};
use crate::leds::LedRefs;
use crate::menu::{MenuBuilder, MenuItem};
use crate::nav::Navigator;

/// Arena ids of every screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Apps {
    pub main: ContextId,
    pub colors: ContextId,
    pub editor: ContextId,
    pub chord: ContextId,
}

/// Build every screen into the arena, leaves first
///
/// Nothing is pushed; the caller pushes `main` as the root.
pub fn build(nav: &mut Navigator, palette: &'static Palette, controls: &Controls) -> Apps {
    let editor = nav.insert(editor::build(palette, controls));
    let colors = nav.insert(colors::build(palette, controls, editor));
    let chord = nav.insert(chord::build(palette, controls));
    let main = nav.insert(main_menu(controls, colors, chord));

    Apps {
        main,
        colors,
        editor,
        chord,
    }
}

fn main_menu(controls: &Controls, colors: ContextId, chord: ContextId) -> Context {
    let mut m = MenuBuilder::init("main", 1, 2);
    m.set_item(0, MenuItem::new("Colors").entering(colors, None))
        .set_item(1, MenuItem::new("Chord").entering(chord, None))
        .set_cursor(0, controls.encoders[0], Some(controls.switches[0]), "")
        .set_back_button(controls.upper)
        .set_forward_button(controls.lower)
        .set_leds(LedRefs::dark());
    m.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::context::FrameData;
    use crate::input::{ButtonId, Direction, Event};
    use crate::nav::{Bus, Outcome};

    fn press(button: ButtonId) -> [Event; 2] {
        [
            Event::ButtonEdge {
                channel: button,
                pressed: true,
            },
            Event::ButtonEdge {
                channel: button,
                pressed: false,
            },
        ]
    }

    #[test]
    fn test_walk_the_tree() {
        static PALETTE: Palette = Palette::new();
        let controls = DeviceConfig::default().controls().unwrap();
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let apps = build(&mut nav, &PALETTE, &controls);
        nav.push(apps.main, None, &bus);
        assert_eq!(bus.leds.try_take().map(|l| l.colors()), Some([0; 3]));

        // Forward into Colors
        assert_eq!(
            nav.dispatch_batch(apps.main, press(controls.lower), &bus),
            Outcome::Navigated
        );
        assert_eq!(nav.current(), apps.colors);

        // Down to D and into the editor
        let down = Event::EncoderTick {
            channel: controls.encoders[0],
            direction: Direction::Clockwise,
        };
        nav.dispatch_batch(apps.colors, [down, down], &bus);
        nav.dispatch_batch(apps.colors, press(controls.switches[0]), &bus);
        assert_eq!(nav.current(), apps.editor);
        assert_eq!(nav.frame_data(), Some(FrameData(2)));
        assert_eq!(nav.depth(), 3);

        // Back twice returns to the root, and back there is a no-op
        nav.dispatch_batch(apps.editor, press(controls.upper), &bus);
        assert_eq!(nav.current(), apps.colors);
        nav.dispatch_batch(apps.colors, press(controls.upper), &bus);
        assert_eq!(nav.current(), apps.main);
        assert_eq!(
            nav.dispatch_batch(apps.main, press(controls.upper), &bus),
            Outcome::Handled
        );
        assert_eq!(nav.depth(), 1);
    }
}
