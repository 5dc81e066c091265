//! Menu construction
//!
//! ```ignore
//! let mut m = MenuBuilder::init("notes", 1, 12);
//! for (i, name) in NOTE_NAMES.iter().enumerate() {
//!     m.set_item(i, MenuItem::new(name).entering(editor, Some(FrameData(i as u32))));
//! }
//! m.set_cursor(0, encoders[0], Some(switches[0]), "Note")
//!     .set_back_button(upper)
//!     .set_forward_button(lower);
//! let id = nav.insert(m.finalize());
//! ```
//!
//! `finalize` binds every cursor's encoder and switch, the navigation
//! buttons, on-enable and render through a [`ContextBuilder`].

use alloc::boxed::Box;

use heapless::Vec;
use pcp_hal::Surface;

use super::{render_name, Cursor, Menu, MenuItem, Selection, Slot};
use crate::config::{label, Label, MAX_CURSORS, MAX_MENU_ITEMS};
use crate::context::{
    ButtonHandler, Context, ContextBuilder, Ctx, EncoderHandler, FrameData, Payload,
};
use crate::input::{ButtonId, EncoderId};
use crate::leds::LedRefs;

struct PendingCursor {
    cursor: Cursor,
    label: Label,
}

/// Assembles a menu [`Context`]
pub struct MenuBuilder {
    name: &'static str,
    items: Vec<Option<MenuItem>, MAX_MENU_ITEMS>,
    cursors: Vec<Option<PendingCursor>, MAX_CURSORS>,
    render_item: Option<super::RenderItemFn>,
    selection_changed: Option<super::SelectionChangedFn>,
    back: Option<ButtonId>,
    forward: Option<ButtonId>,
    leds: Option<LedRefs>,
}

impl MenuBuilder {
    /// Start a menu with `cursor_count` cursors over `item_count` items
    ///
    /// Panics unless 1..=3 cursors and 1..=16 items are requested.
    pub fn init(name: &'static str, cursor_count: usize, item_count: usize) -> Self {
        assert!(
            (1..=MAX_CURSORS).contains(&cursor_count),
            "menu needs 1 to {} cursors, got {}",
            MAX_CURSORS,
            cursor_count
        );
        assert!(
            (1..=MAX_MENU_ITEMS).contains(&item_count),
            "menu needs 1 to {} items, got {}",
            MAX_MENU_ITEMS,
            item_count
        );

        let mut items = Vec::new();
        let mut cursors = Vec::new();
        for _ in 0..item_count {
            let _ = items.push(None);
        }
        for _ in 0..cursor_count {
            let _ = cursors.push(None);
        }

        Self {
            name,
            items,
            cursors,
            render_item: None,
            selection_changed: None,
            back: None,
            forward: None,
            leds: None,
        }
    }

    pub fn set_item(&mut self, index: usize, item: MenuItem) -> &mut Self {
        self.items[index] = Some(item);
        self
    }

    /// Bind cursor `index` to an encoder and, optionally, its push switch
    pub fn set_cursor(
        &mut self,
        index: usize,
        encoder: EncoderId,
        switch: Option<ButtonId>,
        text: &str,
    ) -> &mut Self {
        self.cursors[index] = Some(PendingCursor {
            cursor: Cursor {
                position: 0,
                encoder,
                switch,
                enter_data: None,
            },
            label: label(text),
        });
        self
    }

    /// Replace the label under a cursor's encoder
    pub fn set_label(&mut self, index: usize, text: &str) -> &mut Self {
        self.pending(index).label = label(text);
        self
    }

    /// Frame data pushed when the selected item has none
    pub fn set_cursor_enter_data(&mut self, index: usize, data: FrameData) -> &mut Self {
        self.pending(index).cursor.enter_data = Some(data);
        self
    }

    /// Initial position of a cursor
    pub fn set_start(&mut self, index: usize, position: usize) -> &mut Self {
        assert!(position < self.items.len(), "start position {} out of range", position);
        self.pending(index).cursor.position = position;
        self
    }

    pub fn set_render_item(
        &mut self,
        f: impl FnMut(&mut dyn Surface, &MenuItem, &Slot) + Send + 'static,
    ) -> &mut Self {
        self.render_item = Some(Box::new(f));
        self
    }

    pub fn set_selection_changed(
        &mut self,
        f: impl FnMut(&Selection<'_>, &mut LedRefs) + Send + 'static,
    ) -> &mut Self {
        self.selection_changed = Some(Box::new(f));
        self
    }

    pub fn set_back_button(&mut self, button: ButtonId) -> &mut Self {
        self.back = Some(button);
        self
    }

    pub fn set_forward_button(&mut self, button: ButtonId) -> &mut Self {
        self.forward = Some(button);
        self
    }

    pub fn set_leds(&mut self, leds: LedRefs) -> &mut Self {
        self.leds = Some(leds);
        self
    }

    fn pending(&mut self, index: usize) -> &mut PendingCursor {
        match &mut self.cursors[index] {
            Some(c) => c,
            None => panic!("cursor {} used before set_cursor", index),
        }
    }

    /// Bind the handlers and hand over the finished context
    ///
    /// Panics if an item or cursor was never set.
    pub fn finalize(self) -> Context {
        let mut b = ContextBuilder::begin(self.name);

        let mut items = Vec::new();
        for (i, item) in self.items.into_iter().enumerate() {
            match item {
                Some(item) => {
                    let _ = items.push(item);
                }
                None => panic!("menu {}: item {} never set", self.name, i),
            }
        }

        let mut cursors = Vec::new();
        for (i, pending) in self.cursors.into_iter().enumerate() {
            let Some(PendingCursor { cursor, label: text }) = pending else {
                panic!("menu {}: cursor {} never set", self.name, i);
            };

            let on_tick: EncoderHandler = Box::new(move |ctx: &mut Ctx<'_>, direction| {
                ctx.menu_mut().step(i, direction);
                ctx.notify_selection();
            });
            let on_press = cursor.switch.map(|_| enter_handler(i));
            b.set_encoder(cursor.encoder, cursor.switch, Some(on_tick), on_press, &text);

            let _ = cursors.push(cursor);
        }

        if let Some(back) = self.back {
            b.set_button(
                back,
                Box::new(|ctx: &mut Ctx<'_>, pressed| {
                    if pressed && ctx.depth() > 1 {
                        ctx.pop();
                    }
                }),
                None,
            );
        }
        if let Some(forward) = self.forward {
            b.set_button(forward, enter_handler(0), None);
        }

        b.set_on_enable(Box::new(|ctx: &mut Ctx<'_>| {
            ctx.notify_selection();
        }));
        b.set_render(|r| {
            let depth = r.depth;
            r.payload.menu_mut().render(&mut *r.surface, &mut *r.chrome, depth);
        });

        if let Some(leds) = self.leds {
            b.set_leds(leds);
        }

        b.set_payload(Payload::Menu(Menu {
            items,
            cursors,
            render_item: self.render_item.unwrap_or_else(|| Box::new(render_name)),
            selection_changed: self.selection_changed,
            back: self.back,
            forward: self.forward,
        }));

        b.finalize()
    }
}

/// Press handler opening the item under `cursor`
fn enter_handler(cursor: usize) -> ButtonHandler {
    Box::new(move |ctx: &mut Ctx<'_>, pressed| {
        if !pressed {
            return;
        }
        if let Some((context, data)) = ctx.menu().enter(cursor) {
            ctx.push(context, data);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextId, Env, NavRequest, BACK_GLYPH, FORWARD_GLYPH};
    use crate::input::{Direction, Event};
    use crate::leds::ColorCell;
    use crate::testing::RecordingSurface;

    const ENC: EncoderId = EncoderId::new(0);
    const SW: ButtonId = ButtonId::new(2);
    const BACK: ButtonId = ButtonId::new(0);
    const FWD: ButtonId = ButtonId::new(1);

    fn tick(direction: Direction) -> Event {
        Event::EncoderTick {
            channel: ENC,
            direction,
        }
    }

    fn edge(channel: ButtonId, pressed: bool) -> Event {
        Event::ButtonEdge { channel, pressed }
    }

    fn env(depth: usize) -> Env {
        Env {
            depth,
            frame: None,
            held: 0,
        }
    }

    fn notes() -> Context {
        let mut m = MenuBuilder::init("notes", 1, 3);
        m.set_item(0, MenuItem::new("C"))
            .set_item(1, MenuItem::new("C#/Db").entering(ContextId(7), Some(FrameData(1))))
            .set_item(2, MenuItem::new("D").entering(ContextId(8), None))
            .set_cursor(0, ENC, Some(SW), "Note")
            .set_cursor_enter_data(0, FrameData(99))
            .set_back_button(BACK)
            .set_forward_button(FWD);
        m.finalize()
    }

    #[test]
    fn test_tick_moves_and_wraps() {
        let mut ctx = notes();
        ctx.handle(tick(Direction::CounterClockwise), env(1));
        assert_eq!(ctx.payload().menu().position(0), 2);
        ctx.handle(tick(Direction::Clockwise), env(1));
        ctx.handle(tick(Direction::Clockwise), env(1));
        assert_eq!(ctx.payload().menu().position(0), 1);
    }

    #[test]
    fn test_press_pushes_selected() {
        let mut ctx = notes();
        ctx.handle(tick(Direction::Clockwise), env(1));

        let r = ctx.handle(edge(SW, true), env(1));
        assert_eq!(r.requests.as_slice(), &[NavRequest::Push(ContextId(7), Some(FrameData(1)))]);

        let r = ctx.handle(edge(SW, false), env(1));
        assert!(r.invoked);
        assert!(r.requests.is_empty());
    }

    #[test]
    fn test_press_falls_back_to_cursor_data() {
        let mut ctx = notes();
        ctx.handle(tick(Direction::CounterClockwise), env(1));
        let r = ctx.handle(edge(FWD, true), env(1));
        assert_eq!(r.requests.as_slice(), &[NavRequest::Push(ContextId(8), Some(FrameData(99)))]);
    }

    #[test]
    fn test_press_on_leaf_item_does_nothing() {
        let mut ctx = notes();
        let r = ctx.handle(edge(SW, true), env(1));
        assert!(r.requests.is_empty());
    }

    #[test]
    fn test_back_only_below_root() {
        let mut ctx = notes();
        assert!(ctx.handle(edge(BACK, true), env(1)).requests.is_empty());
        assert_eq!(ctx.handle(edge(BACK, true), env(2)).requests.as_slice(), &[NavRequest::Pop]);
        assert!(ctx.handle(edge(BACK, false), env(2)).requests.is_empty());
    }

    #[test]
    fn test_render_sets_glyphs() {
        let mut ctx = notes();
        let mut surface = RecordingSurface::new(120, 54);

        ctx.render(&mut surface, env(1));
        assert_eq!(surface.texts(), ["D", "C", "C#/Db"]);
        assert!(surface.is_highlighted("C"));
        assert_eq!(ctx.chrome().glyph(BACK), None);
        assert_eq!(ctx.chrome().glyph(FWD), None);

        ctx.handle(tick(Direction::Clockwise), env(2));
        ctx.render(&mut surface, env(2));
        assert_eq!(ctx.chrome().glyph(BACK), Some(BACK_GLYPH));
        assert_eq!(ctx.chrome().glyph(FWD), Some(FORWARD_GLYPH));
    }

    #[test]
    fn test_label_applied() {
        let ctx = notes();
        assert_eq!(ctx.chrome().label(ENC), "Note");
    }

    #[test]
    fn test_enable_publishes_selection() {
        static CELLS: [ColorCell; 3] = [ColorCell::new(0xA), ColorCell::new(0xB), ColorCell::new(0xC)];
        let mut m = MenuBuilder::init("lit", 1, 3);
        for i in 0..3 {
            m.set_item(i, MenuItem::new("x"));
        }
        m.set_cursor(0, ENC, None, "")
            .set_start(0, 2)
            .set_selection_changed(|sel, leds| leds.fill(&CELLS[sel.position(0)]));
        let mut ctx = m.finalize();

        let r = ctx.enable(env(1));
        assert!(r.leds_changed);
        assert_eq!(ctx.leds().unwrap().colors(), [0xC; 3]);

        let r = ctx.handle(tick(Direction::Clockwise), env(1));
        assert!(r.leds_changed);
        assert_eq!(ctx.leds().unwrap().colors(), [0xA; 3]);
    }

    #[test]
    fn test_plain_menu_leaves_leds_alone() {
        let mut ctx = notes();
        let r = ctx.enable(env(1));
        assert!(!r.leds_changed);
        let r = ctx.handle(tick(Direction::Clockwise), env(1));
        assert!(r.invoked);
        assert!(!r.leds_changed);
        assert!(ctx.leds().is_none());
    }

    #[test]
    fn test_custom_render_item() {
        let mut m = MenuBuilder::init("custom", 2, 2);
        m.set_item(0, MenuItem::new("a").with_value(1))
            .set_item(1, MenuItem::new("b").with_value(2))
            .set_cursor(0, EncoderId::new(0), None, "L")
            .set_cursor(1, EncoderId::new(1), None, "R")
            .set_render_item(|s, item, slot| {
                if slot.row == super::super::Row::Selected {
                    s.draw_string(pcp_hal::Point::new(0, 0), pcp_hal::Font::Small, item.name);
                }
            });
        let mut ctx = m.finalize();
        let mut surface = RecordingSurface::new(120, 54);
        ctx.render(&mut surface, env(1));
        assert_eq!(surface.texts(), ["a", "a"]);
        assert_eq!(surface.drawn[1].at, pcp_hal::Point::new(60, 18));
    }

    #[test]
    #[should_panic(expected = "item 1 never set")]
    fn test_missing_item_halts() {
        let mut m = MenuBuilder::init("holes", 1, 2);
        m.set_item(0, MenuItem::new("a")).set_cursor(0, ENC, None, "");
        m.finalize();
    }

    #[test]
    #[should_panic(expected = "menu needs 1 to 3 cursors")]
    fn test_too_many_cursors_halts() {
        MenuBuilder::init("wide", 4, 1);
    }

    #[test]
    #[should_panic(expected = "menu needs 1 to 16 items")]
    fn test_empty_menu_halts() {
        MenuBuilder::init("empty", 1, 0);
    }
}
