//! Menus and cursors
//!
//! A menu is a context payload: a bounded list of items browsed by one to
//! three cursors. Each cursor is bound to one encoder (and optionally its
//! push switch) and draws its own column as a three-row carousel:
//!
//! ```text
//!   cursor 0      cursor 1      cursor 2
//! ┌────────────┬────────────┬────────────┐
//! │  item p-1  │  item p-1  │  item p-1  │
//! │▓▓item p▓▓▓▓│▓▓item p▓▓▓▓│▓▓item p▓▓▓▓│  highlighted
//! │  item p+1  │  item p+1  │  item p+1  │
//! └────────────┴────────────┴────────────┘
//! ```
//!
//! Positions wrap in both directions. Pressing a cursor's switch (or the
//! forward button, which acts for cursor 0) opens the selected item's
//! sub-context.

pub mod builder;

pub use builder::MenuBuilder;

use alloc::boxed::Box;

use heapless::Vec;
use pcp_hal::{Font, Offset, Point, Rect, Size, Surface};

use crate::config::{MAX_CURSORS, MAX_MENU_ITEMS};
use crate::context::{Chrome, ContextId, FrameData, BACK_GLYPH, FORWARD_GLYPH};
use crate::input::{ButtonId, Direction, EncoderId};
use crate::leds::LedRefs;

/// Rows of a carousel
pub const CAROUSEL_ROWS: usize = 3;

/// One entry of a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MenuItem {
    pub name: &'static str,
    /// Context opened when the item is entered
    pub enter: Option<ContextId>,
    /// Frame data passed to `enter`
    pub enter_data: Option<FrameData>,
    /// Application value carried by the item
    pub value: u32,
}

impl MenuItem {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            enter: None,
            enter_data: None,
            value: 0,
        }
    }

    pub const fn entering(mut self, context: ContextId, data: Option<FrameData>) -> Self {
        self.enter = Some(context);
        self.enter_data = data;
        self
    }

    pub const fn with_value(mut self, value: u32) -> Self {
        self.value = value;
        self
    }
}

/// A selection position within a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub(crate) position: usize,
    pub(crate) encoder: EncoderId,
    pub(crate) switch: Option<ButtonId>,
    /// Used when the selected item has no enter data of its own
    pub(crate) enter_data: Option<FrameData>,
}

impl Cursor {
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn encoder(&self) -> EncoderId {
        self.encoder
    }

    pub fn switch(&self) -> Option<ButtonId> {
        self.switch
    }
}

/// Which carousel row a slot is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Row {
    Previous,
    Selected,
    Next,
}

/// Where an item is being painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub cursor: usize,
    pub row: Row,
    pub size: Size,
}

/// Read-only view of items and cursor positions
pub struct Selection<'a> {
    items: &'a [MenuItem],
    cursors: &'a [Cursor],
}

impl<'a> Selection<'a> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor_count(&self) -> usize {
        self.cursors.len()
    }

    pub fn position(&self, cursor: usize) -> usize {
        self.cursors[cursor].position
    }

    /// Index `offset` items away from a cursor, wrapping
    pub fn index(&self, cursor: usize, offset: isize) -> usize {
        wrap(self.position(cursor), offset, self.items.len())
    }

    /// Item `offset` items away from a cursor, wrapping
    pub fn item(&self, cursor: usize, offset: isize) -> &'a MenuItem {
        &self.items[self.index(cursor, offset)]
    }
}

pub type RenderItemFn = Box<dyn FnMut(&mut dyn Surface, &MenuItem, &Slot) + Send>;
pub type SelectionChangedFn = Box<dyn FnMut(&Selection<'_>, &mut LedRefs) + Send>;

/// `(position + offset) mod len`, for any sign of offset
fn wrap(position: usize, offset: isize, len: usize) -> usize {
    let len = len as isize;
    ((position as isize + offset % len + len) % len) as usize
}

/// Draw the item name vertically centred in its slot
pub fn render_name(surface: &mut dyn Surface, item: &MenuItem, slot: &Slot) {
    let glyph = Font::Medium.glyph_size();
    let y = (slot.size.height.saturating_sub(glyph.height) / 2) as i32;
    surface.draw_string(Point::new(2, y), Font::Medium, item.name);
}

/// Items, cursors and the callbacks that paint and preview them
pub struct Menu {
    items: Vec<MenuItem, MAX_MENU_ITEMS>,
    cursors: Vec<Cursor, MAX_CURSORS>,
    render_item: RenderItemFn,
    selection_changed: Option<SelectionChangedFn>,
    back: Option<ButtonId>,
    forward: Option<ButtonId>,
}

impl Menu {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    pub fn position(&self, cursor: usize) -> usize {
        self.cursors[cursor].position
    }

    /// Item under a cursor
    pub fn selected(&self, cursor: usize) -> &MenuItem {
        &self.items[self.position(cursor)]
    }

    pub fn selection(&self) -> Selection<'_> {
        Selection {
            items: &self.items,
            cursors: &self.cursors,
        }
    }

    /// Item indices shown by a cursor's carousel, top to bottom
    pub fn carousel(&self, cursor: usize) -> [usize; CAROUSEL_ROWS] {
        let p = self.position(cursor);
        let len = self.items.len();
        [wrap(p, -1, len), p, wrap(p, 1, len)]
    }

    /// Move a cursor by one tick without notifying
    pub fn step(&mut self, cursor: usize, direction: Direction) -> usize {
        let len = self.items.len();
        let c = &mut self.cursors[cursor];
        c.position = wrap(c.position, direction.delta() as isize, len);
        c.position
    }

    /// Move a cursor by one tick and run selection-changed
    pub fn tick(
        &mut self,
        cursor: usize,
        direction: Direction,
        leds: &mut Option<LedRefs>,
    ) -> usize {
        let position = self.step(cursor, direction);
        self.notify_selection(leds);
        position
    }

    /// Run selection-changed against the current positions
    ///
    /// Returns false when the menu has no selection-changed callback.
    pub fn notify_selection(&mut self, leds: &mut Option<LedRefs>) -> bool {
        let Some(changed) = &mut self.selection_changed else {
            return false;
        };
        let selection = Selection {
            items: &self.items,
            cursors: &self.cursors,
        };
        changed(&selection, leds.get_or_insert_with(LedRefs::dark));
        true
    }

    /// Context and frame data to open for a cursor, if its item has one
    pub fn enter(&self, cursor: usize) -> Option<(ContextId, Option<FrameData>)> {
        let item = self.selected(cursor);
        let fallback = self.cursors[cursor].enter_data;
        item.enter.map(|context| (context, item.enter_data.or(fallback)))
    }

    pub fn back_button(&self) -> Option<ButtonId> {
        self.back
    }

    pub fn forward_button(&self) -> Option<ButtonId> {
        self.forward
    }

    /// Update the navigation glyphs for the current state
    ///
    /// Back shows only when there is somewhere to go back to; forward only
    /// when cursor 0's item opens something.
    pub fn refresh_glyphs(&self, chrome: &mut Chrome, depth: usize) {
        if let Some(back) = self.back {
            chrome.set_glyph(back, (depth > 1).then_some(BACK_GLYPH));
        }
        if let Some(forward) = self.forward {
            let opens = self.selected(0).enter.is_some();
            chrome.set_glyph(forward, opens.then_some(FORWARD_GLYPH));
        }
    }

    /// Paint every cursor's carousel into `pane`
    pub fn render(&mut self, pane: &mut dyn Surface, chrome: &mut Chrome, depth: usize) {
        self.refresh_glyphs(chrome, depth);

        let size = pane.size();
        let columns = self.cursors.len() as u32;
        let slot_size = Size::new(size.width / columns, size.height / CAROUSEL_ROWS as u32);
        let rows = [Row::Previous, Row::Selected, Row::Next];
        let len = self.items.len();

        for (column, cursor) in self.cursors.iter().enumerate() {
            let p = cursor.position;
            let indices = [wrap(p, -1, len), p, wrap(p, 1, len)];

            for (r, (&row, &index)) in rows.iter().zip(indices.iter()).enumerate() {
                let area = Rect::new(
                    (column as u32 * slot_size.width) as i32,
                    (r as u32 * slot_size.height) as i32,
                    slot_size.width,
                    slot_size.height,
                );
                let slot = Slot {
                    cursor: column,
                    row,
                    size: slot_size,
                };

                (self.render_item)(&mut Offset::new(&mut *pane, area), &self.items[index], &slot);

                if row == Row::Selected {
                    pane.invert_region(area);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingSurface;
    use proptest::prelude::*;

    fn menu(names: &[&'static str], cursors: usize) -> Menu {
        let mut items = Vec::new();
        for &name in names {
            items.push(MenuItem::new(name)).unwrap();
        }
        let mut cs = Vec::new();
        for i in 0..cursors {
            cs.push(Cursor {
                position: 0,
                encoder: EncoderId::new(i as u8),
                switch: None,
                enter_data: None,
            })
            .unwrap();
        }
        Menu {
            items,
            cursors: cs,
            render_item: Box::new(render_name),
            selection_changed: None,
            back: None,
            forward: None,
        }
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap(0, -1, 3), 2);
        assert_eq!(wrap(2, 1, 3), 0);
        assert_eq!(wrap(1, -4, 3), 0);
        assert_eq!(wrap(0, 1, 1), 0);
    }

    #[test]
    fn test_plus_then_minus_unchanged() {
        let mut m = menu(&["a", "b", "c"], 1);
        m.step(0, Direction::Clockwise);
        m.step(0, Direction::CounterClockwise);
        assert_eq!(m.position(0), 0);
    }

    #[test]
    fn test_carousel_wraps() {
        let m = menu(&["C", "C#/Db", "D"], 1);
        assert_eq!(m.carousel(0), [2, 0, 1]);
        let single = menu(&["only"], 1);
        assert_eq!(single.carousel(0), [0, 0, 0]);
    }

    #[test]
    fn test_cursors_independent() {
        let mut m = menu(&["a", "b", "c", "d"], 2);
        m.step(1, Direction::CounterClockwise);
        assert_eq!(m.position(0), 0);
        assert_eq!(m.position(1), 3);
    }

    #[test]
    fn test_render_carousel_order_and_highlight() {
        let mut m = menu(&["C", "C#/Db", "D"], 1);
        m.step(0, Direction::Clockwise);
        let mut surface = RecordingSurface::new(120, 54);
        let mut chrome = Chrome::default();

        m.render(&mut surface, &mut chrome, 1);

        assert_eq!(surface.texts(), ["C", "C#/Db", "D"]);
        assert!(surface.is_highlighted("C#/Db"));
        assert!(!surface.is_highlighted("C"));
        assert!(!surface.is_highlighted("D"));

        // Rows stack downwards
        let c = surface.find("C").unwrap().at;
        let d = surface.find("D").unwrap().at;
        assert!(c.y < d.y);
    }

    #[test]
    fn test_render_columns_per_cursor() {
        let mut m = menu(&["a", "b", "c"], 3);
        m.step(1, Direction::Clockwise);
        m.step(2, Direction::Clockwise);
        m.step(2, Direction::Clockwise);
        let mut surface = RecordingSurface::new(120, 54);
        m.render(&mut surface, &mut Chrome::default(), 1);

        // Middle rows: a, b, c from left to right
        let selected: alloc::vec::Vec<_> = surface
            .drawn
            .iter()
            .filter(|d| surface.inverted.iter().any(|r| r.contains(d.at)))
            .map(|d| (d.text.as_str(), d.at.x / 40))
            .collect();
        assert_eq!(selected, [("a", 0), ("b", 1), ("c", 2)]);
    }

    #[test]
    fn test_enter_prefers_item_data() {
        let mut m = menu(&["a", "b"], 1);
        m.cursors[0].enter_data = Some(FrameData(1));
        m.items[0] = MenuItem::new("a").entering(ContextId(4), Some(FrameData(2)));
        m.items[1] = MenuItem::new("b").entering(ContextId(5), None);

        assert_eq!(m.enter(0), Some((ContextId(4), Some(FrameData(2)))));
        m.step(0, Direction::Clockwise);
        assert_eq!(m.enter(0), Some((ContextId(5), Some(FrameData(1)))));
    }

    #[test]
    fn test_enter_without_target() {
        let m = menu(&["a"], 1);
        assert_eq!(m.enter(0), None);
    }

    #[test]
    fn test_glyph_rules() {
        let mut m = menu(&["leaf", "branch"], 1);
        m.items[1] = MenuItem::new("branch").entering(ContextId(1), None);
        m.back = Some(ButtonId::new(0));
        m.forward = Some(ButtonId::new(1));
        let mut chrome = Chrome::default();

        m.refresh_glyphs(&mut chrome, 1);
        assert_eq!(chrome.glyph(ButtonId::new(0)), None);
        assert_eq!(chrome.glyph(ButtonId::new(1)), None);

        m.step(0, Direction::Clockwise);
        m.refresh_glyphs(&mut chrome, 2);
        assert_eq!(chrome.glyph(ButtonId::new(0)), Some(BACK_GLYPH));
        assert_eq!(chrome.glyph(ButtonId::new(1)), Some(FORWARD_GLYPH));
    }

    #[test]
    fn test_selection_changed_sets_leds() {
        static CELLS: [crate::leds::ColorCell; 3] = [
            crate::leds::ColorCell::new(1),
            crate::leds::ColorCell::new(2),
            crate::leds::ColorCell::new(3),
        ];
        let mut m = menu(&["a", "b", "c"], 1);
        m.selection_changed = Some(Box::new(|sel: &Selection<'_>, leds: &mut LedRefs| {
            leds.set(1, &CELLS[sel.index(0, 0)]);
        }));
        let mut leds = None;

        m.tick(0, Direction::Clockwise, &mut leds);
        assert_eq!(leds.unwrap().colors(), [0, 2, 0]);
        m.tick(0, Direction::Clockwise, &mut leds);
        assert_eq!(leds.unwrap().colors(), [0, 3, 0]);
    }

    proptest! {
        #[test]
        fn prop_full_revolution_returns(len in 1usize..=MAX_MENU_ITEMS, start in 0usize..MAX_MENU_ITEMS, cw in any::<bool>()) {
            let names = ["x"; MAX_MENU_ITEMS];
            let mut m = menu(&names[..len], 1);
            m.cursors[0].position = start % len;
            let dir = if cw { Direction::Clockwise } else { Direction::CounterClockwise };
            for _ in 0..len {
                m.step(0, dir);
            }
            prop_assert_eq!(m.position(0), start % len);
        }

        #[test]
        fn prop_position_in_range(len in 1usize..=MAX_MENU_ITEMS, ticks in proptest::collection::vec(any::<bool>(), 0..64)) {
            let names = ["x"; MAX_MENU_ITEMS];
            let mut m = menu(&names[..len], 1);
            for cw in ticks {
                let dir = if cw { Direction::Clockwise } else { Direction::CounterClockwise };
                prop_assert!(m.step(0, dir) < len);
            }
        }
    }
}
