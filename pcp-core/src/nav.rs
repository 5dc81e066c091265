//! Navigation stack
//!
//! The navigator owns every context in an arena and keeps a bounded stack of
//! frames on top of it. The top frame's context is the current one, and it is
//! the only one that receives input:
//!
//! ```text
//!   arena                      stack
//! ┌────┬────────────┐        ┌──────────────────┐
//! │ 0  │ main menu  │◀───────│ (0, None)        │  depth 1
//! │ 1  │ colors     │◀───────│ (1, None)        │  depth 2
//! │ 2  │ rgb editor │◀───────│ (2, Some(4))     │  depth 3  ◀ current
//! │ 3  │ chord      │        └──────────────────┘
//! └────┴────────────┘
//! ```
//!
//! Entering a context (by push, or by pop uncovering it) runs its on-enable
//! callback, republishes its id to both dispatch loops, publishes its LED
//! references and requests a render.

use alloc::vec::Vec;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use pcp_hal::Surface;
use portable_atomic::{AtomicU8, Ordering};

use crate::config::STACK_DEPTH;
use crate::context::{Context, ContextId, Env, Frame, FrameData, NavRequest};
use crate::input::{ButtonId, Event};
use crate::leds::LedRefs;

/// Signals from the navigation core to the tasks around it
pub struct Bus {
    /// Context the encoder dispatch loop resolves against
    pub encoder_context: Signal<CriticalSectionRawMutex, ContextId>,
    /// Context the button dispatch loop resolves against
    pub button_context: Signal<CriticalSectionRawMutex, ContextId>,
    /// The screen needs redrawing
    pub render: Signal<CriticalSectionRawMutex, ()>,
    /// New LED references to show
    pub leds: Signal<CriticalSectionRawMutex, LedRefs>,
    /// Referenced colors may have changed
    pub led_refresh: Signal<CriticalSectionRawMutex, ()>,
    /// Buttons currently held down, one bit per slot
    pub held: AtomicU8,
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

impl Bus {
    pub const fn new() -> Self {
        Self {
            encoder_context: Signal::new(),
            button_context: Signal::new(),
            render: Signal::new(),
            leds: Signal::new(),
            led_refresh: Signal::new(),
            held: AtomicU8::new(0),
        }
    }

    /// Record a button edge in the held mask
    pub fn set_held(&self, button: ButtonId, pressed: bool) {
        if pressed {
            self.held.fetch_or(button.mask(), Ordering::Relaxed);
        } else {
            self.held.fetch_and(!button.mask(), Ordering::Relaxed);
        }
    }

    pub fn is_held(&self, button: ButtonId) -> bool {
        self.held.load(Ordering::Relaxed) & button.mask() != 0
    }
}

/// What became of one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// A handler ran and did not navigate
    Handled,
    /// The current context has nothing bound to the channel
    Unmapped,
    /// The event was meant for a context that is no longer current
    Stale,
    /// A handler ran and changed the stack
    Navigated,
}

/// Navigator shared between the dispatch loops and the render task
pub type SharedNavigator = Mutex<CriticalSectionRawMutex, Navigator>;

/// Context arena plus navigation stack
pub struct Navigator {
    arena: Vec<Option<Context>>,
    stack: heapless::Vec<Frame, STACK_DEPTH>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator {
    pub const fn new() -> Self {
        Self {
            arena: Vec::new(),
            stack: heapless::Vec::new(),
        }
    }

    /// Move a context into the arena
    ///
    /// Ids are never reused, even after [`Navigator::free`].
    pub fn insert(&mut self, context: Context) -> ContextId {
        let index = self.arena.len();
        assert!(index < u16::MAX as usize, "context arena full");
        self.arena.push(Some(context));
        ContextId(index as u16)
    }

    /// Take a context back out of the arena
    ///
    /// Panics if the context is on the stack or was already freed.
    pub fn free(&mut self, id: ContextId) -> Context {
        assert!(
            !self.stack.iter().any(|f| f.context == id),
            "freeing context {} while it is on the stack",
            id.index()
        );
        match self.arena.get_mut(id.index()).and_then(Option::take) {
            Some(context) => context,
            None => panic!("unknown or freed context {}", id.index()),
        }
    }

    pub fn get(&self, id: ContextId) -> &Context {
        match self.arena.get(id.index()) {
            Some(Some(context)) => context,
            _ => panic!("unknown or freed context {}", id.index()),
        }
    }

    pub fn get_mut(&mut self, id: ContextId) -> &mut Context {
        match self.arena.get_mut(id.index()) {
            Some(Some(context)) => context,
            _ => panic!("unknown or freed context {}", id.index()),
        }
    }

    /// Enter `id` on top of the current context
    ///
    /// Panics if the stack is full or the id is unknown.
    pub fn push(&mut self, id: ContextId, data: Option<FrameData>, bus: &Bus) {
        let name = self.get(id).name();
        if self.stack.push(Frame { context: id, data }).is_err() {
            panic!("navigation stack full ({} frames) pushing {}", STACK_DEPTH, name);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("push {} (depth {})", name, self.stack.len());

        self.enable_current(bus);
    }

    /// Leave the current context, re-entering the one below if any
    ///
    /// Panics if the stack is empty.
    pub fn pop(&mut self, bus: &Bus) -> Frame {
        let Some(frame) = self.stack.pop() else {
            panic!("pop on empty navigation stack");
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("pop {} (depth {})", self.get(frame.context).name(), self.stack.len());

        if !self.stack.is_empty() {
            self.enable_current(bus);
        }
        frame
    }

    /// The current context
    ///
    /// Panics if the stack is empty.
    pub fn current(&self) -> ContextId {
        self.top().context
    }

    pub fn current_context(&self) -> &Context {
        self.get(self.current())
    }

    /// Frame data of the current frame
    pub fn frame_data(&self) -> Option<FrameData> {
        self.top().data
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.stack
    }

    fn top(&self) -> Frame {
        match self.stack.last() {
            Some(frame) => *frame,
            None => panic!("navigation stack is empty"),
        }
    }

    fn env(&self, bus: &Bus) -> Env {
        Env {
            depth: self.stack.len(),
            frame: self.stack.last().and_then(|f| f.data),
            held: bus.held.load(Ordering::Relaxed),
        }
    }

    fn enable_current(&mut self, bus: &Bus) {
        let id = self.current();
        let env = self.env(bus);
        let context = self.get_mut(id);

        let response = context.enable(env);
        assert!(
            response.requests.is_empty(),
            "on-enable of {} requested navigation",
            context.name()
        );

        bus.encoder_context.signal(id);
        bus.button_context.signal(id);
        if let Some(leds) = context.leds() {
            bus.leds.signal(*leds);
        }
        bus.render.signal(());
    }

    /// Resolve one event against the current context
    ///
    /// `published` is the context the calling dispatch loop last saw; events
    /// for any other context are dropped. Navigation requests are applied in
    /// the order the handler made them.
    pub fn dispatch(&mut self, published: ContextId, event: Event, bus: &Bus) -> Outcome {
        match self.stack.last() {
            Some(frame) if frame.context == published => {}
            _ => {
                #[cfg(feature = "defmt")]
                defmt::trace!("dropping {} for stale context {}", event, published.index());
                return Outcome::Stale;
            }
        }

        let env = self.env(bus);
        let context = self.get_mut(published);
        let response = context.handle(event, env);
        if !response.invoked {
            return Outcome::Unmapped;
        }

        if response.leds_changed {
            if let Some(leds) = context.leds() {
                bus.leds.signal(*leds);
            }
        }

        if response.requests.is_empty() {
            return Outcome::Handled;
        }
        for request in response.requests {
            match request {
                NavRequest::Push(id, data) => self.push(id, data, bus),
                NavRequest::Pop => {
                    self.pop(bus);
                }
            }
        }
        Outcome::Navigated
    }

    /// Resolve a batch of events in order
    ///
    /// Stops at the first event that navigates or turns out stale; the rest
    /// of the batch is dropped.
    pub fn dispatch_batch(
        &mut self,
        published: ContextId,
        events: impl IntoIterator<Item = Event>,
        bus: &Bus,
    ) -> Outcome {
        let mut summary = Outcome::Unmapped;
        for event in events {
            match self.dispatch(published, event, bus) {
                Outcome::Handled => summary = Outcome::Handled,
                Outcome::Unmapped => {}
                stop @ (Outcome::Navigated | Outcome::Stale) => return stop,
            }
        }
        summary
    }

    /// Paint the current context into its pane
    pub fn render_current(&mut self, pane: &mut dyn Surface) {
        if self.stack.is_empty() {
            return;
        }
        let id = self.current();
        let env = Env {
            depth: self.stack.len(),
            frame: self.frame_data(),
            held: 0,
        };
        self.get_mut(id).render(pane, env);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ContextBuilder, Ctx, Payload};
    use crate::input::{Direction, EncoderId};
    use crate::leds::ColorCell;
    use alloc::boxed::Box;

    const ENC: EncoderId = EncoderId::new(0);
    const BTN: ButtonId = ButtonId::new(0);

    fn tick() -> Event {
        Event::EncoderTick {
            channel: ENC,
            direction: Direction::Clockwise,
        }
    }

    fn press() -> Event {
        Event::ButtonEdge {
            channel: BTN,
            pressed: true,
        }
    }

    fn counter(name: &'static str) -> Context {
        let mut b = ContextBuilder::begin(name);
        b.set_payload(Payload::Leaf(Box::new(0u32)))
            .on_tick(ENC, |ctx, _| *ctx.leaf_mut::<u32>() += 1);
        b.finalize()
    }

    fn count(nav: &mut Navigator, id: ContextId) -> u32 {
        *nav.get_mut(id).payload_mut().leaf_mut::<u32>()
    }

    #[test]
    fn test_push_pop_lifo() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let a = nav.insert(counter("a"));
        let b = nav.insert(counter("b"));

        nav.push(a, None, &bus);
        nav.push(b, Some(FrameData(5)), &bus);
        assert_eq!(nav.current(), b);
        assert_eq!(nav.frame_data(), Some(FrameData(5)));
        assert_eq!(nav.depth(), 2);

        let f = nav.pop(&bus);
        assert_eq!(f, Frame { context: b, data: Some(FrameData(5)) });
        assert_eq!(nav.current(), a);
        assert_eq!(nav.frame_data(), None);
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn test_enable_republishes() {
        static CELL: ColorCell = ColorCell::new(0x00FF00);
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let mut b = ContextBuilder::begin("lit");
        b.set_leds(LedRefs::new([&CELL; 3]));
        let lit = nav.insert(b.finalize());

        nav.push(lit, None, &bus);
        assert_eq!(bus.encoder_context.try_take(), Some(lit));
        assert_eq!(bus.button_context.try_take(), Some(lit));
        assert_eq!(bus.leds.try_take().map(|l| l.colors()), Some([0x00FF00; 3]));
        assert!(bus.render.signaled());
    }

    #[test]
    fn test_pop_reenables_uncovered() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let mut b = ContextBuilder::begin("root");
        b.set_payload(Payload::Leaf(Box::new(0u32)))
            .set_on_enable(Box::new(|ctx: &mut Ctx<'_>| *ctx.leaf_mut::<u32>() += 1));
        let root = nav.insert(b.finalize());
        let top = nav.insert(counter("top"));

        nav.push(root, None, &bus);
        nav.push(top, None, &bus);
        nav.pop(&bus);
        assert_eq!(count(&mut nav, root), 2);
        assert_eq!(bus.encoder_context.try_take(), Some(root));
    }

    #[test]
    fn test_event_reaches_current_only() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let a = nav.insert(counter("a"));
        let b = nav.insert(counter("b"));
        nav.push(a, None, &bus);
        nav.push(b, None, &bus);

        assert_eq!(nav.dispatch(b, tick(), &bus), Outcome::Handled);
        assert_eq!(nav.dispatch(a, tick(), &bus), Outcome::Stale);
        assert_eq!(count(&mut nav, a), 0);
        assert_eq!(count(&mut nav, b), 1);
        assert_eq!(nav.dispatch(b, press(), &bus), Outcome::Unmapped);
    }

    #[test]
    fn test_batch_stops_after_navigation() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let leaf = nav.insert(counter("leaf"));
        let mut b = ContextBuilder::begin("root");
        b.set_payload(Payload::Leaf(Box::new(0u32)))
            .on_tick(ENC, |ctx, _| *ctx.leaf_mut::<u32>() += 1)
            .on_button(BTN, move |ctx, pressed| {
                if pressed {
                    ctx.push(leaf, None);
                }
            });
        let root = nav.insert(b.finalize());
        nav.push(root, None, &bus);

        let outcome = nav.dispatch_batch(root, [tick(), press(), tick()], &bus);
        assert_eq!(outcome, Outcome::Navigated);
        assert_eq!(nav.current(), leaf);
        assert_eq!(count(&mut nav, root), 1);
        assert_eq!(count(&mut nav, leaf), 0);

        // The old id is now stale
        assert_eq!(nav.dispatch_batch(root, [tick()], &bus), Outcome::Stale);
    }

    #[test]
    fn test_pop_to_empty_drops_events() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let a = nav.insert(counter("a"));
        nav.push(a, None, &bus);
        nav.pop(&bus);
        assert_eq!(nav.depth(), 0);
        assert_eq!(nav.dispatch(a, tick(), &bus), Outcome::Stale);
    }

    #[test]
    fn test_held_mask_visible_to_handlers() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let mut b = ContextBuilder::begin("fine");
        b.set_payload(Payload::Leaf(Box::new(false)))
            .on_tick(ENC, |ctx, _| {
                let held = ctx.is_held(ButtonId::new(3));
                *ctx.leaf_mut::<bool>() = held;
            });
        let id = nav.insert(b.finalize());
        nav.push(id, None, &bus);

        bus.set_held(ButtonId::new(3), true);
        nav.dispatch(id, tick(), &bus);
        assert!(*nav.get_mut(id).payload_mut().leaf_mut::<bool>());

        bus.set_held(ButtonId::new(3), false);
        nav.dispatch(id, tick(), &bus);
        assert!(!*nav.get_mut(id).payload_mut().leaf_mut::<bool>());
    }

    #[test]
    fn test_ids_not_reused() {
        let mut nav = Navigator::new();
        let a = nav.insert(counter("a"));
        nav.free(a);
        let b = nav.insert(counter("b"));
        assert_ne!(a, b);
    }

    #[test]
    #[should_panic(expected = "navigation stack full")]
    fn test_push_past_capacity_halts() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let a = nav.insert(counter("a"));
        for _ in 0..=STACK_DEPTH {
            nav.push(a, None, &bus);
        }
    }

    #[test]
    #[should_panic(expected = "pop on empty navigation stack")]
    fn test_pop_empty_halts() {
        Navigator::new().pop(&Bus::new());
    }

    #[test]
    #[should_panic(expected = "navigation stack is empty")]
    fn test_current_empty_halts() {
        Navigator::new().current();
    }

    #[test]
    #[should_panic(expected = "while it is on the stack")]
    fn test_free_on_stack_halts() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let a = nav.insert(counter("a"));
        nav.push(a, None, &bus);
        nav.free(a);
    }

    #[test]
    #[should_panic(expected = "unknown or freed context")]
    fn test_push_freed_halts() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let a = nav.insert(counter("a"));
        nav.free(a);
        nav.push(a, None, &bus);
    }

    #[test]
    #[should_panic(expected = "requested navigation")]
    fn test_navigating_on_enable_halts() {
        let bus = Bus::new();
        let mut nav = Navigator::new();
        let mut b = ContextBuilder::begin("eager");
        b.set_on_enable(Box::new(|ctx: &mut Ctx<'_>| ctx.pop()));
        let id = nav.insert(b.finalize());
        nav.push(id, None, &bus);
    }
}
