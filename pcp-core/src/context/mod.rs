//! UI contexts
//!
//! A context is one screen: the callbacks that input events resolve to, the
//! chrome drawn around its pane (encoder labels and button glyphs), the LEDs
//! it previews and its payload.
//!
//! ```text
//! ┌──────────────────────────────┬───┐
//! │                              │ « │  glyph of the upper button
//! │        pane (render cb)      │ » │  glyph of the lower button
//! │                              │   │
//! ├──────────────────────────────┴───┤
//! │ Red        Green           Blue  │  encoder labels
//! └──────────────────────────────────┘
//! ```
//!
//! Callbacks never see the navigator. They get a [`Ctx`] handle and record
//! navigation requests on it; the navigator applies them once the callback
//! has returned.

pub mod builder;
pub mod payload;

pub use builder::ContextBuilder;
pub use payload::{EncoderTriplet, Payload, TripletChannel, COARSE_STEP, FINE_STEP};

use alloc::boxed::Box;
use core::any::Any;

use heapless::Vec;
use pcp_hal::Surface;

use crate::config::{Label, BUTTON_SLOTS, ENCODER_SLOTS};
use crate::input::{ButtonId, Direction, EncoderId, Event};
use crate::leds::LedRefs;
use crate::menu::Menu;

/// Navigation requests one callback may make
pub const MAX_REQUESTS: usize = 4;

/// Glyph shown next to a button that navigates back
pub const BACK_GLYPH: char = '\u{ab}';

/// Glyph shown next to a button that navigates forward
pub const FORWARD_GLYPH: char = '\u{bb}';

/// Handle of a context in the navigator's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ContextId(pub(crate) u16);

impl ContextId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Opaque value paired with a stack frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameData(pub u32);

/// One entry of the navigation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub context: ContextId,
    pub data: Option<FrameData>,
}

/// Navigation requested by a callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NavRequest {
    Push(ContextId, Option<FrameData>),
    Pop,
}

pub type EncoderHandler = Box<dyn FnMut(&mut Ctx<'_>, Direction) + Send>;
pub type ButtonHandler = Box<dyn FnMut(&mut Ctx<'_>, bool) + Send>;
pub type EnableHandler = Box<dyn FnMut(&mut Ctx<'_>) + Send>;
pub type RenderHandler = Box<dyn FnMut(&mut RenderCtx<'_>) + Send>;

/// Per-context event routing
///
/// Empty slots are no-ops.
pub struct CallbackTable {
    encoders: [Option<EncoderHandler>; ENCODER_SLOTS],
    buttons: [Option<ButtonHandler>; BUTTON_SLOTS],
    on_enable: Option<EnableHandler>,
    render: Option<RenderHandler>,
}

impl Default for CallbackTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CallbackTable {
    pub fn new() -> Self {
        Self {
            encoders: core::array::from_fn(|_| None),
            buttons: core::array::from_fn(|_| None),
            on_enable: None,
            render: None,
        }
    }

    pub fn has_encoder(&self, id: EncoderId) -> bool {
        self.encoders[id.index()].is_some()
    }

    pub fn has_button(&self, id: ButtonId) -> bool {
        self.buttons[id.index()].is_some()
    }

    /// Run the handler bound to `event`; false if the slot is empty
    fn invoke(&mut self, event: Event, ctx: &mut Ctx<'_>) -> bool {
        match event {
            Event::EncoderTick { channel, direction } => match &mut self.encoders[channel.index()] {
                Some(handler) => {
                    handler(ctx, direction);
                    true
                }
                None => false,
            },
            Event::ButtonEdge { channel, pressed } => match &mut self.buttons[channel.index()] {
                Some(handler) => {
                    handler(ctx, pressed);
                    true
                }
                None => false,
            },
        }
    }
}

/// Labels and glyphs drawn around a context's pane
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chrome {
    labels: [Label; ENCODER_SLOTS],
    glyphs: [Option<char>; BUTTON_SLOTS],
}

impl Chrome {
    pub fn label(&self, id: EncoderId) -> &str {
        &self.labels[id.index()]
    }

    pub fn set_label(&mut self, id: EncoderId, label: Label) {
        self.labels[id.index()] = label;
    }

    pub fn glyph(&self, id: ButtonId) -> Option<char> {
        self.glyphs[id.index()]
    }

    pub fn set_glyph(&mut self, id: ButtonId, glyph: Option<char>) {
        self.glyphs[id.index()] = glyph;
    }
}

/// Navigation state visible to callbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Env {
    pub depth: usize,
    pub frame: Option<FrameData>,
    pub held: u8,
}

/// What a callback left behind
#[derive(Debug, Default)]
pub(crate) struct Response {
    pub invoked: bool,
    pub requests: Vec<NavRequest, MAX_REQUESTS>,
    pub leds_changed: bool,
}

/// Handle passed to event and on-enable callbacks
pub struct Ctx<'a> {
    payload: &'a mut Payload,
    chrome: &'a mut Chrome,
    leds: &'a mut Option<LedRefs>,
    env: Env,
    requests: Vec<NavRequest, MAX_REQUESTS>,
    leds_changed: bool,
}

impl<'a> Ctx<'a> {
    fn new(
        payload: &'a mut Payload,
        chrome: &'a mut Chrome,
        leds: &'a mut Option<LedRefs>,
        env: Env,
    ) -> Self {
        Self {
            payload,
            chrome,
            leds,
            env,
            requests: Vec::new(),
            leds_changed: false,
        }
    }

    fn finish(self, invoked: bool) -> Response {
        Response {
            invoked,
            requests: self.requests,
            leds_changed: self.leds_changed,
        }
    }

    pub fn payload(&self) -> &Payload {
        &*self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut *self.payload
    }

    pub fn menu(&self) -> &Menu {
        self.payload.menu()
    }

    pub fn menu_mut(&mut self) -> &mut Menu {
        self.payload.menu_mut()
    }

    /// Run the menu's selection-changed callback on this context's LEDs
    pub fn notify_selection(&mut self) {
        if self.payload.menu_mut().notify_selection(&mut *self.leds) {
            self.leds_changed = true;
        }
    }

    pub fn encoders_mut(&mut self) -> &mut EncoderTriplet {
        self.payload.encoders_mut()
    }

    pub fn leaf_mut<T: Any>(&mut self) -> &mut T {
        self.payload.leaf_mut()
    }

    pub fn leds(&self) -> Option<&LedRefs> {
        self.leds.as_ref()
    }

    /// Replace the LED references; published after the callback returns
    pub fn set_leds(&mut self, leds: LedRefs) {
        *self.leds = Some(leds);
        self.leds_changed = true;
    }

    pub fn chrome_mut(&mut self) -> &mut Chrome {
        &mut *self.chrome
    }

    /// Navigation stack depth, including this context
    pub fn depth(&self) -> usize {
        self.env.depth
    }

    /// Data of the frame this context was pushed with
    pub fn frame_data(&self) -> Option<FrameData> {
        self.env.frame
    }

    /// Whether a button is currently held down
    pub fn is_held(&self, button: ButtonId) -> bool {
        self.env.held & button.mask() != 0
    }

    /// Open `context` on top of this one
    pub fn push(&mut self, context: ContextId, data: Option<FrameData>) {
        self.request(NavRequest::Push(context, data));
    }

    /// Leave this context
    pub fn pop(&mut self) {
        self.request(NavRequest::Pop);
    }

    fn request(&mut self, request: NavRequest) {
        if self.requests.push(request).is_err() {
            panic!("more than {} navigation requests from one callback", MAX_REQUESTS);
        }
    }
}

/// Handle passed to render callbacks
///
/// `surface` is the context's pane; (0, 0) is its top-left corner.
pub struct RenderCtx<'a> {
    pub surface: &'a mut dyn Surface,
    pub payload: &'a mut Payload,
    pub chrome: &'a mut Chrome,
    pub depth: usize,
    pub frame: Option<FrameData>,
}

/// One screen
pub struct Context {
    name: &'static str,
    callbacks: CallbackTable,
    chrome: Chrome,
    leds: Option<LedRefs>,
    payload: Payload,
}

impl Context {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn callbacks(&self) -> &CallbackTable {
        &self.callbacks
    }

    pub fn chrome(&self) -> &Chrome {
        &self.chrome
    }

    pub fn leds(&self) -> Option<&LedRefs> {
        self.leds.as_ref()
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut Payload {
        &mut self.payload
    }

    /// Resolve one event against the callback table
    pub(crate) fn handle(&mut self, event: Event, env: Env) -> Response {
        let Context {
            callbacks,
            chrome,
            leds,
            payload,
            ..
        } = self;
        let mut ctx = Ctx::new(payload, chrome, leds, env);
        let invoked = callbacks.invoke(event, &mut ctx);
        ctx.finish(invoked)
    }

    /// Run the on-enable callback, if any
    pub(crate) fn enable(&mut self, env: Env) -> Response {
        let Context {
            callbacks,
            chrome,
            leds,
            payload,
            ..
        } = self;
        let mut ctx = Ctx::new(payload, chrome, leds, env);
        let invoked = match &mut callbacks.on_enable {
            Some(handler) => {
                handler(&mut ctx);
                true
            }
            None => false,
        };
        ctx.finish(invoked)
    }

    /// Run the render callback against the pane
    pub(crate) fn render(&mut self, pane: &mut dyn Surface, env: Env) {
        if let Some(render) = &mut self.callbacks.render {
            render(&mut RenderCtx {
                surface: pane,
                payload: &mut self.payload,
                chrome: &mut self.chrome,
                depth: env.depth,
                frame: env.frame,
            });
        }
    }
}
