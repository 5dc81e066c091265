//! Context construction
//!
//! ```ignore
//! let mut b = ContextBuilder::begin("editor");
//! b.set_encoder(red, Some(red_switch), Some(on_tick), None, "Red");
//! b.set_button(upper, back, Some(BACK_GLYPH));
//! b.set_payload(Payload::Encoders(triplet));
//! let id = nav.insert(b.finalize());
//! ```
//!
//! The builder is an ordinary value, so nested constructors (a menu building
//! its sub-contexts first) each hold their own and cannot disturb another
//! context under construction.

use alloc::boxed::Box;

use super::{
    ButtonHandler, CallbackTable, Chrome, Context, Ctx, EnableHandler, EncoderHandler, Payload,
    RenderCtx,
};
use crate::config::label;
use crate::input::{ButtonId, Direction, EncoderId};
use crate::leds::LedRefs;

/// Assembles a [`Context`]
pub struct ContextBuilder {
    context: Context,
}

impl ContextBuilder {
    /// Start a context with no callbacks, chrome or payload
    pub fn begin(name: &'static str) -> Self {
        Self {
            context: Context {
                name,
                callbacks: CallbackTable::new(),
                chrome: Chrome::default(),
                leds: None,
                payload: Payload::None,
            },
        }
    }

    /// Bind an encoder and its push switch
    ///
    /// `on_tick` receives rotation, `on_press` receives the switch edges.
    /// `text` is the label shown under the encoder.
    pub fn set_encoder(
        &mut self,
        encoder: EncoderId,
        switch: Option<ButtonId>,
        on_tick: Option<EncoderHandler>,
        on_press: Option<ButtonHandler>,
        text: &str,
    ) -> &mut Self {
        self.context.callbacks.encoders[encoder.index()] = on_tick;
        if let Some(switch) = switch {
            self.context.callbacks.buttons[switch.index()] = on_press;
        } else if on_press.is_some() {
            panic!("press handler for encoder {} without a switch", encoder.index());
        }
        self.context.chrome.set_label(encoder, label(text));
        self
    }

    /// Bind a lone button, with the glyph drawn next to it
    pub fn set_button(
        &mut self,
        button: ButtonId,
        handler: ButtonHandler,
        glyph: Option<char>,
    ) -> &mut Self {
        self.context.callbacks.buttons[button.index()] = Some(handler);
        self.context.chrome.set_glyph(button, glyph);
        self
    }

    pub fn set_on_enable(&mut self, handler: EnableHandler) -> &mut Self {
        self.context.callbacks.on_enable = Some(handler);
        self
    }

    pub fn set_render(
        &mut self,
        handler: impl FnMut(&mut RenderCtx<'_>) + Send + 'static,
    ) -> &mut Self {
        self.context.callbacks.render = Some(Box::new(handler));
        self
    }

    pub fn set_payload(&mut self, payload: Payload) -> &mut Self {
        self.context.payload = payload;
        self
    }

    pub fn set_leds(&mut self, leds: LedRefs) -> &mut Self {
        self.context.leds = Some(leds);
        self
    }

    /// Convenience for closures: bind a tick handler without a switch
    pub fn on_tick(
        &mut self,
        encoder: EncoderId,
        handler: impl FnMut(&mut Ctx<'_>, Direction) + Send + 'static,
    ) -> &mut Self {
        self.context.callbacks.encoders[encoder.index()] = Some(Box::new(handler));
        self
    }

    /// Convenience for closures: bind a button handler without a glyph
    pub fn on_button(
        &mut self,
        button: ButtonId,
        handler: impl FnMut(&mut Ctx<'_>, bool) + Send + 'static,
    ) -> &mut Self {
        self.context.callbacks.buttons[button.index()] = Some(Box::new(handler));
        self
    }

    /// Hand over the finished context
    pub fn finalize(self) -> Context {
        self.context
    }
}
