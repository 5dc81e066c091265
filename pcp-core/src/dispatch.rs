//! Dispatch loops
//!
//! One loop per input class. Each waits on its bridge's mailbox, picks up a
//! republished context id if there is one, and resolves the notification's
//! events against the navigator in ascending channel order. Afterwards it
//! asks for a redraw and an LED refresh.
//!
//! The button loop also keeps [`Bus::held`] current, before any handler
//! runs, so encoder handlers can ask whether a switch is down.

use crate::bridge::{Mailbox, Notification};
use crate::context::ContextId;
use crate::input::Event;
use crate::nav::{Bus, Navigator, Outcome, SharedNavigator};

/// Which half of the input a loop serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputClass {
    Encoders,
    Buttons,
}

/// State of one dispatch loop
pub struct Dispatcher<'a> {
    class: InputClass,
    bus: &'a Bus,
    published: Option<ContextId>,
}

impl<'a> Dispatcher<'a> {
    pub fn new(class: InputClass, bus: &'a Bus) -> Self {
        Self {
            class,
            bus,
            published: None,
        }
    }

    /// Context this loop currently resolves against
    pub fn published(&self) -> Option<ContextId> {
        self.published
    }

    fn refresh_published(&mut self) {
        let signal = match self.class {
            InputClass::Encoders => &self.bus.encoder_context,
            InputClass::Buttons => &self.bus.button_context,
        };
        if let Some(id) = signal.try_take() {
            self.published = Some(id);
        }
    }

    /// Handle one notification word with the navigator locked
    pub fn step(&mut self, nav: &mut Navigator, notification: Notification) -> Outcome {
        self.refresh_published();

        let outcome = match self.class {
            InputClass::Encoders => self.resolve(nav, notification.encoder_events()),
            InputClass::Buttons => {
                for event in notification.button_events() {
                    if let Event::ButtonEdge { channel, pressed } = event {
                        self.bus.set_held(channel, pressed);
                    }
                }
                self.resolve(nav, notification.button_events())
            }
        };

        self.bus.render.signal(());
        self.bus.led_refresh.signal(());
        outcome
    }

    fn resolve(&self, nav: &mut Navigator, events: impl Iterator<Item = Event>) -> Outcome {
        match self.published {
            Some(id) => nav.dispatch_batch(id, events, self.bus),
            None => {
                #[cfg(feature = "defmt")]
                defmt::trace!("{}: no context published yet", self.class);
                Outcome::Stale
            }
        }
    }

    /// Serve `mailbox` forever
    pub async fn run(mut self, mailbox: &Mailbox, nav: &SharedNavigator) -> ! {
        loop {
            let notification = mailbox.wait().await;
            let mut nav = nav.lock().await;
            let _outcome = self.step(&mut nav, notification);

            #[cfg(feature = "defmt")]
            defmt::trace!("{} batch {=u32:#x}: {}", self.class, notification.bits(), _outcome);
        }
    }
}

/// Encoder dispatch loop
pub async fn encoder_dispatch(mailbox: &Mailbox, nav: &SharedNavigator, bus: &Bus) -> ! {
    Dispatcher::new(InputClass::Encoders, bus).run(mailbox, nav).await
}

/// Button dispatch loop
pub async fn button_dispatch(mailbox: &Mailbox, nav: &SharedNavigator, bus: &Bus) -> ! {
    Dispatcher::new(InputClass::Buttons, bus).run(mailbox, nav).await
}
