//! Interrupt-to-task bridge
//!
//! The only code that runs at interrupt priority. It drains every pending
//! sample word, decodes them, folds the events into one [`Notification`]
//! and posts it into a single-slot [`Mailbox`]:
//!
//! ```text
//!  capture FIFO ──▶ decode ──▶ Notification ──(fetch_or)──▶ Mailbox ──▶ dispatch task
//!                                                 │
//!                                           Signal (wake)
//! ```
//!
//! Posting never blocks, never allocates and never takes a lock a task could
//! hold. If the task has not drained the previous word yet, the new bits are
//! OR-ed into it, so intermediate counts are lost under flooding.
//!
//! A notification word carries two bits per channel:
//!
//! ```text
//!  bit 2i   changed
//!  bit 2i+1 direction (1 = counter-clockwise) / pressed
//! ```

use core::ops::{BitOr, BitOrAssign};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use pcp_hal::SampleSource;
use portable_atomic::{AtomicU32, Ordering};

use crate::input::{ButtonBank, ButtonId, Direction, EncoderBank, EncoderId, Event};

/// Highest channel count a notification word can carry
pub const MAX_CHANNELS: usize = 16;

/// Coalesced events of one or more sample batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notification(u32);

impl Notification {
    pub const EMPTY: Self = Self(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Mark a channel as changed, with its direction/pressed flag
    ///
    /// A later mark of the same channel replaces the flag.
    pub fn mark(&mut self, channel: usize, flag: bool) {
        debug_assert!(channel < MAX_CHANNELS);
        let flag_bit = 1 << (2 * channel + 1);
        self.0 |= 1 << (2 * channel);
        if flag {
            self.0 |= flag_bit;
        } else {
            self.0 &= !flag_bit;
        }
    }

    /// Fold a decoded event into the word
    pub fn record(&mut self, event: Event) {
        match event {
            Event::EncoderTick { channel, direction } => {
                self.mark(channel.index(), direction == Direction::CounterClockwise)
            }
            Event::ButtonEdge { channel, pressed } => self.mark(channel.index(), pressed),
        }
    }

    /// Changed channels in ascending order, with their flag
    pub fn entries(self) -> impl Iterator<Item = (usize, bool)> {
        (0..MAX_CHANNELS).filter_map(move |ch| {
            let changed = self.0 & (1 << (2 * ch)) != 0;
            changed.then(|| (ch, self.0 & (1 << (2 * ch + 1)) != 0))
        })
    }

    /// Interpret the word as encoder ticks
    pub fn encoder_events(self) -> impl Iterator<Item = Event> {
        self.entries().map(|(ch, ccw)| Event::EncoderTick {
            channel: EncoderId::new(ch as u8),
            direction: if ccw {
                Direction::CounterClockwise
            } else {
                Direction::Clockwise
            },
        })
    }

    /// Interpret the word as button edges
    pub fn button_events(self) -> impl Iterator<Item = Event> {
        self.entries().map(|(ch, pressed)| Event::ButtonEdge {
            channel: ButtonId::new(ch as u8),
            pressed,
        })
    }
}

impl BitOr for Notification {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Notification {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Single-slot, OR-coalescing handoff from interrupt to task
pub struct Mailbox {
    word: AtomicU32,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            word: AtomicU32::new(0),
            wake: Signal::new(),
        }
    }

    /// Merge a notification into the slot and wake the owner
    ///
    /// Safe to call from interrupt context. Empty words are not posted.
    pub fn post(&self, notification: Notification) {
        if notification.is_empty() {
            return;
        }
        self.word.fetch_or(notification.bits(), Ordering::AcqRel);
        self.wake.signal(());
    }

    /// Take whatever has accumulated, without waiting
    pub fn try_take(&self) -> Option<Notification> {
        let bits = self.word.swap(0, Ordering::AcqRel);
        (bits != 0).then_some(Notification(bits))
    }

    /// Wait for the next non-empty notification and take it
    pub async fn wait(&self) -> Notification {
        loop {
            self.wake.wait().await;
            if let Some(n) = self.try_take() {
                return n;
            }
        }
    }
}

/// Turns sample words into notification bits
pub trait Decoder {
    fn decode(&mut self, word: u32, into: &mut Notification);
}

impl Decoder for EncoderBank {
    fn decode(&mut self, word: u32, into: &mut Notification) {
        EncoderBank::decode(self, word, |e| into.record(e));
    }
}

impl Decoder for ButtonBank {
    fn decode(&mut self, word: u32, into: &mut Notification) {
        ButtonBank::decode(self, word, |e| into.record(e));
    }
}

/// Interrupt-side owner of one device class
///
/// Holds the channel state exclusively; tasks only see the mailbox.
pub struct Bridge<'a, D: Decoder> {
    decoder: D,
    mailbox: &'a Mailbox,
}

impl<'a, D: Decoder> Bridge<'a, D> {
    pub fn new(decoder: D, mailbox: &'a Mailbox) -> Self {
        Self { decoder, mailbox }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Decode one batch of sample words and post the result
    pub fn on_batch(&mut self, words: impl IntoIterator<Item = u32>) -> Notification {
        let mut notification = Notification::EMPTY;
        for word in words {
            self.decoder.decode(word, &mut notification);
        }
        self.mailbox.post(notification);
        notification
    }

    /// Serve a sample source forever
    ///
    /// Waits for the first word of a batch, then drains whatever else is
    /// already pending so one wake-up covers the whole burst.
    pub async fn run<S: SampleSource>(mut self, source: &mut S) -> ! {
        loop {
            let first = source.next().await;
            let rest = core::iter::from_fn(|| source.try_next());
            self.on_batch(core::iter::once(first).chain(rest));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use pcp_hal::input::pack;

    #[test]
    fn test_mark_and_entries() {
        let mut n = Notification::EMPTY;
        n.mark(3, true);
        n.mark(0, false);
        let entries: heapless::Vec<(usize, bool), 4> = n.entries().collect();
        assert_eq!(entries.as_slice(), &[(0, false), (3, true)]);
    }

    #[test]
    fn test_encoder_events_roundtrip_flags() {
        let mut n = Notification::EMPTY;
        n.record(Event::EncoderTick {
            channel: EncoderId::new(1),
            direction: Direction::CounterClockwise,
        });
        let events: heapless::Vec<Event, 4> = n.encoder_events().collect();
        assert_eq!(
            events.as_slice(),
            &[Event::EncoderTick {
                channel: EncoderId::new(1),
                direction: Direction::CounterClockwise
            }]
        );
    }

    #[test]
    fn test_post_empty_is_noop() {
        let mailbox = Mailbox::new();
        mailbox.post(Notification::EMPTY);
        assert_eq!(mailbox.try_take(), None);
    }

    #[test]
    fn test_undrained_posts_coalesce() {
        let mailbox = Mailbox::new();
        let mut first = Notification::EMPTY;
        first.mark(0, false);
        let mut second = Notification::EMPTY;
        second.mark(2, true);

        mailbox.post(first);
        mailbox.post(second);

        // One word, both batches OR-ed together
        let got = block_on(mailbox.wait());
        assert_eq!(got, first | second);
        assert_eq!(mailbox.try_take(), None);
    }

    #[test]
    fn test_coalescing_loses_intermediate_direction() {
        let mailbox = Mailbox::new();
        let mut cw = Notification::EMPTY;
        cw.mark(1, false);
        let mut ccw = Notification::EMPTY;
        ccw.mark(1, true);

        mailbox.post(cw);
        mailbox.post(ccw);

        // Two opposite ticks collapse into one counter-clockwise tick
        let events: heapless::Vec<Event, 4> = block_on(mailbox.wait()).encoder_events().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            Event::EncoderTick {
                channel: EncoderId::new(1),
                direction: Direction::CounterClockwise
            }
        );
    }

    #[test]
    fn test_bridge_batch_folds_words() {
        let mailbox = Mailbox::new();
        let mut bank = ButtonBank::new(true);
        bank.enable(ButtonId::new(0));
        bank.enable(ButtonId::new(3));
        let mut bridge = Bridge::new(bank, &mailbox);

        let n = bridge.on_batch([pack(0xFF, 0xFE), pack(0xFE, 0xF6)]);
        assert_eq!(mailbox.try_take(), Some(n));

        let events: heapless::Vec<Event, 4> = n.button_events().collect();
        assert_eq!(
            events.as_slice(),
            &[
                Event::ButtonEdge {
                    channel: ButtonId::new(0),
                    pressed: true
                },
                Event::ButtonEdge {
                    channel: ButtonId::new(3),
                    pressed: true
                },
            ]
        );
        assert!(bridge.decoder().channel(ButtonId::new(3)).is_pressed());
    }

    #[test]
    fn test_batch_keeps_latest_direction() {
        let mailbox = Mailbox::new();
        let mut bank = EncoderBank::new();
        bank.register(EncoderId::new(0), false, 1);
        let mut bridge = Bridge::new(bank, &mailbox);

        // Counter-clockwise quarter step, then back clockwise
        let n = bridge.on_batch([pack(0b00, 0b01), pack(0b01, 0b00)]);
        let events: heapless::Vec<Event, 4> = n.encoder_events().collect();
        assert_eq!(
            events.as_slice(),
            &[Event::EncoderTick {
                channel: EncoderId::new(0),
                direction: Direction::Clockwise
            }]
        );
    }

    #[test]
    fn test_mark_replaces_flag() {
        let mut n = Notification::EMPTY;
        n.mark(2, true);
        n.mark(2, false);
        let entries: heapless::Vec<(usize, bool), 4> = n.entries().collect();
        assert_eq!(entries.as_slice(), &[(2, false)]);
    }

    #[test]
    fn test_bridge_quiet_batch_posts_nothing() {
        let mailbox = Mailbox::new();
        let mut bank = EncoderBank::new();
        bank.register_default(EncoderId::new(0), false);
        let mut bridge = Bridge::new(bank, &mailbox);

        // A single quarter step never completes a detent
        assert!(bridge.on_batch([pack(0b11, 0b01)]).is_empty());
        assert_eq!(mailbox.try_take(), None);
    }
}
