//! Quadrature decoding for rotary encoders
//!
//! Each encoder occupies two adjacent pins of the sample word: pin `2i` is
//! A and pin `2i+1` is B. A 2-bit state is `B << 1 | A`, so one clockwise
//! detent walks the Gray sequence:
//!
//! ```text
//!   00 ──▶ 10 ──▶ 11 ──▶ 01 ──▶ 00      (+1 per step)
//! ```
//!
//! Every valid step moves the channel's sub-count by one. A tick fires when
//! the sub-count reaches the divisor in either direction, so contact bounce
//! that does not add up to a full detent is absorbed. Same-state samples and
//! double-bit flips are noise and leave the channel untouched.

use pcp_hal::input::{current_levels, prior_levels};

use super::{Direction, EncoderId, Event};
use crate::config::{DEFAULT_DIVISOR, ENCODER_SLOTS};

/// Step for each `prior << 2 | new` state pair
pub const TRANSITIONS: [i8; 16] = [
    0, -1, 1, 0, //
    1, 0, 0, -1, //
    -1, 0, 0, 1, //
    0, 1, -1, 0, //
];

/// Swap the A and B bits of a 2-bit state
#[inline]
const fn swap_pins(state: u8) -> u8 {
    ((state & 1) << 1) | ((state & 2) >> 1)
}

/// Decoder state for one encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncoderChannel {
    id: EncoderId,
    /// A and B are wired the other way round
    inverted: bool,
    /// Last seen pin state, as wired
    prior: u8,
    sub_count: i8,
    divisor: i8,
}

impl EncoderChannel {
    /// Create a channel at rest with both pins high (pull-ups)
    pub const fn new(id: EncoderId, inverted: bool, divisor: i8) -> Self {
        assert!(divisor > 0, "encoder divisor must be positive");
        Self {
            id,
            inverted,
            prior: 0b11,
            sub_count: 0,
            divisor,
        }
    }

    pub const fn id(&self) -> EncoderId {
        self.id
    }

    pub const fn sub_count(&self) -> i8 {
        self.sub_count
    }

    /// Process one transition from `prior` to `new` (2-bit states as wired)
    pub fn transition(&mut self, prior: u8, new: u8) -> Option<Direction> {
        let (prior, new) = (prior & 0b11, new & 0b11);
        self.prior = new;

        if prior == new {
            return None;
        }

        let (prior, new) = if self.inverted {
            (swap_pins(prior), swap_pins(new))
        } else {
            (prior, new)
        };

        let step = TRANSITIONS[((prior << 2) | new) as usize];
        if step == 0 {
            return None;
        }

        self.sub_count += step;
        if self.sub_count >= self.divisor {
            self.sub_count = 0;
            Some(Direction::Clockwise)
        } else if self.sub_count <= -self.divisor {
            self.sub_count = 0;
            Some(Direction::CounterClockwise)
        } else {
            None
        }
    }

    /// Process a new 2-bit state against the last one seen
    pub fn feed(&mut self, new: u8) -> Option<Direction> {
        self.transition(self.prior, new)
    }

    /// Process this channel's pins in a sample word
    pub fn sample(&mut self, word: u32) -> Option<Direction> {
        let shift = self.id.index() * 2;
        let prior = prior_levels(word) >> shift;
        let new = current_levels(word) >> shift;
        self.transition(prior, new)
    }
}

/// All encoder channels of one sample word
#[derive(Debug, Clone, Default)]
pub struct EncoderBank {
    channels: [Option<EncoderChannel>; ENCODER_SLOTS],
}

impl EncoderBank {
    pub const fn new() -> Self {
        Self {
            channels: [None; ENCODER_SLOTS],
        }
    }

    /// Enable decoding for an encoder slot
    pub fn register(&mut self, id: EncoderId, inverted: bool, divisor: i8) {
        self.channels[id.index()] = Some(EncoderChannel::new(id, inverted, divisor));
    }

    /// Enable a slot with the default divisor
    pub fn register_default(&mut self, id: EncoderId, inverted: bool) {
        self.register(id, inverted, DEFAULT_DIVISOR);
    }

    pub fn channel(&self, id: EncoderId) -> Option<&EncoderChannel> {
        self.channels[id.index()].as_ref()
    }

    /// Decode one sample word, reporting ticks in ascending slot order
    pub fn decode(&mut self, word: u32, mut emit: impl FnMut(Event)) {
        for channel in self.channels.iter_mut().flatten() {
            if let Some(direction) = channel.sample(word) {
                emit(Event::EncoderTick {
                    channel: channel.id,
                    direction,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcp_hal::input::pack;
    use proptest::prelude::*;

    const CW: [u8; 4] = [0b10, 0b11, 0b01, 0b00];
    const CCW: [u8; 4] = [0b01, 0b11, 0b10, 0b00];

    fn channel() -> EncoderChannel {
        let mut ch = EncoderChannel::new(EncoderId::new(0), false, 4);
        ch.prior = 0b00;
        ch
    }

    fn run(ch: &mut EncoderChannel, states: &[u8]) -> heapless::Vec<Direction, 64> {
        let mut out = heapless::Vec::new();
        for &s in states {
            if let Some(d) = ch.feed(s) {
                out.push(d).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_table_values() {
        for (index, step) in TRANSITIONS.iter().enumerate() {
            assert!([-1, 0, 1].contains(step), "entry {} = {}", index, step);
        }
        // Same state and double flips are noise
        for s in 0..4u8 {
            assert_eq!(TRANSITIONS[((s << 2) | s) as usize], 0);
            assert_eq!(TRANSITIONS[((s << 2) | (s ^ 0b11)) as usize], 0);
        }
    }

    #[test]
    fn test_full_cycle_cw() {
        let mut ch = channel();
        assert_eq!(run(&mut ch, &CW).as_slice(), &[Direction::Clockwise]);
        assert_eq!(ch.sub_count(), 0);
    }

    #[test]
    fn test_full_cycle_ccw() {
        let mut ch = channel();
        assert_eq!(run(&mut ch, &CCW).as_slice(), &[Direction::CounterClockwise]);
    }

    #[test]
    fn test_three_quarters_no_tick() {
        let mut ch = channel();
        assert!(run(&mut ch, &CW[..3]).is_empty());
        assert_eq!(ch.sub_count(), 3);
    }

    #[test]
    fn test_double_flip_is_noise() {
        let mut ch = channel();
        run(&mut ch, &CW[..1]);
        let before = ch.sub_count();
        // 10 -> 01 flips both pins
        assert_eq!(ch.transition(0b10, 0b01), None);
        assert_eq!(ch.sub_count(), before);
    }

    #[test]
    fn test_inverted_reverses_direction() {
        let mut ch = EncoderChannel::new(EncoderId::new(0), true, 4);
        ch.prior = 0b00;
        assert_eq!(run(&mut ch, &CW).as_slice(), &[Direction::CounterClockwise]);
    }

    #[test]
    fn test_bounce_absorbed() {
        let mut ch = channel();
        // Forward, bounce back, then complete the detent
        let states = [0b10, 0b00, 0b10, 0b11, 0b01, 0b00];
        assert_eq!(run(&mut ch, &states).as_slice(), &[Direction::Clockwise]);
    }

    #[test]
    fn test_sample_word_uses_slot_pins() {
        let mut ch = EncoderChannel::new(EncoderId::new(2), false, 1);
        // Slot 2 lives on pins 4 and 5; 00 -> 10 is one clockwise step
        let word = pack(0b0000_0000, 0b0010_0000);
        assert_eq!(ch.sample(word), Some(Direction::Clockwise));
        // Activity on other pins is ignored
        let word = pack(0b0000_0011, 0b0000_0001);
        assert_eq!(ch.sample(word), None);
    }

    #[test]
    fn test_bank_ascending_order() {
        let mut bank = EncoderBank::new();
        bank.register(EncoderId::new(2), false, 1);
        bank.register(EncoderId::new(0), false, 1);

        // Slot 0 turns clockwise (00 -> 10), slot 2 counter-clockwise (00 -> 01)
        let word = pack(0b0000_0000, 0b0001_0010);
        let mut events = heapless::Vec::<Event, 4>::new();
        bank.decode(word, |e| events.push(e).unwrap());

        assert_eq!(
            events.as_slice(),
            &[
                Event::EncoderTick {
                    channel: EncoderId::new(0),
                    direction: Direction::Clockwise
                },
                Event::EncoderTick {
                    channel: EncoderId::new(2),
                    direction: Direction::CounterClockwise
                },
            ]
        );
    }

    #[test]
    fn test_unregistered_slots_ignored() {
        let mut bank = EncoderBank::new();
        bank.register(EncoderId::new(1), false, 1);
        let mut count = 0;
        bank.decode(pack(0, 0b0000_0010), |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_multiple_ticks_in_order() {
        let mut ch = channel();
        let mut states = heapless::Vec::<u8, 16>::new();
        states.extend_from_slice(&CW).unwrap();
        states.extend_from_slice(&CCW).unwrap();
        states.extend_from_slice(&CW).unwrap();
        assert_eq!(
            run(&mut ch, &states).as_slice(),
            &[
                Direction::Clockwise,
                Direction::CounterClockwise,
                Direction::Clockwise
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_no_motion_no_ticks(state in 0u8..4, repeats in 1usize..64) {
            let mut ch = channel();
            ch.prior = state;
            for _ in 0..repeats {
                prop_assert_eq!(ch.feed(state), None);
            }
            prop_assert_eq!(ch.sub_count(), 0);
        }

        #[test]
        fn prop_cycles_give_one_tick_each(cycles in 1usize..16, cw in any::<bool>()) {
            let mut ch = channel();
            let seq = if cw { CW } else { CCW };
            let mut ticks = 0;
            for _ in 0..cycles {
                for &s in &seq {
                    if let Some(d) = ch.feed(s) {
                        prop_assert_eq!(d == Direction::Clockwise, cw);
                        ticks += 1;
                    }
                }
            }
            prop_assert_eq!(ticks, cycles);
        }

        #[test]
        fn prop_noise_never_moves(prior in 0u8..4, start in 0usize..3) {
            let mut ch = channel();
            for &s in &CW[..start] {
                ch.feed(s);
            }
            let before = ch.sub_count();
            prop_assert_eq!(ch.transition(prior, prior ^ 0b11), None);
            prop_assert_eq!(ch.sub_count(), before);
        }
    }
}
