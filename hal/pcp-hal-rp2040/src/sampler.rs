//! PIO-based input sampler
//!
//! One state machine watches 8 consecutive input pins. Whenever their
//! levels change it pushes one word to the RX FIFO holding the previous
//! levels in bits 0..8 and the new levels in bits 8..16, the layout
//! described in `pcp_hal::input`.
//!
//! The previous-level register starts out as all ones, so the very first
//! sample is always reported.
//!
//! # Architecture
//!
//! The program is loaded once per PIO block and shared by the encoder and
//! button state machines. With the RX FIFO joined it can buffer 8 words
//! before sampling stalls, which is plenty at human input rates.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::gpio::Pull;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, LoadedProgram, Pin,
    ShiftConfig, ShiftDirection, StateMachine,
};
use pcp_hal::SampleSource;

use crate::clock_divider;

/// Number of pins one sampler watches
pub const SAMPLER_PINS: usize = 8;

/// State machine clock; the sampling loop is 4 instructions long
pub const SAMPLE_CLOCK_HZ: u32 = 4_000_000;

/// Sampler program, loaded once per PIO block
pub struct SamplerProgram<'d, PIO: Instance> {
    prg: LoadedProgram<'d, PIO>,
}

impl<'d, PIO: Instance> SamplerProgram<'d, PIO> {
    pub fn new(common: &mut Common<'d, PIO>) -> Self {
        let prg = pio::pio_asm!(
            "    mov y, ~null",     // Previous levels: all ones
            ".wrap_target",
            "sample:",
            "    mov osr, pins",
            "    out x, 8",         // Current levels
            "    jmp x!=y changed",
            "    jmp sample",
            "changed:",
            "    in x, 8",
            "    in y, 8",          // ISR = current << 8 | previous
            "    push block",
            "    mov y, x",
            ".wrap"
        );

        let prg = common.load_program(&prg.program);
        Self { prg }
    }
}

/// One bank of 8 sampled pins
pub struct InputSampler<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    _pins: [Pin<'d, PIO>; SAMPLER_PINS],
}

impl<'d, PIO: Instance, const SM: usize> InputSampler<'d, PIO, SM> {
    /// Start sampling `pins`, which must be consecutive GPIOs
    ///
    /// Pins get their pull-ups enabled, matching active-low buttons and
    /// common-ground encoders.
    pub fn new(
        program: &SamplerProgram<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        mut pins: [Pin<'d, PIO>; SAMPLER_PINS],
    ) -> Self {
        for pin in pins.iter_mut() {
            pin.set_pull(Pull::Up);
        }
        let refs = pins.each_ref();

        let mut cfg = Config::default();
        cfg.use_program(&program.prg, &[]);
        cfg.set_in_pins(&refs);
        cfg.shift_in = ShiftConfig {
            threshold: 32,
            direction: ShiftDirection::Left,
            auto_fill: false,
        };
        cfg.shift_out = ShiftConfig {
            threshold: 32,
            direction: ShiftDirection::Right,
            auto_fill: false,
        };
        cfg.fifo_join = FifoJoin::RxOnly;
        cfg.clock_divider = clock_divider(clk_sys_freq(), SAMPLE_CLOCK_HZ);

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::In, &refs);
        sm.set_enable(true);

        Self { sm, _pins: pins }
    }
}

impl<PIO: Instance, const SM: usize> SampleSource for InputSampler<'_, PIO, SM> {
    async fn next(&mut self) -> u32 {
        self.sm.rx().wait_pull().await
    }

    fn try_next(&mut self) -> Option<u32> {
        self.sm.rx().try_pull()
    }
}
