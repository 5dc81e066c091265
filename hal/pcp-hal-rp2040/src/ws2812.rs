//! PIO-based WS2812 driver
//!
//! Each LED takes 24 bits in green, red, blue order, MSB first. A bit is
//! 10 PIO cycles at 8 MHz (1.25µs): high for 2 cycles, then high or low
//! for 5 depending on the bit, then low for 3. The chain latches after the
//! line has been low for more than 280µs.

use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pio::{
    Common, Config, Direction as PioDirection, FifoJoin, Instance, Pin, PioPin, ShiftConfig,
    ShiftDirection, StateMachine,
};
use embassy_rp::Peri;
use embassy_time::{Duration, Timer};
use pcp_hal::leds::unpack_rgb;
use pcp_hal::LedOutput;

use crate::clock_divider;

/// State machine clock (10 cycles per bit gives 800 kHz)
pub const BIT_CLOCK_HZ: u32 = 8_000_000;

/// Time on the wire per LED
pub const LED_TIME_US: u64 = 30;

/// Reset/latch time after the last bit
pub const LATCH_US: u64 = 300;

/// Pack a `0xRRGGBB` color into the word the program shifts out
pub const fn grb_word(color: u32) -> u32 {
    let (r, g, b) = unpack_rgb(color);
    ((g as u32) << 24) | ((r as u32) << 16) | ((b as u32) << 8)
}

/// Time until a frame of `leds` colors has been shifted out and latched
pub fn frame_time(leds: usize) -> Duration {
    Duration::from_micros(leds as u64 * LED_TIME_US + LATCH_US)
}

/// WS2812 chain on one pin
pub struct Ws2812<'d, PIO: Instance, const SM: usize> {
    sm: StateMachine<'d, PIO, SM>,
    _pin: Pin<'d, PIO>,
}

impl<'d, PIO: Instance, const SM: usize> Ws2812<'d, PIO, SM> {
    pub fn new<DATA: PioPin>(
        common: &mut Common<'d, PIO>,
        mut sm: StateMachine<'d, PIO, SM>,
        pin: Peri<'d, DATA>,
    ) -> Self {
        let prg = pio::pio_asm!(
            ".side_set 1",
            ".wrap_target",
            "bitloop:",
            "    out x, 1        side 0 [2]",
            "    jmp !x do_zero  side 1 [1]",
            "    jmp bitloop     side 1 [4]",
            "do_zero:",
            "    nop             side 0 [4]",
            ".wrap"
        );

        let installed = common.load_program(&prg.program);
        let data_pin = common.make_pio_pin(pin);

        let mut cfg = Config::default();
        cfg.use_program(&installed, &[&data_pin]);
        cfg.shift_out = ShiftConfig {
            threshold: 24,
            direction: ShiftDirection::Left,
            auto_fill: true,
        };
        cfg.fifo_join = FifoJoin::TxOnly;
        cfg.clock_divider = clock_divider(clk_sys_freq(), BIT_CLOCK_HZ);

        sm.set_config(&cfg);
        sm.set_pin_dirs(PioDirection::Out, &[&data_pin]);
        sm.set_enable(true);

        Self { sm, _pin: data_pin }
    }
}

impl<PIO: Instance, const SM: usize> LedOutput for Ws2812<'_, PIO, SM> {
    async fn write(&mut self, colors: &[u32]) {
        for &color in colors {
            self.sm.tx().wait_push(grb_word(color)).await;
        }
        Timer::after(frame_time(colors.len())).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grb_word() {
        assert_eq!(grb_word(0xFF0000), 0x00FF_0000);
        assert_eq!(grb_word(0x00FF00), 0xFF00_0000);
        assert_eq!(grb_word(0x0000FF), 0x0000_FF00);
        assert_eq!(grb_word(0x123456), 0x3412_5600);
    }

    #[test]
    fn test_frame_time() {
        assert_eq!(frame_time(0), Duration::from_micros(300));
        assert_eq!(frame_time(3), Duration::from_micros(390));
    }
}
