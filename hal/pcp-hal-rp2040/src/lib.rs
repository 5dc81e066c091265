//! RP2040-specific HAL for the color picker firmware
//!
//! This crate provides RP2040 implementations of the shared `pcp-hal`
//! traits, both built on the Programmable I/O blocks:
//!
//! - [`sampler::InputSampler`] - Watches 8 consecutive pins and reports
//!   every level change (implements `pcp_hal::SampleSource`)
//! - [`ws2812::Ws2812`] - Drives a WS2812 LED chain (implements
//!   `pcp_hal::LedOutput`)

#![no_std]

pub mod sampler;
pub mod ws2812;

use fixed::types::U24F8;

pub use sampler::{InputSampler, SamplerProgram};
pub use ws2812::Ws2812;

/// PIO clock divider that runs a state machine at `target_hz`
///
/// Clamped to the largest divider the hardware supports.
pub fn clock_divider(sys_clk_hz: u32, target_hz: u32) -> U24F8 {
    if target_hz == 0 {
        return U24F8::from_bits(0xFFFF_FF00);
    }
    let divider_x256 = (sys_clk_hz as u64 * 256) / target_hz as u64;
    U24F8::from_bits(divider_x256.clamp(256, 0xFFFF_FF00) as u32)
}
