//! Input bridge tasks
//!
//! These run on the interrupt-priority executor. Each one owns a sampler
//! and the decoder state for its device class, and coalesces every burst
//! of sample words into one mailbox notification.

use defmt::*;
use embassy_rp::peripherals::PIO0;
use pcp_core::bridge::Bridge;
use pcp_core::input::{ButtonBank, EncoderBank};
use pcp_hal_rp2040::InputSampler;

/// Sampler on GPIO2..9
pub type EncoderSampler = InputSampler<'static, PIO0, 0>;

/// Sampler on GPIO10..17
pub type ButtonSampler = InputSampler<'static, PIO0, 1>;

/// Encoder bridge - decodes quadrature and posts tick notifications
#[embassy_executor::task]
pub async fn encoder_bridge_task(bridge: Bridge<'static, EncoderBank>, mut sampler: EncoderSampler) {
    info!("Encoder bridge task started");
    bridge.run(&mut sampler).await
}

/// Button bridge - detects edges and posts edge notifications
#[embassy_executor::task]
pub async fn button_bridge_task(bridge: Bridge<'static, ButtonBank>, mut sampler: ButtonSampler) {
    info!("Button bridge task started");
    bridge.run(&mut sampler).await
}
