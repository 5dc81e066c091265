//! LED task
//!
//! Shows the colors the current context points at. New references replace
//! the old ones; a refresh re-reads the same cells so in-place edits show.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::peripherals::PIO1;
use pcp_core::leds::LedRefs;
use pcp_hal::LedOutput;
use pcp_hal_rp2040::Ws2812;

use crate::channels::BUS;

pub type LedChain = Ws2812<'static, PIO1, 0>;

#[embassy_executor::task]
pub async fn led_task(mut chain: LedChain) {
    info!("LED task started");

    let mut refs = LedRefs::dark();
    chain.write(&refs.colors()).await;

    loop {
        match select(BUS.leds.wait(), BUS.led_refresh.wait()).await {
            Either::First(new) => refs = new,
            Either::Second(()) => {}
        }

        let colors = refs.colors();
        trace!("LEDs {:?}", refs);
        chain.write(&colors).await;
    }
}
