//! Render task
//!
//! Redraws the whole screen whenever the navigation core asks for it and
//! pushes the frame to the OLED.

use defmt::*;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::Timer;
use pcp_core::render::Layout;
use pcp_display::Ssd1306;

use crate::channels::{BUS, NAV, SURFACE};

/// The panel ignores commands for a while after power-up
const WARM_UP_MS: u64 = 400;

pub type Display = Ssd1306<I2c<'static, I2C0, Async>>;

#[embassy_executor::task]
pub async fn render_task(mut display: Display, layout: Layout) {
    info!("Render task started");

    Timer::after_millis(WARM_UP_MS).await;
    if let Err(e) = display.init().await {
        error!("Display init failed: {:?}", e);
    }

    loop {
        BUS.render.wait().await;

        let mut frame = SURFACE.lock().await;
        {
            let mut nav = NAV.lock().await;
            layout.render(&mut nav, &mut *frame);
        }

        if let Err(e) = display.flush(&frame).await {
            warn!("Display flush failed: {:?}", e);
        } else {
            trace!("Frame flushed");
        }
    }
}
