//! Dispatch tasks
//!
//! One per input class, so a slow encoder handler never delays a button
//! press and the other way round.

use defmt::*;
use pcp_core::dispatch::{button_dispatch, encoder_dispatch};

use crate::channels::{BUS, BUTTON_MAILBOX, ENCODER_MAILBOX, NAV};

#[embassy_executor::task]
pub async fn encoder_dispatch_task() {
    info!("Encoder dispatch task started");
    encoder_dispatch(&ENCODER_MAILBOX, &NAV, &BUS).await
}

#[embassy_executor::task]
pub async fn button_dispatch_task() {
    info!("Button dispatch task started");
    button_dispatch(&BUTTON_MAILBOX, &NAV, &BUS).await
}
