//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.
//! The bridges run at interrupt priority, everything else in thread mode.

pub mod bridge;
pub mod dispatch;
pub mod leds;
pub mod render;

pub use bridge::{button_bridge_task, encoder_bridge_task, ButtonSampler, EncoderSampler};
pub use dispatch::{button_dispatch_task, encoder_dispatch_task};
pub use leds::{led_task, LedChain};
pub use render::{render_task, Display};
