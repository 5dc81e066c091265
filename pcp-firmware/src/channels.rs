//! Inter-task communication channels
//!
//! Defines the statics shared between the interrupt-priority bridges and
//! the thread-mode tasks. Uses embassy-sync primitives for safe async
//! communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use pcp_core::apps::Palette;
use pcp_core::bridge::Mailbox;
use pcp_core::nav::{Bus, Navigator, SharedNavigator};
use pcp_display::Framebuffer;

/// Encoder notifications from the encoder bridge
pub static ENCODER_MAILBOX: Mailbox = Mailbox::new();

/// Button notifications from the button bridge
pub static BUTTON_MAILBOX: Mailbox = Mailbox::new();

/// Republished contexts, redraw and LED requests, held buttons
pub static BUS: Bus = Bus::new();

/// Context arena and navigation stack
pub static NAV: SharedNavigator = Mutex::new(Navigator::new());

/// Frame the render task draws into before flushing
pub static SURFACE: Mutex<CriticalSectionRawMutex, Framebuffer> = Mutex::new(Framebuffer::new());

/// Note colors, edited in place by the RGB editor
pub static PALETTE: Palette = Palette::new();
