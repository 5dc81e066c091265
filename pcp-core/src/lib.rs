//! Board-agnostic core logic for the pico color picker
//!
//! This crate contains everything between the raw pin samples and the
//! screens, with no dependency on a specific chip:
//!
//! - Quadrature decoding and button edge detection
//! - The interrupt-to-task bridge (coalescing mailbox)
//! - Contexts, the navigation stack and the dispatch loops
//! - Menus with up to three cursors
//! - The device's screens and note palette
//! - Board description types and the `device.toml` reader

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod apps;
pub mod bridge;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod input;
pub mod leds;
pub mod menu;
pub mod nav;
pub mod render;

#[cfg(test)]
mod testing;
