//! Screen output for the pico color picker
//!
//! This crate provides:
//! - [`Framebuffer`], a 128x64 page buffer that is both an
//!   `embedded-graphics` draw target and a [`pcp_hal::Surface`]
//! - [`Ssd1306`], an async I2C driver that pushes a framebuffer to the panel
//!
//! The render task draws into the framebuffer while holding its lock, then
//! flushes it to the panel in one pass.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod framebuffer;
pub mod ssd1306;

pub use framebuffer::{Framebuffer, HEIGHT, PAGES, WIDTH};
pub use ssd1306::Ssd1306;
