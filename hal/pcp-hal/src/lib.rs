//! pcp Hardware Abstraction Layer
//!
//! This crate defines the hardware seams of the color picker. Chip-specific
//! crates implement them; `pcp-core` only ever talks to these traits, which
//! keeps the navigation and menu logic testable on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  pcp-core (decoding, navigation, menus) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  pcp-hal (this crate - traits)          │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ pcp-hal-      │       │ pcp-display   │
//! │ rp2040 (PIO)  │       │ (framebuffer) │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`input::SampleSource`] - Raw pin-sample batches from the capture hardware
//! - [`surface::Surface`] - Monochrome drawing surface for the screen
//! - [`leds::LedOutput`] - Addressable LED chain

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod input;
pub mod leds;
pub mod surface;

// Re-export key traits at crate root for convenience
pub use input::SampleSource;
pub use leds::LedOutput;
pub use surface::{Font, Offset, Point, Rect, Size, Surface};
