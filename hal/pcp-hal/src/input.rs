//! Raw input sampling
//!
//! The capture hardware watches a bank of up to 8 consecutive pins and
//! emits one word every time any of them changes level:
//!
//! ```text
//!  31            16 15           8 7            0
//! ┌────────────────┬──────────────┬──────────────┐
//! │     unused     │ current pins │  prior pins  │
//! └────────────────┴──────────────┴──────────────┘
//! ```
//!
//! One word can carry transitions on several pins at once. Words for one
//! device class (encoders or buttons) always come from the same source.

use core::future::Future;

/// Bit offset of the current pin levels within a sample word
pub const CURRENT_SHIFT: u32 = 8;

/// Mask for one 8-pin bank
pub const BANK_MASK: u32 = 0xFF;

/// Source of raw sample words
pub trait SampleSource {
    /// Wait until the next sample word is available and take it
    fn next(&mut self) -> impl Future<Output = u32>;

    /// Take a pending sample word without waiting
    fn try_next(&mut self) -> Option<u32>;
}

/// Extract the prior pin levels of a sample word
#[inline]
pub const fn prior_levels(word: u32) -> u8 {
    (word & BANK_MASK) as u8
}

/// Extract the current pin levels of a sample word
#[inline]
pub const fn current_levels(word: u32) -> u8 {
    ((word >> CURRENT_SHIFT) & BANK_MASK) as u8
}

/// Pack prior and current pin levels into a sample word
#[inline]
pub const fn pack(prior: u8, current: u8) -> u32 {
    (prior as u32) | ((current as u32) << CURRENT_SHIFT)
}
