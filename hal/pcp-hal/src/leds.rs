//! Addressable LED output

use core::future::Future;

/// Chain of addressable RGB LEDs
///
/// Colors are packed 24-bit `0xRRGGBB`. A write completes only after the
/// chain's latch/settle time has elapsed, so the next write can follow
/// immediately.
pub trait LedOutput {
    /// Drive the chain with one color per LED
    fn write(&mut self, colors: &[u32]) -> impl Future<Output = ()>;
}

/// Split a packed color into (red, green, blue)
#[inline]
pub const fn unpack_rgb(color: u32) -> (u8, u8, u8) {
    ((color >> 16) as u8, (color >> 8) as u8, color as u8)
}
