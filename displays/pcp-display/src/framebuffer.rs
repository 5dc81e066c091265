//! 128x64 monochrome framebuffer
//!
//! Pixels are stored the way SSD1306-class controllers expect them: eight
//! pages of 128 columns, one byte per column, bit 0 at the top of the page.
//! The buffer can be flushed to the panel page by page without reshuffling.
//!
//! Text goes through `embedded-graphics` with ISO 8859-1 fonts, so the
//! button glyphs `«` and `»` are available.

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTargetExt;
use embedded_graphics::geometry::{OriginDimensions, Point as GfxPoint, Size as GfxSize};
use embedded_graphics::mono_font::iso_8859_1::{FONT_10X20, FONT_5X8, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use embedded_graphics::{Drawable, Pixel};
use pcp_hal::{Font, Point, Rect, Size, Surface};

/// Panel width in pixels
pub const WIDTH: usize = 128;
/// Panel height in pixels
pub const HEIGHT: usize = 64;
/// Number of 8-pixel pages
pub const PAGES: usize = HEIGHT / 8;

/// Bitmap font backing each surface font
fn mono_font(font: Font) -> &'static MonoFont<'static> {
    match font {
        Font::Small => &FONT_5X8,
        Font::Medium => &FONT_6X10,
        Font::Large => &FONT_10X20,
    }
}

/// Page-organised frame buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    buffer: [[u8; WIDTH]; PAGES],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub const fn new() -> Self {
        Self {
            buffer: [[0; WIDTH]; PAGES],
        }
    }

    /// Raw page data, as sent to the panel
    pub fn pages(&self) -> &[[u8; WIDTH]; PAGES] {
        &self.buffer
    }

    /// Read one pixel; outside the panel reads as off
    pub fn pixel(&self, x: i32, y: i32) -> bool {
        if !in_bounds(x, y) {
            return false;
        }
        let (x, y) = (x as usize, y as usize);
        self.buffer[y / 8][x] & (1 << (y % 8)) != 0
    }

    /// Write one pixel; outside the panel is ignored
    pub fn set_pixel(&mut self, x: i32, y: i32, on: bool) {
        if !in_bounds(x, y) {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        let mask = 1 << (y % 8);
        if on {
            self.buffer[y / 8][x] |= mask;
        } else {
            self.buffer[y / 8][x] &= !mask;
        }
    }

    /// Number of lit pixels
    pub fn lit(&self) -> u32 {
        self.buffer
            .iter()
            .flatten()
            .map(|b| b.count_ones())
            .sum()
    }

    fn draw_text(&mut self, at: Point, font: Font, text: &str) {
        let style = MonoTextStyle::new(mono_font(font), BinaryColor::On);
        let text = Text::with_baseline(text, GfxPoint::new(at.x, at.y), style, Baseline::Top);
        let _ = text.draw(self);
    }

    fn draw_text_clipped(&mut self, at: Point, font: Font, text: &str, clip: Rect) {
        let area = Rectangle::new(
            GfxPoint::new(clip.origin.x, clip.origin.y),
            GfxSize::new(clip.size.width, clip.size.height),
        );
        let style = MonoTextStyle::new(mono_font(font), BinaryColor::On);
        let text = Text::with_baseline(text, GfxPoint::new(at.x, at.y), style, Baseline::Top);
        let _ = text.draw(&mut self.clipped(&area));
    }

    /// Apply `f` to every on-panel pixel of `rect`
    fn for_each_in(&mut self, rect: Rect, mut f: impl FnMut(&mut Self, i32, i32)) {
        let Some((x0, y0, x1, y1)) = clip(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                f(self, x, y);
            }
        }
    }
}

fn in_bounds(x: i32, y: i32) -> bool {
    (0..WIDTH as i32).contains(&x) && (0..HEIGHT as i32).contains(&y)
}

/// Clip a rectangle to the panel, as half-open pixel ranges
fn clip(rect: Rect) -> Option<(i32, i32, i32, i32)> {
    let x0 = rect.origin.x.max(0);
    let y0 = rect.origin.y.max(0);
    let x1 = (rect.origin.x + rect.size.width as i32).min(WIDTH as i32);
    let y1 = (rect.origin.y + rect.size.height as i32).min(HEIGHT as i32);
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> GfxSize {
        GfxSize::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl embedded_graphics::draw_target::DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            self.set_pixel(p.x, p.y, color.is_on());
        }
        Ok(())
    }
}

impl Surface for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }

    fn clear(&mut self) {
        for page in self.buffer.iter_mut() {
            page.fill(0);
        }
    }

    fn draw_string(&mut self, at: Point, font: Font, text: &str) {
        self.draw_text(at, font, text);
    }

    fn draw_char(&mut self, at: Point, font: Font, ch: char) {
        let mut buf = [0u8; 4];
        self.draw_text(at, font, ch.encode_utf8(&mut buf));
    }

    fn draw_string_clipped(&mut self, at: Point, font: Font, text: &str, clip: Rect) {
        self.draw_text_clipped(at, font, text, clip);
    }

    fn copy_region(&mut self, src: Rect, dst: Point) {
        // Read from a snapshot so overlapping copies come out right
        let snapshot = self.clone();
        let (dx, dy) = (dst.x - src.origin.x, dst.y - src.origin.y);
        self.for_each_in(src, |fb, x, y| {
            fb.set_pixel(x + dx, y + dy, snapshot.pixel(x, y));
        });
    }

    fn invert_region(&mut self, rect: Rect) {
        self.for_each_in(rect, |fb, x, y| {
            let on = fb.pixel(x, y);
            fb.set_pixel(x, y, !on);
        });
    }

    fn fill_region(&mut self, rect: Rect, on: bool) {
        self.for_each_in(rect, |fb, x, y| fb.set_pixel(x, y, on));
    }
}
