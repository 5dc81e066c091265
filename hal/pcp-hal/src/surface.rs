//! Monochrome drawing surface
//!
//! Coordinates are in pixels with the origin at the top-left corner.
//! Text is drawn with its top-left corner at the given point and only sets
//! pixels; highlighting is done by inverting a region afterwards.

/// A pixel position (may lie outside the surface; drawing clips)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this point by another
    pub const fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Check if a point lies inside the rectangle
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.origin.x
            && p.y >= self.origin.y
            && p.x < self.origin.x + self.size.width as i32
            && p.y < self.origin.y + self.size.height as i32
    }

    /// Same size, moved by `by`
    pub const fn translate(self, by: Point) -> Self {
        Self {
            origin: self.origin.offset(by),
            size: self.size,
        }
    }

    /// The overlap of two rectangles, if they share any pixel
    pub fn intersection(&self, other: Rect) -> Option<Rect> {
        let x0 = self.origin.x.max(other.origin.x);
        let y0 = self.origin.y.max(other.origin.y);
        let x1 = (self.origin.x + self.size.width as i32).min(other.origin.x + other.size.width as i32);
        let y1 = (self.origin.y + self.size.height as i32).min(other.origin.y + other.size.height as i32);
        (x0 < x1 && y0 < y1).then(|| Rect::new(x0, y0, (x1 - x0) as u32, (y1 - y0) as u32))
    }
}

/// Fonts available on every surface
///
/// Glyph cells are fixed width. Implementations map these to concrete
/// bitmap fonts with exactly these cell sizes so layout math done against
/// [`Font::glyph_size`] holds on every surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Font {
    /// 5x8, encoder labels
    Small,
    /// 6x10, menu rows and button glyphs
    Medium,
    /// 10x20, single large values
    Large,
}

impl Font {
    /// Size of one glyph cell
    pub const fn glyph_size(self) -> Size {
        match self {
            Font::Small => Size::new(5, 8),
            Font::Medium => Size::new(6, 10),
            Font::Large => Size::new(10, 20),
        }
    }

    /// Width in pixels of `text` set in this font
    pub fn text_width(self, text: &str) -> u32 {
        text.chars().count() as u32 * self.glyph_size().width
    }
}

/// Drawing surface
///
/// The render task is the only writer, and it holds the surface lock for
/// the whole clear-and-draw sequence.
pub trait Surface {
    /// Surface dimensions in pixels
    fn size(&self) -> Size;

    /// Clear every pixel
    fn clear(&mut self);

    /// Draw a string with its top-left corner at `at`
    fn draw_string(&mut self, at: Point, font: Font, text: &str);

    /// Draw a single character with its top-left corner at `at`
    fn draw_char(&mut self, at: Point, font: Font, ch: char);

    /// Draw a string, touching only pixels inside `clip`
    ///
    /// The default drops every glyph that is not wholly inside `clip`;
    /// surfaces that can clip per pixel override it.
    fn draw_string_clipped(&mut self, at: Point, font: Font, text: &str, clip: Rect) {
        let glyph = font.glyph_size();
        for (i, ch) in text.chars().enumerate() {
            let cell = Rect {
                origin: Point::new(at.x + (i as u32 * glyph.width) as i32, at.y),
                size: glyph,
            };
            if clip.intersection(cell) == Some(cell) {
                self.draw_char(cell.origin, font, ch);
            }
        }
    }

    /// Copy the pixels of `src` so that its top-left corner lands on `dst`
    fn copy_region(&mut self, src: Rect, dst: Point);

    /// Invert every pixel inside `rect` (selection highlighting)
    fn invert_region(&mut self, rect: Rect);

    /// Set or clear every pixel inside `rect`
    fn fill_region(&mut self, rect: Rect, on: bool);
}

/// A view of one area of a surface, with the origin at its top-left corner
///
/// Lets a render callback paint one pane or slot in local coordinates.
/// Nothing drawn through the view lands outside the area.
pub struct Offset<'a, S: Surface + ?Sized> {
    inner: &'a mut S,
    area: Rect,
}

impl<'a, S: Surface + ?Sized> Offset<'a, S> {
    pub fn new(inner: &'a mut S, area: Rect) -> Self {
        Self { inner, area }
    }

    /// The area of the underlying surface this view covers
    pub fn area(&self) -> Rect {
        self.area
    }
}

impl<S: Surface + ?Sized> Surface for Offset<'_, S> {
    fn size(&self) -> Size {
        self.area.size
    }

    /// Clears only the covered area
    fn clear(&mut self) {
        self.inner.fill_region(self.area, false);
    }

    fn draw_string(&mut self, at: Point, font: Font, text: &str) {
        self.inner
            .draw_string_clipped(at.offset(self.area.origin), font, text, self.area);
    }

    fn draw_char(&mut self, at: Point, font: Font, ch: char) {
        let mut buf = [0u8; 4];
        self.draw_string(at, font, ch.encode_utf8(&mut buf));
    }

    fn draw_string_clipped(&mut self, at: Point, font: Font, text: &str, clip: Rect) {
        if let Some(clip) = self.area.intersection(clip.translate(self.area.origin)) {
            self.inner
                .draw_string_clipped(at.offset(self.area.origin), font, text, clip);
        }
    }

    fn copy_region(&mut self, src: Rect, dst: Point) {
        let src = src.translate(self.area.origin);
        let dst = Rect {
            origin: dst.offset(self.area.origin),
            size: src.size,
        };
        if let Some(visible) = self.area.intersection(dst) {
            let skip = Point::new(visible.origin.x - dst.origin.x, visible.origin.y - dst.origin.y);
            let src = Rect {
                origin: src.origin.offset(skip),
                size: visible.size,
            };
            self.inner.copy_region(src, visible.origin);
        }
    }

    fn invert_region(&mut self, rect: Rect) {
        if let Some(rect) = self.area.intersection(rect.translate(self.area.origin)) {
            self.inner.invert_region(rect);
        }
    }

    fn fill_region(&mut self, rect: Rect, on: bool) {
        if let Some(rect) = self.area.intersection(rect.translate(self.area.origin)) {
            self.inner.fill_region(rect, on);
        }
    }
}
