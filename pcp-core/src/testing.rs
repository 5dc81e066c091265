//! Host-side test doubles

use alloc::string::String;
use alloc::vec::Vec;

use pcp_hal::{Font, Point, Rect, Size, Surface};

/// One text draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drawn {
    pub at: Point,
    pub font: Font,
    pub text: String,
}

/// Surface that records draw calls instead of setting pixels
#[derive(Debug)]
pub struct RecordingSurface {
    pub size: Size,
    pub drawn: Vec<Drawn>,
    pub inverted: Vec<Rect>,
    pub clears: usize,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Size::new(width, height),
            drawn: Vec::new(),
            inverted: Vec::new(),
            clears: 0,
        }
    }

    /// Texts in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.drawn.iter().map(|d| d.text.as_str()).collect()
    }

    /// Whether a draw of `text` starts inside an inverted region
    pub fn is_highlighted(&self, text: &str) -> bool {
        self.drawn
            .iter()
            .filter(|d| d.text == text)
            .any(|d| self.inverted.iter().any(|r| r.contains(d.at)))
    }

    pub fn find(&self, text: &str) -> Option<&Drawn> {
        self.drawn.iter().find(|d| d.text == text)
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.drawn.clear();
        self.inverted.clear();
        self.clears += 1;
    }

    fn draw_string(&mut self, at: Point, font: Font, text: &str) {
        self.drawn.push(Drawn {
            at,
            font,
            text: String::from(text),
        });
    }

    fn draw_char(&mut self, at: Point, font: Font, ch: char) {
        let mut text = String::new();
        text.push(ch);
        self.drawn.push(Drawn { at, font, text });
    }

    /// Records the whole string; clipping is the real surfaces' business
    fn draw_string_clipped(&mut self, at: Point, font: Font, text: &str, _clip: Rect) {
        self.draw_string(at, font, text);
    }

    fn copy_region(&mut self, _src: Rect, _dst: Point) {}

    fn invert_region(&mut self, rect: Rect) {
        self.inverted.push(rect);
    }

    fn fill_region(&mut self, _rect: Rect, _on: bool) {}
}
