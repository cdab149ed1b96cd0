//! Particle canvas over a terminal buffer
//!
//! One canvas unit is one terminal cell. Glyph opacity is flattened onto
//! the void color since cells cannot blend.

use ratatui::buffer::Buffer;
use ratatui::style::Style;

use visage_core::particles::Canvas;
use visage_core::Color;

use crate::theme;

/// A [`Canvas`] writing into a compositor layer's buffer
pub struct BufferCanvas<'a> {
    buffer: &'a mut Buffer,
}

impl<'a> BufferCanvas<'a> {
    /// Wrap a layer buffer
    pub fn new(buffer: &'a mut Buffer) -> Self {
        Self { buffer }
    }
}

impl Canvas for BufferCanvas<'_> {
    fn size(&self) -> (f32, f32) {
        (f32::from(self.buffer.area.width), f32::from(self.buffer.area.height))
    }

    fn clear(&mut self) {
        self.buffer.reset();
    }

    fn draw_glyph(&mut self, x: f32, y: f32, glyph: &str, color: Color) {
        let (cx, cy) = (x.floor(), y.floor());
        let area = self.buffer.area;
        if !(cx >= 0.0 && cy >= 0.0 && cx < f32::from(area.width) && cy < f32::from(area.height)) {
            return;
        }
        // Bounds checked above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (col, row) = (area.x + cx as u16, area.y + cy as u16);
        self.buffer
            .set_string(col, row, glyph, Style::default().fg(theme::to_terminal(color)));
    }
}
