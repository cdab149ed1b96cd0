//! Drawing surface for the particle field
//!
//! Surfaces implement [`Canvas`] over whatever they draw to (a terminal
//! buffer layer, an HTML canvas bridge, an image). [`GlyphCanvas`] is an
//! in-memory grid used for headless rendering and tests.

use crate::color::Color;

/// A surface the particle field can draw glyphs onto
///
/// Coordinates are in canvas units with the origin top-left and `y`
/// growing downward. Glyphs drawn outside the surface are dropped.
pub trait Canvas {
    /// Width and height in canvas units
    fn size(&self) -> (f32, f32);

    /// Erase everything drawn so far
    fn clear(&mut self);

    /// Draw one glyph with the given (possibly translucent) color
    fn draw_glyph(&mut self, x: f32, y: f32, glyph: &str, color: Color);
}

/// A glyph stamped onto a [`GlyphCanvas`]
#[derive(Clone, Debug, PartialEq)]
pub struct GlyphCell {
    /// The glyph text
    pub glyph: String,
    /// Color including opacity
    pub color: Color,
}

/// In-memory grid canvas, one cell per integer coordinate
#[derive(Clone, Debug)]
pub struct GlyphCanvas {
    width: u16,
    height: u16,
    /// Row-major cells
    cells: Vec<Option<GlyphCell>>,
    /// Glyphs that landed outside the grid since the last clear
    clipped: usize,
}

impl GlyphCanvas {
    /// Create an empty canvas
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![None; usize::from(width) * usize::from(height)],
            clipped: 0,
        }
    }

    /// Cell at a grid position
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&GlyphCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[self.index(x, y)].as_ref()
    }

    /// Number of cells currently holding a glyph
    #[must_use]
    pub fn drawn_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Glyphs dropped for landing off-grid since the last clear
    #[must_use]
    pub fn clipped_count(&self) -> usize {
        self.clipped
    }

    /// Render as text rows, blank cells as spaces
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| {
                        self.get(x, y)
                            .and_then(|c| c.glyph.chars().next())
                            .unwrap_or(' ')
                    })
                    .collect()
            })
            .collect()
    }

    fn index(&self, x: u16, y: u16) -> usize {
        usize::from(y) * usize::from(self.width) + usize::from(x)
    }
}

impl Canvas for GlyphCanvas {
    fn size(&self) -> (f32, f32) {
        (f32::from(self.width), f32::from(self.height))
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
        self.clipped = 0;
    }

    fn draw_glyph(&mut self, x: f32, y: f32, glyph: &str, color: Color) {
        let (cx, cy) = (x.floor(), y.floor());
        if !(cx >= 0.0 && cy >= 0.0 && cx < f32::from(self.width) && cy < f32::from(self.height)) {
            self.clipped += 1;
            return;
        }
        let idx = self.index(cx as u16, cy as u16);
        self.cells[idx] = Some(GlyphCell {
            glyph: glyph.to_string(),
            color,
        });
    }
}
