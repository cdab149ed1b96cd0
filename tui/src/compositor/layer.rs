//! Layer - A single compositable layer

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use super::LayerId;

/// A single layer in the compositor
pub struct Layer {
    /// Unique identifier
    pub id: LayerId,
    /// Z-order (higher = in front)
    pub z_index: i32,
    /// Screen position and size
    pub bounds: Rect,
    /// Whether the layer is composited
    pub visible: bool,
    /// The layer's render buffer, in layer-local coordinates
    pub buffer: Buffer,
}

impl Layer {
    /// Create an empty layer
    pub fn new(id: LayerId, bounds: Rect, z_index: i32) -> Self {
        Self {
            id,
            z_index,
            bounds,
            visible: true,
            buffer: Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height)),
        }
    }

    /// Move and resize, discarding the old contents
    pub fn place(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.buffer = Buffer::empty(Rect::new(0, 0, bounds.width, bounds.height));
    }
}
