//! Frame driver for the terminal
//!
//! The terminal has no vsync callback; the app's frame tick plays that
//! role. Requests queue here and the app delivers them on the next tick.

use visage_core::{FrameDriver, FrameHandle};

/// Frame requests fired by the app's refresh tick
#[derive(Debug, Default)]
pub struct TickFrameDriver {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl TickFrameDriver {
    /// Create an idle driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every request due on this tick
    pub fn due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    /// Requests waiting for the next tick
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl FrameDriver for TickFrameDriver {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle::new(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        self.pending.retain(|h| *h != handle);
    }
}
