//! Test helpers
//!
//! [`ManualFrameDriver`] stands in for a display refresh: requested frames
//! queue up until a test (or a tick-based host) drains them with
//! [`ManualFrameDriver::take_due`]. Clones share state, so a test can keep
//! one handle while the scheduler owns another.

use std::cell::RefCell;
use std::rc::Rc;

use crate::scheduler::{FrameDriver, FrameHandle};

#[derive(Debug, Default)]
struct DriverLog {
    next_id: u64,
    requested: Vec<FrameHandle>,
    cancelled: Vec<FrameHandle>,
    outstanding: Vec<FrameHandle>,
}

/// A frame driver advanced by hand
#[derive(Clone, Debug, Default)]
pub struct ManualFrameDriver {
    log: Rc<RefCell<DriverLog>>,
}

impl ManualFrameDriver {
    /// Create a driver with no requests
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the frames that would fire on this refresh
    #[must_use]
    pub fn take_due(&self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.log.borrow_mut().outstanding)
    }

    /// Every handle ever requested, in order
    #[must_use]
    pub fn requested(&self) -> Vec<FrameHandle> {
        self.log.borrow().requested.clone()
    }

    /// Every handle cancelled, in order
    #[must_use]
    pub fn cancelled(&self) -> Vec<FrameHandle> {
        self.log.borrow().cancelled.clone()
    }

    /// Total requests made
    #[must_use]
    pub fn requested_count(&self) -> usize {
        self.log.borrow().requested.len()
    }

    /// Requests not yet delivered or cancelled
    #[must_use]
    pub fn outstanding_count(&self) -> usize {
        self.log.borrow().outstanding.len()
    }
}

impl FrameDriver for ManualFrameDriver {
    fn request_frame(&mut self) -> FrameHandle {
        let mut log = self.log.borrow_mut();
        log.next_id += 1;
        let handle = FrameHandle::new(log.next_id);
        log.requested.push(handle);
        log.outstanding.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        let mut log = self.log.borrow_mut();
        log.outstanding.retain(|h| *h != handle);
        log.cancelled.push(handle);
    }
}
