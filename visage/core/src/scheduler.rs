//! Frame Scheduler
//!
//! Owns the lifecycle of the background animation loop. The host supplies a
//! [`FrameDriver`] (display refresh, a terminal tick, a manual test clock);
//! the scheduler keeps at most one frame request outstanding and re-arms
//! after every step.
//!
//! # States
//!
//! ```text
//!            sync(true) / start()
//!   Stopped ─────────────────────────▶ Running
//!      ▲                                  │
//!      └──────────────────────────────────┘
//!        sync(false) / stop() / teardown / drop
//! ```
//!
//! Every path out of `Running` cancels the pending request. A callback the
//! driver delivers anyway (already queued, or stale) is ignored, so no step
//! runs after a stop.

/// Identifies one frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(u64);

impl FrameHandle {
    /// Wrap a driver-specific request id
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw request id
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Source of "next frame" callbacks
///
/// Implementations deliver a requested handle back to
/// [`FrameScheduler::run_frame`] on the next refresh. Cancelling a handle
/// should stop delivery, but the scheduler tolerates late deliveries.
pub trait FrameDriver {
    /// Ask for one callback on the next refresh
    fn request_frame(&mut self) -> FrameHandle;

    /// Withdraw a request made with [`FrameDriver::request_frame`]
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Loop state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// No frames are requested
    #[default]
    Stopped,
    /// One frame is always pending
    Running,
}

/// Edge reported by [`FrameScheduler::sync`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerTransition {
    /// `Stopped -> Running`
    Started,
    /// `Running -> Stopped`
    Stopped,
}

/// Drives a per-frame step through a [`FrameDriver`]
#[derive(Debug)]
pub struct FrameScheduler<D: FrameDriver> {
    driver: D,
    state: SchedulerState,
    /// The single outstanding request while running
    pending: Option<FrameHandle>,
    /// Steps executed since creation
    steps: u64,
}

impl<D: FrameDriver> FrameScheduler<D> {
    /// Create a stopped scheduler
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            state: SchedulerState::Stopped,
            pending: None,
            steps: 0,
        }
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Whether the loop is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == SchedulerState::Running
    }

    /// The outstanding request, if any
    #[must_use]
    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }

    /// Steps executed so far
    #[must_use]
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Start the loop; a no-op when already running
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        self.state = SchedulerState::Running;
        let handle = self.driver.request_frame();
        self.pending = Some(handle);
        tracing::debug!(frame = handle.id(), "Frame scheduler started");
        true
    }

    /// Stop the loop and cancel the pending request; a no-op when stopped
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state = SchedulerState::Stopped;
        if let Some(handle) = self.pending.take() {
            self.driver.cancel_frame(handle);
        }
        tracing::debug!(steps = self.steps, "Frame scheduler stopped");
        true
    }

    /// Bring the loop in line with whether it should be active
    ///
    /// Returns the transition taken, if any.
    pub fn sync(&mut self, active: bool) -> Option<SchedulerTransition> {
        match (active, self.state) {
            (true, SchedulerState::Stopped) => {
                self.start();
                Some(SchedulerTransition::Started)
            }
            (false, SchedulerState::Running) => {
                self.stop();
                Some(SchedulerTransition::Stopped)
            }
            (true, SchedulerState::Running) | (false, SchedulerState::Stopped) => None,
        }
    }

    /// Handle a driver callback
    ///
    /// Runs `step` and re-arms only if `handle` is the pending request of a
    /// running loop. Returns whether the step ran.
    pub fn run_frame<F: FnOnce()>(&mut self, handle: FrameHandle, step: F) -> bool {
        if !self.is_running() || self.pending != Some(handle) {
            tracing::trace!(frame = handle.id(), state = ?self.state, "Ignoring stale frame callback");
            return false;
        }

        self.pending = None;
        step();
        self.steps += 1;

        // The step may not stop us, but keep the check honest
        if self.is_running() {
            self.pending = Some(self.driver.request_frame());
        }
        true
    }

    /// Stop the loop; used on surface teardown
    pub fn teardown(&mut self) {
        self.stop();
    }

    /// Borrow the driver
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mutably borrow the driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

impl<D: FrameDriver> Drop for FrameScheduler<D> {
    fn drop(&mut self) {
        self.stop();
    }
}
