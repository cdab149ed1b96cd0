//! Host Signals
//!
//! The only inputs the engine consumes from the enclosing application:
//! a handful of state flags, a tone hint, and pointer/viewport geometry.
//! A [`HostSignal`] is produced by the host once per UI tick and is never
//! mutated by the engine.

use serde::{Deserialize, Serialize};

/// Absolute pointer position in screen coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pointer {
    /// Horizontal position
    pub x: f32,
    /// Vertical position (grows downward)
    pub y: f32,
}

impl Pointer {
    /// Create a pointer sample
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Size of the viewport the pointer moves in
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in the same units as [`Pointer`]
    pub width: f32,
    /// Height in the same units as [`Pointer`]
    pub height: f32,
}

impl Viewport {
    /// Create a viewport
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Centre of the viewport
    ///
    /// Non-finite or negative dimensions are treated as zero.
    #[must_use]
    pub fn center(&self) -> Pointer {
        Pointer::new(sanitize_extent(self.width) / 2.0, sanitize_extent(self.height) / 2.0)
    }

    /// Half-extents used as normalization denominators, never below 1
    #[must_use]
    pub fn half_extents(&self) -> (f32, f32) {
        (
            (sanitize_extent(self.width) / 2.0).max(1.0),
            (sanitize_extent(self.height) / 2.0).max(1.0),
        )
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

fn sanitize_extent(value: f32) -> f32 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Per-tick input from the host application
///
/// The flags are advisory and may overlap (e.g. typing while a response is
/// still streaming); [`crate::resolve`] combines them by precedence.
///
/// # Examples
///
/// ```
/// use visage_core::{HostSignal, Pointer};
///
/// let signal = HostSignal::default()
///     .typing(true)
///     .with_pointer(Pointer::new(120.0, 80.0));
/// assert!(signal.is_typing);
/// assert!(!signal.is_responding);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HostSignal {
    /// User has text in the input box
    pub is_typing: bool,
    /// Awaiting or streaming a response from the backend
    pub is_responding: bool,
    /// No user interaction for the idle timeout
    pub is_idle: bool,
    /// Free-text tone label of the last response (e.g. "calm")
    pub emotion_hint: Option<String>,
    /// A proactive alert is pending
    pub has_alert: bool,
    /// Latest pointer sample
    pub pointer: Pointer,
}

impl HostSignal {
    /// Set the typing flag
    #[must_use]
    pub fn typing(mut self, value: bool) -> Self {
        self.is_typing = value;
        self
    }

    /// Set the responding flag
    #[must_use]
    pub fn responding(mut self, value: bool) -> Self {
        self.is_responding = value;
        self
    }

    /// Set the idle flag
    #[must_use]
    pub fn idle(mut self, value: bool) -> Self {
        self.is_idle = value;
        self
    }

    /// Set the alert flag
    #[must_use]
    pub fn alert(mut self, value: bool) -> Self {
        self.has_alert = value;
        self
    }

    /// Set the tone hint
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.emotion_hint = Some(hint.into());
        self
    }

    /// Set the pointer sample
    #[must_use]
    pub fn with_pointer(mut self, pointer: Pointer) -> Self {
        self.pointer = pointer;
        self
    }
}
