//! Parallax Engine
//!
//! Converts absolute pointer coordinates into a normalized gaze vector and
//! derives per-layer offsets and a 3-D head tilt from it.
//!
//! # Normalization
//!
//! `dx = (pointer.x - w/2) / (w/2)`, `dy` likewise. There is no explicit
//! clamp: at the viewport edges values may slightly exceed ±1 and consumers
//! must tolerate that. Zero or non-finite viewport extents fall back to a
//! denominator of 1.
//!
//! # Background drift
//!
//! In [`ExpressiveMode::Background`] the pointer is ignored and replaced by a
//! slow sine drift of elapsed time so the face looks around on its own. The
//! [`ParallaxBlender`] eases between the two sources so the hand-off never
//! jumps.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::mode::ExpressiveMode;
use crate::signal::{Pointer, Viewport};

/// Degrees of tilt per unit of normalized offset
pub const TILT_DEGREES: f32 = 10.0;

/// Default hand-off duration between pointer and drift
pub const DEFAULT_BLEND_DURATION: Duration = Duration::from_millis(250);

/// 3-D head tilt in degrees
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Tilt {
    /// Rotation around the horizontal axis (`-dy * 10`)
    pub rotate_x: f32,
    /// Rotation around the vertical axis (`dx * 10`)
    pub rotate_y: f32,
}

/// A 2-D displacement in surface units
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Offset {
    /// Horizontal displacement
    pub x: f32,
    /// Vertical displacement
    pub y: f32,
}

impl Offset {
    /// Create an offset
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Scale both components
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Normalized gaze direction plus the tilt derived from it
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParallaxVector {
    /// Horizontal direction, roughly `-1.0..=1.0`
    pub x: f32,
    /// Vertical direction, roughly `-1.0..=1.0`
    pub y: f32,
    /// Head tilt derived from `x`/`y`
    pub tilt: Tilt,
}

impl ParallaxVector {
    /// Build a vector, deriving the tilt
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            tilt: Tilt {
                rotate_x: -y * TILT_DEGREES,
                rotate_y: x * TILT_DEGREES,
            },
        }
    }

    /// The centred (straight ahead) vector
    #[must_use]
    pub fn center() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Linear interpolation toward `other` (`t` clamped to `0.0..=1.0`)
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// Offsets for each depth layer
    #[must_use]
    pub fn layers(&self, scales: &LayerScales) -> LayerOffsets {
        let unit = Offset::new(self.x, self.y);
        LayerOffsets {
            head: unit.scaled(scales.head),
            eyes: unit.scaled(scales.eyes),
            pupils: unit.scaled(scales.pupils),
        }
    }
}

/// Per-layer multipliers; deeper layers move further (head < eyes < pupils)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerScales {
    /// Whole-head translation
    pub head: f32,
    /// Eye-socket translation
    pub eyes: f32,
    /// Pupil translation
    pub pupils: f32,
}

impl LayerScales {
    /// Whether the scales respect the depth ordering
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.head < self.eyes && self.eyes < self.pupils
    }
}

impl Default for LayerScales {
    fn default() -> Self {
        Self {
            head: 2.0,
            eyes: 4.0,
            pupils: 6.0,
        }
    }
}

/// Offsets of each layer for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerOffsets {
    /// Whole-head translation
    pub head: Offset,
    /// Eye-socket translation
    pub eyes: Offset,
    /// Pupil translation
    pub pupils: Offset,
}

/// Shape of the autonomous "looking around" motion
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriftParams {
    /// Horizontal angular frequency (rad/s)
    pub x_frequency: f32,
    /// Vertical angular frequency (rad/s)
    pub y_frequency: f32,
    /// Horizontal amplitude (normalized units)
    pub x_amplitude: f32,
    /// Vertical amplitude (normalized units)
    pub y_amplitude: f32,
}

impl DriftParams {
    /// Drift position at `elapsed`
    #[must_use]
    pub fn sample(&self, elapsed: Duration) -> ParallaxVector {
        let t = elapsed.as_secs_f32();
        ParallaxVector::new(
            (t * self.x_frequency).sin() * self.x_amplitude,
            (t * self.y_frequency).sin() * self.y_amplitude,
        )
    }
}

impl Default for DriftParams {
    fn default() -> Self {
        Self {
            x_frequency: 0.5,
            y_frequency: 0.3,
            x_amplitude: 0.8,
            y_amplitude: 0.4,
        }
    }
}

/// Parallax settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParallaxConfig {
    /// Depth multipliers
    pub scales: LayerScales,
    /// Background drift
    pub drift: DriftParams,
    /// Hand-off duration between pointer and drift
    pub blend_duration: Duration,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            scales: LayerScales::default(),
            drift: DriftParams::default(),
            blend_duration: DEFAULT_BLEND_DURATION,
        }
    }
}

/// Project a pointer sample with the default drift
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use visage_core::{project, ExpressiveMode, Pointer, Viewport};
///
/// let viewport = Viewport::new(800.0, 600.0);
/// let v = project(Pointer::new(400.0, 300.0), viewport, ExpressiveMode::Idle, Duration::ZERO);
/// assert_eq!((v.x, v.y), (0.0, 0.0));
///
/// let v = project(Pointer::new(800.0, 0.0), viewport, ExpressiveMode::Idle, Duration::ZERO);
/// assert_eq!((v.x, v.y), (1.0, -1.0));
/// assert_eq!(v.tilt.rotate_y, 10.0);
/// ```
#[must_use]
pub fn project(
    pointer: Pointer,
    viewport: Viewport,
    mode: ExpressiveMode,
    elapsed: Duration,
) -> ParallaxVector {
    project_with(&DriftParams::default(), pointer, viewport, mode, elapsed)
}

/// Project a pointer sample with explicit drift parameters
///
/// In Background mode `pointer` and `viewport` are not read at all.
#[must_use]
pub fn project_with(
    drift: &DriftParams,
    pointer: Pointer,
    viewport: Viewport,
    mode: ExpressiveMode,
    elapsed: Duration,
) -> ParallaxVector {
    if mode.is_background() {
        return drift.sample(elapsed);
    }

    let center = viewport.center();
    let (half_w, half_h) = viewport.half_extents();

    ParallaxVector::new(
        normalize(pointer.x, center.x, half_w),
        normalize(pointer.y, center.y, half_h),
    )
}

fn normalize(value: f32, center: f32, half: f32) -> f32 {
    if value.is_finite() {
        (value - center) / half
    } else {
        0.0
    }
}

/// In-flight hand-off between two gaze sources
#[derive(Clone, Copy, Debug)]
struct BlendTransition {
    /// Vector emitted when the source changed
    from: ParallaxVector,
    /// When the source changed
    start: Instant,
}

/// Smooths the switch between pointer-driven and autonomous gaze
///
/// Steady state is a pass-through. When the source flips, output eases from
/// the last emitted vector to the live target with a smoothstep curve.
#[derive(Clone, Debug)]
pub struct ParallaxBlender {
    /// Last emitted vector
    current: ParallaxVector,
    /// Source of the last sample (`true` = autonomous drift)
    autonomous: Option<bool>,
    /// Active hand-off, if any
    transition: Option<BlendTransition>,
    /// Hand-off length
    duration: Duration,
}

impl ParallaxBlender {
    /// Create a blender with the given hand-off duration
    #[must_use]
    pub fn new(duration: Duration) -> Self {
        Self {
            current: ParallaxVector::center(),
            autonomous: None,
            transition: None,
            duration,
        }
    }

    /// Feed this tick's projected target and get the vector to render
    pub fn blend(&mut self, target: ParallaxVector, autonomous: bool, now: Instant) -> ParallaxVector {
        if self.autonomous.is_some_and(|previous| previous != autonomous) {
            self.transition = Some(BlendTransition {
                from: self.current,
                start: now,
            });
        }
        self.autonomous = Some(autonomous);

        let output = match self.transition {
            Some(transition) => {
                let progress = self.progress(transition, now);
                if progress >= 1.0 {
                    self.transition = None;
                    target
                } else {
                    transition.from.lerp(target, smoothstep(progress))
                }
            }
            None => target,
        };

        self.current = output;
        output
    }

    /// Whether a hand-off is in progress
    #[must_use]
    pub fn is_blending(&self) -> bool {
        self.transition.is_some()
    }

    /// Last emitted vector
    #[must_use]
    pub fn current(&self) -> ParallaxVector {
        self.current
    }

    fn progress(&self, transition: BlendTransition, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(transition.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

impl Default for ParallaxBlender {
    fn default() -> Self {
        Self::new(DEFAULT_BLEND_DURATION)
    }
}

/// Smooth ease-in-out: 3t^2 - 2t^3
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}
