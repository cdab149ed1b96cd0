//! Frame description types
//!
//! Everything a surface needs to draw one frame of the face, in the face's
//! own 100 x 100 coordinate space (origin top-left, `y` down). Frames are
//! plain data: built once by the compositor, consumed once by a surface.

use serde::Serialize;

use crate::color::Color;
use crate::mode::{EmotionTag, ExpressiveMode};
use crate::parallax::{Offset, Tilt};

/// Outline of the head
pub const HEAD_PATH: &str =
    "M50 10 C 20 10 15 40 15 60 C 15 85 35 95 50 95 C 65 95 85 85 85 60 C 85 40 80 10 50 10";

/// Palm arc of the thinking hand (before its vertical offset)
pub const HAND_PALM_PATH: &str = "M40 105 Q 50 95 60 105";

/// Finger strokes of the thinking hand, outer fingers first
pub const HAND_FINGER_PATHS: [&str; 3] = ["M43 100 L 41 88", "M57 100 L 59 88", "M50 98 L 50 82"];

/// A point in face space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// Create a point
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Shift by an offset
    #[must_use]
    pub fn translated(self, offset: Offset) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }

    /// Reflect across the vertical centre line (`x -> 100 - x`)
    #[must_use]
    pub fn mirrored(self) -> Self {
        Self::new(100.0 - self.x, self.y)
    }
}

/// A quadratic Bézier segment
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QuadCurve {
    /// Start point
    pub start: Point,
    /// Control point
    pub control: Point,
    /// End point
    pub end: Point,
}

impl QuadCurve {
    /// Create a curve
    #[must_use]
    pub const fn new(start: Point, control: Point, end: Point) -> Self {
        Self {
            start,
            control,
            end,
        }
    }

    /// Shift every point
    #[must_use]
    pub fn translated(self, offset: Offset) -> Self {
        Self::new(
            self.start.translated(offset),
            self.control.translated(offset),
            self.end.translated(offset),
        )
    }

    /// Mirror image across the face's centre line
    #[must_use]
    pub fn mirrored(self) -> Self {
        Self::new(self.start.mirrored(), self.control.mirrored(), self.end.mirrored())
    }

    /// Point at parameter `t` (`0.0` = start, `1.0` = end)
    #[must_use]
    pub fn point_at(&self, t: f32) -> Point {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let x = u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x;
        let y = u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y;
        Point::new(x, y)
    }

    /// `segments + 1` evenly spaced points along the curve
    #[must_use]
    pub fn sample(&self, segments: usize) -> Vec<Point> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }

    /// SVG path data, e.g. `M35 75 Q 50 75.5 65 75`
    #[must_use]
    pub fn to_path(&self) -> String {
        format!(
            "M{} {} Q {} {} {} {}",
            fmt_coord(self.start.x),
            fmt_coord(self.start.y),
            fmt_coord(self.control.x),
            fmt_coord(self.control.y),
            fmt_coord(self.end.x),
            fmt_coord(self.end.y),
        )
    }
}

/// Format a coordinate with at most two decimals and no trailing zeros
pub(crate) fn fmt_coord(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    // Avoid "-0"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded}")
}

/// Declarative pupil breathing cycle
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Breath {
    /// Radius at the bottom of the cycle
    pub min_radius: f32,
    /// Radius at the top of the cycle (the resting radius)
    pub max_radius: f32,
    /// Full cycle length in seconds
    pub period_secs: f32,
}

impl Breath {
    /// Radius at a point in time (`min -> max -> min` over one period)
    #[must_use]
    pub fn radius_at(&self, seconds: f32) -> f32 {
        if self.period_secs <= 0.0 {
            return self.max_radius;
        }
        let phase = (seconds / self.period_secs).rem_euclid(1.0);
        // Triangle wave, 0 at the ends and 1 in the middle
        let level = 1.0 - (2.0 * phase - 1.0).abs();
        self.min_radius + (self.max_radius - self.min_radius) * level
    }
}

/// One eye: dark socket plus glowing pupil
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Eye {
    /// Socket centre
    pub socket_center: Point,
    /// Socket horizontal radius
    pub socket_rx: f32,
    /// Socket vertical radius
    pub socket_ry: f32,
    /// Pupil centre
    pub pupil_center: Point,
    /// Resting pupil radius
    pub pupil_radius: f32,
    /// Breathing animation of the pupil radius
    pub breath: Breath,
}

/// Both eyes
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EyePair {
    /// Viewer's left
    pub left: Eye,
    /// Viewer's right
    pub right: Eye,
}

/// Both brows
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BrowPair {
    /// Viewer's left
    pub left: QuadCurve,
    /// Viewer's right (mirror of the left)
    pub right: QuadCurve,
}

/// Which mouth program is showing
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MouthShape {
    /// Unattended, relaxed
    Background,
    /// Speaking, animated
    Responding,
    /// Concentrating, lips pressed flat
    Typing,
    /// Attentive rest
    Idle,
}

/// The mouth for one frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Mouth {
    /// Which program produced the curve
    pub shape: MouthShape,
    /// The lip line
    pub curve: QuadCurve,
    /// Stroke opacity
    pub stroke_opacity: f32,
    /// Stroke width
    pub stroke_width: f32,
    /// Whether the stroke glows
    pub glow: bool,
}

/// The ring around the head
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Aura {
    /// Ring color (the emotion's glow)
    pub color: Color,
    /// Ring radius around the face centre
    pub radius: f32,
    /// Stroke width
    pub stroke_width: f32,
    /// Base opacity
    pub opacity: f32,
    /// Current rotation in degrees, `0.0..360.0`
    pub rotation_deg: f32,
    /// Glow pulse cycle length in seconds
    pub pulse_period_secs: f32,
}

/// The thinking-hand gesture
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct HandGesture {
    /// Horizontal shift following the gaze
    pub offset_x: f32,
    /// Vertical shift; large positive values park it below the face
    pub offset_y: f32,
    /// Overall opacity
    pub opacity: f32,
}

impl HandGesture {
    /// Whether the hand is visible at all
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

/// Whole-head translation and tilt
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct HeadPose {
    /// Translation in face units
    pub offset: Offset,
    /// 3-D tilt in degrees
    pub tilt: Tilt,
}

/// Every visual parameter for one render
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameDescription {
    /// Resolved mode
    pub mode: ExpressiveMode,
    /// Resolved emotion
    pub emotion: EmotionTag,
    /// Emotion glow color shared by pupils and aura
    pub glow: Color,
    /// Head pose
    pub head: HeadPose,
    /// Eyes
    pub eyes: EyePair,
    /// Brows
    pub brows: BrowPair,
    /// Mouth
    pub mouth: Mouth,
    /// Aura ring
    pub aura: Aura,
    /// Thinking hand
    pub hand: HandGesture,
    /// Whether the background particle layer should be showing
    pub particles_active: bool,
}

impl FrameDescription {
    /// Serialize for web surfaces
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (not expected for finite values).
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
