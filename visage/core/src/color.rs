//! Surface-agnostic colour
//!
//! A simple RGBA colour that every surface can map to its native type:
//! - Terminal: true colour, alpha pre-multiplied against the background
//! - Web/SVG: CSS `rgba()`

use serde::{Deserialize, Serialize};

/// Surface-agnostic RGBA color
///
/// # Examples
///
/// ```
/// use visage_core::Color;
///
/// let glow = Color::rgb(56, 189, 248);
/// assert_eq!(glow.a, 255);
///
/// let faded = glow.with_opacity(0.5);
/// assert_eq!(faded.a, 128);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
    /// Alpha component (0=transparent, 255=opaque)
    pub a: u8,
}

impl Color {
    /// Opaque white, the neutral glow
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Create a fully opaque color from RGB components
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color with explicit alpha channel
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Check if this color is fully transparent
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }

    /// Same color with alpha set from an opacity in `0.0..=1.0`
    ///
    /// Out-of-range and non-finite opacities are clamped (NaN becomes 0).
    #[must_use]
    pub fn with_opacity(self, opacity: f32) -> Self {
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            a: (opacity * 255.0).round() as u8,
            ..self
        }
    }

    /// Opacity of this color in `0.0..=1.0`
    #[must_use]
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }

    /// Composite this color over an opaque background
    ///
    /// Returns an opaque color. Terminals have no alpha channel, so surfaces
    /// flatten translucent glyphs against their background with this.
    #[must_use]
    pub fn over(self, background: Color) -> Color {
        let alpha = self.opacity();
        let mix = |fg: u8, bg: u8| -> u8 {
            (f32::from(fg) * alpha + f32::from(bg) * (1.0 - alpha)).round() as u8
        };
        Color::rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }

    /// CSS `rgba()` notation
    #[must_use]
    pub fn to_css(&self) -> String {
        format!(
            "rgba({}, {}, {}, {:.3})",
            self.r,
            self.g,
            self.b,
            self.opacity()
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_opacity_clamps() {
        assert_eq!(Color::WHITE.with_opacity(2.0).a, 255);
        assert_eq!(Color::WHITE.with_opacity(-1.0).a, 0);
        assert_eq!(Color::WHITE.with_opacity(f32::NAN).a, 0);
        assert!(Color::WHITE.with_opacity(0.0).is_transparent());
    }

    #[test]
    fn test_over_blends_toward_background() {
        let half_white = Color::WHITE.with_opacity(0.5);
        let blended = half_white.over(Color::rgb(0, 0, 0));
        assert_eq!(blended.a, 255);
        assert!((i32::from(blended.r) - 128).abs() <= 1);

        let opaque = Color::rgb(10, 20, 30).over(Color::WHITE);
        assert_eq!(opaque, Color::rgb(10, 20, 30));
    }

    #[test]
    fn test_css_notation() {
        assert_eq!(Color::rgb(1, 2, 3).to_css(), "rgba(1, 2, 3, 1.000)");
    }
}
