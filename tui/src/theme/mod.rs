//! Theme and Colors
//!
//! The avatar lives on a near-black void; everything else is shades of
//! white at low opacity, with the emotion glow as the only saturated color.
//!
//! Terminals have no alpha channel, so translucent engine colors are
//! flattened against [`VOID`] before they reach a cell.

use ratatui::style::Color;
use visage_core::Color as EngineColor;

/// Screen background
pub const VOID: EngineColor = EngineColor::rgb(8, 8, 10);

/// Head outline (white at 35%)
pub const FACE_OUTLINE: EngineColor = EngineColor::rgba(255, 255, 255, 89);

/// Eye sockets
pub const SOCKET: EngineColor = EngineColor::rgba(255, 255, 255, 46);

/// Brows (white at 40%)
pub const BROW: EngineColor = EngineColor::rgba(255, 255, 255, 102);

/// Thinking hand
pub const HAND: EngineColor = EngineColor::rgb(163, 163, 163);

/// Status line text
pub const STATUS_TEXT: Color = Color::Rgb(120, 120, 128);

/// Status line accent (mode and emotion)
pub const STATUS_ACCENT: Color = Color::Rgb(200, 200, 210);

/// Pending alert marker
pub const ALERT_RED: Color = Color::Rgb(239, 68, 68);

/// Typed input
pub const INPUT_TEXT: Color = Color::Rgb(130, 220, 130);

/// Convert an engine color to a terminal color, flattening onto the void
#[must_use]
pub fn to_terminal(color: EngineColor) -> Color {
    let flat = color.over(VOID);
    Color::Rgb(flat.r, flat.g, flat.b)
}

/// Same as [`to_terminal`] with an extra opacity multiplier
#[must_use]
pub fn to_terminal_with(color: EngineColor, opacity: f32) -> Color {
    to_terminal(color.with_opacity(color.opacity() * opacity))
}
