//! Visage TUI - Terminal surface for the Visage avatar
//!
//! This crate renders a [`visage_core::AvatarEngine`] full-screen in the
//! terminal. It has no response backend of its own; a simulated
//! [`responder::Responder`] stands in so every expressive mode can be seen.
//!
//! # Architecture
//!
//! - **Compositor**: Layered rendering with z-ordering (particles, face, status)
//! - **Face**: Braille-canvas rendering of a frame description
//! - **Canvas**: Particle glyphs drawn straight into a layer buffer
//! - **Driver**: The app's refresh tick stands in for a vsync callback

pub mod app;
pub mod canvas;
pub mod compositor;
pub mod driver;
pub mod face;
pub mod responder;
pub mod theme;

pub use app::App;
