//! Visage Core - Expressive Avatar Engine
//!
//! Renders a synthetic face whose gaze, pupils, brows, mouth, aura and
//! background particle field are a continuous function of the host's
//! discrete state (idle, typing, responding, unattended) and its continuous
//! input (pointer position, elapsed time).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Host surface                          │
//! │     HostSignal + Viewport (per tick)     FrameDriver          │
//! └───────────────┬─────────────────────────────────┬────────────┘
//!                 │                                 │ frame callbacks
//! ┌───────────────┼─────────────────────────────────┼────────────┐
//! │               ▼            VISAGE CORE          ▼            │
//! │        ┌─────────────┐                 ┌────────────────┐    │
//! │        │Mode Resolver│──── gates ─────▶│Frame Scheduler │    │
//! │        └──────┬──────┘                 └───────┬────────┘    │
//! │       ┌───────┴────────┐                       ▼             │
//! │       ▼                ▼               ┌────────────────┐    │
//! │  ┌─────────┐    ┌────────────┐         │ Particle Field │    │
//! │  │Parallax │───▶│ Compositor │         └───────┬────────┘    │
//! │  └─────────┘    └─────┬──────┘                 │             │
//! └───────────────────────┼────────────────────────┼─────────────┘
//!                         ▼                        ▼
//!                 FrameDescription            Canvas layer
//! ```
//!
//! Data flows one way. The particle field never feeds back into the face.
//!
//! # Key Types
//!
//! - [`AvatarEngine`]: per-surface facade wiring everything together
//! - [`HostSignal`]: the flags and pointer sample a host supplies each tick
//! - [`FrameDescription`]: the declarative output of one tick
//! - [`FrameDriver`]: the seam a surface implements to provide frame callbacks
//! - [`Canvas`]: the seam a surface implements to receive particles
//!
//! # Quick Start
//!
//! ```
//! use std::time::Instant;
//! use visage_core::test_utils::ManualFrameDriver;
//! use visage_core::{render_svg, AvatarEngine, HostSignal, Viewport};
//!
//! let mut engine = AvatarEngine::new(ManualFrameDriver::new());
//! let signal = HostSignal::default().typing(true);
//! let frame = engine.tick(&signal, Viewport::new(800.0, 600.0), Instant::now());
//!
//! assert_eq!(frame.emotion.as_str(), "curious");
//! assert!(render_svg(&frame).contains("<svg"));
//! ```
//!
//! # No Surface Dependencies
//!
//! This crate has no dependency on ratatui, crossterm, or an async runtime.
//! It is single-threaded and cooperative; hosts own the clock.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod activity;
pub mod color;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod mode;
pub mod parallax;
pub mod particles;
pub mod scheduler;
pub mod signal;
pub mod test_utils;

pub use activity::{ActivityMonitor, DEFAULT_IDLE_TIMEOUT};
pub use color::Color;
pub use compositor::{
    compose, compose_with, glow_color, mouth_shape, render_svg, write_svg, FrameDescription,
    MouthShape,
};
pub use engine::AvatarEngine;
pub use mode::{resolve, EmotionTag, ExpressiveMode};
pub use parallax::{
    project, project_with, LayerOffsets, LayerScales, ParallaxBlender, ParallaxConfig,
    ParallaxVector, Tilt,
};
pub use particles::{Canvas, GlyphCanvas, ParticleConfig, ParticleConfigError, ParticleLayer};
pub use scheduler::{FrameDriver, FrameHandle, FrameScheduler, SchedulerState};
pub use signal::{HostSignal, Pointer, Viewport};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigSource,
    EngineConfig,
};
