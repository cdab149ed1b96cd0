//! Particle Field Simulator
//!
//! A fixed pool of glyph particles drifting upward and flickering in and
//! out, suggesting background "thought" while the avatar is unattended.
//!
//! # Per-tick update
//!
//! ```text
//! y       -= speed                        (speed sampled once per particle)
//! opacity  = sin(time * k + phase) * amp  (phase = initial x)
//! y < -threshold  =>  y = height, x = fresh random
//! ```
//!
//! The simulation never converges; it runs for as long as the field is
//! alive. All randomness comes from an owned [`StdRng`], seedable for tests.
//!
//! # Missing surface
//!
//! Before a view mounts there may be no canvas. A step without one is a
//! silent no-op: nothing moves and nothing fails.

mod canvas;

pub use canvas::{Canvas, GlyphCanvas, GlyphCell};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Color;

/// Slowest speed a particle can be given
pub const MIN_SPEED: f32 = 0.001;

/// Glyphs for the ambient field
const AMBIENT_GLYPHS: &[&str] = &["·", "•", "∘", "⋅", "+", "*"];

/// Glyphs for the data-stream overlay
const DATA_STREAM_GLYPHS: &[&str] = &["0", "1", "λ", "Σ", "∂", "∇", "π", "{", "}", "≡"];

/// Which field a pool belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// Sparse drifting motes
    Ambient,
    /// Fewer, faster symbols suggesting computation
    DataStream,
}

impl FieldKind {
    /// Glyph set for this field
    #[must_use]
    pub fn glyphs(self) -> &'static [&'static str] {
        match self {
            Self::Ambient => AMBIENT_GLYPHS,
            Self::DataStream => DATA_STREAM_GLYPHS,
        }
    }
}

/// Simulation parameters for one pool
///
/// Distances are in canvas units per tick; `flicker_rate` is in radians per
/// second of elapsed time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    /// Number of particles, fixed for the life of the pool
    pub pool_size: usize,
    /// Slowest upward speed
    pub speed_min: f32,
    /// Fastest upward speed
    pub speed_max: f32,
    /// How far past the top edge a particle may go before wrapping
    pub wrap_threshold: f32,
    /// Flicker angular frequency (`k`)
    pub flicker_rate: f32,
    /// Peak opacity (`amp`)
    pub amplitude: f32,
    /// Glyph color before opacity
    pub tint: Color,
}

impl ParticleConfig {
    /// Ambient field preset for pixel canvases
    #[must_use]
    pub fn ambient() -> Self {
        Self {
            pool_size: 15,
            speed_min: 0.2,
            speed_max: 0.8,
            wrap_threshold: 20.0,
            flicker_rate: 1.2,
            amplitude: 0.5,
            tint: Color::WHITE,
        }
    }

    /// Data-stream overlay preset for pixel canvases
    #[must_use]
    pub fn data_stream() -> Self {
        Self {
            pool_size: 6,
            speed_min: 0.6,
            speed_max: 1.6,
            wrap_threshold: 20.0,
            flicker_rate: 2.0,
            amplitude: 0.7,
            tint: Color::rgb(163, 163, 163),
        }
    }

    /// Rescale distances for a coarser canvas (e.g. terminal cells)
    ///
    /// `units_per_cell` is how many canvas units one coarse cell spans.
    #[must_use]
    pub fn per_cell(mut self, units_per_cell: f32) -> Self {
        if units_per_cell > 0.0 {
            self.speed_min /= units_per_cell;
            self.speed_max /= units_per_cell;
            self.wrap_threshold /= units_per_cell;
        }
        self
    }

    /// Check the parameters
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an empty pool, non-positive or
    /// inverted speeds, or an out-of-range threshold, amplitude or rate.
    pub fn validate(&self) -> Result<(), ParticleConfigError> {
        if self.pool_size == 0 {
            return Err(ParticleConfigError::EmptyPool);
        }
        if !(self.speed_min > 0.0 && self.speed_min.is_finite()) {
            return Err(ParticleConfigError::InvalidSpeed(self.speed_min));
        }
        if !(self.speed_max >= self.speed_min && self.speed_max.is_finite()) {
            return Err(ParticleConfigError::InvertedSpeedRange {
                min: self.speed_min,
                max: self.speed_max,
            });
        }
        if !(self.wrap_threshold >= 0.0 && self.wrap_threshold.is_finite()) {
            return Err(ParticleConfigError::InvalidThreshold(self.wrap_threshold));
        }
        if !(0.0..=1.0).contains(&self.amplitude) {
            return Err(ParticleConfigError::InvalidAmplitude(self.amplitude));
        }
        if !self.flicker_rate.is_finite() {
            return Err(ParticleConfigError::InvalidFlickerRate(self.flicker_rate));
        }
        Ok(())
    }

    /// Speed bounds safe to sample from, whatever the configured values
    ///
    /// Non-finite or too-small speeds are raised to [`MIN_SPEED`] and an
    /// inverted range is swapped.
    #[must_use]
    pub fn speed_range(&self) -> (f32, f32) {
        let sane = |v: f32| if v.is_finite() && v > MIN_SPEED { v } else { MIN_SPEED };
        let (a, b) = (sane(self.speed_min), sane(self.speed_max));
        (a.min(b), a.max(b))
    }
}

/// Invalid particle pool parameters
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ParticleConfigError {
    /// The pool has no particles
    #[error("pool_size must be at least 1")]
    EmptyPool,

    /// `speed_min` is zero, negative or not finite
    #[error("speed_min must be a positive number, got {0}")]
    InvalidSpeed(f32),

    /// `speed_max` is below `speed_min` or not finite
    #[error("speed_max ({max}) must be finite and >= speed_min ({min})")]
    InvertedSpeedRange {
        /// Configured minimum
        min: f32,
        /// Configured maximum
        max: f32,
    },

    /// `wrap_threshold` is negative or not finite
    #[error("wrap_threshold must be a finite value >= 0, got {0}")]
    InvalidThreshold(f32),

    /// `amplitude` is outside 0..=1
    #[error("amplitude must be within 0.0..=1.0, got {0}")]
    InvalidAmplitude(f32),

    /// `flicker_rate` is not finite
    #[error("flicker_rate must be finite, got {0}")]
    InvalidFlickerRate(f32),
}

/// One drifting glyph
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Horizontal position
    pub x: f32,
    /// Vertical position (decreases as it rises)
    pub y: f32,
    /// Upward distance per tick, fixed at creation
    pub speed: f32,
    /// Glyph drawn for this particle
    pub glyph: &'static str,
    /// Flicker phase offset (initial x)
    pub phase: f32,
}

impl Particle {
    /// Raw flicker value; negative means fully faded out
    #[must_use]
    pub fn opacity(&self, time: f32, flicker_rate: f32, amplitude: f32) -> f32 {
        (time * flicker_rate + self.phase).sin() * amplitude
    }
}

/// A fixed-size pool of particles for one field
#[derive(Debug)]
pub struct ParticleField {
    kind: FieldKind,
    config: ParticleConfig,
    /// Empty until the first tick with a usable canvas
    particles: Vec<Particle>,
    /// Canvas size the pool was last fitted to
    bounds: Option<(f32, f32)>,
    rng: StdRng,
}

impl ParticleField {
    /// Create a field with entropy-seeded randomness
    #[must_use]
    pub fn new(kind: FieldKind, config: ParticleConfig) -> Self {
        Self::from_rng(kind, config, StdRng::from_entropy())
    }

    /// Create a field with a fixed seed for reproducible runs
    #[must_use]
    pub fn with_seed(kind: FieldKind, config: ParticleConfig, seed: u64) -> Self {
        Self::from_rng(kind, config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(kind: FieldKind, config: ParticleConfig, rng: StdRng) -> Self {
        Self {
            kind,
            config,
            particles: Vec::new(),
            bounds: None,
            rng,
        }
    }

    /// Which field this is
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Current particles (empty before the first drawable tick)
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Simulation parameters
    #[must_use]
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Advance one tick within a `width` x `height` canvas
    ///
    /// The pool is allocated on the first call with a non-empty canvas and
    /// reused afterwards. Degenerate sizes leave the field untouched.
    pub fn advance(&mut self, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite()) {
            return;
        }

        if self.particles.is_empty() {
            self.populate(width, height);
        } else if self.bounds != Some((width, height)) {
            self.refit(width, height);
        }
        self.bounds = Some((width, height));

        let threshold = self.config.wrap_threshold;
        for particle in &mut self.particles {
            particle.y -= particle.speed;
            if particle.y < -threshold {
                particle.y = height;
                particle.x = self.rng.gen_range(0.0..width);
            }
        }
    }

    /// Draw every visible particle
    pub fn draw(&self, canvas: &mut dyn Canvas, time: f32) {
        for particle in &self.particles {
            let opacity = particle.opacity(time, self.config.flicker_rate, self.config.amplitude);
            if opacity <= 0.0 {
                continue;
            }
            canvas.draw_glyph(
                particle.x,
                particle.y,
                particle.glyph,
                self.config.tint.with_opacity(opacity),
            );
        }
    }

    fn populate(&mut self, width: f32, height: f32) {
        let glyphs = self.kind.glyphs();
        let (speed_min, speed_max) = self.config.speed_range();

        self.particles = (0..self.config.pool_size)
            .map(|_| {
                let x = self.rng.gen_range(0.0..width);
                Particle {
                    x,
                    y: self.rng.gen_range(0.0..height),
                    speed: self.rng.gen_range(speed_min..=speed_max),
                    glyph: glyphs.choose(&mut self.rng).copied().unwrap_or("·"),
                    phase: x,
                }
            })
            .collect();

        tracing::debug!(
            kind = ?self.kind,
            count = self.particles.len(),
            "Allocated particle pool"
        );
    }

    /// Pull particles back inside a resized canvas
    fn refit(&mut self, width: f32, height: f32) {
        for particle in &mut self.particles {
            if particle.y > height {
                particle.y = height;
            }
            if particle.x >= width {
                particle.x = self.rng.gen_range(0.0..width);
            }
        }
    }
}

/// The two pools sharing the background canvas
///
/// Owned by the engine only while Background mode is active; dropping it
/// discards both pools.
#[derive(Debug)]
pub struct ParticleLayer {
    /// Ambient motes
    pub ambient: ParticleField,
    /// Data-stream overlay
    pub stream: ParticleField,
}

impl ParticleLayer {
    /// Create both pools with entropy-seeded randomness
    #[must_use]
    pub fn new(ambient: ParticleConfig, stream: ParticleConfig) -> Self {
        Self {
            ambient: ParticleField::new(FieldKind::Ambient, ambient),
            stream: ParticleField::new(FieldKind::DataStream, stream),
        }
    }

    /// Create both pools from one seed (the stream pool uses `seed + 1`)
    #[must_use]
    pub fn with_seed(ambient: ParticleConfig, stream: ParticleConfig, seed: u64) -> Self {
        Self {
            ambient: ParticleField::with_seed(FieldKind::Ambient, ambient, seed),
            stream: ParticleField::with_seed(FieldKind::DataStream, stream, seed.wrapping_add(1)),
        }
    }

    /// Simulate and redraw one tick
    ///
    /// Returns `false` without touching any state when there is no canvas or
    /// the canvas has no area.
    pub fn step(&mut self, time: f32, canvas: Option<&mut dyn Canvas>) -> bool {
        let Some(canvas) = canvas else {
            tracing::trace!("No particle canvas; skipping tick");
            return false;
        };

        let (width, height) = canvas.size();
        if !(width > 0.0 && height > 0.0) {
            tracing::trace!(width, height, "Particle canvas has no area; skipping tick");
            return false;
        }

        canvas.clear();
        self.ambient.advance(width, height);
        self.stream.advance(width, height);
        self.ambient.draw(canvas, time);
        self.stream.draw(canvas, time);
        true
    }

    /// Total particles across both pools
    #[must_use]
    pub fn len(&self) -> usize {
        self.ambient.particles().len() + self.stream.particles().len()
    }

    /// Whether neither pool has been allocated yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
