//! Avatar Engine
//!
//! The per-surface entry point. A host calls [`AvatarEngine::tick`] once per
//! render with the current [`HostSignal`] and gets a [`FrameDescription`]
//! back. Frame callbacks from its [`FrameDriver`] go to
//! [`AvatarEngine::on_frame`], which steps the particle field.
//!
//! # Per-tick flow
//!
//! ```text
//! HostSignal ──▶ resolve ──▶ (mode, emotion)
//!                               │
//!         ┌─────────────────────┼──────────────────────┐
//!         ▼                     ▼                      ▼
//!   scheduler.sync      project + blend            compose
//!   (pool alloc/drop)         │                        ▲
//!                             └────── parallax ────────┘
//! ```
//!
//! The mode is resolved exactly once per tick and that snapshot feeds all
//! three consumers.

use std::time::Instant;

use crate::compositor::{compose_with, FrameDescription};
use crate::config::EngineConfig;
use crate::mode::{resolve, EmotionTag, ExpressiveMode};
use crate::parallax::{project_with, ParallaxBlender};
use crate::particles::{Canvas, ParticleLayer};
use crate::scheduler::{FrameDriver, FrameHandle, FrameScheduler, SchedulerTransition};
use crate::signal::{HostSignal, Viewport};

/// Expressive avatar engine for one mounted surface
#[derive(Debug)]
pub struct AvatarEngine<D: FrameDriver> {
    config: EngineConfig,
    scheduler: FrameScheduler<D>,
    blender: ParallaxBlender,
    /// Present only while Background is active
    particles: Option<ParticleLayer>,
    /// Background activations so far
    activations: u64,
    /// Time origin for drift, mouth and flicker
    origin: Option<Instant>,
    /// Snapshot from the most recent tick
    last_resolved: Option<(ExpressiveMode, EmotionTag)>,
}

impl<D: FrameDriver> AvatarEngine<D> {
    /// Create an engine with default configuration
    pub fn new(driver: D) -> Self {
        Self::with_config(EngineConfig::default(), driver)
    }

    /// Create an engine with explicit configuration
    ///
    /// An invalid configuration is logged and used anyway; particle speeds
    /// are normalized when pools are populated.
    pub fn with_config(config: EngineConfig, driver: D) -> Self {
        if let Err(e) = config.validate() {
            tracing::warn!(error = %e, "Engine configuration failed validation");
        }
        let blender = ParallaxBlender::new(config.parallax.blend_duration);
        Self {
            config,
            scheduler: FrameScheduler::new(driver),
            blender,
            particles: None,
            activations: 0,
            origin: None,
            last_resolved: None,
        }
    }

    /// Produce the frame for this tick
    ///
    /// The first call fixes the time origin.
    pub fn tick(&mut self, signal: &HostSignal, viewport: Viewport, now: Instant) -> FrameDescription {
        let origin = *self.origin.get_or_insert(now);
        let elapsed = now.saturating_duration_since(origin);

        let (mode, emotion) = resolve(signal);
        if self.last_resolved.is_some_and(|(last, _)| last != mode) {
            tracing::debug!(from = ?self.last_resolved.map(|(m, _)| m), to = %mode, "Expressive mode changed");
        }
        self.last_resolved = Some((mode, emotion));

        let autonomous = mode.is_background();
        self.sync_background(autonomous);

        let target = project_with(&self.config.parallax.drift, signal.pointer, viewport, mode, elapsed);
        let parallax = self.blender.blend(target, autonomous, now);

        compose_with(&self.config.parallax.scales, signal, mode, emotion, &parallax, elapsed)
    }

    /// Deliver a frame callback from the driver
    ///
    /// Steps the particle field when `handle` is the live request. Stale or
    /// post-cancellation callbacks do nothing. Returns whether a step ran.
    pub fn on_frame(&mut self, handle: FrameHandle, now: Instant, canvas: Option<&mut dyn Canvas>) -> bool {
        let time = self
            .origin
            .map_or(0.0, |origin| now.saturating_duration_since(origin).as_secs_f32());
        let particles = &mut self.particles;

        self.scheduler.run_frame(handle, || {
            if let Some(layer) = particles.as_mut() {
                layer.step(time, canvas);
            }
        })
    }

    /// Stop the loop and release the particle pools
    pub fn teardown(&mut self) {
        self.scheduler.teardown();
        if self.particles.take().is_some() {
            tracing::debug!("Released particle pools on teardown");
        }
    }

    /// Whether the background loop is running
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.scheduler.is_running()
    }

    /// The live particle pools, if Background is active
    #[must_use]
    pub fn particles(&self) -> Option<&ParticleLayer> {
        self.particles.as_ref()
    }

    /// How many times Background has been entered
    #[must_use]
    pub fn activations(&self) -> u64 {
        self.activations
    }

    /// Mode and emotion from the most recent tick
    #[must_use]
    pub fn last_resolved(&self) -> Option<(ExpressiveMode, EmotionTag)> {
        self.last_resolved
    }

    /// The scheduler
    #[must_use]
    pub fn scheduler(&self) -> &FrameScheduler<D> {
        &self.scheduler
    }

    /// Borrow the frame driver
    #[must_use]
    pub fn driver(&self) -> &D {
        self.scheduler.driver()
    }

    /// Mutably borrow the frame driver
    pub fn driver_mut(&mut self) -> &mut D {
        self.scheduler.driver_mut()
    }

    /// The configuration in use
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn sync_background(&mut self, active: bool) {
        match self.scheduler.sync(active) {
            Some(SchedulerTransition::Started) => {
                self.activations += 1;
                self.particles = Some(self.fresh_layer());
                tracing::debug!(activation = self.activations, "Background activated");
            }
            Some(SchedulerTransition::Stopped) => {
                self.particles = None;
                tracing::debug!("Background deactivated; particle pools dropped");
            }
            None => {}
        }
    }

    fn fresh_layer(&self) -> ParticleLayer {
        let ambient = self.config.ambient.clone();
        let stream = self.config.stream.clone();
        match self.config.seed {
            // Distinct but reproducible pools per activation
            Some(seed) => ParticleLayer::with_seed(
                ambient,
                stream,
                seed.wrapping_add(self.activations.wrapping_mul(2)),
            ),
            None => ParticleLayer::new(ambient, stream),
        }
    }
}
