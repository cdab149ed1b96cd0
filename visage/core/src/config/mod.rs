//! TOML Configuration File Support
//!
//! Engine tunables loaded from `~/.config/visage/avatar.toml`.
//!
//! # Configuration Priority
//!
//! Highest first:
//! 1. Environment variables (`VISAGE_*`)
//! 2. TOML configuration file
//! 3. Default values
//!
//! A missing file is not an error. Values are validated after all layers are
//! applied.
//!
//! # Example Configuration
//!
//! ```toml
//! [idle]
//! timeout_ms = 5000
//!
//! [parallax]
//! head_scale = 2.0
//! eyes_scale = 4.0
//! pupil_scale = 6.0
//! blend_ms = 250
//!
//! [particles]
//! ambient_count = 15
//! stream_count = 6
//! speed_scale = 1.0
//! seed = 42
//!
//! [surface]
//! target_fps = 30
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::DEFAULT_IDLE_TIMEOUT;
use crate::parallax::ParallaxConfig;
use crate::particles::ParticleConfig;

/// Default surface refresh rate
pub const DEFAULT_TARGET_FPS: u32 = 30;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// `[idle]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleToml {
    /// Quiet period before the avatar goes unattended
    pub timeout_ms: Option<u64>,
}

/// `[parallax]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxToml {
    /// Head layer multiplier
    pub head_scale: Option<f32>,
    /// Eye layer multiplier
    pub eyes_scale: Option<f32>,
    /// Pupil layer multiplier
    pub pupil_scale: Option<f32>,
    /// Horizontal drift amplitude
    pub drift_x_amplitude: Option<f32>,
    /// Vertical drift amplitude
    pub drift_y_amplitude: Option<f32>,
    /// Pointer/drift hand-off in milliseconds
    pub blend_ms: Option<u64>,
}

/// `[particles]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticlesToml {
    /// Ambient pool size
    pub ambient_count: Option<usize>,
    /// Data-stream pool size
    pub stream_count: Option<usize>,
    /// Multiplier on both pools' speed ranges
    pub speed_scale: Option<f32>,
    /// Fixed random seed
    pub seed: Option<u64>,
}

/// `[surface]` section
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceToml {
    /// Frame rate of the terminal surface
    pub target_fps: Option<u32>,
}

/// Root TOML document
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisageToml {
    /// `[idle]`
    pub idle: IdleToml,
    /// `[parallax]`
    pub parallax: ParallaxToml,
    /// `[particles]`
    pub particles: ParticlesToml,
    /// `[surface]`
    pub surface: SurfaceToml,
}

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Fully resolved engine configuration
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Quiet period before `is_idle`
    pub idle_timeout: Duration,

    /// Layer scales, drift and hand-off
    pub parallax: ParallaxConfig,

    /// Ambient particle pool
    pub ambient: ParticleConfig,

    /// Data-stream particle pool
    pub stream: ParticleConfig,

    /// Fixed random seed; `None` seeds from entropy
    pub seed: Option<u64>,

    /// Surface refresh rate
    pub target_fps: u32,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            parallax: ParallaxConfig::default(),
            ambient: ParticleConfig::ambient(),
            stream: ParticleConfig::data_stream(),
            seed: None,
            target_fps: DEFAULT_TARGET_FPS,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Use a fixed seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Use explicit particle pools
    #[must_use]
    pub fn with_particles(mut self, ambient: ParticleConfig, stream: ParticleConfig) -> Self {
        self.ambient = ambient;
        self.stream = stream;
        self
    }

    /// Interval between surface frames
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.target_fps.max(1)
    }

    /// Check every value
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.idle_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "idle timeout must be greater than zero".to_string(),
            ));
        }
        let scales = &self.parallax.scales;
        if ![scales.head, scales.eyes, scales.pupils]
            .iter()
            .all(|s| s.is_finite() && *s > 0.0)
        {
            return Err(ConfigError::ValidationError(
                "parallax scales must be finite and positive".to_string(),
            ));
        }
        let drift = &self.parallax.drift;
        if ![drift.x_amplitude, drift.y_amplitude, drift.x_frequency, drift.y_frequency]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(ConfigError::ValidationError(
                "parallax drift values must be finite".to_string(),
            ));
        }
        if !self.parallax.scales.is_ordered() {
            return Err(ConfigError::ValidationError(
                "parallax scales must increase head < eyes < pupils".to_string(),
            ));
        }
        self.ambient
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("ambient particles: {e}")))?;
        self.stream
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("stream particles: {e}")))?;
        if !(1..=240).contains(&self.target_fps) {
            return Err(ConfigError::ValidationError(format!(
                "target_fps must be within 1..=240, got {}",
                self.target_fps
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/visage/avatar.toml` or
/// `~/.config/visage/avatar.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("visage").join("avatar.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<EngineConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed, or
/// if the merged values fail validation.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<EngineConfig, ConfigError> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit environment lookup
///
/// # Errors
///
/// Same as [`load_config_from_path`].
pub fn load_config_with_env<F>(path: Option<PathBuf>, env: F) -> Result<EngineConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = EngineConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: VisageToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, env);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut EngineConfig, toml: &VisageToml) {
    if let Some(ms) = toml.idle.timeout_ms {
        config.idle_timeout = Duration::from_millis(ms);
    }

    let parallax = &mut config.parallax;
    if let Some(scale) = toml.parallax.head_scale {
        parallax.scales.head = scale;
    }
    if let Some(scale) = toml.parallax.eyes_scale {
        parallax.scales.eyes = scale;
    }
    if let Some(scale) = toml.parallax.pupil_scale {
        parallax.scales.pupils = scale;
    }
    if let Some(amplitude) = toml.parallax.drift_x_amplitude {
        parallax.drift.x_amplitude = amplitude;
    }
    if let Some(amplitude) = toml.parallax.drift_y_amplitude {
        parallax.drift.y_amplitude = amplitude;
    }
    if let Some(ms) = toml.parallax.blend_ms {
        parallax.blend_duration = Duration::from_millis(ms);
    }

    if let Some(count) = toml.particles.ambient_count {
        config.ambient.pool_size = count;
    }
    if let Some(count) = toml.particles.stream_count {
        config.stream.pool_size = count;
    }
    if let Some(scale) = toml.particles.speed_scale {
        for pool in [&mut config.ambient, &mut config.stream] {
            pool.speed_min *= scale;
            pool.speed_max *= scale;
        }
    }
    if toml.particles.seed.is_some() {
        config.seed = toml.particles.seed;
    }

    if let Some(fps) = toml.surface.target_fps {
        config.target_fps = fps;
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config<F>(config: &mut EngineConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(ms) = env("VISAGE_IDLE_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
        config.idle_timeout = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(n) = env("VISAGE_AMBIENT_PARTICLES").and_then(|v| v.parse::<usize>().ok()) {
        config.ambient.pool_size = n;
        config.source = ConfigSource::Env;
    }
    if let Some(n) = env("VISAGE_STREAM_PARTICLES").and_then(|v| v.parse::<usize>().ok()) {
        config.stream.pool_size = n;
        config.source = ConfigSource::Env;
    }
    if let Some(fps) = env("VISAGE_TARGET_FPS").and_then(|v| v.parse::<u32>().ok()) {
        config.target_fps = fps;
        config.source = ConfigSource::Env;
    }
    if let Some(seed) = env("VISAGE_SEED").and_then(|v| v.parse::<u64>().ok()) {
        config.seed = Some(seed);
        config.source = ConfigSource::Env;
    }
}
