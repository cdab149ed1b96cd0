//! Integration tests for the avatar engine
//!
//! These tests drive [`AvatarEngine`] the way a surface does: one `tick` per
//! render, frame callbacks delivered from a manual driver, and a glyph canvas
//! standing in for the particle layer.
//! Tests cover:
//! - The three reference scenarios (typing, unattended alert, calm hint)
//! - Scheduler lifecycle across Background activations
//! - Particle pools being recreated per activation
//! - Configuration files feeding the engine

use std::io::Write;
use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use visage_core::compositor::MouthShape;
use visage_core::config::load_config_from_path;
use visage_core::particles::ParticleConfig;
use visage_core::test_utils::ManualFrameDriver;
use visage_core::{
    glow_color, AvatarEngine, Color, EmotionTag, EngineConfig, ExpressiveMode, GlyphCanvas,
    HostSignal, Pointer, Viewport,
};

const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

fn seeded_engine() -> (AvatarEngine<ManualFrameDriver>, ManualFrameDriver) {
    let driver = ManualFrameDriver::new();
    let config = EngineConfig::default()
        .with_particles(
            ParticleConfig::ambient().per_cell(8.0),
            ParticleConfig::data_stream().per_cell(8.0),
        )
        .with_seed(2024);
    (AvatarEngine::with_config(config, driver.clone()), driver)
}

/// Deliver every due frame, returning how many steps ran
fn pump(
    engine: &mut AvatarEngine<ManualFrameDriver>,
    driver: &ManualFrameDriver,
    now: Instant,
    canvas: &mut GlyphCanvas,
) -> usize {
    let mut steps = 0;
    for handle in driver.take_due() {
        if engine.on_frame(handle, now, Some(&mut *canvas)) {
            steps += 1;
        }
    }
    steps
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn test_typing_scenario() {
    let (mut engine, driver) = seeded_engine();
    let signal = HostSignal::default()
        .typing(true)
        .with_pointer(Pointer::new(640.0, 360.0));

    let frame = engine.tick(&signal, VIEWPORT, Instant::now());

    assert_eq!(frame.mode, ExpressiveMode::Typing);
    assert_eq!(frame.emotion, EmotionTag::Curious);
    assert_eq!(frame.glow, glow_color(EmotionTag::Curious));
    assert_eq!(frame.mouth.shape, MouthShape::Typing);
    assert!(frame.hand.is_visible());
    assert!(!frame.particles_active);
    assert_eq!(driver.requested_count(), 0);
}

#[test]
fn test_unattended_alert_scenario() {
    let (mut engine, driver) = seeded_engine();
    let signal = HostSignal::default().idle(true).alert(true);

    let frame = engine.tick(&signal, VIEWPORT, Instant::now());

    assert_eq!(frame.mode, ExpressiveMode::Background);
    assert_eq!(frame.emotion, EmotionTag::Serious);
    assert_eq!(frame.aura.pulse_period_secs, 1.5);
    assert!(frame.particles_active);
    assert!(engine.is_animating());
    assert_eq!(driver.outstanding_count(), 1);
}

#[test]
fn test_calm_hint_scenario() {
    let (mut engine, _) = seeded_engine();
    let signal = HostSignal::default().with_hint("Calm");

    let frame = engine.tick(&signal, VIEWPORT, Instant::now());

    assert_eq!(frame.mode, ExpressiveMode::Idle);
    assert_eq!(frame.emotion, EmotionTag::Calm);
    assert_eq!(frame.glow, Color::rgb(56, 189, 248));
    assert_eq!(frame.aura.pulse_period_secs, 4.0);
}

// =============================================================================
// Scheduler lifecycle
// =============================================================================

#[test]
fn test_no_steps_after_deactivation() {
    let (mut engine, driver) = seeded_engine();
    let mut canvas = GlyphCanvas::new(100, 30);
    let start = Instant::now();
    let idle = HostSignal::default().idle(true);

    engine.tick(&idle, VIEWPORT, start);
    for i in 1..=5 {
        assert_eq!(pump(&mut engine, &driver, start + Duration::from_millis(i * 16), &mut canvas), 1);
    }
    assert_eq!(engine.scheduler().steps(), 5);

    // A callback already queued by the driver when the host wakes up
    let late = driver.requested();
    engine.tick(&HostSignal::default(), VIEWPORT, start + Duration::from_millis(100));

    for handle in late {
        assert!(!engine.on_frame(handle, start, Some(&mut canvas)));
    }
    assert_eq!(pump(&mut engine, &driver, start, &mut canvas), 0);
    assert_eq!(engine.scheduler().steps(), 5);
    assert_eq!(driver.outstanding_count(), 0);
}

#[test]
fn test_reactivation_creates_fresh_pool() {
    let (mut engine, driver) = seeded_engine();
    let mut canvas = GlyphCanvas::new(100, 30);
    let start = Instant::now();
    let idle = HostSignal::default().idle(true);

    engine.tick(&idle, VIEWPORT, start);
    pump(&mut engine, &driver, start, &mut canvas);
    let first: Vec<_> = engine
        .particles()
        .map(|layer| layer.ambient.particles().to_vec())
        .unwrap_or_default();
    assert_eq!(first.len(), 15);

    engine.tick(&HostSignal::default().typing(true), VIEWPORT, start);
    assert!(engine.particles().is_none());

    engine.tick(&idle, VIEWPORT, start);
    assert_eq!(engine.activations(), 2);
    assert!(engine.particles().is_some_and(|layer| layer.is_empty()));

    pump(&mut engine, &driver, start, &mut canvas);
    let second: Vec<_> = engine
        .particles()
        .map(|layer| layer.ambient.particles().to_vec())
        .unwrap_or_default();
    assert_eq!(second.len(), 15);
    assert_ne!(first, second);
}

#[test]
fn test_particles_stay_in_band_over_long_run() {
    let (mut engine, driver) = seeded_engine();
    let mut canvas = GlyphCanvas::new(60, 20);
    let start = Instant::now();
    engine.tick(&HostSignal::default().idle(true), VIEWPORT, start);

    for i in 0..2_000u64 {
        pump(&mut engine, &driver, start + Duration::from_millis(i * 16), &mut canvas);
    }

    let Some(layer) = engine.particles() else {
        panic!("background should own a particle layer");
    };
    for field in [&layer.ambient, &layer.stream] {
        let threshold = field.config().wrap_threshold;
        for p in field.particles() {
            assert!(p.y >= -threshold && p.y <= 20.0, "{p:?}");
        }
    }
}

#[test]
fn test_mode_is_resolved_once_per_tick() {
    let (mut engine, _) = seeded_engine();
    let signal = HostSignal::default().idle(true).typing(true);

    let frame = engine.tick(&signal, VIEWPORT, Instant::now());

    // Typing wins the mode, so no loop; the mouth policy still reads idle
    assert_eq!(engine.last_resolved(), Some((ExpressiveMode::Typing, EmotionTag::Curious)));
    assert!(!engine.is_animating());
    assert_eq!(frame.mouth.shape, MouthShape::Background);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_file_feeds_engine() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"[particles]\nambient_count = 4\nstream_count = 1\nseed = 3\n")
        .unwrap();
    let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

    let driver = ManualFrameDriver::new();
    let mut engine = AvatarEngine::with_config(config, driver.clone());
    let mut canvas = GlyphCanvas::new(40, 10);
    let now = Instant::now();

    engine.tick(&HostSignal::default().idle(true), VIEWPORT, now);
    pump(&mut engine, &driver, now, &mut canvas);

    assert_eq!(engine.particles().map(|layer| layer.len()), Some(5));
}
