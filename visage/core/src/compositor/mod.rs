//! Vector Compositor
//!
//! Maps the resolved mode and emotion, the gaze vector and elapsed time onto
//! concrete vector parameters and emits a [`FrameDescription`].
//!
//! # Design
//!
//! Each visual trait is its own total lookup so adding an emotion or a mode
//! fails to compile until every table handles it:
//!
//! - glow color, brow shape, pupil size: by [`EmotionTag`]
//! - aura shaping: by [`ExpressiveMode`], Responding ignoring emotion
//! - mouth: by [`mouth_shape`], which reads the raw host flags
//!
//! ```text
//!   (mode, emotion) ──┬── glow_color ──────┐
//!                     ├── brow_curve ──────┤
//!                     ├── pupil_radius ────┼──▶ FrameDescription
//!   parallax ─────────┼── layer offsets ───┤
//!   signal + elapsed ─┴── mouth / aura ────┘
//! ```

mod frame;
mod svg;

pub use frame::{
    Aura, Breath, BrowPair, Eye, EyePair, FrameDescription, HandGesture, HeadPose, Mouth,
    MouthShape, Point, QuadCurve, HAND_FINGER_PATHS, HAND_PALM_PATH, HEAD_PATH,
};
pub use svg::{render_svg, write_svg};

use std::time::Duration;

use crate::color::Color;
use crate::mode::{EmotionTag, ExpressiveMode};
use crate::parallax::{LayerScales, Offset, ParallaxVector};
use crate::signal::HostSignal;

/// Pupil radius at rest for a neutral face
pub const PUPIL_BASE_RADIUS: f32 = 3.0;

/// Pupil breathing cycle length
pub const BREATH_PERIOD: Duration = Duration::from_secs(4);

/// Aura pulse period when `Serious`
pub const SERIOUS_PULSE_PERIOD: Duration = Duration::from_millis(1_500);

/// Aura pulse period for every other emotion
pub const CALM_PULSE_PERIOD: Duration = Duration::from_secs(4);

/// Aura pulse period while responding
pub const RESPONDING_PULSE_PERIOD: Duration = Duration::from_millis(800);

/// Frames per second the responding mouth was tuned at
const MOUTH_FRAME_RATE: f32 = 60.0;

/// Vertical position of the lip line
const MOUTH_Y: f32 = 75.0;

/// How far typing lowers the brows
const BROW_TYPING_DROP: f32 = 2.0;

/// Pupil travel divisor while typing
const TYPING_TRAVEL_DAMPING: f32 = 3.0;

/// Left and right socket centres at rest
const LEFT_EYE: Point = Point::new(35.0, 45.0);
const RIGHT_EYE: Point = Point::new(65.0, 45.0);

/// Compose a frame with the default layer scales
///
/// `elapsed` is time since the surface mounted; it drives the speaking
/// mouth and the aura rotation.
#[must_use]
pub fn compose(
    signal: &HostSignal,
    mode: ExpressiveMode,
    emotion: EmotionTag,
    parallax: &ParallaxVector,
    elapsed: Duration,
) -> FrameDescription {
    compose_with(&LayerScales::default(), signal, mode, emotion, parallax, elapsed)
}

/// Compose a frame with explicit layer scales
#[must_use]
pub fn compose_with(
    scales: &LayerScales,
    signal: &HostSignal,
    mode: ExpressiveMode,
    emotion: EmotionTag,
    parallax: &ParallaxVector,
    elapsed: Duration,
) -> FrameDescription {
    let typing = mode == ExpressiveMode::Typing;
    let glow = glow_color(emotion);
    let layers = parallax.layers(scales);

    let pupil_travel = if typing {
        Offset::new(
            layers.pupils.x / TYPING_TRAVEL_DAMPING,
            layers.pupils.y / TYPING_TRAVEL_DAMPING,
        )
    } else {
        layers.pupils
    };

    let resting = pupil_radius(emotion, mode);
    let breath = Breath {
        min_radius: resting * 2.5 / 3.0,
        max_radius: resting,
        period_secs: BREATH_PERIOD.as_secs_f32(),
    };
    let eye = |center: Point| Eye {
        socket_center: center.translated(layers.eyes),
        socket_rx: 8.0,
        socket_ry: 10.0,
        pupil_center: center.translated(pupil_travel),
        pupil_radius: resting,
        breath,
    };

    let brow_drop = if typing { BROW_TYPING_DROP } else { 0.0 };
    let left_brow = brow_curve(emotion).translated(Offset::new(0.0, brow_drop));

    let hand = if typing {
        HandGesture {
            offset_x: pupil_travel.x * 0.8,
            offset_y: -15.0,
            opacity: 0.6,
        }
    } else {
        HandGesture {
            offset_x: pupil_travel.x * 0.8,
            offset_y: 40.0,
            opacity: 0.0,
        }
    };

    FrameDescription {
        mode,
        emotion,
        glow,
        head: HeadPose {
            offset: layers.head,
            tilt: parallax.tilt,
        },
        eyes: EyePair {
            left: eye(LEFT_EYE),
            right: eye(RIGHT_EYE),
        },
        brows: BrowPair {
            left: left_brow,
            right: left_brow.mirrored(),
        },
        mouth: mouth(mouth_shape(signal), elapsed),
        aura: aura(mode, emotion, glow, elapsed),
        hand,
        particles_active: mode.is_background(),
    }
}

/// Glow color for an emotion
#[must_use]
pub const fn glow_color(emotion: EmotionTag) -> Color {
    match emotion {
        EmotionTag::Neutral => Color::WHITE,
        EmotionTag::Serious => Color::rgb(239, 68, 68),
        EmotionTag::Cautious => Color::rgb(245, 158, 11),
        EmotionTag::Calm => Color::rgb(56, 189, 248),
        EmotionTag::Curious => Color::rgb(167, 139, 250),
        EmotionTag::Analytical => Color::rgb(52, 211, 153),
    }
}

/// Left brow control points for an emotion (before the typing drop)
#[must_use]
pub fn brow_curve(emotion: EmotionTag) -> QuadCurve {
    let (start_y, control_y, end_y) = match emotion {
        EmotionTag::Neutral => (35.0, 30.0, 38.0),
        EmotionTag::Serious => (33.0, 34.0, 40.0),
        EmotionTag::Cautious => (36.0, 29.0, 35.0),
        EmotionTag::Calm => (35.0, 32.0, 36.0),
        EmotionTag::Curious => (32.0, 25.0, 34.0),
        EmotionTag::Analytical => (34.0, 32.0, 37.0),
    };
    QuadCurve::new(
        Point::new(25.0, start_y),
        Point::new(35.0, control_y),
        Point::new(43.0, end_y),
    )
}

/// Resting pupil radius; halved while typing, narrowest when `Cautious`
#[must_use]
pub fn pupil_radius(emotion: EmotionTag, mode: ExpressiveMode) -> f32 {
    let base = match emotion {
        EmotionTag::Neutral => PUPIL_BASE_RADIUS,
        EmotionTag::Serious => 2.7,
        EmotionTag::Cautious => 2.2,
        EmotionTag::Calm => 3.1,
        EmotionTag::Curious => 3.2,
        EmotionTag::Analytical => 2.6,
    };
    if mode == ExpressiveMode::Typing {
        base * 0.5
    } else {
        base
    }
}

/// Which mouth to show, from the raw host flags
///
/// Priority is Background, Responding, Typing, Idle. Background here means
/// `is_idle` without a response in flight, which also covers `is_idle` while
/// typing; the resolved mode would say Typing for that case.
#[must_use]
pub fn mouth_shape(signal: &HostSignal) -> MouthShape {
    if signal.is_idle && !signal.is_responding {
        MouthShape::Background
    } else if signal.is_responding {
        MouthShape::Responding
    } else if signal.is_typing {
        MouthShape::Typing
    } else {
        MouthShape::Idle
    }
}

fn mouth(shape: MouthShape, elapsed: Duration) -> Mouth {
    let (width, control_y) = match shape {
        MouthShape::Responding => {
            let frame = elapsed.as_secs_f32() * MOUTH_FRAME_RATE;
            let openness = 5.0 + (frame * 0.2).sin() * 8.0;
            let width = 30.0 + (frame * 0.1).sin() * 5.0;
            (width, MOUTH_Y + openness)
        }
        MouthShape::Background => (30.0, 76.0),
        MouthShape::Typing => (30.0, MOUTH_Y),
        MouthShape::Idle => (30.0, 75.5),
    };

    let curve = QuadCurve::new(
        Point::new(50.0 - width / 2.0, MOUTH_Y),
        Point::new(50.0, control_y),
        Point::new(50.0 + width / 2.0, MOUTH_Y),
    );

    let speaking = shape == MouthShape::Responding;
    Mouth {
        shape,
        curve,
        stroke_opacity: if speaking { 0.4 } else { 0.1 },
        stroke_width: if speaking { 1.0 } else { 0.5 },
        glow: speaking,
    }
}

fn aura(mode: ExpressiveMode, emotion: EmotionTag, color: Color, elapsed: Duration) -> Aura {
    // (stroke width, opacity, rotation speed in deg/s)
    let (stroke_width, opacity, speed) = match mode {
        ExpressiveMode::Responding => (2.0, 0.55, 45.0),
        ExpressiveMode::Typing => (1.2, 0.35, 20.0),
        ExpressiveMode::Background => (0.8, 0.25, 8.0),
        ExpressiveMode::Idle => (1.0, 0.3, 12.0),
    };

    let pulse = match (mode, emotion) {
        (ExpressiveMode::Responding, _) => RESPONDING_PULSE_PERIOD,
        (_, EmotionTag::Serious) => SERIOUS_PULSE_PERIOD,
        _ => CALM_PULSE_PERIOD,
    };

    Aura {
        color,
        radius: 48.0,
        stroke_width,
        opacity,
        rotation_deg: (elapsed.as_secs_f32() * speed).rem_euclid(360.0),
        pulse_period_secs: pulse.as_secs_f32(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::resolve;
    use pretty_assertions::assert_eq;

    fn frame_for(signal: &HostSignal, elapsed: Duration) -> FrameDescription {
        let (mode, emotion) = resolve(signal);
        compose(signal, mode, emotion, &ParallaxVector::center(), elapsed)
    }

    #[test]
    fn test_typing_scenario() {
        let signal = HostSignal::default().typing(true);
        let frame = frame_for(&signal, Duration::ZERO);

        assert_eq!(frame.mode, ExpressiveMode::Typing);
        assert_eq!(frame.emotion, EmotionTag::Curious);
        assert_eq!(frame.glow, glow_color(EmotionTag::Curious));
        assert_eq!(frame.mouth.shape, MouthShape::Typing);
        assert!(frame.eyes.left.pupil_radius < pupil_radius(EmotionTag::Curious, ExpressiveMode::Idle));
        assert!(frame.hand.is_visible());
        assert!(!frame.particles_active);
        // Brows lowered
        assert_eq!(frame.brows.left.start.y, brow_curve(EmotionTag::Curious).start.y + 2.0);
    }

    #[test]
    fn test_idle_alert_scenario() {
        let signal = HostSignal::default().idle(true).alert(true).with_hint("calm");
        let frame = frame_for(&signal, Duration::ZERO);

        assert_eq!(frame.mode, ExpressiveMode::Background);
        assert_eq!(frame.emotion, EmotionTag::Serious);
        assert_eq!(frame.glow, Color::rgb(239, 68, 68));
        assert_eq!(frame.aura.pulse_period_secs, 1.5);
        assert_eq!(frame.mouth.shape, MouthShape::Background);
        assert!(frame.particles_active);
    }

    #[test]
    fn test_calm_hint_scenario() {
        let signal = HostSignal::default().with_hint("calm");
        let frame = frame_for(&signal, Duration::ZERO);

        assert_eq!(frame.mode, ExpressiveMode::Idle);
        assert_eq!(frame.emotion, EmotionTag::Calm);
        assert_eq!(frame.glow, glow_color(EmotionTag::Calm));
        assert_eq!(frame.aura.pulse_period_secs, 4.0);
        assert_eq!(frame.mouth.curve.to_path(), "M35 75 Q 50 75.5 65 75");
        assert!(!frame.hand.is_visible());
    }

    #[test]
    fn test_neutral_face_matches_rest_pose() {
        let frame = frame_for(&HostSignal::default(), Duration::ZERO);
        assert_eq!(frame.glow, Color::WHITE);
        assert_eq!(frame.brows.left.to_path(), "M25 35 Q 35 30 43 38");
        assert_eq!(frame.brows.right.to_path(), "M75 35 Q 65 30 57 38");
        assert_eq!(frame.eyes.left.pupil_center, Point::new(35.0, 45.0));
        assert_eq!(frame.eyes.left.pupil_radius, PUPIL_BASE_RADIUS);
        assert_eq!(frame.eyes.left.breath.min_radius, 2.5);
    }

    #[test]
    fn test_cautious_pupils_are_narrowest() {
        let cautious = pupil_radius(EmotionTag::Cautious, ExpressiveMode::Idle);
        for emotion in EmotionTag::ALL {
            if emotion != EmotionTag::Cautious {
                assert!(cautious < pupil_radius(emotion, ExpressiveMode::Idle), "{emotion}");
            }
            assert!(
                pupil_radius(emotion, ExpressiveMode::Typing) < pupil_radius(emotion, ExpressiveMode::Idle)
            );
        }
    }

    #[test]
    fn test_every_emotion_has_distinct_glow_and_brows() {
        for (i, a) in EmotionTag::ALL.iter().enumerate() {
            for b in &EmotionTag::ALL[i + 1..] {
                assert_ne!(glow_color(*a), glow_color(*b), "{a} vs {b}");
                assert_ne!(brow_curve(*a), brow_curve(*b), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_responding_overrides_aura_regardless_of_emotion() {
        let signal = HostSignal::default().responding(true).with_hint("assertive");
        let frame = frame_for(&signal, Duration::ZERO);
        assert_eq!(frame.emotion, EmotionTag::Serious);
        assert_eq!(frame.aura.pulse_period_secs, RESPONDING_PULSE_PERIOD.as_secs_f32());
        assert_eq!(frame.aura.stroke_width, 2.0);
    }

    #[test]
    fn test_responding_mouth_animates() {
        let signal = HostSignal::default().responding(true);
        let first = frame_for(&signal, Duration::ZERO).mouth;
        let later = frame_for(&signal, Duration::from_millis(250)).mouth;

        assert_eq!(first.shape, MouthShape::Responding);
        assert!(first.glow);
        assert_eq!(first.curve.to_path(), "M35 75 Q 50 80 65 75");
        assert_ne!(first.curve, later.curve);

        // openness stays within 5 ± 8, width within 30 ± 5
        for ms in (0..5_000).step_by(37) {
            let mouth = frame_for(&signal, Duration::from_millis(ms)).mouth;
            let openness = mouth.curve.control.y - 75.0;
            let width = mouth.curve.end.x - mouth.curve.start.x;
            assert!((-3.0..=13.0).contains(&openness));
            assert!((25.0 - 1e-4..=35.0 + 1e-4).contains(&width));
        }
    }

    #[test]
    fn test_mouth_policy_reads_raw_flags() {
        let cases = [
            (HostSignal::default(), MouthShape::Idle),
            (HostSignal::default().typing(true), MouthShape::Typing),
            (HostSignal::default().responding(true), MouthShape::Responding),
            (HostSignal::default().idle(true), MouthShape::Background),
            (HostSignal::default().idle(true).responding(true), MouthShape::Responding),
            // Resolved mode is Typing but the mouth rests
            (HostSignal::default().idle(true).typing(true), MouthShape::Background),
        ];
        for (signal, expected) in cases {
            assert_eq!(mouth_shape(&signal), expected, "{signal:?}");
        }
    }

    #[test]
    fn test_typing_damps_pupil_travel() {
        let gaze = ParallaxVector::new(1.0, 0.0);
        let idle = compose(
            &HostSignal::default(),
            ExpressiveMode::Idle,
            EmotionTag::Neutral,
            &gaze,
            Duration::ZERO,
        );
        let typing = compose(
            &HostSignal::default().typing(true),
            ExpressiveMode::Typing,
            EmotionTag::Curious,
            &gaze,
            Duration::ZERO,
        );
        assert_eq!(idle.eyes.left.pupil_center.x, 41.0);
        assert_eq!(typing.eyes.left.pupil_center.x, 37.0);
        assert_eq!(idle.head.tilt.rotate_y, 10.0);
    }

    #[test]
    fn test_aura_rotation_wraps() {
        let frame = frame_for(&HostSignal::default(), Duration::from_secs(31));
        // 31 s * 12 deg/s = 372 deg
        assert!((frame.aura.rotation_deg - 12.0).abs() < 1e-3);
    }
}
