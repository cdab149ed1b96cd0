//! Mode Resolver
//!
//! Derives the avatar's discrete expressive mode and emotion from the raw
//! host flags. Both are recomputed every frame; nothing here is cached.
//!
//! # Precedence
//!
//! Highest first: `Responding` > `Typing` > `Background` (idle) > `Idle`.
//!
//! # Emotion
//!
//! - `Typing` always reads as `Curious`
//! - `Background` with a pending alert reads as `Serious`
//! - otherwise the host's tone hint is looked up, defaulting to `Neutral`

use serde::{Deserialize, Serialize};

use crate::signal::HostSignal;

/// Discrete behavioral state driving which visual program runs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExpressiveMode {
    /// Attentive, following the pointer
    #[default]
    Idle,
    /// User is composing a message
    Typing,
    /// Awaiting or streaming a response
    Responding,
    /// Unattended: autonomous gaze and ambient particles
    Background,
}

impl ExpressiveMode {
    /// Whether this mode runs the autonomous (pointer-free) programs
    #[must_use]
    pub const fn is_background(self) -> bool {
        matches!(self, Self::Background)
    }

    /// Lowercase name, used for logs and surface class names
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Typing => "typing",
            Self::Responding => "responding",
            Self::Background => "background",
        }
    }
}

impl std::fmt::Display for ExpressiveMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emotional tint of the face
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EmotionTag {
    /// No particular tone
    #[default]
    Neutral,
    /// Assertive answers and pending alerts
    Serious,
    /// Hedged, careful answers
    Cautious,
    /// Relaxed
    Calm,
    /// Engaged, listening
    Curious,
    /// Deliberate, reasoning
    Analytical,
}

impl EmotionTag {
    /// Every emotion, in declaration order
    pub const ALL: [EmotionTag; 6] = [
        Self::Neutral,
        Self::Serious,
        Self::Cautious,
        Self::Calm,
        Self::Curious,
        Self::Analytical,
    ];

    /// Map a backend tone label onto an emotion
    ///
    /// Matching ignores case only. Unknown, empty, padded or missing labels
    /// map to [`EmotionTag::Neutral`]; this never fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use visage_core::EmotionTag;
    ///
    /// assert_eq!(EmotionTag::from_tone(Some("Assertive")), EmotionTag::Serious);
    /// assert_eq!(EmotionTag::from_tone(Some(" calm ")), EmotionTag::Neutral);
    /// assert_eq!(EmotionTag::from_tone(Some("jubilant")), EmotionTag::Neutral);
    /// assert_eq!(EmotionTag::from_tone(None), EmotionTag::Neutral);
    /// ```
    #[must_use]
    pub fn from_tone(tone: Option<&str>) -> Self {
        let Some(tone) = tone else {
            return Self::Neutral;
        };

        match tone.to_ascii_lowercase().as_str() {
            "assertive" => Self::Serious,
            "cautious" => Self::Cautious,
            "calm" => Self::Calm,
            "analytical" => Self::Analytical,
            "curious" => Self::Curious,
            _ => Self::Neutral,
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neutral => "neutral",
            Self::Serious => "serious",
            Self::Cautious => "cautious",
            Self::Calm => "calm",
            Self::Curious => "curious",
            Self::Analytical => "analytical",
        }
    }
}

impl std::fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve the expressive mode and emotion for one frame
///
/// Pure and total: identical input always yields identical output.
///
/// # Examples
///
/// ```
/// use visage_core::{resolve, EmotionTag, ExpressiveMode, HostSignal};
///
/// let signal = HostSignal::default().idle(true).alert(true);
/// assert_eq!(
///     resolve(&signal),
///     (ExpressiveMode::Background, EmotionTag::Serious)
/// );
/// ```
#[must_use]
pub fn resolve(signal: &HostSignal) -> (ExpressiveMode, EmotionTag) {
    let mode = resolve_mode(signal);
    (mode, resolve_emotion(signal, mode))
}

fn resolve_mode(signal: &HostSignal) -> ExpressiveMode {
    if signal.is_responding {
        ExpressiveMode::Responding
    } else if signal.is_typing {
        ExpressiveMode::Typing
    } else if signal.is_idle {
        ExpressiveMode::Background
    } else {
        ExpressiveMode::Idle
    }
}

fn resolve_emotion(signal: &HostSignal, mode: ExpressiveMode) -> EmotionTag {
    let hinted = || EmotionTag::from_tone(signal.emotion_hint.as_deref());

    match mode {
        ExpressiveMode::Typing => EmotionTag::Curious,
        ExpressiveMode::Background if signal.has_alert => EmotionTag::Serious,
        ExpressiveMode::Background | ExpressiveMode::Idle | ExpressiveMode::Responding => hinted(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_flag_combinations() -> impl Iterator<Item = HostSignal> {
        (0u8..32).map(|bits| HostSignal {
            is_typing: bits & 1 != 0,
            is_responding: bits & 2 != 0,
            is_idle: bits & 4 != 0,
            has_alert: bits & 8 != 0,
            emotion_hint: (bits & 16 != 0).then(|| "cautious".to_string()),
            ..HostSignal::default()
        })
    }

    #[test]
    fn test_responding_has_priority() {
        for signal in all_flag_combinations().filter(|s| s.is_responding) {
            assert_eq!(resolve(&signal).0, ExpressiveMode::Responding, "{signal:?}");
        }
    }

    #[test]
    fn test_background_law() {
        for signal in all_flag_combinations() {
            let expected = signal.is_idle && !signal.is_typing && !signal.is_responding;
            assert_eq!(resolve(&signal).0.is_background(), expected, "{signal:?}");
        }
    }

    #[test]
    fn test_typing_beats_idle_and_forces_curious() {
        let signal = HostSignal::default()
            .typing(true)
            .idle(true)
            .alert(true)
            .with_hint("assertive");
        assert_eq!(resolve(&signal), (ExpressiveMode::Typing, EmotionTag::Curious));
    }

    #[test]
    fn test_alert_only_matters_in_background() {
        let idle = HostSignal::default().alert(true).with_hint("calm");
        assert_eq!(resolve(&idle), (ExpressiveMode::Idle, EmotionTag::Calm));

        let responding = HostSignal::default()
            .responding(true)
            .idle(true)
            .alert(true)
            .with_hint("calm");
        assert_eq!(
            resolve(&responding),
            (ExpressiveMode::Responding, EmotionTag::Calm)
        );
    }

    #[test]
    fn test_background_without_alert_uses_hint() {
        let signal = HostSignal::default().idle(true).with_hint("analytical");
        assert_eq!(
            resolve(&signal),
            (ExpressiveMode::Background, EmotionTag::Analytical)
        );
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for signal in all_flag_combinations() {
            assert_eq!(resolve(&signal), resolve(&signal));
        }
    }

    #[test]
    fn test_tone_table() {
        let table = [
            ("assertive", EmotionTag::Serious),
            ("cautious", EmotionTag::Cautious),
            ("calm", EmotionTag::Calm),
            ("analytical", EmotionTag::Analytical),
            ("curious", EmotionTag::Curious),
            ("inconclusive", EmotionTag::Neutral),
            ("Assertive", EmotionTag::Serious),
            ("CALM", EmotionTag::Calm),
        ];
        for (tone, expected) in table {
            assert_eq!(EmotionTag::from_tone(Some(tone)), expected, "{tone}");
        }
    }

    #[test]
    fn test_unknown_tones_are_neutral() {
        for tone in ["", "   ", "angry", "calmly", "😀", "cautious!", "ANALYTIC", " calm ", "calm\n"] {
            assert_eq!(EmotionTag::from_tone(Some(tone)), EmotionTag::Neutral, "{tone}");
        }
    }

    #[test]
    fn test_emotion_names_are_not_tones() {
        // Only the six backend tones are recognized, not the tag names
        assert_eq!(EmotionTag::from_tone(Some("serious")), EmotionTag::Neutral);
        assert_eq!(EmotionTag::from_tone(Some("neutral")), EmotionTag::Neutral);
        for emotion in EmotionTag::ALL {
            if emotion != EmotionTag::Serious {
                assert_eq!(EmotionTag::from_tone(Some(emotion.as_str())), emotion);
            }
        }
    }
}
