//! Simulated responses
//!
//! The terminal surface has no backend. Submitting input starts a fake
//! response of random length; when it finishes, a random tone arrives with
//! it and becomes the emotion hint, the way a real backend's response tone
//! would.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Tones a backend can attach to a response
pub const TONES: [&str; 6] = [
    "assertive",
    "cautious",
    "calm",
    "analytical",
    "curious",
    "inconclusive",
];

/// Shortest simulated response
const MIN_RESPONSE: Duration = Duration::from_millis(1_500);

/// Longest simulated response
const MAX_RESPONSE: Duration = Duration::from_millis(4_500);

/// Stand-in for a response backend
#[derive(Debug)]
pub struct Responder {
    rng: StdRng,
    /// When the in-flight response completes
    until: Option<Instant>,
    /// Tone of the last completed response
    tone: Option<&'static str>,
    /// Responses completed so far
    completed: u64,
}

impl Responder {
    /// Create a responder with entropy-seeded randomness
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create a responder with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            until: None,
            tone: None,
            completed: 0,
        }
    }

    /// Start a response; ignored while one is in flight
    pub fn submit(&mut self, prompt: &str, now: Instant) -> bool {
        if self.until.is_some() {
            return false;
        }
        let millis = self
            .rng
            .gen_range(MIN_RESPONSE.as_millis()..=MAX_RESPONSE.as_millis());
        let length = Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX));
        self.until = Some(now + length);
        tracing::debug!(chars = prompt.chars().count(), ?length, "Simulating response");
        true
    }

    /// Advance to `now`; returns whether a response is in flight
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.until {
            Some(until) if now >= until => {
                self.until = None;
                self.completed += 1;
                self.tone = TONES.choose(&mut self.rng).copied();
                tracing::debug!(tone = ?self.tone, "Response complete");
                false
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Whether a response is in flight (as of the last poll)
    pub fn is_responding(&self) -> bool {
        self.until.is_some()
    }

    /// Tone of the most recent response
    pub fn tone(&self) -> Option<&'static str> {
        self.tone
    }

    /// Responses completed so far
    pub fn completed(&self) -> u64 {
        self.completed
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::new()
    }
}
