//! Sound signals
//!
//! The simulation only says *which* sound should play. Playback belongs to the
//! host, and `play` must return immediately.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Ship fired a bullet
    Shoot,
    /// A body was destroyed by a collision
    Explosion,
}

impl SoundEffect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoundEffect::Shoot => "shoot",
            SoundEffect::Explosion => "explosion",
        }
    }
}

/// Fire-and-forget playback capability owned by the host
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);
}

/// Sink that only logs, for headless runs
#[derive(Debug, Default)]
pub struct LogAudio {
    played: usize,
    muted: bool,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mute/unmute (muted sounds are dropped, not counted)
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Number of sounds played so far
    pub fn played(&self) -> usize {
        self.played
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect) {
        if self.muted {
            return;
        }
        self.played += 1;
        log::debug!("play sound: {}", effect.as_str());
    }
}
