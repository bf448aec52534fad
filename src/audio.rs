//! Audio feedback interface and the ambient mix model.
//!
//! The engine never produces sound itself. It tells an [`AudioSink`] which
//! one-shot effects to play and, once per tick, which weather is active so
//! the sink can fade its ambience loops. [`AmbientMix`] implements the level
//! model an audio backend drives its loop volumes from.

use serde::Serialize;

/// One-shot feedback effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundEffect {
    /// A plant was protected.
    Protect,
    /// A plant withered.
    Shatter,
}

impl SoundEffect {
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Protect => "protect",
            SoundEffect::Shatter => "shatter",
        }
    }
}

/// Receives sound requests from the tick.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Called once per tick with the active weather name.
    fn update(&mut self, weather: &str, is_night: bool);
}

/// Sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}

    fn update(&mut self, _weather: &str, _is_night: bool) {}
}

/// Looping ambience channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbientChannel {
    Rain,
    Wind,
    Crickets,
    Storm,
    Fire,
}

impl AmbientChannel {
    pub const ALL: [AmbientChannel; 5] = [
        AmbientChannel::Rain,
        AmbientChannel::Wind,
        AmbientChannel::Crickets,
        AmbientChannel::Storm,
        AmbientChannel::Fire,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Volume per channel, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AmbientLevels([f32; 5]);

impl AmbientLevels {
    pub fn get(&self, channel: AmbientChannel) -> f32 {
        self.0[channel.index()]
    }

    pub fn set(&mut self, channel: AmbientChannel, level: f32) {
        self.0[channel.index()] = crate::core::clamp01(level);
    }

    /// Target levels for a weather name, chosen by substring.
    pub fn target(weather: &str, is_night: bool) -> Self {
        let has = |s: &str| weather.contains(s);
        let mut levels = Self::default();
        levels.set(AmbientChannel::Wind, 0.3);

        if has("rain") {
            levels.set(AmbientChannel::Rain, 0.5);
            levels.set(AmbientChannel::Wind, 0.4);
        } else if has("storm") || has("thunder") {
            levels.set(AmbientChannel::Rain, 0.6);
            levels.set(AmbientChannel::Storm, 0.6);
            levels.set(AmbientChannel::Wind, 0.6);
        } else if has("breeze") || has("cloudy") {
            levels.set(AmbientChannel::Wind, 0.5);
        } else if has("gale") || has("hurricane") || has("tornado") {
            levels.set(AmbientChannel::Wind, 1.0);
            levels.set(AmbientChannel::Rain, 0.3);
        } else if has("blizzard") {
            levels.set(AmbientChannel::Wind, 0.8);
        }

        // Quiet nights only
        if is_night && !has("storm") && !has("rain") && !has("snow") {
            levels.set(AmbientChannel::Crickets, 0.4);
        }
        levels
    }
}

/// Per-tick fade step of every channel.
pub const FADE_STEP: f32 = 0.02;

/// Move `current` one step toward `target`, snapping when within a step.
pub fn fade_toward(current: f32, target: f32, step: f32) -> f32 {
    if (current - target).abs() < step {
        target
    } else if current < target {
        (current + step).min(1.0)
    } else {
        (current - step).max(0.0)
    }
}

/// Ambient mix state: current channel levels fading toward weather targets,
/// plus the effects requested since the last drain.
#[derive(Clone, Debug, Default)]
pub struct AmbientMix {
    levels: AmbientLevels,
    target: AmbientLevels,
    played: Vec<SoundEffect>,
}

impl AmbientMix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> AmbientLevels {
        self.levels
    }

    pub fn level(&self, channel: AmbientChannel) -> f32 {
        self.levels.get(channel)
    }

    pub fn target(&self) -> AmbientLevels {
        self.target
    }

    /// Effects played since the last call.
    pub fn drain_played(&mut self) -> Vec<SoundEffect> {
        std::mem::take(&mut self.played)
    }
}

impl AudioSink for AmbientMix {
    fn play(&mut self, effect: SoundEffect) {
        log::debug!("Sound effect: {}", effect.name());
        self.played.push(effect);
    }

    fn update(&mut self, weather: &str, is_night: bool) {
        self.target = AmbientLevels::target(weather, is_night);
        for channel in AmbientChannel::ALL {
            let next = fade_toward(self.levels.get(channel), self.target.get(channel), FADE_STEP);
            self.levels.set(channel, next);
        }
    }
}
