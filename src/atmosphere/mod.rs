//! Unified atmosphere and weather physics.
//!
//! Provides the weather preset table, smoothed wind, the day/night cycle,
//! ground accumulation, and the lightning/aurora effects. The main entry
//! point is [`AtmosphereSystem`] which is updated once per tick and produces
//! an [`AtmosphereState`] snapshot.

pub mod color_ramp;
pub mod config;
pub mod effects;
pub mod ground;
pub mod state;
pub mod time;
pub mod weather;
pub mod wind;

// Re-exports
pub use color_ramp::ColorRamp;
pub use config::{AtmosphereConfig, DirectionWaves, GroundConfig, LightningConfig};
pub use ground::{GroundState, Puddle, PuddleMap};
pub use state::AtmosphereState;
pub use time::{DayCycle, DayPhase};
pub use weather::{DEFAULT_PRESET, WeatherPreset, WeatherTable};
pub use wind::{DirectionField, WindState};

use std::collections::HashSet;

use rand::Rng;

use crate::core::Millis;
use effects::{AuroraState, LightningFlash};

// ---------------------------------------------------------------------------
// AtmosphereSystem
// ---------------------------------------------------------------------------

/// Main atmosphere system. Call [`update`](Self::update) once per tick, then
/// read the resulting [`state`](Self::state).
pub struct AtmosphereSystem {
    config: AtmosphereConfig,
    table: WeatherTable,
    /// Requested weather name, possibly unknown to the table.
    weather: String,
    cycle: DayCycle,
    direction: DirectionField,
    wind: WindState,
    ground: GroundState,
    lightning: LightningFlash,
    aurora: AuroraState,
    /// Unknown names already reported, so each is logged once.
    warned_unknown: HashSet<String>,
    state: AtmosphereState,
}

impl AtmosphereSystem {
    /// Create a new atmosphere system. Wind starts settled at the initial
    /// preset's targets.
    pub fn new(config: AtmosphereConfig, table: WeatherTable) -> Self {
        let weather = config.initial_weather.clone();
        let preset = table.get(&weather);
        let mut wind = WindState::new(preset.speed, preset.force);
        let direction = DirectionField::new(config.direction.clone());
        wind.direction = direction.sample(0.0);

        let mut sys = Self {
            cycle: DayCycle::new(config.start_time_of_day),
            direction,
            wind,
            ground: GroundState::default(),
            lightning: LightningFlash::default(),
            aurora: AuroraState::default(),
            warned_unknown: HashSet::new(),
            state: AtmosphereState::default(),
            config,
            table,
            weather: String::new(),
        };
        sys.set_weather(&weather);
        sys.recompute_state();
        sys
    }

    /// Advance one tick. `dt_ms` moves the day cycle, `elapsed_ms` drives the
    /// background direction wave and wind drift.
    pub fn update(&mut self, dt_ms: Millis, elapsed_ms: Millis, rng: &mut impl Rng) {
        self.cycle.advance(dt_ms, self.config.day_cycle_ms);

        let preset = self.table.get(&self.weather);
        let factor = self.config.effective_smoothing();
        self.wind.smooth_toward(preset.speed, preset.force, factor);

        self.wind.direction = match preset.direction {
            Some(pinned) if self.config.honor_preset_direction => pinned,
            _ => self.direction.sample(elapsed_ms),
        };
        self.wind.advance(elapsed_ms);

        self.ground.update(preset, &self.config.ground);

        if self.lightning.update(preset.lightning, &self.config.lightning, rng) {
            log::debug!("Lightning strike");
        }
        self.aurora.update(preset.aurora, self.config.aurora_fade);

        self.recompute_state();
    }

    /// Current atmosphere state.
    #[inline]
    pub fn state(&self) -> &AtmosphereState {
        &self.state
    }

    /// Immutable reference to the configuration.
    #[inline]
    pub fn config(&self) -> &AtmosphereConfig {
        &self.config
    }

    #[inline]
    pub fn table(&self) -> &WeatherTable {
        &self.table
    }

    /// Select the active weather. Unknown names are kept (so the host can
    /// read back what it asked for) but resolve to the default preset.
    pub fn set_weather(&mut self, name: &str) {
        if name == self.weather {
            return;
        }
        let resolved = self.table.resolve(name);
        if resolved.known {
            log::info!("Weather changed: {} -> {}", display_name(&self.weather), name);
        } else if self.warned_unknown.insert(name.to_string()) {
            log::warn!("Unknown weather '{}', using '{}'", name, resolved.key);
        }
        self.weather = name.to_string();
    }

    /// Name last passed to [`set_weather`](Self::set_weather).
    #[inline]
    pub fn weather_name(&self) -> &str {
        &self.weather
    }

    /// Preset currently in effect (the default one for unknown names).
    pub fn preset(&self) -> &WeatherPreset {
        self.table.get(&self.weather)
    }

    /// Jump the day cycle to a position and immediately recompute state.
    pub fn set_time_of_day(&mut self, t: f32) {
        self.cycle.set(t);
        self.recompute_state();
    }

    #[inline]
    pub fn wind(&self) -> &WindState {
        &self.wind
    }

    #[inline]
    pub fn ground(&self) -> &GroundState {
        &self.ground
    }

    /// Night by the clock, or forced by the preset.
    pub fn is_night(&self) -> bool {
        self.cycle.is_night() || self.preset().night
    }

    /// Garden clock as `HH:MM`.
    pub fn clock_string(&self) -> String {
        self.cycle.clock_string()
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn recompute_state(&mut self) {
        let preset = self.table.get(&self.weather);
        let is_night = self.cycle.is_night() || preset.night;
        let t = self.cycle.time_of_day();

        // Forced-night presets get the midnight darkness regardless of clock
        let darkness = if preset.night {
            self.config.darkness_ramp.sample(0.0)
        } else {
            self.config.darkness_ramp.sample(t)
        };

        self.state = AtmosphereState {
            weather: self.weather.clone(),
            label: preset.display_label(is_night).to_string(),
            visibility: crate::core::clamp01(preset.visibility),
            dark: preset.dark,
            tint: preset.tint,
            time_of_day: t,
            day_count: self.cycle.day_count(),
            is_night,
            phase: if preset.night { DayPhase::Night } else { self.cycle.phase() },
            wind: self.wind,
            ground: self.ground,
            lightning: self.lightning.opacity(),
            aurora: self.aurora.opacity(),
            aurora_phase: self.aurora.phase(),
            darkness: crate::core::clamp01(darkness),
        };
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() { "<none>" } else { name }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn system() -> AtmosphereSystem {
        AtmosphereSystem::new(AtmosphereConfig::default(), WeatherTable::builtin())
    }

    fn run(sys: &mut AtmosphereSystem, ticks: usize, rng: &mut StdRng) {
        for i in 0..ticks {
            sys.update(16.0, i as f64 * 16.0, rng);
        }
    }

    #[test]
    fn test_starts_settled_on_initial_weather() {
        let sys = system();
        let sunny = WeatherTable::builtin().get("sunny").clone();
        assert_eq!(sys.weather_name(), "sunny");
        assert!((sys.wind().speed - sunny.speed).abs() < 1e-6);
        assert!((sys.wind().force - sunny.force).abs() < 1e-6);
        assert_eq!(sys.state().label, "☀️ Sunny");
    }

    #[test]
    fn test_speed_and_force_converge_monotonically() {
        let mut rng = StdRng::seed_from_u64(9);
        let table = WeatherTable::builtin();
        for name in table.names() {
            let mut sys = system();
            sys.set_weather(name);
            let target = table.get(name);
            let mut speed_gap = (sys.wind().speed - target.speed).abs();
            let mut force_gap = (sys.wind().force - target.force).abs();
            for i in 0..600 {
                sys.update(16.0, i as f64 * 16.0, &mut rng);
                let s = (sys.wind().speed - target.speed).abs();
                let f = (sys.wind().force - target.force).abs();
                assert!(s <= speed_gap + 1e-6, "{name}: speed gap grew {speed_gap} -> {s}");
                assert!(f <= force_gap + 1e-6, "{name}: force gap grew {force_gap} -> {f}");
                speed_gap = s;
                force_gap = f;
            }
        }
    }

    #[test]
    fn test_unknown_weather_uses_default_without_nan() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut sys = system();
        sys.set_weather("plague_of_frogs");
        run(&mut sys, 300, &mut rng);
        let s = sys.state();
        assert_eq!(s.weather, "plague_of_frogs");
        assert_eq!(s.label, "Unknown");
        assert!(s.wind.speed.is_finite() && s.wind.force.is_finite());
        assert!(s.wind.direction.is_finite() && s.wind.accumulator.is_finite());
    }

    #[test]
    fn test_direction_independent_of_preset_by_default() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut a = system();
        let mut b = system();
        b.set_weather("tornado");
        run(&mut a, 50, &mut rng);
        run(&mut b, 50, &mut rng);
        assert_eq!(a.wind().direction, b.wind().direction);
    }

    #[test]
    fn test_pinned_direction_when_honored() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut preset = WeatherPreset::calm("Westerly", 0.05, 0.4, 15.0, 0.0, 1.0);
        preset.direction = Some(-1.0);
        let table = WeatherTable::new([("westerly".to_string(), preset)]);
        let config = AtmosphereConfig {
            honor_preset_direction: true,
            initial_weather: "westerly".into(),
            ..AtmosphereConfig::default()
        };
        let mut sys = AtmosphereSystem::new(config, table);
        run(&mut sys, 10, &mut rng);
        assert_eq!(sys.wind().direction, -1.0);
    }

    #[test]
    fn test_meteor_shower_forces_night() {
        let mut sys = system();
        sys.set_time_of_day(0.5);
        assert!(!sys.is_night());
        sys.set_weather("meteor_shower");
        sys.set_time_of_day(0.5);
        assert!(sys.is_night());
        assert!(sys.state().is_night);
        assert_eq!(sys.state().phase, DayPhase::Night);
    }

    #[test]
    fn test_night_label_follows_clock() {
        let mut sys = system();
        sys.set_time_of_day(0.9);
        assert_eq!(sys.state().label, "🌙 Clear Night");
        sys.set_time_of_day(0.4);
        assert_eq!(sys.state().label, "☀️ Sunny");
    }

    #[test]
    fn test_accumulator_never_decreases() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sys = system();
        let mut last = sys.wind().accumulator;
        for (i, name) in ["storm", "fog", "tornado", "sunny"].iter().cycle().take(400).enumerate() {
            sys.set_weather(name);
            sys.update(16.0, i as f64 * 16.0, &mut rng);
            assert!(sys.wind().accumulator >= last);
            last = sys.wind().accumulator;
        }
    }

    #[test]
    fn test_levels_clamped_in_state() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut sys = system();
        for name in ["hurricane", "blizzard", "thunderstorm", "aurora_borealis", "dust_storm"] {
            sys.set_weather(name);
            for i in 0..400 {
                sys.update(16.0, i as f64 * 16.0, &mut rng);
                let s = sys.state();
                for v in [s.ground.puddle_level, s.ground.snow_level, s.lightning, s.aurora, s.darkness] {
                    assert!((0.0..=1.0).contains(&v));
                }
            }
        }
    }

    #[test]
    fn test_time_paused_no_advance() {
        let mut rng = StdRng::seed_from_u64(1);
        let config = AtmosphereConfig {
            day_cycle_ms: 0.0,
            ..AtmosphereConfig::default()
        };
        let mut sys = AtmosphereSystem::new(config, WeatherTable::builtin());
        let t0 = sys.state().time_of_day;
        run(&mut sys, 100, &mut rng);
        assert!((t0 - sys.state().time_of_day).abs() < 1e-6);
    }
}
