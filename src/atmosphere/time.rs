//! Day/night cycle tracking with day counting.

use serde::{Deserialize, Serialize};

use crate::core::Millis;

/// Discrete phase of the day, used for the sky palette and the clock icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPhase {
    Dawn,
    Day,
    Dusk,
    Night,
}

impl DayPhase {
    /// Phase for a cycle position in `[0, 1)`.
    pub fn from_time_of_day(t: f32) -> Self {
        match t {
            t if (0.2..0.3).contains(&t) => DayPhase::Dawn,
            t if (0.3..0.7).contains(&t) => DayPhase::Day,
            t if (0.7..0.8).contains(&t) => DayPhase::Dusk,
            _ => DayPhase::Night,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DayPhase::Dawn => "🌅",
            DayPhase::Day => "☀️",
            DayPhase::Dusk => "🌇",
            DayPhase::Night => "🌙",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayPhase::Dawn => "dawn",
            DayPhase::Day => "day",
            DayPhase::Dusk => "dusk",
            DayPhase::Night => "night",
        }
    }
}

/// Tracks the position within a repeating day cycle plus elapsed day count.
#[derive(Clone, Debug)]
pub struct DayCycle {
    /// Current position, in the range `[0.0, 1.0)`.
    time_of_day: f32,
    /// Number of full days that have elapsed.
    day_count: u32,
}

impl DayCycle {
    /// Create a cycle starting at the given position (wrapped into `[0, 1)`).
    pub fn new(start: f32) -> Self {
        let mut cycle = Self {
            time_of_day: 0.0,
            day_count: 0,
        };
        cycle.set(start);
        cycle
    }

    /// Advance by `dt_ms` of simulation time, where `cycle_ms` is the length
    /// of one full day. A non-positive cycle length pauses time.
    pub fn advance(&mut self, dt_ms: Millis, cycle_ms: Millis) {
        if cycle_ms <= 0.0 || !dt_ms.is_finite() {
            return;
        }
        let mut t = self.time_of_day as f64 + dt_ms / cycle_ms;

        // Handle wrapping
        while t >= 1.0 {
            t -= 1.0;
            self.day_count += 1;
        }
        while t < 0.0 {
            t += 1.0;
            self.day_count = self.day_count.saturating_sub(1);
        }
        self.time_of_day = wrap_unit(t as f32);
    }

    /// Jump to a cycle position. Non-finite input resets to midnight.
    pub fn set(&mut self, t: f32) {
        self.time_of_day = if t.is_finite() { wrap_unit(t) } else { 0.0 };
    }

    /// Current position in the range `[0.0, 1.0)`.
    #[inline]
    pub fn time_of_day(&self) -> f32 {
        self.time_of_day
    }

    /// Number of full days that have passed.
    #[inline]
    pub fn day_count(&self) -> u32 {
        self.day_count
    }

    /// Whether the clock is in the night band (`< 0.25` or `> 0.75`).
    #[inline]
    pub fn is_night(&self) -> bool {
        self.time_of_day < 0.25 || self.time_of_day > 0.75
    }

    #[inline]
    pub fn phase(&self) -> DayPhase {
        DayPhase::from_time_of_day(self.time_of_day)
    }

    /// 24-hour clock string, `HH:MM`.
    pub fn clock_string(&self) -> String {
        let minutes = (self.time_of_day * 24.0 * 60.0).floor() as u32 % (24 * 60);
        format!("{:02}:{:02}", minutes / 60, minutes % 60)
    }
}

/// Wrap into `[0, 1)`, guarding against `rem_euclid` rounding up to 1.0.
fn wrap_unit(t: f32) -> f32 {
    let w = t.rem_euclid(1.0);
    if w >= 1.0 { 0.0 } else { w }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_wraps_and_counts_days() {
        let mut cycle = DayCycle::new(0.9);
        cycle.advance(20_000.0, 100_000.0);
        assert!((cycle.time_of_day() - 0.1).abs() < 1e-5);
        assert_eq!(cycle.day_count(), 1);
    }

    #[test]
    fn test_paused_when_cycle_zero() {
        let mut cycle = DayCycle::new(0.4);
        cycle.advance(5_000.0, 0.0);
        assert_eq!(cycle.time_of_day(), 0.4);
    }

    #[test]
    fn test_time_of_day_stays_in_unit_range() {
        let mut cycle = DayCycle::new(0.0);
        for _ in 0..10_000 {
            cycle.advance(16.6, 3_000.0);
            let t = cycle.time_of_day();
            assert!((0.0..1.0).contains(&t), "t = {t}");
        }
    }

    #[test]
    fn test_night_bands() {
        assert!(DayCycle::new(0.1).is_night());
        assert!(DayCycle::new(0.8).is_night());
        assert!(!DayCycle::new(0.25).is_night());
        assert!(!DayCycle::new(0.5).is_night());
        assert!(!DayCycle::new(0.75).is_night());
    }

    #[test]
    fn test_phases() {
        assert_eq!(DayPhase::from_time_of_day(0.1), DayPhase::Night);
        assert_eq!(DayPhase::from_time_of_day(0.22), DayPhase::Dawn);
        assert_eq!(DayPhase::from_time_of_day(0.5), DayPhase::Day);
        assert_eq!(DayPhase::from_time_of_day(0.75), DayPhase::Dusk);
        assert_eq!(DayPhase::from_time_of_day(0.95), DayPhase::Night);
    }

    #[test]
    fn test_clock_string() {
        assert_eq!(DayCycle::new(0.5).clock_string(), "12:00");
        assert_eq!(DayCycle::new(0.0).clock_string(), "00:00");
        assert_eq!(DayCycle::new(0.75).clock_string(), "18:00");
        assert_eq!(DayCycle::new(-0.25).clock_string(), "18:00");
    }
}
