//! Status readout pushed to the host UI once per tick.

use serde::Serialize;

use crate::atmosphere::{AtmosphereState, DayPhase};

/// Derived display values. Purely observational.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Readout {
    /// `HH:MM` on the garden clock.
    pub clock: String,
    pub phase: DayPhase,
    pub phase_icon: &'static str,
    /// Weather label, night-adjusted.
    pub weather_label: String,
    pub wind_kmh: u32,
    /// Wind arrow rotation in degrees.
    pub wind_arrow_deg: f32,
    pub plant_count: usize,
}

impl Readout {
    pub fn from_state(state: &AtmosphereState, clock: String, plant_count: usize) -> Self {
        Self {
            clock,
            phase: state.phase,
            phase_icon: state.phase.icon(),
            weather_label: state.label.clone(),
            wind_kmh: state.wind_kmh(),
            wind_arrow_deg: state.wind_arrow_degrees(),
            plant_count,
        }
    }
}

/// Host side of the readout.
pub trait ReadoutSink {
    fn publish(&mut self, readout: &Readout);
}

/// Sink that discards readouts.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReadout;

impl ReadoutSink for NullReadout {
    fn publish(&mut self, _readout: &Readout) {}
}

/// Keeps the most recent readout, for hosts that poll.
#[derive(Clone, Debug, Default)]
pub struct LatestReadout {
    latest: Option<Readout>,
}

impl LatestReadout {
    pub fn get(&self) -> Option<&Readout> {
        self.latest.as_ref()
    }
}

impl ReadoutSink for LatestReadout {
    fn publish(&mut self, readout: &Readout) {
        // Avoid reallocating when nothing changed
        if self.latest.as_ref() != Some(readout) {
            self.latest = Some(readout.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readout_from_state() {
        let mut state = AtmosphereState::default();
        state.label = "🌧️ Rain".into();
        state.wind.force = 0.2;
        state.wind.direction = 1.0;
        let r = Readout::from_state(&state, "12:00".into(), 3);
        assert_eq!(r.wind_kmh, 50);
        assert_eq!(r.wind_arrow_deg, 0.0);
        assert_eq!(r.weather_label, "🌧️ Rain");
        assert_eq!(r.phase, DayPhase::Day);
        assert_eq!(r.plant_count, 3);

        let mut sink = LatestReadout::default();
        sink.publish(&r);
        assert_eq!(sink.get(), Some(&r));
    }
}
