//! Weather presets and the name → preset lookup table.
//!
//! Presets are immutable after load. Looking up an unknown name never fails:
//! it resolves to the table's `default` entry.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{Color, Error, Result};

/// Key of the fallback preset every table carries.
pub const DEFAULT_PRESET: &str = "default";

/// Physical parameters of one named weather.
///
/// All numeric fields are rates or coefficients in author-chosen units.
/// Absent optional fields mean "no effect": a missing rate never spawns its
/// particle class.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPreset {
    pub label: String,
    /// Label shown instead of `label` at night.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub night_label: Option<String>,
    /// Target phase speed of the wind waveform.
    pub speed: f32,
    /// Target wind force.
    pub force: f32,
    /// Temperature; below zero snow accumulates on the ground.
    pub temp: f32,
    /// Positive dries puddles, negative fills them.
    pub dry_speed: f32,
    /// 1.0 = clear air, lower values fog the scene.
    #[serde(alias = "vis")]
    pub visibility: f32,
    /// Rain drops spawned per frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_rate: Option<u32>,
    /// Snow flakes spawned per frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snow_rate: Option<u32>,
    /// Hail stones spawned per frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hail_rate: Option<u32>,
    /// Ash flakes spawned per frame.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ash_rate: Option<u32>,
    /// Presence enables meteors at a fixed low per-frame chance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meteor_rate: Option<f32>,
    /// Per-frame probability of spawning one debris piece.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debris: Option<f32>,
    #[serde(default)]
    pub dark: bool,
    /// Forces night visuals regardless of the day cycle.
    #[serde(default)]
    pub night: bool,
    #[serde(default)]
    pub lightning: bool,
    #[serde(default)]
    pub aurora: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint: Option<Color>,
    /// Pinned wind direction, honored only when the atmosphere is configured
    /// to respect preset directions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<f32>,
}

impl WeatherPreset {
    /// Minimal preset with every optional effect absent.
    pub fn calm(label: &str, speed: f32, force: f32, temp: f32, dry_speed: f32, visibility: f32) -> Self {
        Self {
            label: label.to_string(),
            night_label: None,
            speed,
            force,
            temp,
            dry_speed,
            visibility,
            rain_rate: None,
            snow_rate: None,
            hail_rate: None,
            ash_rate: None,
            meteor_rate: None,
            debris: None,
            dark: false,
            night: false,
            lightning: false,
            aurora: false,
            tint: None,
            direction: None,
        }
    }

    pub fn is_freezing(&self) -> bool {
        self.temp < 0.0
    }

    /// Whether anything falls from the sky under this preset.
    pub fn has_precipitation(&self) -> bool {
        [self.rain_rate, self.snow_rate, self.hail_rate, self.ash_rate]
            .iter()
            .any(|r| r.is_some_and(|n| n > 0))
    }

    /// Label to display, night-adjusted when the preset declares one.
    pub fn display_label(&self, is_night: bool) -> &str {
        match (&self.night_label, is_night) {
            (Some(night), true) => night,
            _ => &self.label,
        }
    }

    /// Replace non-finite numeric fields with the fallback's values so a bad
    /// config entry can never feed NaN into the physics.
    fn sanitized(mut self, fallback: &WeatherPreset) -> Self {
        let fix = |v: &mut f32, f: f32| {
            if !v.is_finite() {
                *v = f;
            }
        };
        fix(&mut self.speed, fallback.speed);
        fix(&mut self.force, fallback.force);
        fix(&mut self.temp, fallback.temp);
        fix(&mut self.dry_speed, fallback.dry_speed);
        fix(&mut self.visibility, fallback.visibility);
        self.debris = self.debris.filter(|p| p.is_finite());
        self.meteor_rate = self.meteor_rate.filter(|r| r.is_finite());
        self.direction = self.direction.filter(|d| d.is_finite());
        self
    }
}

/// Result of resolving a weather name.
#[derive(Clone, Copy, Debug)]
pub struct Resolved<'a> {
    /// Key of the preset actually used.
    pub key: &'a str,
    pub preset: &'a WeatherPreset,
    /// False when the requested name was unknown and the default was used.
    pub known: bool,
}

/// Immutable name → preset table with a guaranteed default entry.
#[derive(Clone, Debug)]
pub struct WeatherTable {
    presets: HashMap<String, WeatherPreset>,
    /// The `default` entry, held outside the map so lookups cannot miss it.
    fallback: WeatherPreset,
}

impl WeatherTable {
    /// Build a table from entries. A missing `default` entry is filled in
    /// with the built-in one.
    pub fn new(entries: impl IntoIterator<Item = (String, WeatherPreset)>) -> Self {
        let stock = builtin_default();
        let mut presets: HashMap<String, WeatherPreset> = entries
            .into_iter()
            .map(|(k, p)| (k, p.sanitized(&stock)))
            .collect();
        let fallback = presets.remove(DEFAULT_PRESET).unwrap_or(stock);
        Self { presets, fallback }
    }

    /// Table of the stock presets.
    pub fn builtin() -> Self {
        Self::new(builtin_presets())
    }

    /// Parse a JSON object mapping weather names to presets.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let map: HashMap<String, WeatherPreset> = serde_json::from_str(json)?;
        if map.is_empty() {
            return Err(Error::Config("weather table is empty".into()));
        }
        Ok(Self::new(map))
    }

    /// Look up a preset, falling back to the default for unknown names.
    pub fn get(&self, name: &str) -> &WeatherPreset {
        self.resolve(name).preset
    }

    pub fn resolve<'a>(&'a self, name: &str) -> Resolved<'a> {
        match self.presets.get_key_value(name) {
            Some((key, preset)) => Resolved { key, preset, known: true },
            None if name == DEFAULT_PRESET => Resolved {
                key: DEFAULT_PRESET,
                preset: &self.fallback,
                known: true,
            },
            None => Resolved {
                key: DEFAULT_PRESET,
                preset: &self.fallback,
                known: false,
            },
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        name == DEFAULT_PRESET || self.presets.contains_key(name)
    }

    /// All preset names including `default`, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.presets.keys().map(String::as_str).collect();
        names.push(DEFAULT_PRESET);
        names.sort_unstable();
        names
    }

    /// Number of presets including `default`; never zero.
    pub fn len(&self) -> usize {
        self.presets.len() + 1
    }
}

impl Default for WeatherTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_default() -> WeatherPreset {
    WeatherPreset::calm("Unknown", 0.01, 0.05, 20.0, 0.001, 1.0)
}

/// The stock presets.
pub fn builtin_presets() -> Vec<(String, WeatherPreset)> {
    let p = WeatherPreset::calm;
    let tint = |hex: &str| Color::from_hex(hex);

    let entries = vec![
        ("sunny", WeatherPreset { night_label: Some("🌙 Clear Night".into()), ..p("☀️ Sunny", 0.01, 0.10, 20.0, 0.01, 1.0) }),
        ("cloudy", p("☁️ Cloudy", 0.02, 0.20, 15.0, 0.001, 0.9)),
        ("breeze", WeatherPreset { debris: Some(0.2), ..p("🍃 Breeze", 0.05, 0.40, 18.0, 0.01, 1.0) }),
        ("gale", WeatherPreset { debris: Some(0.6), ..p("💨 Gale", 0.35, 1.20, 12.0, 0.02, 0.8) }),
        ("rain", WeatherPreset { rain_rate: Some(5), ..p("🌧️ Rain", 0.04, 0.30, 12.0, -0.01, 0.8) }),
        ("storm", WeatherPreset { rain_rate: Some(15), dark: true, ..p("⛈️ Storm", 0.20, 0.80, 10.0, -0.02, 0.6) }),
        ("thunderstorm", WeatherPreset { rain_rate: Some(20), dark: true, lightning: true, ..p("⚡ Thunderstorm", 0.25, 0.90, 10.0, -0.03, 0.5) }),
        ("hurricane", WeatherPreset { rain_rate: Some(40), dark: true, debris: Some(1.0), ..p("🌀 Hurricane", 0.50, 1.50, 15.0, -0.05, 0.4) }),
        ("snow", WeatherPreset { snow_rate: Some(5), dark: true, ..p("🌨️ Snow", 0.02, 0.10, -5.0, 0.001, 0.7) }),
        ("blizzard", WeatherPreset { snow_rate: Some(20), dark: true, ..p("❄️ Blizzard", 0.40, 1.00, -15.0, 0.0, 0.2) }),
        ("hail", WeatherPreset { hail_rate: Some(15), dark: true, ..p("☄️ Hail", 0.15, 0.50, 0.0, -0.01, 0.8) }),
        ("fog", WeatherPreset { dark: true, ..p("🌫️ Fog", 0.005, 0.05, 10.0, -0.001, 0.2) }),
        ("tornado", WeatherPreset { debris: Some(1.0), dark: true, tint: tint("#2a2a2a"), ..p("🌪️ Tornado", 0.60, 2.00, 15.0, 0.0, 0.5) }),
        ("dust_storm", WeatherPreset { debris: Some(0.5), tint: tint("#d68e31"), ..p("🏜️ Dust Storm", 0.30, 0.60, 30.0, 0.05, 0.3) }),
        ("volcanic_ash", WeatherPreset { ash_rate: Some(10), tint: tint("#3d3d3d"), ..p("🌋 Volcanic Ash", 0.05, 0.10, 5.0, 0.01, 0.4) }),
        ("meteor_shower", WeatherPreset { meteor_rate: Some(1.0), dark: true, night: true, ..p("🌠 Meteor Shower", 0.01, 0.05, 10.0, 0.005, 1.0) }),
        ("aurora_borealis", WeatherPreset { dark: true, aurora: true, ..p("🌌 Aurora", 0.01, 0.05, -10.0, 0.0, 1.0) }),
        (DEFAULT_PRESET, builtin_default()),
    ];

    entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_default_and_stock_names() {
        let table = WeatherTable::builtin();
        assert!(table.contains(DEFAULT_PRESET));
        for name in ["sunny", "rain", "thunderstorm", "blizzard", "tornado", "meteor_shower", "gale"] {
            assert!(table.contains(name), "missing {name}");
        }
        assert_eq!(table.len(), 18);
    }

    #[test]
    fn test_unknown_name_falls_back_to_default() {
        let table = WeatherTable::builtin();
        let r = table.resolve("acid_rain");
        assert!(!r.known);
        assert_eq!(r.key, DEFAULT_PRESET);
        assert_eq!(r.preset.label, "Unknown");
        assert!(r.preset.speed.is_finite() && r.preset.force.is_finite());
    }

    #[test]
    fn test_custom_default_overrides_builtin() {
        let mut custom = WeatherPreset::calm("Haze", 0.02, 0.1, 18.0, 0.0, 0.7);
        custom.tint = Color::from_hex("#ccbb99");
        let table = WeatherTable::new([(DEFAULT_PRESET.to_string(), custom.clone())]);
        let r = table.resolve(DEFAULT_PRESET);
        assert!(r.known);
        assert_eq!(r.preset, &custom);
        assert_eq!(table.get("nope").label, "Haze");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_missing_rates_mean_no_effect() {
        let table = WeatherTable::builtin();
        let sunny = table.get("sunny");
        assert!(sunny.rain_rate.is_none());
        assert!(sunny.debris.is_none());
        assert!(!sunny.has_precipitation());
        assert!(table.get("rain").has_precipitation());
    }

    #[test]
    fn test_night_label() {
        let table = WeatherTable::builtin();
        assert_eq!(table.get("sunny").display_label(false), "☀️ Sunny");
        assert_eq!(table.get("sunny").display_label(true), "🌙 Clear Night");
        assert_eq!(table.get("rain").display_label(true), "🌧️ Rain");
    }

    #[test]
    fn test_from_json_original_field_names() {
        let json = r##"{
            "drizzle": { "label": "Drizzle", "speed": 0.03, "force": 0.2, "temp": 11,
                         "drySpeed": -0.005, "vis": 0.9, "rainRate": 2, "tint": "#8899aa" }
        }"##;
        let table = WeatherTable::from_json_str(json).unwrap();
        let d = table.get("drizzle");
        assert_eq!(d.rain_rate, Some(2));
        assert!((d.visibility - 0.9).abs() < 1e-6);
        assert!((d.dry_speed + 0.005).abs() < 1e-6);
        assert_eq!(d.tint, Color::from_hex("#8899aa"));
        // Default filled in even though the file did not declare one
        assert!(table.contains(DEFAULT_PRESET));
    }

    #[test]
    fn test_from_json_rejects_empty_and_malformed() {
        assert!(matches!(WeatherTable::from_json_str("{}"), Err(Error::Config(_))));
        assert!(matches!(WeatherTable::from_json_str("{\"x\": 3}"), Err(Error::Json(_))));
    }

    #[test]
    fn test_names_sorted() {
        let table = WeatherTable::builtin();
        let names = table.names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
