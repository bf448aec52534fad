//! Debug protocol - JSON command/response definitions

use serde::{Deserialize, Serialize};

/// Commands sent from a debug client to the debug server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum DebugCommand {
    /// Health check
    Ping,
    /// Force the active weather preset by name
    SetWeather { name: String },
    /// Return to the weather reported by the plant data source
    ClearWeatherOverride,
    /// Get the current wind / ground / day-cycle state
    GetPhysicsState,
    /// Get FPS statistics (1s/5s/15s averages with min/max)
    GetFpsStats,
    /// Take a screenshot of the last composed frame (returns base64 PNG)
    TakeScreenshot,
    /// Number of plants in the current snapshot
    GetPlantCount,
}

/// Responses from debug server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum DebugResponse {
    #[serde(rename = "ok")]
    Ok { data: ResponseData },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Response data variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    Pong { message: String },
    Screenshot {
        width: u32,
        height: u32,
        png_base64: String,
    },
    PhysicsState(PhysicsInfo),
    FpsStats {
        current_fps: f32,
        frame_count: u64,
        one_sec: FpsWindowInfo,
        five_sec: FpsWindowInfo,
        fifteen_sec: FpsWindowInfo,
    },
    PlantCount { count: usize },
    None,
}

/// Snapshot of the simulation's physics state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhysicsInfo {
    pub weather: String,
    pub speed: f32,
    pub force: f32,
    pub direction: f32,
    pub accumulator: f32,
    pub time_of_day: f32,
    pub is_night: bool,
    pub puddle_level: f32,
    pub snow_level: f32,
    pub particle_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpsWindowInfo {
    pub avg: f32,
    pub min: f32,
    pub max: f32,
}

impl DebugResponse {
    pub fn ok(data: ResponseData) -> Self {
        Self::Ok { data }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::Error {
            message: msg.into(),
        }
    }

    pub fn pong() -> Self {
        Self::ok(ResponseData::Pong {
            message: "pong".into(),
        })
    }

    pub fn none() -> Self {
        Self::ok(ResponseData::None)
    }
}
