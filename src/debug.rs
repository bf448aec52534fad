//! Bridge between the TCP debug server and a running garden.
//!
//! The server answers commands on its own runtime thread, so it never
//! touches the [`Garden`] directly. Requests are parked in a
//! [`SharedDebugState`] and applied by [`DebugBridge::apply`] on the tick
//! thread; [`DebugBridge::publish`] refreshes the read-only values the server
//! reports.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use verdant_debug::{DebugCommand, DebugHandler, DebugResponse, FpsWindowInfo, PhysicsInfo, ResponseData};

use crate::core::time::{FpsStats, FpsWindow};
use crate::scene::RasterSurface;
use crate::sim::Garden;

/// How long a screenshot request waits for the tick thread.
const SCREENSHOT_TIMEOUT: Duration = Duration::from_secs(2);
const SCREENSHOT_POLL: Duration = Duration::from_millis(10);

/// State shared by the debug server and the tick thread.
#[derive(Debug, Default)]
pub struct SharedDebugState {
    // Requests (set by the handler, consumed by the tick)
    pub set_weather: Option<String>,
    pub clear_weather_override: bool,
    pub screenshot_requested: bool,

    // Current state (refreshed by the tick)
    pub physics: PhysicsInfo,
    pub fps: Option<FpsStats>,
    pub plant_count: usize,
    /// (width, height, png_base64)
    pub screenshot_data: Option<(u32, u32, String)>,
}

fn lock(state: &Mutex<SharedDebugState>) -> MutexGuard<'_, SharedDebugState> {
    // A panicked holder leaves plain data behind; keep serving it
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn window_info(w: FpsWindow) -> FpsWindowInfo {
    FpsWindowInfo {
        avg: w.avg,
        min: w.min,
        max: w.max,
    }
}

/// [`DebugHandler`] answering from a [`SharedDebugState`].
pub struct GardenDebugHandler {
    state: Arc<Mutex<SharedDebugState>>,
}

impl GardenDebugHandler {
    pub fn new(state: Arc<Mutex<SharedDebugState>>) -> Self {
        Self { state }
    }
}

impl DebugHandler for GardenDebugHandler {
    fn handle_command(&mut self, cmd: DebugCommand) -> DebugResponse {
        match cmd {
            DebugCommand::Ping => DebugResponse::pong(),

            DebugCommand::SetWeather { name } => {
                lock(&self.state).set_weather = Some(name);
                DebugResponse::none()
            }

            DebugCommand::ClearWeatherOverride => {
                lock(&self.state).clear_weather_override = true;
                DebugResponse::none()
            }

            DebugCommand::GetPhysicsState => {
                DebugResponse::ok(ResponseData::PhysicsState(lock(&self.state).physics.clone()))
            }

            DebugCommand::GetFpsStats => match lock(&self.state).fps {
                Some(fps) => DebugResponse::ok(ResponseData::FpsStats {
                    current_fps: fps.current_fps,
                    frame_count: fps.frame_count,
                    one_sec: window_info(fps.one_sec),
                    five_sec: window_info(fps.five_sec),
                    fifteen_sec: window_info(fps.fifteen_sec),
                }),
                None => DebugResponse::error("No frames rendered yet"),
            },

            DebugCommand::GetPlantCount => DebugResponse::ok(ResponseData::PlantCount {
                count: lock(&self.state).plant_count,
            }),

            DebugCommand::TakeScreenshot => {
                {
                    let mut s = lock(&self.state);
                    s.screenshot_requested = true;
                    s.screenshot_data = None;
                }

                let polls = SCREENSHOT_TIMEOUT.as_millis() / SCREENSHOT_POLL.as_millis();
                for _ in 0..polls {
                    std::thread::sleep(SCREENSHOT_POLL);
                    let mut s = lock(&self.state);
                    if let Some((width, height, png_base64)) = s.screenshot_data.take() {
                        s.screenshot_requested = false;
                        return DebugResponse::ok(ResponseData::Screenshot {
                            width,
                            height,
                            png_base64,
                        });
                    }
                }

                lock(&self.state).screenshot_requested = false;
                DebugResponse::error("Screenshot timed out")
            }
        }
    }
}

/// Tick-side half of the bridge.
#[derive(Clone, Default)]
pub struct DebugBridge {
    state: Arc<Mutex<SharedDebugState>>,
}

impl DebugBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handler for the debug server sharing this bridge's state.
    pub fn handler(&self) -> GardenDebugHandler {
        GardenDebugHandler::new(Arc::clone(&self.state))
    }

    /// Apply pending requests to `garden`. Call before the tick.
    pub fn apply(&self, garden: &mut Garden) {
        let (weather, clear) = {
            let mut s = lock(&self.state);
            (s.set_weather.take(), std::mem::take(&mut s.clear_weather_override))
        };
        if clear {
            log::info!("Debug: clearing weather override");
            garden.clear_weather_override();
        }
        if let Some(name) = weather {
            log::info!("Debug: weather set to '{}'", name);
            garden.set_weather(&name);
        }
    }

    /// Publish the garden's state, and the presented frame if a screenshot
    /// is waiting. Call after the frame was presented to `surface`.
    pub fn publish(&self, garden: &Garden, surface: Option<&RasterSurface>) {
        let atmo = garden.atmosphere();
        let wind = atmo.wind();
        let state = atmo.state();
        let physics = PhysicsInfo {
            weather: atmo.weather_name().to_string(),
            speed: wind.speed,
            force: wind.force,
            direction: wind.direction,
            accumulator: wind.accumulator,
            time_of_day: state.time_of_day,
            is_night: state.is_night,
            puddle_level: state.ground.puddle_level,
            snow_level: state.ground.snow_level,
            particle_count: garden.particles().len(),
        };

        let mut s = lock(&self.state);
        s.physics = physics;
        s.fps = Some(garden.fps_stats());
        s.plant_count = garden.plants().len();

        if s.screenshot_requested && s.screenshot_data.is_none() {
            if let Some(surface) = surface {
                match surface.png_base64() {
                    Ok(png) => {
                        let (w, h) = surface.image().dimensions();
                        s.screenshot_data = Some((w, h, png));
                    }
                    Err(e) => log::warn!("Debug screenshot encode failed: {}", e),
                }
            }
        }
    }
}
