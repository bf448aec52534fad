//! Frame timing utilities
//!
//! Time is injected: callers pass the current timestamp to [`FrameClock::tick`]
//! instead of the clock reading a global source, so a simulation can be
//! driven deterministically from synthetic time.

use std::collections::VecDeque;

use crate::core::types::Millis;

/// Longest delta a single tick may report. Larger gaps (a suspended tab, a
/// debugger pause) are clamped so the simulation does not lurch.
pub const MAX_FRAME_DELTA_MS: Millis = 250.0;

/// FPS statistics for a time window
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct FpsWindow {
    pub avg: f32,
    pub min: f32,
    pub max: f32,
}

/// Rolling FPS statistics over multiple time windows
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct FpsStats {
    pub one_sec: FpsWindow,
    pub five_sec: FpsWindow,
    pub fifteen_sec: FpsWindow,
    pub current_fps: f32,
    pub frame_count: u64,
}

/// Tracks frame timing from injected timestamps and calculates FPS.
pub struct FrameClock {
    last_frame: Option<Millis>,
    delta: Millis,
    elapsed: Millis,
    frame_count: u64,
    fps_timer: Millis,
    fps: f32,
    fps_frame_count: u32,
    /// Ring buffer of (timestamp, frame_time_ms) for rolling stats
    frame_history: VecDeque<(Millis, Millis)>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last_frame: None,
            delta: 0.0,
            elapsed: 0.0,
            frame_count: 0,
            fps_timer: 0.0,
            fps: 0.0,
            fps_frame_count: 0,
            frame_history: VecDeque::new(),
        }
    }

    /// Call once per frame with the current timestamp. Returns the clamped
    /// delta since the previous call (0 on the first call).
    pub fn tick(&mut self, now: Millis) -> Millis {
        let delta = match self.last_frame {
            Some(last) => (now - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => {
                self.fps_timer = now;
                0.0
            }
        };
        self.last_frame = Some(now);
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        self.frame_history.push_back((now, delta));

        // Prune frames older than 15 seconds
        let cutoff = now - 15_000.0;
        while let Some(&(timestamp, _)) = self.frame_history.front() {
            if timestamp < cutoff {
                self.frame_history.pop_front();
            } else {
                break;
            }
        }

        // Update FPS every second
        let fps_elapsed = now - self.fps_timer;
        if fps_elapsed >= 1000.0 {
            self.fps = self.fps_frame_count as f32 / (fps_elapsed / 1000.0) as f32;
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }

        delta
    }

    /// Delta of the last tick in milliseconds
    pub fn delta_ms(&self) -> Millis {
        self.delta
    }

    /// Sum of all clamped deltas since the clock started
    pub fn elapsed_ms(&self) -> Millis {
        self.elapsed
    }

    /// Current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Rolling FPS statistics over 1s, 5s, and 15s windows ending at the
    /// last tick.
    pub fn fps_stats(&self) -> FpsStats {
        let now = self.last_frame.unwrap_or(0.0);

        FpsStats {
            one_sec: self.compute_window_stats(now, 1_000.0),
            five_sec: self.compute_window_stats(now, 5_000.0),
            fifteen_sec: self.compute_window_stats(now, 15_000.0),
            current_fps: self.fps,
            frame_count: self.frame_count,
        }
    }

    fn compute_window_stats(&self, now: Millis, window: Millis) -> FpsWindow {
        let cutoff = now - window;

        let mut frame_count = 0;
        let mut total_time = 0.0f64;
        let mut min_fps = f32::INFINITY;
        let mut max_fps = 0.0f32;

        for &(timestamp, frame_time) in self.frame_history.iter() {
            if timestamp >= cutoff && frame_time > 0.0 {
                frame_count += 1;
                total_time += frame_time;

                let fps = (1000.0 / frame_time) as f32;
                min_fps = min_fps.min(fps);
                max_fps = max_fps.max(fps);
            }
        }

        let avg_fps = if total_time > 0.0 {
            (frame_count as f64 / (total_time / 1000.0)) as f32
        } else {
            0.0
        };

        if frame_count == 0 {
            min_fps = 0.0;
            max_fps = 0.0;
        }

        FpsWindow {
            avg: avg_fps,
            min: min_fps,
            max: max_fps,
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
