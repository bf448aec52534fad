//! Animation driver.
//!
//! [`AnimationLoop`] binds a [`Garden`] to a drawing [`Surface`] and runs one
//! tick per display frame. Time is always passed in by the host's frame
//! callback, never read from a global clock, so the same loop runs under a
//! real display or a synthetic timeline.
//!
//! Lifecycle: [`start`](AnimationLoop::start) acquires the surface and fails
//! without starting anything if it cannot; [`stop`](AnimationLoop::stop)
//! tears the loop down and hands the garden back.

use crate::core::{Millis, Result, Viewport};
use crate::scene::{Frame, Surface};
use crate::sim::Garden;

pub struct AnimationLoop<S: Surface> {
    garden: Garden,
    surface: S,
    /// Surface resize waiting for the next frame.
    pending_resize: Option<Viewport>,
    frames: u64,
    present_failures: u64,
}

impl<S: Surface> AnimationLoop<S> {
    /// Acquire the drawing surface and start the loop. If the surface cannot
    /// be acquired the loop does not start and the error is returned.
    pub fn start(garden: Garden, acquire: impl FnOnce(Viewport) -> Result<S>) -> Result<Self> {
        let viewport = garden.viewport();
        let surface = match acquire(viewport) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Drawing surface unavailable, animation not started: {}", e);
                return Err(e);
            }
        };
        let actual = surface.viewport();
        log::info!("Animation started on a {}x{} surface", actual.width, actual.height);

        let mut garden = garden;
        if actual != viewport {
            garden.request_resize(actual);
        }
        Ok(Self {
            garden,
            surface,
            pending_resize: None,
            frames: 0,
            present_failures: 0,
        })
    }

    /// Run one tick at `now_ms` and present it. Present failures are logged
    /// and the loop carries on; the next frame redraws everything.
    pub fn run_frame(&mut self, now_ms: Millis) {
        if let Some(viewport) = self.pending_resize.take() {
            if let Err(e) = self.surface.resize(viewport) {
                log::warn!("Surface resize to {}x{} failed: {}", viewport.width, viewport.height, e);
            }
            self.garden.request_resize(viewport);
        }

        let frame = self.garden.tick(now_ms);
        if let Err(e) = self.surface.present(frame) {
            self.present_failures += 1;
            log::warn!("Frame {} not presented: {}", self.frames, e);
        }
        self.frames += 1;
    }

    /// Run frames at each timestamp in order.
    pub fn run_timeline(&mut self, timestamps: impl IntoIterator<Item = Millis>) {
        for now_ms in timestamps {
            self.run_frame(now_ms);
        }
    }

    /// Queue a viewport change for the surface and the garden. Applied at
    /// the start of the next frame, never during one.
    pub fn resize(&mut self, viewport: Viewport) {
        self.pending_resize = Some(viewport);
    }

    /// Tear the loop down and return the garden.
    pub fn stop(self) -> Garden {
        log::info!(
            "Animation stopped after {} frames ({} present failures)",
            self.frames,
            self.present_failures
        );
        self.garden
    }

    pub fn garden(&self) -> &Garden {
        &self.garden
    }

    pub fn garden_mut(&mut self) -> &mut Garden {
        &mut self.garden
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn last_frame(&self) -> &Frame {
        self.garden.frame()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn present_failures(&self) -> u64 {
        self.present_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atmosphere::WeatherTable;
    use crate::config::GardenConfig;
    use crate::core::Error;
    use crate::garden::snapshot_channel;
    use crate::scene::RasterSurface;
    use crate::sim::Collaborators;

    fn garden(viewport: Viewport) -> Garden {
        let (_tx, rx) = snapshot_channel();
        let mut config = GardenConfig::default();
        config.grass.blade_count = 40;
        Garden::new(config, WeatherTable::builtin(), viewport, rx, Collaborators::default())
    }

    /// Surface that refuses every frame.
    struct BrokenSurface;

    impl Surface for BrokenSurface {
        fn viewport(&self) -> Viewport {
            Viewport::new(10.0, 10.0)
        }

        fn present(&mut self, _frame: &Frame) -> Result<()> {
            Err(Error::Surface("lost".into()))
        }
    }

    #[test]
    fn test_start_fails_without_surface() {
        let result = AnimationLoop::<RasterSurface>::start(garden(Viewport::new(32.0, 32.0)), |_| {
            Err(Error::Surface("no canvas".into()))
        });
        assert!(matches!(result, Err(Error::Surface(_))));
    }

    #[test]
    fn test_frames_run_and_present() {
        let vp = Viewport::new(32.0, 24.0);
        let mut anim = AnimationLoop::start(garden(vp), |vp| {
            RasterSurface::new(vp.width as u32, vp.height as u32)
        })
        .unwrap();
        anim.run_timeline((0..10).map(|i| i as f64 * 16.0));
        assert_eq!(anim.frames(), 10);
        assert_eq!(anim.present_failures(), 0);
        assert!(!anim.last_frame().is_empty());
        let g = anim.stop();
        assert_eq!(g.fps_stats().frame_count, 10);
    }

    #[test]
    fn test_present_failures_are_not_fatal() {
        let mut anim = AnimationLoop::start(garden(Viewport::new(10.0, 10.0)), |_| Ok(BrokenSurface)).unwrap();
        anim.run_timeline([0.0, 16.0, 32.0]);
        assert_eq!(anim.frames(), 3);
        assert_eq!(anim.present_failures(), 3);
    }

    #[test]
    fn test_resize_reaches_surface_and_garden() {
        let mut anim = AnimationLoop::start(garden(Viewport::new(32.0, 24.0)), |vp| {
            RasterSurface::new(vp.width as u32, vp.height as u32)
        })
        .unwrap();
        anim.run_frame(0.0);
        anim.resize(Viewport::new(16.0, 12.0));
        anim.run_frame(16.0);
        assert_eq!(anim.garden().viewport(), Viewport::new(16.0, 12.0));
        assert_eq!(anim.surface().image().dimensions(), (16, 12));
    }
}
