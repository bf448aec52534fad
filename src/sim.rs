//! The garden simulation context.
//!
//! [`Garden`] owns every piece of per-tick state (atmosphere, particles,
//! grass, puddles, textures, the current plant snapshot, pointer and click
//! state) and the host's collaborator sinks. It is created when the
//! animation starts and dropped when it stops. One call to
//! [`Garden::tick`] is one complete tick:
//!
//! 1. apply a queued resize
//! 2. swap in the newest plant snapshot
//! 3. decode a budgeted batch of textures
//! 4. physics update, then particle update
//! 5. hover and click handling
//! 6. audio and readout sinks
//! 7. compose the frame

use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::atmosphere::{AtmosphereSystem, PuddleMap, WeatherTable};
use crate::audio::{AudioSink, NullAudio, SoundEffect};
use crate::config::GardenConfig;
use crate::core::input::{PointerEvent, PointerState};
use crate::core::time::{FpsStats, FrameClock};
use crate::core::{Millis, Vec2, Viewport};
use crate::garden::{NewPlant, Plant, PlantId, PlantPose, SnapshotMailbox, TextureCache};
use crate::grass::GrassField;
use crate::interaction::{self, ClickHandler, ClickOutcome, CreationSink, NullSink, PlantEditor, ProtectSink};
use crate::particles::ParticleSystem;
use crate::readout::{NullReadout, Readout, ReadoutSink};
use crate::scene::{Compositor, Frame, SceneInput};

/// Host-provided sinks the tick reports to.
pub struct Collaborators {
    pub audio: Box<dyn AudioSink + Send>,
    pub readout: Box<dyn ReadoutSink + Send>,
    pub protect: Box<dyn ProtectSink + Send>,
    pub creation: Box<dyn CreationSink + Send>,
    pub editor: Box<dyn PlantEditor + Send>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            audio: Box::new(NullAudio),
            readout: Box::new(NullReadout),
            protect: Box::new(NullSink),
            creation: Box::new(NullSink),
            editor: Box::new(NullSink),
        }
    }
}

/// Simulation context for one running garden.
pub struct Garden {
    config: GardenConfig,
    viewport: Viewport,
    pending_resize: Option<Viewport>,
    rng: StdRng,

    atmosphere: AtmosphereSystem,
    particles: ParticleSystem,
    grass: GrassField,
    puddles: PuddleMap,
    compositor: Compositor,
    textures: TextureCache,

    mailbox: SnapshotMailbox,
    plants: Arc<[Plant]>,
    poses: Vec<PlantPose>,
    /// Plants already dead in the current snapshot.
    dead: HashSet<PlantId>,
    /// Weather reported by the data source.
    source_weather: Option<String>,
    /// Weather forced by the host; wins over the data source.
    weather_override: Option<String>,

    clock: FrameClock,
    now_ms: Millis,
    pointer: PointerState,
    clicks: ClickHandler,
    hovered: Option<PlantId>,
    /// Where the editor was opened, awaiting its textures.
    pending_planting: Option<Vec2>,

    collaborators: Collaborators,
    readout: Option<Readout>,
    frame: Frame,
}

impl Garden {
    pub fn new(
        config: GardenConfig,
        table: WeatherTable,
        viewport: Viewport,
        mailbox: SnapshotMailbox,
        collaborators: Collaborators,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let grass = GrassField::generate(viewport, &config.grass, &mut rng);
        let puddles = PuddleMap::generate(viewport, config.atmosphere.ground.puddle_count, &mut rng);
        let compositor = Compositor::new(config.scene.clone(), viewport, &mut rng);

        log::info!(
            "Garden created: {}x{}, {} grass blades, {} weather presets",
            viewport.width,
            viewport.height,
            grass.len(),
            table.len()
        );

        Self {
            atmosphere: AtmosphereSystem::new(config.atmosphere.clone(), table),
            particles: ParticleSystem::new(config.particles.clone()),
            textures: TextureCache::new(config.plants.texture_cache_capacity),
            clicks: ClickHandler::new(config.interaction.cooldown_ms),
            grass,
            puddles,
            compositor,
            viewport,
            pending_resize: None,
            rng,
            mailbox,
            plants: Arc::from(Vec::new()),
            poses: Vec::new(),
            dead: HashSet::new(),
            source_weather: None,
            weather_override: None,
            clock: FrameClock::new(),
            now_ms: 0.0,
            pointer: PointerState::new(),
            hovered: None,
            pending_planting: None,
            collaborators,
            readout: None,
            frame: Frame::new(viewport),
            config,
        }
    }

    /// Run one tick at wall time `now_ms` (milliseconds since the Unix
    /// epoch, the time base of plant timestamps) and return its frame.
    pub fn tick(&mut self, now_ms: Millis) -> &Frame {
        let dt = self.clock.tick(now_ms);
        let elapsed = self.clock.elapsed_ms();
        self.now_ms = now_ms;

        self.apply_resize();
        self.swap_snapshot();

        self.textures.pump(self.config.plants.decode_budget);

        self.atmosphere.update(dt, elapsed, &mut self.rng);
        self.particles
            .update(self.atmosphere.preset(), self.atmosphere.wind(), self.viewport, &mut self.rng);

        let wind = *self.atmosphere.wind();
        self.poses.clear();
        self.poses
            .extend(self.plants.iter().map(|p| PlantPose::of(p, &wind, now_ms, &self.config.plants)));

        self.update_hover();
        self.handle_clicks(now_ms);

        let is_night = self.atmosphere.is_night();
        self.collaborators
            .audio
            .update(self.atmosphere.weather_name(), is_night);

        let readout = Readout::from_state(self.atmosphere.state(), self.atmosphere.clock_string(), self.plants.len());
        self.collaborators.readout.publish(&readout);
        self.readout = Some(readout);

        let input = SceneInput {
            viewport: self.viewport,
            atmosphere: self.atmosphere.state(),
            preset: self.atmosphere.preset(),
            grass: &self.grass,
            grass_config: &self.config.grass,
            puddles: &self.puddles,
            particles: self.particles.particles(),
            plants: &self.plants,
            poses: &self.poses,
            hovered: self.hovered,
            now_ms,
        };
        self.frame = self.compositor.compose(&input, &mut self.textures);
        &self.frame
    }

    /// Queue a viewport change; it takes effect at the start of the next
    /// tick.
    pub fn request_resize(&mut self, viewport: Viewport) {
        self.pending_resize = Some(viewport);
    }

    /// Feed a pointer event. Presses are handled at the next tick.
    pub fn pointer_event(&mut self, event: PointerEvent) {
        self.pointer.process_event(event);
    }

    /// Force a weather preset, overriding the data source.
    pub fn set_weather(&mut self, name: &str) {
        self.weather_override = Some(name.to_string());
        self.atmosphere.set_weather(name);
    }

    /// Drop a forced weather and return to the data source's (or the
    /// configured initial) weather.
    pub fn clear_weather_override(&mut self) {
        if self.weather_override.take().is_some() {
            let name = self
                .source_weather
                .clone()
                .unwrap_or_else(|| self.config.atmosphere.initial_weather.clone());
            self.atmosphere.set_weather(&name);
        }
    }

    pub fn set_time_of_day(&mut self, t: f32) {
        self.atmosphere.set_time_of_day(t);
    }

    /// Turn the editor's output into a planting request at the location the
    /// editor was opened for, and hand it to the creation sink. Returns
    /// `None` when no planting is pending.
    pub fn submit_planting(
        &mut self,
        stem_tex: String,
        leaf_tex: String,
        flower_tex: String,
        author: &str,
        now_ms: Millis,
    ) -> Option<NewPlant> {
        let Some(at) = self.pending_planting.take() else {
            log::warn!("Planting submitted with no pending location, ignored");
            return None;
        };
        let author = author.trim();
        let plant = NewPlant {
            x: at.x,
            y: at.y,
            stem_tex,
            leaf_tex,
            flower_tex,
            author: if author.is_empty() { "Anonymous".to_string() } else { author.to_string() },
            timestamp: now_ms,
        };
        log::info!("Submitting planting by {} at ({:.0}, {:.0})", plant.author, plant.x, plant.y);
        self.collaborators.creation.create(plant.clone());
        Some(plant)
    }

    /// Abandon the pending planting (editor closed without submitting).
    pub fn cancel_planting(&mut self) {
        self.pending_planting = None;
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &GardenConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn atmosphere(&self) -> &AtmosphereSystem {
        &self.atmosphere
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn grass(&self) -> &GrassField {
        &self.grass
    }

    pub fn puddles(&self) -> &PuddleMap {
        &self.puddles
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn poses(&self) -> &[PlantPose] {
        &self.poses
    }

    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    pub fn hovered(&self) -> Option<PlantId> {
        self.hovered
    }

    pub fn pending_planting(&self) -> Option<Vec2> {
        self.pending_planting
    }

    pub fn weather_override(&self) -> Option<&str> {
        self.weather_override.as_deref()
    }

    /// Last composed frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn readout(&self) -> Option<&Readout> {
        self.readout.as_ref()
    }

    pub fn fps_stats(&self) -> FpsStats {
        self.clock.fps_stats()
    }

    pub fn now_ms(&self) -> Millis {
        self.now_ms
    }

    // -----------------------------------------------------------------------
    // Tick stages
    // -----------------------------------------------------------------------

    fn apply_resize(&mut self) {
        let Some(viewport) = self.pending_resize.take() else { return };
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.grass = GrassField::generate(viewport, &self.config.grass, &mut self.rng);
        self.puddles = PuddleMap::generate(viewport, self.config.atmosphere.ground.puddle_count, &mut self.rng);
        self.compositor.resize(viewport, &mut self.rng);
        log::info!(
            "Resized to {}x{}, regenerated {} grass blades",
            viewport.width,
            viewport.height,
            self.grass.len()
        );
    }

    fn swap_snapshot(&mut self) {
        let Some(snapshot) = self.mailbox.take_new() else { return };

        // Withered since the previous snapshot
        let newly_dead = snapshot
            .plants
            .iter()
            .filter(|p| p.is_dead() && !self.dead.contains(&p.id))
            .filter(|p| self.plants.iter().any(|old| old.id == p.id))
            .count();
        for _ in 0..newly_dead {
            self.collaborators.audio.play(SoundEffect::Shatter);
        }

        self.dead = snapshot.plants.iter().filter(|p| p.is_dead()).map(|p| p.id).collect();
        self.plants = Arc::clone(&snapshot.plants);
        self.textures.set_live(
            self.plants
                .iter()
                .flat_map(|p| [p.stem_tex.as_str(), p.leaf_tex.as_str(), p.flower_tex.as_str()]),
        );
        log::info!("Plant snapshot swapped in: {} plants", self.plants.len());

        if let Some(weather) = &snapshot.weather {
            if self.source_weather.as_deref() != Some(weather.as_str()) {
                self.source_weather = Some(weather.clone());
                if self.weather_override.is_none() {
                    self.atmosphere.set_weather(weather);
                }
            }
        }
    }

    fn update_hover(&mut self) {
        let hovered = self.pointer.position().and_then(|point| {
            interaction::plant_at(&self.plants, &self.poses, point, &self.config.interaction).map(|p| p.id)
        });
        if hovered != self.hovered {
            log::debug!("Hovered plant: {:?}", hovered);
            self.hovered = hovered;
        }
    }

    fn handle_clicks(&mut self, now_ms: Millis) {
        for at in self.pointer.drain_presses() {
            let hit = interaction::plant_at(&self.plants, &self.poses, at, &self.config.interaction).map(|p| p.id);
            match self.clicks.click(hit, at, now_ms) {
                ClickOutcome::Protected(id) => {
                    log::info!("Protecting plant {}", id);
                    self.collaborators.protect.protect(id);
                    self.collaborators.audio.play(SoundEffect::Protect);
                }
                ClickOutcome::CoolingDown(_) => {}
                ClickOutcome::Planting(at) => {
                    self.pending_planting = Some(at);
                    self.collaborators.editor.open(at);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garden::snapshot_channel;
    use crate::grass::GrassConfig;

    fn small_config() -> GardenConfig {
        GardenConfig {
            grass: GrassConfig {
                blade_count: 100,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn garden() -> Garden {
        let (_tx, rx) = snapshot_channel();
        Garden::new(
            small_config(),
            WeatherTable::builtin(),
            Viewport::new(320.0, 240.0),
            rx,
            Collaborators::default(),
        )
    }

    #[test]
    fn test_resize_applies_on_next_tick() {
        let mut g = garden();
        g.tick(0.0);
        g.request_resize(Viewport::new(100.0, 80.0));
        assert_eq!(g.viewport(), Viewport::new(320.0, 240.0));
        g.tick(16.0);
        assert_eq!(g.viewport(), Viewport::new(100.0, 80.0));
        for blade in g.grass().blades() {
            assert!(blade.pos.x >= 0.0 && blade.pos.x < 100.0);
            assert!(blade.pos.y >= 0.0 && blade.pos.y < 80.0);
        }
    }

    #[test]
    fn test_weather_override_and_clear() {
        let mut g = garden();
        g.set_weather("snow");
        assert_eq!(g.atmosphere().weather_name(), "snow");
        g.clear_weather_override();
        assert_eq!(g.atmosphere().weather_name(), "sunny");
        assert!(g.weather_override().is_none());
    }

    #[test]
    fn test_submit_without_pending_location() {
        let mut g = garden();
        assert!(g.submit_planting("a".into(), "b".into(), "c".into(), "x", 0.0).is_none());
    }

    #[test]
    fn test_empty_press_opens_editor_and_submits() {
        let mut g = garden();
        g.pointer_event(PointerEvent::PrimaryDown(Vec2::new(50.0, 60.0)));
        g.tick(0.0);
        assert_eq!(g.pending_planting(), Some(Vec2::new(50.0, 60.0)));
        let plant = g
            .submit_planting("s".into(), "l".into(), "f".into(), "  ", 1234.0)
            .unwrap();
        assert_eq!((plant.x, plant.y), (50.0, 60.0));
        assert_eq!(plant.author, "Anonymous");
        assert_eq!(plant.timestamp, 1234.0);
        assert!(g.pending_planting().is_none());
    }
}
