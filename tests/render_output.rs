//! Config files in, PNG frames out.

use image::{Rgba, RgbaImage};

use verdant::atmosphere::WeatherTable;
use verdant::core::Viewport;
use verdant::garden::texture::encode_data_url;
use verdant::garden::{GardenSnapshot, Plant, snapshot_channel};
use verdant::scene::{DrawCommand, Layer, RasterSurface};
use verdant::{AnimationLoop, Collaborators, Garden, GardenConfig};

const T0: f64 = 1_700_000_000_000.0;

fn solid(color: [u8; 4]) -> String {
    encode_data_url(&RgbaImage::from_pixel(16, 16, Rgba(color))).unwrap()
}

fn textured_plant() -> Plant {
    Plant {
        id: 9,
        x: 80.0,
        y: 100.0,
        stem_tex: solid([40, 120, 40, 255]),
        leaf_tex: solid([60, 160, 60, 255]),
        flower_tex: solid([230, 80, 120, 255]),
        author: "rowan".into(),
        server_time: T0 - 60_000.0,
        stats: None,
    }
}

#[test]
fn test_config_file_drives_garden() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garden.json");
    std::fs::write(
        &path,
        r#"{ "seed": 11, "grass": { "blade_count": 30 }, "particles": { "cap": 25 },
             "atmosphere": { "initial_weather": "blizzard" } }"#,
    )
    .unwrap();

    let config = GardenConfig::from_json_file(&path).unwrap();
    assert_eq!(config.seed, 11);

    let (_tx, rx) = snapshot_channel();
    let mut garden = Garden::new(config, WeatherTable::builtin(), Viewport::new(160.0, 120.0), rx, Collaborators::default());
    for i in 0..300 {
        garden.tick(T0 + i as f64 * 16.0);
        assert!(garden.particles().len() <= 25);
    }
    assert_eq!(garden.grass().len(), 30);
    assert_eq!(garden.atmosphere().weather_name(), "blizzard");
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(GardenConfig::from_json_file(dir.path().join("absent.json")).is_err());
}

#[test]
fn test_textured_plant_rendered_to_png() {
    let (tx, rx) = snapshot_channel();
    tx.publish(GardenSnapshot::new(vec![textured_plant()]));

    let mut config = GardenConfig::default();
    config.grass.blade_count = 40;
    let garden = Garden::new(config, WeatherTable::builtin(), Viewport::new(160.0, 120.0), rx, Collaborators::default());
    let mut anim = AnimationLoop::start(garden, |vp| RasterSurface::new(vp.width as u32, vp.height as u32)).unwrap();
    anim.run_timeline((0..4).map(|i| T0 + i as f64 * 16.0));

    let images = anim
        .last_frame()
        .layer(Layer::Plants)
        .filter(|c| matches!(c, DrawCommand::Image { .. }))
        .count();
    assert_eq!(images, 3);
    assert_eq!(anim.present_failures(), 0);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frame.png");
    anim.surface().save_png(&out).unwrap();

    let decoded = image::open(&out).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (160, 120));
    assert_eq!(&decoded, anim.surface().image());
    // The sky covers the top row with an opaque color
    assert_eq!(decoded.get_pixel(0, 0)[3], 255);
}

#[test]
fn test_zero_sized_surface_does_not_start() {
    let (_tx, rx) = snapshot_channel();
    let garden = Garden::new(
        GardenConfig::default(),
        WeatherTable::builtin(),
        Viewport::new(0.0, 0.0),
        rx,
        Collaborators::default(),
    );
    let result = AnimationLoop::start(garden, |vp| RasterSurface::new(vp.width as u32, vp.height as u32));
    assert!(result.is_err());
}

#[test]
fn test_garden_larger_than_texture_cache_still_draws() {
    let plants: Vec<Plant> = (0..100u8)
        .map(|i| Plant {
            id: i as u64,
            x: 10.0 + i as f32 * 1.4,
            y: 60.0 + (i % 5) as f32 * 10.0,
            stem_tex: solid([i, 10, 0, 255]),
            leaf_tex: solid([i, 20, 0, 255]),
            flower_tex: solid([i, 30, 0, 255]),
            author: format!("g{}", i),
            server_time: T0 - 60_000.0,
            stats: None,
        })
        .collect();
    let (tx, rx) = snapshot_channel();
    tx.publish(GardenSnapshot::new(plants));

    let mut config = GardenConfig::default();
    config.grass.blade_count = 40;
    assert!(config.plants.texture_cache_capacity < 300);
    let mut garden = Garden::new(config, WeatherTable::builtin(), Viewport::new(160.0, 120.0), rx, Collaborators::default());

    let mut images = 0;
    for i in 0..120 {
        let frame = garden.tick(T0 + i as f64 * 16.0);
        images = frame
            .layer(Layer::Plants)
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count();
        let cache = garden.textures();
        assert!(cache.pending_count() <= cache.len(), "tick {}: queue {}", i, cache.pending_count());
    }
    assert_eq!(images, 300);
    assert_eq!(garden.textures().len(), 300);
    assert_eq!(garden.textures().pending_count(), 0);
}
