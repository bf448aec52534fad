//! Headless garden renderer: ticks a garden and writes frames as PNG.
//!
//! Usage: cargo run --release --bin render_garden -- [OPTIONS]
//!
//! Options:
//!   --width <PX>        Viewport width (default: 960)
//!   --height <PX>       Viewport height (default: 540)
//!   --weather <NAME>    Weather preset (default: config's initial weather)
//!   --frames <N>        Frames to simulate (default: 240)
//!   --every <N>         Save every Nth frame (default: 60)
//!   --time <T>          Start time of day in [0, 1) (default: config)
//!   --seed <SEED>       Override the config seed
//!   --config <FILE>     Garden config JSON
//!   --presets <FILE>    Weather preset table JSON
//!   --plants <FILE>     Plant updates document (`{ "plants": [...] }`)
//!   --demo-plants <N>   Plant N generated plants instead (default: 6)
//!   --out <DIR>         Output directory (default: "frames")
//!   --debug             Serve the debug protocol and run in real time
//!
//! Output: <out>/frame_00000.png, ...

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use image::{Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use verdant::atmosphere::WeatherTable;
use verdant::core::{Millis, Result, Viewport};
use verdant::debug::DebugBridge;
use verdant::garden::texture::encode_data_url;
use verdant::garden::{GardenSnapshot, Plant, snapshot_channel};
use verdant::scene::RasterSurface;
use verdant::{AnimationLoop, Collaborators, Garden, GardenConfig};

const FRAME_MS: Millis = 1000.0 / 60.0;

fn main() {
    verdant::core::logging::init();

    if let Err(e) = run() {
        log::error!("render_garden failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let width = parse_u32_arg(&args, "--width").unwrap_or(960);
    let height = parse_u32_arg(&args, "--height").unwrap_or(540);
    let frames = parse_usize_arg(&args, "--frames").unwrap_or(240);
    let every = parse_usize_arg(&args, "--every").unwrap_or(60).max(1);
    let demo_plants = parse_usize_arg(&args, "--demo-plants").unwrap_or(6);
    let out_dir = PathBuf::from(parse_str_arg(&args, "--out").unwrap_or_else(|| "frames".to_string()));
    let debug = args.iter().any(|a| a == "--debug");

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => GardenConfig::from_json_file(path)?,
        None => GardenConfig::default(),
    };
    if let Some(seed) = parse_u64_arg(&args, "--seed") {
        config.seed = seed;
    }
    if let Some(t) = parse_f32_arg(&args, "--time") {
        config.atmosphere.start_time_of_day = t;
    }
    let table = match parse_str_arg(&args, "--presets") {
        Some(path) => WeatherTable::from_json_str(&std::fs::read_to_string(path)?)?,
        None => WeatherTable::builtin(),
    };

    let start_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Millis)
        .unwrap_or(0.0);

    let viewport = Viewport::new(width as f32, height as f32);
    let (publisher, mailbox) = snapshot_channel();
    let snapshot = match parse_str_arg(&args, "--plants") {
        Some(path) => GardenSnapshot::from_json_str(&std::fs::read_to_string(path)?)?,
        None => GardenSnapshot::new(demo_garden(demo_plants, viewport, start_ms, config.seed)?),
    };
    log::info!("Loaded {} plants", snapshot.plants.len());
    publisher.publish(snapshot);

    let seed = config.seed;
    let mut garden = Garden::new(config, table, viewport, mailbox, Collaborators::default());
    if let Some(weather) = parse_str_arg(&args, "--weather") {
        garden.set_weather(&weather);
    }

    println!("=== Verdant Garden Renderer ===");
    println!("Size:    {}x{}", width, height);
    println!("Weather: {}", garden.atmosphere().weather_name());
    println!("Frames:  {} (saving every {})", frames, every);
    println!("Seed:    {}", seed);
    println!("Output:  {}", out_dir.display());
    println!();

    std::fs::create_dir_all(&out_dir)?;

    let bridge = DebugBridge::new();
    if debug {
        start_debug_server(&bridge);
    }

    let mut anim = AnimationLoop::start(garden, |vp| RasterSurface::new(vp.width as u32, vp.height as u32))?;

    let started = Instant::now();
    let mut saved = 0usize;
    let mut i = 0usize;
    while debug || i < frames {
        bridge.apply(anim.garden_mut());
        let now = if debug {
            start_ms + started.elapsed().as_secs_f64() * 1000.0
        } else {
            start_ms + i as Millis * FRAME_MS
        };
        anim.run_frame(now);
        bridge.publish(anim.garden(), Some(anim.surface()));

        if i < frames && (i + 1) % every == 0 {
            let path = out_dir.join(format!("frame_{:05}.png", i));
            anim.surface().save_png(&path)?;
            saved += 1;
            let g = anim.garden();
            log::info!(
                "Saved {} ({} particles, {} plants, {})",
                path.display(),
                g.particles().len(),
                g.plants().len(),
                g.atmosphere().state().label
            );
        }

        i += 1;
        if debug {
            std::thread::sleep(Duration::from_secs_f64(FRAME_MS / 1000.0));
        }
    }

    let garden = anim.stop();
    let elapsed = started.elapsed();
    println!();
    println!("=== Complete ===");
    println!("Frames:  {} in {:.1}s", i, elapsed.as_secs_f64());
    println!("Saved:   {}", saved);
    println!("Weather: {}", garden.atmosphere().state().label);
    Ok(())
}

fn start_debug_server(bridge: &DebugBridge) {
    let handler = Arc::new(tokio::sync::Mutex::new(bridge.handler()));
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create tokio runtime for the debug server: {}", e);
                return;
            }
        };
        rt.block_on(async {
            let _server = verdant_debug::DebugServer::start(handler, verdant_debug::DEFAULT_PORT);
            log::info!("Debug server started on port {}", verdant_debug::DEFAULT_PORT);
            // Keep runtime alive forever
            loop {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
        });
    });
}

/// Plants with simple generated textures, at staggered ages so every
/// growth stage is on screen.
fn demo_garden(count: usize, viewport: Viewport, now_ms: Millis, seed: u64) -> Result<Vec<Plant>> {
    let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);
    let mut plants = Vec::with_capacity(count);
    for id in 0..count {
        let petal = Rgba([rng.gen_range(180..=255), rng.gen_range(40..200), rng.gen_range(60..220), 255]);
        plants.push(Plant {
            id: id as u64 + 1,
            x: (id as f32 + 0.5) / count as f32 * viewport.width,
            y: rng.gen_range(viewport.height * 0.55..viewport.height * 0.95),
            stem_tex: encode_data_url(&stem_texture())?,
            leaf_tex: encode_data_url(&leaf_texture())?,
            flower_tex: encode_data_url(&flower_texture(petal))?,
            author: format!("gardener{}", id + 1),
            server_time: now_ms - (id as f64 * 2_500.0),
            stats: None,
        });
    }
    Ok(plants)
}

const TEX: u32 = 64;

fn stem_texture() -> RgbaImage {
    RgbaImage::from_fn(TEX, TEX, |x, _| {
        if (TEX / 2 - 2..TEX / 2 + 2).contains(&x) {
            Rgba([60, 120, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn leaf_texture() -> RgbaImage {
    // Two leaves either side of the stalk around the leaf pivot
    let c = (TEX / 2) as f32;
    RgbaImage::from_fn(TEX, TEX, |x, y| {
        let dy = (y as f32 - TEX as f32 * 0.5) / 6.0;
        let left = ((x as f32 - (c - 10.0)) / 10.0).powi(2) + dy * dy;
        let right = ((x as f32 - (c + 10.0)) / 10.0).powi(2) + dy * dy;
        if left <= 1.0 || right <= 1.0 {
            Rgba([70, 150, 60, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn flower_texture(petal: Rgba<u8>) -> RgbaImage {
    let c = (TEX / 2) as f32;
    RgbaImage::from_fn(TEX, TEX, |x, y| {
        let d = ((x as f32 - c).powi(2) + (y as f32 - 8.0).powi(2)).sqrt();
        if d < 3.0 {
            Rgba([250, 220, 80, 255])
        } else if d < 8.0 {
            petal
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn parse_f32_arg(args: &[String], flag: &str) -> Option<f32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u32_arg(args: &[String], flag: &str) -> Option<u32> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_u64_arg(args: &[String], flag: &str) -> Option<u64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
