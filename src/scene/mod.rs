//! Scene composition
//!
//! The [`Compositor`] turns the tick's simulation state into a [`Frame`]
//! display list, and a [`Surface`] presents it.

pub mod compositor;
pub mod config;
pub mod overlay;
pub mod raster;
pub mod surface;

pub use compositor::{Compositor, SceneInput};
pub use config::{SceneConfig, SkyGradient, SkyPalette};
pub use overlay::{LightBeam, LightBeams};
pub use raster::RasterSurface;
pub use surface::{BlendMode, DrawCommand, Frame, ImageFilter, Layer, Paint, Surface};
