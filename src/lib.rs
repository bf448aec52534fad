//! Verdant - animation and weather engine for a shared virtual garden

pub mod core;
pub mod atmosphere;
pub mod particles;
pub mod grass;
pub mod garden;
pub mod scene;
pub mod interaction;
pub mod audio;
pub mod readout;
pub mod config;
pub mod sim;
pub mod driver;
pub mod debug;

pub use config::GardenConfig;
pub use driver::AnimationLoop;
pub use sim::{Collaborators, Garden};
