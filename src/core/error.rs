//! Error types for the verdant engine

use thiserror::Error;

/// Main error type for the engine.
///
/// Only initialization and tooling paths return these; a running tick never
/// fails.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Drawing surface unavailable: {0}")]
    Surface(String),

    #[error("Texture error: {0}")]
    Texture(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
