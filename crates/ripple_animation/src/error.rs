//! Animation errors

use thiserror::Error;

/// Errors raised while building animated values or loading presets
#[derive(Error, Debug)]
pub enum AnimationError {
    #[error("cannot interpolate {found} values")]
    UnsupportedShape { found: &'static str },

    #[error("unknown {kind} preset: {name}")]
    UnknownPreset { kind: &'static str, name: String },

    #[error("failed to parse presets: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize presets: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for animation operations
pub type Result<T> = std::result::Result<T, AnimationError>;
