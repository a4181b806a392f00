//! Presets file handling

use anyhow::{Context, Result};
use ripple_animation::{
    MotionOptions, MotionPresets, SpringOptions, SpringOverrides, TweenOptions, TweenOverrides,
};
use std::fs;
use std::path::Path;

/// File name looked up when `--presets` points at a directory
pub const PRESETS_FILE: &str = "ripple.toml";

/// Built-in presets, extended by the presets file when one is given
pub fn load_presets(path: Option<&Path>) -> Result<MotionPresets> {
    let mut presets = MotionPresets::builtin();
    let Some(path) = path else {
        return Ok(presets);
    };

    let presets_path = if path.is_dir() {
        path.join(PRESETS_FILE)
    } else {
        path.to_path_buf()
    };

    if !presets_path.exists() {
        anyhow::bail!("No presets file found at {}", presets_path.display());
    }

    let content = fs::read_to_string(&presets_path)
        .with_context(|| format!("Failed to read {}", presets_path.display()))?;

    let loaded = MotionPresets::from_toml_str(&content)
        .with_context(|| format!("Failed to parse {}", presets_path.display()))?;

    tracing::info!(
        path = %presets_path.display(),
        tweens = loaded.tween.len(),
        springs = loaded.spring.len(),
        "Loaded presets"
    );
    presets.merge(loaded);
    Ok(presets)
}

/// Tween options from an optional preset with command-line flags on top
pub fn resolve_tween(
    presets: &MotionPresets,
    preset: Option<&str>,
    overrides: &TweenOverrides,
) -> Result<TweenOptions> {
    let base = match preset {
        Some(name) => presets.tween(name)?,
        None => TweenOptions::default(),
    };
    Ok(base.merged(overrides))
}

/// Spring options from an optional preset with command-line flags on top
pub fn resolve_spring(
    presets: &MotionPresets,
    preset: Option<&str>,
    overrides: &SpringOverrides,
) -> Result<SpringOptions> {
    let base = match preset {
        Some(name) => presets.spring(name)?,
        None => SpringOptions::default(),
    };
    Ok(base.merged(overrides))
}
