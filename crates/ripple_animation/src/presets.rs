//! Named motion presets
//!
//! Presets are plain option records grouped by motion kind and loaded from
//! TOML:
//!
//! ```toml
//! [tween.fade]
//! duration = 150.0
//! easing = "ease-out"
//!
//! [spring.bouncy]
//! stiffness = 180.0
//! damping = 8.0
//! ```
//!
//! Fields left out take the motion's defaults.

use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::spring::SpringOptions;
use crate::tween::TweenOptions;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Named tween and spring options
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionPresets {
    pub tween: FxHashMap<String, TweenOptions>,
    pub spring: FxHashMap<String, SpringOptions>,
}

impl MotionPresets {
    /// The presets every build ships with
    pub fn builtin() -> Self {
        let mut presets = Self::default();

        presets
            .spring
            .insert("gentle".to_string(), SpringOptions::gentle());
        presets
            .spring
            .insert("snappy".to_string(), SpringOptions::snappy());
        presets
            .spring
            .insert("stiff".to_string(), SpringOptions::stiff());
        presets
            .spring
            .insert("wobbly".to_string(), SpringOptions::wobbly());

        presets.tween.insert(
            "quick".to_string(),
            TweenOptions::new(150.0).with_easing(Easing::EaseOutCubic),
        );
        presets.tween.insert(
            "smooth".to_string(),
            TweenOptions::new(400.0).with_easing(Easing::EaseInOutCubic),
        );

        presets
    }

    /// Parse presets from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let presets: Self = toml::from_str(content)?;
        tracing::debug!(
            tweens = presets.tween.len(),
            springs = presets.spring.len(),
            "loaded motion presets"
        );
        Ok(presets)
    }

    /// Serialize to TOML text
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Add every preset of `other`, replacing same-named ones
    pub fn merge(&mut self, other: MotionPresets) {
        self.tween.extend(other.tween);
        self.spring.extend(other.spring);
    }

    /// Look up a tween preset
    pub fn tween(&self, name: &str) -> Result<TweenOptions> {
        self.tween
            .get(name)
            .copied()
            .ok_or_else(|| AnimationError::UnknownPreset {
                kind: "tween",
                name: name.to_string(),
            })
    }

    /// Look up a spring preset
    pub fn spring(&self, name: &str) -> Result<SpringOptions> {
        self.spring
            .get(name)
            .copied()
            .ok_or_else(|| AnimationError::UnknownPreset {
                kind: "spring",
                name: name.to_string(),
            })
    }

    /// Sorted tween preset names
    pub fn tween_names(&self) -> Vec<&str> {
        sorted_keys(&self.tween)
    }

    /// Sorted spring preset names
    pub fn spring_names(&self) -> Vec<&str> {
        sorted_keys(&self.spring)
    }
}

fn sorted_keys<V>(map: &FxHashMap<String, V>) -> Vec<&str> {
    let mut names: Vec<&str> = map.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}
