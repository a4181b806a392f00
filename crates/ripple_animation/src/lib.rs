//! Ripple Animation System
//!
//! Reactive values that move smoothly toward their targets.
//!
//! # Features
//!
//! - **Tweens**: Duration-based transitions shaped by an easing curve
//! - **Springs**: Semi-implicit Euler spring physics with optional clamping
//! - **Interpolation**: Numbers, arrays, and flat records, or a custom interpolator
//! - **Interruptible**: A new target supersedes the running transition immediately
//! - **Presets**: Named tween and spring options loaded from TOML
//!
//! # Example
//!
//! ```rust
//! use ripple_animation::{tweened, Easing, TweenOptions};
//! use ripple_core::HeadlessHost;
//!
//! let host = HeadlessHost::with_frame_interval(10.0);
//! let opacity = tweened(
//!     host.shared(),
//!     0.0_f64,
//!     TweenOptions::new(200.0).with_easing(Easing::EaseOut),
//! )
//! .unwrap();
//!
//! opacity.set(1.0);
//! host.advance(200.0);
//! assert_eq!(opacity.value(), 1.0);
//! ```

pub mod animated;
pub mod easing;
mod engine;
pub mod error;
pub mod interpolate;
pub mod motion;
pub mod presets;
pub mod spring;
pub mod state;
pub mod tween;

pub use animated::{
    follow_spring, follow_tweened, spring, tweened, Animated, Follow, Springy, Tweened,
};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use interpolate::{Interpolate, Interpolator, Strategy};
pub use motion::{
    DelayOptions, DelayOverrides, Motion, MotionOptions, Overrides, OverridesOf, StepFn,
};
pub use presets::MotionPresets;
pub use spring::{Spring, SpringOptions, SpringOverrides, SpringState};
pub use state::{AnimationState, RunPhase};
pub use tween::{Tween, TweenOptions, TweenOverrides};
