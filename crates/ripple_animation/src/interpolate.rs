//! Interpolation between animated values
//!
//! An [`Interpolator`] is derived once per animated value from a sample and
//! reused for every run. Built-in shapes are plain numbers, arrays of numbers
//! and flat records of numbers. Anything else needs [`Interpolator::custom`].
//!
//! Arrays and records follow the destination's shape. An element or key that
//! the source lacks is not animated; it sits at the destination value from
//! the first frame.

use crate::error::{AnimationError, Result};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Shape of an interpolated value, resolved once from a sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// A single number
    Scalar,
    /// Numbers by position
    Array,
    /// Numbers by field name
    Record,
}

/// Values the built-in interpolator knows how to blend
pub trait Interpolate: Clone + 'static {
    /// Inspect `sample` and pick the strategy for this value's shape
    fn strategy(sample: &Self) -> Result<Strategy>;

    /// Blend `a` toward `b` by `t`
    ///
    /// `t` is usually in `[0, 1]` but overshooting curves and springs may go
    /// past either end.
    fn lerp(strategy: Strategy, a: &Self, b: &Self, t: f64) -> Self;
}

#[inline]
fn mix(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

macro_rules! impl_numeric {
    ($($ty:ty),*) => {$(
        impl Interpolate for $ty {
            fn strategy(_: &Self) -> Result<Strategy> {
                Ok(Strategy::Scalar)
            }

            fn lerp(_: Strategy, a: &Self, b: &Self, t: f64) -> Self {
                mix(*a as f64, *b as f64, t) as $ty
            }
        }

        impl Interpolate for Vec<$ty> {
            fn strategy(_: &Self) -> Result<Strategy> {
                Ok(Strategy::Array)
            }

            fn lerp(_: Strategy, a: &Self, b: &Self, t: f64) -> Self {
                b.iter()
                    .enumerate()
                    .map(|(i, to)| match a.get(i) {
                        Some(from) => mix(*from as f64, *to as f64, t) as $ty,
                        None => *to,
                    })
                    .collect()
            }
        }

        impl<const N: usize> Interpolate for [$ty; N] {
            fn strategy(_: &Self) -> Result<Strategy> {
                Ok(Strategy::Array)
            }

            fn lerp(_: Strategy, a: &Self, b: &Self, t: f64) -> Self {
                std::array::from_fn(|i| mix(a[i] as f64, b[i] as f64, t) as $ty)
            }
        }
    )*};
}

impl_numeric!(f32, f64);

impl Interpolate for BTreeMap<String, f64> {
    fn strategy(_: &Self) -> Result<Strategy> {
        Ok(Strategy::Record)
    }

    fn lerp(_: Strategy, a: &Self, b: &Self, t: f64) -> Self {
        b.iter()
            .map(|(key, to)| {
                let value = a.get(key).map_or(*to, |from| mix(*from, *to, t));
                (key.clone(), value)
            })
            .collect()
    }
}

impl Interpolate for IndexMap<String, f64> {
    fn strategy(_: &Self) -> Result<Strategy> {
        Ok(Strategy::Record)
    }

    fn lerp(_: Strategy, a: &Self, b: &Self, t: f64) -> Self {
        b.iter()
            .map(|(key, to)| {
                let value = a.get(key).map_or(*to, |from| mix(*from, *to, t));
                (key.clone(), value)
            })
            .collect()
    }
}

/// JSON values are checked at construction: a number, an array of numbers
/// or an object whose values are all numbers.
impl Interpolate for Value {
    fn strategy(sample: &Self) -> Result<Strategy> {
        match sample {
            Value::Number(_) => Ok(Strategy::Scalar),
            Value::Array(items) if items.iter().all(Value::is_number) => Ok(Strategy::Array),
            Value::Object(fields) if fields.values().all(Value::is_number) => {
                Ok(Strategy::Record)
            }
            other => Err(AnimationError::UnsupportedShape {
                found: json_kind(other),
            }),
        }
    }

    fn lerp(strategy: Strategy, a: &Self, b: &Self, t: f64) -> Self {
        match (strategy, a, b) {
            (Strategy::Scalar, from, to) => mix_json(Some(from), to, t),
            (Strategy::Array, Value::Array(from), Value::Array(to)) => Value::Array(
                to.iter()
                    .enumerate()
                    .map(|(i, to)| mix_json(from.get(i), to, t))
                    .collect(),
            ),
            (Strategy::Record, Value::Object(from), Value::Object(to)) => Value::Object(
                to.iter()
                    .map(|(key, to)| (key.clone(), mix_json(from.get(key), to, t)))
                    .collect(),
            ),
            // Shape changed since the sample was taken
            (_, _, to) => to.clone(),
        }
    }
}

fn mix_json(from: Option<&Value>, to: &Value, t: f64) -> Value {
    match (from.and_then(Value::as_f64), to.as_f64()) {
        // Endpoints keep their integer/float representation
        (Some(_), Some(_)) if t == 0.0 => from.cloned().unwrap_or_else(|| to.clone()),
        (Some(_), Some(_)) if t == 1.0 => to.clone(),
        (Some(a), Some(b)) => Value::from(mix(a, b, t)),
        _ => to.clone(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "mixed array",
        Value::Object(_) => "nested object",
    }
}

type BlendFn<T> = fn(Strategy, &T, &T, f64) -> T;
type CustomFn<T> = Rc<dyn Fn(&T, &T) -> Box<dyn Fn(f64) -> T>>;

enum Kind<T> {
    Builtin { strategy: Strategy, blend: BlendFn<T> },
    Custom(CustomFn<T>),
}

/// Produces a progress-to-value function for a pair of endpoints
pub struct Interpolator<T> {
    kind: Kind<T>,
}

impl<T: Interpolate> Interpolator<T> {
    /// Resolve the built-in strategy for values shaped like `sample`
    pub fn for_sample(sample: &T) -> Result<Self> {
        let strategy = T::strategy(sample)?;
        Ok(Self {
            kind: Kind::Builtin {
                strategy,
                blend: T::lerp,
            },
        })
    }
}

impl<T: Clone + 'static> Interpolator<T> {
    /// Use `f` to build the progress function for each run
    pub fn custom(f: impl Fn(&T, &T) -> Box<dyn Fn(f64) -> T> + 'static) -> Self {
        Self {
            kind: Kind::Custom(Rc::new(f)),
        }
    }

    /// The built-in strategy, `None` for custom interpolators
    pub fn strategy(&self) -> Option<Strategy> {
        match &self.kind {
            Kind::Builtin { strategy, .. } => Some(*strategy),
            Kind::Custom(_) => None,
        }
    }

    /// Progress function from `a` to `b`
    pub fn between(&self, a: &T, b: &T) -> Box<dyn Fn(f64) -> T> {
        match &self.kind {
            Kind::Builtin { strategy, blend } => {
                let (strategy, blend) = (*strategy, *blend);
                let (a, b) = (a.clone(), b.clone());
                Box::new(move |t| blend(strategy, &a, &b, t))
            }
            Kind::Custom(f) => f(a, b),
        }
    }
}

impl<T> Clone for Interpolator<T> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            Kind::Builtin { strategy, blend } => Kind::Builtin {
                strategy: *strategy,
                blend: *blend,
            },
            Kind::Custom(f) => Kind::Custom(Rc::clone(f)),
        };
        Self { kind }
    }
}

impl<T> fmt::Debug for Interpolator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Builtin { strategy, .. } => f
                .debug_struct("Interpolator")
                .field("strategy", strategy)
                .finish(),
            Kind::Custom(_) => f.write_str("Interpolator(custom)"),
        }
    }
}
