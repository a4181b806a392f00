//! Reactive value generators
//!
//! Small building blocks that produce or reshape reactive values over time:
//!
//! - [`interval`] / [`timeout`]: clock-driven values
//! - [`debounced`]: follow a source only after it settles
//! - [`filtered`]: keep the latest source value that passes a predicate
//! - [`Sequence`]: a cursor over a fixed list

mod debounce;
mod filter;
mod sequence;
mod timing;

pub use debounce::{debounced, Debounced};
pub use filter::{filtered, Filtered};
pub use sequence::Sequence;
pub use timing::{interval, timeout, Interval, Timeout};
