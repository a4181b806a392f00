//! Ripple Core Runtime
//!
//! This crate provides the foundational primitives for Ripple:
//!
//! - **Stores**: Single-threaded reactive value cells with synchronous change notification
//! - **Hosts**: Clock and frame scheduling abstraction (deterministic headless host, tokio host)
//! - **Generators**: Intervals, timeouts, debouncing, filtering, and sequence cursors
//!
//! # Example
//!
//! ```rust
//! use ripple_core::store::{derived, Readable, Store};
//!
//! let count = Store::new(1);
//! let doubled = derived(&count, |n| n * 2);
//!
//! count.set(5);
//! assert_eq!(doubled.get(), 10);
//! ```

pub mod error;
pub mod generators;
pub mod host;
pub mod store;

pub use error::{CoreError, Result};
pub use generators::{
    debounced, filtered, interval, timeout, Debounced, Filtered, Interval, Sequence, Timeout,
};
pub use host::{
    FrameCallback, FrameHandle, FrameId, FrameMode, HeadlessHost, Host, TimerCallback, TimerId,
    FALLBACK_FRAME_MS,
};
#[cfg(feature = "tokio")]
pub use host::TokioHost;
pub use store::{derived, Derived, ReadOnly, Readable, Store, Subscription};
