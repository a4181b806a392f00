//! Host clock and frame scheduling
//!
//! Nothing in Ripple sleeps or blocks. Work is driven by callbacks that a
//! [`Host`] runs after a delay or on the next display frame. Hosts without a
//! native frame facility fall back to a fixed [`FALLBACK_FRAME_MS`] timer.

mod headless;
#[cfg(feature = "tokio")]
mod realtime;

pub use headless::{FrameMode, HeadlessHost};
#[cfg(feature = "tokio")]
pub use realtime::TokioHost;

use slotmap::new_key_type;

/// Frame cadence used when no native frame facility exists (~30fps)
pub const FALLBACK_FRAME_MS: f64 = 33.0;

new_key_type! {
    /// Handle to a pending timer
    pub struct TimerId;
    /// Handle to a pending native frame request
    pub struct FrameId;
}

/// Callback fired once when a timer elapses
pub type TimerCallback = Box<dyn FnOnce()>;

/// Callback fired once on the next frame, with the frame timestamp in ms
pub type FrameCallback = Box<dyn FnOnce(f64)>;

/// Handle to a pending frame request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameHandle {
    /// Registered with the host's native frame facility
    Native(FrameId),
    /// Emulated with a fallback timer
    Timer(TimerId),
}

/// Clock and callback scheduler supplied by the embedding environment
///
/// All callbacks run on the host's single thread, one at a time. A host must
/// never invoke a callback synchronously from inside `set_timeout` or
/// `request_frame`.
pub trait Host {
    /// Current time in milliseconds
    fn now(&self) -> f64;

    /// Run `callback` once after `delay_ms`
    fn set_timeout(&self, delay_ms: f64, callback: TimerCallback) -> TimerId;

    /// Cancel a pending timer. Unknown or already-fired ids are ignored.
    fn clear_timeout(&self, id: TimerId);

    /// Run `callback` once on the next frame
    ///
    /// The default implementation has no native frames and emulates them
    /// with a [`FALLBACK_FRAME_MS`] timer.
    fn request_frame(&self, callback: FrameCallback) -> FrameHandle {
        fallback_frame(self, callback)
    }

    /// Cancel a pending frame request. Unknown handles are ignored.
    fn cancel_frame(&self, handle: FrameHandle) {
        if let FrameHandle::Timer(id) = handle {
            self.clear_timeout(id);
        }
    }
}

/// Emulate a frame request with a fixed-interval timer
pub fn fallback_frame<H: Host + ?Sized>(host: &H, callback: FrameCallback) -> FrameHandle {
    let timestamp = host.now() + FALLBACK_FRAME_MS;
    FrameHandle::Timer(host.set_timeout(
        FALLBACK_FRAME_MS,
        Box::new(move || callback(timestamp)),
    ))
}
