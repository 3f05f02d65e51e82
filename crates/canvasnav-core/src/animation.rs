//! Animated camera transitions.

use crate::viewport::ViewportState;
use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

/// Cubic ease-out: fast start, gentle arrival.
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Generation stamp of a camera animation.
///
/// Every new animation gets a fresh token; frames carrying an older token
/// must not write viewport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationToken(pub(crate) u64);

/// Outcome of advancing an animation by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationStatus {
    /// State was written; schedule another frame.
    Running,
    /// State snapped to the target; no more frames needed.
    Finished,
    /// A newer animation (or a manual camera change) replaced this one.
    Superseded,
}

/// A transition between two viewport states.
#[derive(Debug, Clone)]
pub struct CameraAnimation {
    pub(crate) token: AnimationToken,
    from: ViewportState,
    to: ViewportState,
    start: Instant,
    duration: Duration,
}

impl CameraAnimation {
    pub(crate) fn new(
        token: AnimationToken,
        from: ViewportState,
        to: ViewportState,
        start: Instant,
        duration: Duration,
    ) -> Self {
        Self {
            token,
            from,
            to,
            start,
            duration,
        }
    }

    pub fn token(&self) -> AnimationToken {
        self.token
    }

    /// Final camera state.
    pub fn target(&self) -> ViewportState {
        self.to
    }

    /// Normalised progress in `[0, 1]` at `now`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Camera state at `now`, and whether the animation has completed.
    ///
    /// On completion the exact target is returned rather than an
    /// interpolated value.
    pub fn sample(&self, now: Instant) -> (ViewportState, bool) {
        let progress = self.progress(now);
        if progress >= 1.0 {
            return (self.to, true);
        }
        let t = ease_out_cubic(progress);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        let state = ViewportState {
            x: lerp(self.from.x, self.to.x),
            y: lerp(self.from.y, self.to.y),
            zoom: lerp(self.from.zoom, self.to.zoom),
        };
        (state, false)
    }
}
