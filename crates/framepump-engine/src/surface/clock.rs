use std::time::Duration;

/// Render-time accumulator embedded by surfaces.
///
/// Only moves forward, and only when advanced.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct RenderClock {
    elapsed: Duration,
}

impl RenderClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Elapsed time in seconds, for shader-style animation parameters.
    pub fn as_secs_f32(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}
