use std::fmt;
use std::time::Duration;

/// Pause state of the frame loop.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LoopState {
    #[default]
    Running,
    Paused,
}

impl LoopState {
    pub fn toggled(self) -> Self {
        match self {
            LoopState::Running => LoopState::Paused,
            LoopState::Paused => LoopState::Running,
        }
    }

    pub fn is_paused(self) -> bool {
        self == LoopState::Paused
    }
}

/// Snapshot of frame loop counters.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct LoopStats {
    pub ticks: u64,
    pub life_duration: Duration,
    pub render_duration: Duration,
    pub state: LoopState,
}

impl LoopStats {
    /// Time the loop spent paused.
    pub fn paused_duration(&self) -> Duration {
        self.life_duration.saturating_sub(self.render_duration)
    }
}

impl fmt::Display for LoopStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ticks, life {:.3}s, render {:.3}s, {:?}",
            self.ticks,
            self.life_duration.as_secs_f64(),
            self.render_duration.as_secs_f64(),
            self.state,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_running() {
        assert_eq!(LoopState::default(), LoopState::Running);
    }

    #[test]
    fn toggle_flips_both_ways() {
        assert_eq!(LoopState::Running.toggled(), LoopState::Paused);
        assert_eq!(LoopState::Paused.toggled(), LoopState::Running);
    }

    #[test]
    fn paused_duration_is_the_gap() {
        let s = LoopStats {
            ticks: 3,
            life_duration: Duration::from_millis(300),
            render_duration: Duration::from_millis(100),
            state: LoopState::Paused,
        };
        assert_eq!(s.paused_duration(), Duration::from_millis(200));
    }
}
