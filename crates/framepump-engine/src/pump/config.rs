use std::time::Duration;

use anyhow::{Context, Result};

use crate::input::KeyBinding;

/// Frame loop configuration.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Nominal tick interval. Every tick advances the clocks by exactly this much.
    pub tick_interval: Duration,

    /// Key that toggles pause.
    pub toggle_key: KeyBinding,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs_f64(1.0 / 60.0),
            toggle_key: KeyBinding::default(),
        }
    }
}

impl LoopConfig {
    /// Ticks `hz` times per second.
    pub fn from_hz(hz: f64) -> Result<Self> {
        anyhow::ensure!(hz.is_finite() && hz > 0.0, "tick rate must be positive, got {hz}");
        let tick_interval = Duration::try_from_secs_f64(1.0 / hz)
            .with_context(|| format!("tick rate {hz} Hz has no representable interval"))?;

        let config = Self {
            tick_interval,
            ..Self::default()
        };
        config
            .validate()
            .with_context(|| format!("tick rate {hz} Hz is too fast"))?;
        Ok(config)
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_toggle_key(mut self, key: KeyBinding) -> Self {
        self.toggle_key = key;
        self
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !self.tick_interval.is_zero(),
            "tick interval must be greater than zero"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    #[test]
    fn default_is_sixty_hz_uppercase_p() {
        let c = LoopConfig::default();
        assert!((c.tick_interval.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
        assert_eq!(c.toggle_key, KeyBinding::Char('P'));
        assert!(c.validate().is_ok());
    }

    #[test]
    fn from_hz_rejects_non_positive_rates() {
        assert!(LoopConfig::from_hz(0.0).is_err());
        assert!(LoopConfig::from_hz(-30.0).is_err());
        assert!(LoopConfig::from_hz(f64::NAN).is_err());
        assert!(LoopConfig::from_hz(f64::INFINITY).is_err());
        assert_eq!(
            LoopConfig::from_hz(50.0).unwrap().tick_interval,
            Duration::from_millis(20)
        );
    }

    #[test]
    fn from_hz_rejects_rates_without_a_usable_interval() {
        // Interval overflows `Duration`.
        assert!(LoopConfig::from_hz(1e-300).is_err());
        // Interval rounds down to zero.
        assert!(LoopConfig::from_hz(1e12).is_err());
    }

    #[test]
    fn zero_interval_fails_validation() {
        let c = LoopConfig::default().with_tick_interval(Duration::ZERO);
        assert!(c.validate().is_err());
    }

    #[test]
    fn builder_overrides_toggle_key() {
        let c = LoopConfig::default().with_toggle_key(KeyBinding::Physical(Key::Space));
        assert_eq!(c.toggle_key, KeyBinding::Physical(Key::Space));
    }
}
