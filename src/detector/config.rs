use anyhow::{bail, Result};

/// Tunables for one detection session. Durations are in seconds, `rise` and
/// `fall` are multipliers applied to the adaptive noise floor.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Shortest whistle that still counts.
    pub min: f64,
    /// Longest whistle that still counts.
    pub max: f64,
    /// A whistle starts when energy reaches `rise * noise_floor`.
    pub rise: f64,
    /// A whistle provisionally ends when energy drops below `fall * noise_floor`.
    pub fall: f64,
    /// Silence gap that still merges into the same whistle.
    pub hold: f64,
    /// Noise-floor smoothing factor, in (0, 1).
    pub alpha: f64,
    /// Events starting before this point are discarded.
    pub warmup: f64,
    /// Optional noise-floor seed; otherwise the first frame seeds it.
    pub floor: Option<f64>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 15.0,
            rise: 6.0,
            fall: 3.0,
            hold: 0.4,
            alpha: 0.02,
            warmup: 1.0,
            floor: None,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.fall <= 0.0 {
            bail!("fall must be positive, got {}", self.fall);
        }
        if self.rise <= self.fall {
            bail!(
                "rise ({}) must be greater than fall ({}) for hysteresis",
                self.rise,
                self.fall
            );
        }
        if self.min <= 0.0 {
            bail!("min duration must be positive, got {}", self.min);
        }
        if self.min > self.max {
            bail!("min duration ({}) exceeds max ({})", self.min, self.max);
        }
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            bail!("alpha must lie in (0, 1), got {}", self.alpha);
        }
        if self.hold < 0.0 {
            bail!("hold must not be negative, got {}", self.hold);
        }
        if self.warmup < 0.0 {
            bail!("warmup must not be negative, got {}", self.warmup);
        }
        if self.floor.map_or(false, |f| f < 0.0) {
            bail!("floor seed must not be negative");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_hysteresis() {
        let cfg = DetectorConfig {
            rise: 3.0,
            fall: 3.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_inverted_duration_window() {
        let cfg = DetectorConfig {
            min: 5.0,
            max: 2.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_alpha_out_of_range() {
        for alpha in [0.0, 1.0, -0.1, 2.0] {
            let cfg = DetectorConfig {
                alpha,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "alpha {} accepted", alpha);
        }
    }

    #[test]
    fn rejects_negative_durations() {
        let cfg = DetectorConfig {
            hold: -0.1,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
        let cfg = DetectorConfig {
            warmup: -1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
