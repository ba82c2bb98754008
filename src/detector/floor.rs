/// Exponentially-weighted estimate of the background energy level.
///
/// The floor only adapts while the detector judges the signal to be
/// background; during a whistle it is frozen so a loud tone cannot raise its
/// own threshold and cut itself off.
#[derive(Debug, Clone)]
pub struct NoiseFloor {
    alpha: f64,
    level: Option<f64>,
}

impl NoiseFloor {
    pub fn new(alpha: f64) -> Self {
        Self { alpha, level: None }
    }

    /// Starts from a known background level instead of the first frame.
    pub fn seeded(alpha: f64, seed: f64) -> Self {
        Self {
            alpha,
            level: Some(seed.max(0.0)),
        }
    }

    /// Current estimate, or `None` until the first frame has been seen.
    pub fn level(&self) -> Option<f64> {
        self.level
    }

    /// Feeds one frame's energy. The first observation seeds the estimate;
    /// afterwards the floor tracks energy only while `active` is false.
    pub fn observe(&mut self, energy: f64, active: bool) {
        match self.level {
            None => self.level = Some(energy),
            Some(cur) if !active => {
                self.level = Some(cur * (1.0 - self.alpha) + energy * self.alpha);
            }
            Some(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_from_first_observation() {
        let mut floor = NoiseFloor::new(0.02);
        assert_eq!(floor.level(), None);
        floor.observe(0.25, false);
        assert_eq!(floor.level(), Some(0.25));
    }

    #[test]
    fn adapts_while_inactive() {
        let mut floor = NoiseFloor::seeded(0.1, 1.0);
        floor.observe(2.0, false);
        assert!((floor.level().unwrap() - 1.1).abs() < 1e-12);
        floor.observe(2.0, false);
        assert!((floor.level().unwrap() - 1.19).abs() < 1e-12);
    }

    #[test]
    fn frozen_while_active() {
        let mut floor = NoiseFloor::seeded(0.5, 1.0);
        floor.observe(10.0, true);
        floor.observe(20.0, true);
        assert_eq!(floor.level(), Some(1.0));
    }

    #[test]
    fn accepts_zero_energy_and_stays_non_negative() {
        let mut floor = NoiseFloor::seeded(0.5, 0.5);
        for _ in 0..100 {
            floor.observe(0.0, false);
        }
        let level = floor.level().unwrap();
        assert!(level >= 0.0);
        assert!(level < 1e-6);
    }

    #[test]
    fn negative_seed_is_clamped() {
        let floor = NoiseFloor::seeded(0.1, -3.0);
        assert_eq!(floor.level(), Some(0.0));
    }
}
