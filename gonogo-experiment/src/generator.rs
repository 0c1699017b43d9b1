use crate::error::ConfigError;
use gonogo_core::{StimulusKind, TrialSpec};
use rand::Rng;
use std::time::Duration;

/// Draws the kind and pre-stimulus delay of each trial.
///
/// Draws are independent: there is no balancing across trials and no cap on runs of
/// the same kind.
#[derive(Debug, Clone)]
pub struct TrialGenerator<R: Rng> {
    rng: R,
    go_probability: f64,
    base_delay_ms: u64,
    max_jitter_ms: u64,
}

impl<R: Rng> TrialGenerator<R> {
    pub fn new(
        rng: R,
        go_probability: f64,
        base_delay_ms: u64,
        max_jitter_ms: u64,
    ) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&go_probability) {
            return Err(ConfigError::GoProbability(go_probability));
        }
        Ok(Self {
            rng,
            go_probability,
            base_delay_ms,
            max_jitter_ms,
        })
    }

    pub fn generate(&mut self, index: usize) -> TrialSpec {
        let kind = if self.rng.random_bool(self.go_probability) {
            StimulusKind::Go
        } else {
            StimulusKind::NoGo
        };
        let jitter_ms = if self.max_jitter_ms == 0 {
            0
        } else {
            self.rng.random_range(0..self.max_jitter_ms)
        };

        TrialSpec {
            index,
            kind,
            delay: Duration::from_millis(self.base_delay_ms.saturating_add(jitter_ms)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn generator(go_probability: f64, base: u64, jitter: u64) -> TrialGenerator<StdRng> {
        TrialGenerator::new(StdRng::seed_from_u64(7), go_probability, base, jitter).unwrap()
    }

    #[test]
    fn rejects_probability_outside_unit_range() {
        for p in [-0.5, 1.5, f64::NAN] {
            let result = TrialGenerator::new(StdRng::seed_from_u64(1), p, 1000, 2000);
            assert!(matches!(result, Err(ConfigError::GoProbability(_))), "accepted {p}");
        }
    }

    #[test]
    fn huge_delay_saturates_instead_of_overflowing() {
        let mut generator = generator(0.5, u64::MAX, 2000);
        assert_eq!(generator.generate(1).delay, Duration::from_millis(u64::MAX));
    }

    #[test]
    fn delay_stays_in_half_open_range() {
        let mut generator = generator(0.6, 1000, 2000);
        for index in 1..=500 {
            let spec = generator.generate(index);
            assert_eq!(spec.index, index);
            assert!(spec.delay >= Duration::from_millis(1000));
            assert!(spec.delay < Duration::from_millis(3000));
        }
    }

    #[test]
    fn zero_jitter_gives_the_base_delay() {
        let mut generator = generator(0.6, 750, 0);
        for index in 1..=20 {
            assert_eq!(generator.generate(index).delay, Duration::from_millis(750));
        }
    }

    #[test]
    fn probability_extremes_are_deterministic() {
        let mut always = generator(1.0, 0, 10);
        let mut never = generator(0.0, 0, 10);
        for index in 1..=100 {
            assert_eq!(always.generate(index).kind, StimulusKind::Go);
            assert_eq!(never.generate(index).kind, StimulusKind::NoGo);
        }
    }

    #[test]
    fn go_share_tracks_probability() {
        let mut generator = generator(0.6, 1000, 2000);
        let go = (1..=10_000)
            .filter(|&i| generator.generate(i).kind == StimulusKind::Go)
            .count();
        assert!((5600..=6400).contains(&go), "go trials: {go}");
    }

    #[test]
    fn same_seed_same_schedule() {
        let mut a = generator(0.6, 1000, 2000);
        let mut b = generator(0.6, 1000, 2000);
        for index in 1..=50 {
            assert_eq!(a.generate(index), b.generate(index));
        }
    }
}
