//! Fault injection strategy for the synthetic-behavior endpoints.
//!
//! Handlers never read the environment or a thread-local RNG directly. They
//! ask the injected [`FaultInjector`] whether to fail and how long to stall,
//! which keeps them deterministic under a fixed seed.
//!
//! The RNG lock is held only for a single draw and never across an `.await`.

use crate::config::Config;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Probability that `/sometimes-broken` answers 500.
pub const SOMETIMES_BROKEN_RATE: f64 = 0.3;

/// Failure probability, delays and a random source.
pub struct FaultInjector {
    failure_rate: f64,
    slow_delay: Duration,
    may_fail_delay: RangeInclusive<Duration>,
    rng: Mutex<StdRng>,
}

impl FaultInjector {
    /// Build the injector described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let rng = match config.fault_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            failure_rate: config.failure_rate,
            slow_delay: config.slow_delay,
            may_fail_delay: config.may_fail_min_delay..=config.may_fail_max_delay,
            rng: Mutex::new(rng),
        }
    }

    /// Configured `/may-fail` failure probability.
    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Configured `/slow` delay.
    pub fn slow_delay(&self) -> Duration {
        self.slow_delay
    }

    /// Decide whether a `/may-fail` request fails.
    pub fn should_fail(&self) -> bool {
        self.chance(self.failure_rate)
    }

    /// True with probability `probability`. Values outside `[0, 1]` saturate.
    pub fn chance(&self, probability: f64) -> bool {
        let roll: f64 = self.with_rng(|rng| rng.gen());
        roll < probability
    }

    /// Random processing delay for `/may-fail`, uniform over the configured range.
    pub fn may_fail_delay(&self) -> Duration {
        let (min, max) = (*self.may_fail_delay.start(), *self.may_fail_delay.end());
        if max <= min {
            return min;
        }

        let secs = self.uniform(min.as_secs_f64(), max.as_secs_f64());
        Duration::try_from_secs_f64(secs).unwrap_or(min)
    }

    /// Uniform float in `[low, high]`; `low` when the range is empty.
    pub fn uniform(&self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.with_rng(|rng| rng.gen_range(low..=high))
    }

    /// Uniform integer in `range`; the start when the range is empty.
    pub fn int_in(&self, range: RangeInclusive<u32>) -> u32 {
        if range.is_empty() {
            return *range.start();
        }
        self.with_rng(|rng| rng.gen_range(range))
    }

    /// Pick one item at random. `None` only for an empty slice.
    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.with_rng(|rng| items.choose(rng))
    }

    fn with_rng<T>(&self, draw: impl FnOnce(&mut StdRng) -> T) -> T {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        draw(&mut rng)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn injector(pairs: &[(&str, &str)]) -> FaultInjector {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        FaultInjector::from_config(&Config::from_vars(&vars).unwrap())
    }

    #[test]
    fn test_failure_rate_one_always_fails() {
        let faults = injector(&[("FAILURE_RATE", "1.0"), ("FAULT_SEED", "7")]);
        assert!((0..1_000).all(|_| faults.should_fail()));
    }

    #[test]
    fn test_failure_rate_zero_never_fails() {
        let faults = injector(&[("FAILURE_RATE", "0.0"), ("FAULT_SEED", "7")]);
        assert!((0..1_000).all(|_| !faults.should_fail()));
    }

    #[test]
    fn test_same_seed_gives_same_decisions() {
        let first = injector(&[("FAILURE_RATE", "0.5"), ("FAULT_SEED", "1234")]);
        let second = injector(&[("FAILURE_RATE", "0.5"), ("FAULT_SEED", "1234")]);

        let a: Vec<bool> = (0..64).map(|_| first.should_fail()).collect();
        let b: Vec<bool> = (0..64).map(|_| second.should_fail()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_failure_rate_is_roughly_honoured() {
        let faults = injector(&[("FAILURE_RATE", "0.3"), ("FAULT_SEED", "99")]);

        let failures = (0..10_000).filter(|_| faults.should_fail()).count();
        assert!((2_500..3_500).contains(&failures), "got {failures} failures");
    }

    #[test]
    fn test_may_fail_delay_stays_in_default_range() {
        let faults = injector(&[("FAULT_SEED", "3")]);

        for _ in 0..1_000 {
            let delay = faults.may_fail_delay();
            assert!(delay >= Duration::from_millis(100), "{delay:?} too short");
            assert!(delay <= Duration::from_millis(500), "{delay:?} too long");
        }
    }

    #[test]
    fn test_may_fail_delay_degenerate_range() {
        let faults = injector(&[("MAY_FAIL_MIN_DELAY", "0"), ("MAY_FAIL_MAX_DELAY", "0")]);
        assert_eq!(faults.may_fail_delay(), Duration::ZERO);
    }

    #[test]
    fn test_slow_delay_comes_from_config() {
        let faults = injector(&[("SLOW_DELAY", "0.75")]);
        assert_eq!(faults.slow_delay(), Duration::from_millis(750));
    }

    #[test]
    fn test_int_in_and_uniform_stay_in_bounds() {
        let faults = injector(&[("FAULT_SEED", "5")]);

        for _ in 0..1_000 {
            assert!((1..=100).contains(&faults.int_in(1..=100)));
            let load = faults.uniform(0.1, 2.5);
            assert!((0.1..=2.5).contains(&load));
        }
        assert_eq!(faults.uniform(1.0, 1.0), 1.0);
    }

    #[test]
    fn test_choose_from_empty_slice() {
        let faults = injector(&[]);
        let empty: [&str; 0] = [];
        assert!(faults.choose(&empty).is_none());
        assert_eq!(faults.choose(&["only"]), Some(&"only"));
    }
}
