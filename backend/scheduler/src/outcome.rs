//! Built-in outcome sources.
//!
//! [`CoinFlip`] simulates call results the way the demo front end does;
//! [`ScriptedOutcomes`] replays a fixed sequence for deterministic runs.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use redial_core::{OutcomeSource, RedialError, Result};

/// Simulated call results: each attempt succeeds with a fixed probability.
#[derive(Debug)]
pub struct CoinFlip {
    rng: StdRng,
    success_probability: f64,
}

impl CoinFlip {
    /// `success_probability` must be within `0.0..=1.0`.
    pub fn new(success_probability: f64) -> Result<Self> {
        Self::build(success_probability, StdRng::from_entropy())
    }

    /// Reproducible variant of [`new`](Self::new).
    pub fn seeded(success_probability: f64, seed: u64) -> Result<Self> {
        Self::build(success_probability, StdRng::seed_from_u64(seed))
    }

    fn build(success_probability: f64, rng: StdRng) -> Result<Self> {
        if !(0.0..=1.0).contains(&success_probability) {
            return Err(RedialError::invalid_argument(
                "successProbability",
                format!("{success_probability} is outside 0.0..=1.0"),
            ));
        }
        Ok(Self {
            rng,
            success_probability,
        })
    }

    pub fn success_probability(&self) -> f64 {
        self.success_probability
    }
}

impl OutcomeSource for CoinFlip {
    fn next_outcome(&mut self) -> bool {
        self.rng.gen_bool(self.success_probability)
    }
}

/// Replays a fixed list of outcomes, then keeps answering `fallback`.
#[derive(Debug, Clone)]
pub struct ScriptedOutcomes {
    script: VecDeque<bool>,
    fallback: bool,
}

impl ScriptedOutcomes {
    pub fn new(script: impl IntoIterator<Item = bool>) -> Self {
        Self {
            script: script.into_iter().collect(),
            fallback: false,
        }
    }

    /// Answer to give once the script runs out (default `false`).
    pub fn then(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }
}

impl OutcomeSource for ScriptedOutcomes {
    fn next_outcome(&mut self) -> bool {
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coin_flip_rejects_bad_probability() {
        assert!(CoinFlip::new(1.5).is_err());
        assert!(CoinFlip::new(-0.1).is_err());
        assert!(CoinFlip::new(f64::NAN).is_err());
    }

    #[test]
    fn certain_coins_are_certain() {
        let mut always = CoinFlip::seeded(1.0, 7).unwrap();
        let mut never = CoinFlip::seeded(0.0, 7).unwrap();
        for _ in 0..32 {
            assert!(always.next_outcome());
            assert!(!never.next_outcome());
        }
    }

    #[test]
    fn seeded_coins_repeat() {
        let mut a = CoinFlip::seeded(0.5, 42).unwrap();
        let mut b = CoinFlip::seeded(0.5, 42).unwrap();
        let left: Vec<bool> = (0..64).map(|_| a.next_outcome()).collect();
        let right: Vec<bool> = (0..64).map(|_| b.next_outcome()).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn script_then_fallback() {
        let mut s = ScriptedOutcomes::new([false, true]).then(true);
        assert!(!s.next_outcome());
        assert!(s.next_outcome());
        assert!(s.next_outcome());
        assert!(s.next_outcome());
    }
}
