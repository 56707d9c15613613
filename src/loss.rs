// Simulated packet loss
//
// Each packet is dropped independently with probability `percent / 100`. The
// generator is owned by the simulator so a fixed seed replays the same losses.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SpeexError};

/// Per-packet Bernoulli loss injector
#[derive(Debug, Clone)]
pub struct LossSimulator {
    percent: u8,
    rng: StdRng,
}

impl LossSimulator {
    /// Loss at `percent` (0..=100); unseeded simulators draw from OS entropy
    pub fn new(percent: u8, seed: Option<u64>) -> Result<Self> {
        if percent > 100 {
            return Err(SpeexError::InvalidLossPercent(percent));
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(LossSimulator { percent, rng })
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// Decide whether the next packet is lost
    pub fn next_is_lost(&mut self) -> bool {
        self.percent > 0 && self.rng.gen_range(0..100u8) < self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_percent_never_loses() {
        let mut loss = LossSimulator::new(0, Some(1)).unwrap();
        assert!((0..100_000).all(|_| !loss.next_is_lost()));
    }

    #[test]
    fn test_hundred_percent_always_loses() {
        let mut loss = LossSimulator::new(100, Some(1)).unwrap();
        assert!((0..100_000).all(|_| loss.next_is_lost()));
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let mut a = LossSimulator::new(30, Some(42)).unwrap();
        let mut b = LossSimulator::new(30, Some(42)).unwrap();
        let run_a: Vec<bool> = (0..1000).map(|_| a.next_is_lost()).collect();
        let run_b: Vec<bool> = (0..1000).map(|_| b.next_is_lost()).collect();
        assert_eq!(run_a, run_b);

        // roughly 30% over 1000 draws
        let lost = run_a.iter().filter(|&&l| l).count();
        assert!((200..400).contains(&lost), "lost {}", lost);
    }

    #[test]
    fn test_rejects_out_of_range_percent() {
        assert!(matches!(
            LossSimulator::new(101, None),
            Err(SpeexError::InvalidLossPercent(101))
        ));
        let mut none = LossSimulator::new(0, Some(1)).unwrap();
        assert_eq!(none.percent(), 0);
        assert!((0..100).all(|_| !none.next_is_lost()));
    }
}
