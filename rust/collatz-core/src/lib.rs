//! Shared types and the trajectory engine for Collatz residue-class experiments.
//!
//! All arithmetic is exact `BigUint` arithmetic: the experiments probe
//! magnitudes up to 2^1000 and beyond, far past native integer ranges.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use std::fmt;

/// Errors surfaced by the trajectory engine and the analyzers built on it.
#[derive(Debug, thiserror::Error)]
pub enum CollatzError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// How a trajectory is allowed to terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrajectoryMode {
    /// Iterate until the value reaches 1.
    FullConvergence,
    /// Stop at the first value strictly below the starting value.
    Descent,
}

/// Why a trajectory stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    ReachedOne,
    Descended,
    BoundExceeded,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::ReachedOne => write!(f, "reached-one"),
            Termination::Descended => write!(f, "descended"),
            Termination::BoundExceeded => write!(f, "bound-exceeded"),
        }
    }
}

/// Summary of a single trajectory — one per simulated starting value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrajectorySummary {
    /// The starting value.
    pub start: BigUint,
    /// Number of Collatz steps taken before termination.
    pub steps: u64,
    /// Maximum value observed along the trajectory (start included).
    pub peak: BigUint,
    /// Why iteration stopped.
    pub termination: Termination,
}

/// One application of the Collatz map: n/2 if even, else 3n+1.
pub fn collatz_step(n: &BigUint) -> BigUint {
    if n.is_even() {
        n >> 1u32
    } else {
        n * 3u32 + 1u32
    }
}

/// Default step bound for a starting value, proportional to bit-length
/// squared. Comfortably above every empirically known total stopping time
/// for the magnitudes these experiments reach (2^1000-scale inputs).
pub fn default_step_bound(n: &BigUint) -> u64 {
    let bits = n.bits().max(1);
    bits.saturating_mul(bits).saturating_mul(20).max(1000)
}

/// Iterate the Collatz map from `start`, producing a [`TrajectorySummary`].
///
/// Terminates on the first of: the value reaching 1 (`ReachedOne`), the value
/// dropping below `start` in [`TrajectoryMode::Descent`] (`Descended`), or
/// the step count reaching `max_steps` (`BoundExceeded`). The step bound is a
/// hard guarantee of termination; reaching it always reports
/// `BoundExceeded`, even if the bounded step landed on 1.
pub fn compute_trajectory(
    start: &BigUint,
    max_steps: u64,
    mode: TrajectoryMode,
) -> Result<TrajectorySummary, CollatzError> {
    if start.is_zero() {
        return Err(CollatzError::InvalidInput(
            "starting value must be a positive integer".into(),
        ));
    }
    if max_steps == 0 {
        return Err(CollatzError::InvalidInput(
            "maximum step count must be positive".into(),
        ));
    }

    let one = BigUint::one();
    let mut current = start.clone();
    let mut peak = start.clone();
    let mut steps = 0u64;

    loop {
        if current == one {
            return Ok(TrajectorySummary {
                start: start.clone(),
                steps,
                peak,
                termination: Termination::ReachedOne,
            });
        }

        current = collatz_step(&current);
        steps += 1;
        if current > peak {
            peak = current.clone();
        }

        if mode == TrajectoryMode::Descent && current < *start {
            return Ok(TrajectorySummary {
                start: start.clone(),
                steps,
                peak,
                termination: Termination::Descended,
            });
        }

        if steps == max_steps {
            return Ok(TrajectorySummary {
                start: start.clone(),
                steps,
                peak,
                termination: Termination::BoundExceeded,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_step_parity() {
        assert_eq!(collatz_step(&big(6)), big(3));
        assert_eq!(collatz_step(&big(3)), big(10));
        assert_eq!(collatz_step(&big(1)), big(4));
    }

    #[test]
    fn test_trajectory_of_one_is_empty() {
        let s = compute_trajectory(&big(1), 100, TrajectoryMode::FullConvergence).unwrap();
        assert_eq!(s.steps, 0);
        assert_eq!(s.peak, big(1));
        assert_eq!(s.termination, Termination::ReachedOne);
    }

    #[test]
    fn test_trajectory_of_27() {
        // Classic reference: 27 takes 111 steps to reach 1, peaking at 9232.
        let s = compute_trajectory(&big(27), 10_000, TrajectoryMode::FullConvergence).unwrap();
        assert_eq!(s.termination, Termination::ReachedOne);
        assert_eq!(s.steps, 111);
        assert_eq!(s.peak, big(9232));
    }

    #[test]
    fn test_trajectory_of_six() {
        // 6 -> 3 -> 10 -> 5 -> 16 -> 8 -> 4 -> 2 -> 1
        let s = compute_trajectory(&big(6), 100, TrajectoryMode::FullConvergence).unwrap();
        assert_eq!(s.steps, 8);
        assert_eq!(s.peak, big(16));
    }

    #[test]
    fn test_single_step_bound_always_exceeds() {
        for n in [2u64, 3, 27, 1000] {
            let s = compute_trajectory(&big(n), 1, TrajectoryMode::FullConvergence).unwrap();
            assert_eq!(
                s.termination,
                Termination::BoundExceeded,
                "start {} should hit the one-step bound",
                n
            );
        }
    }

    #[test]
    fn test_descent_mode() {
        // Even starts halve below themselves immediately.
        let s = compute_trajectory(&big(8), 100, TrajectoryMode::Descent).unwrap();
        assert_eq!(s.steps, 1);
        assert_eq!(s.termination, Termination::Descended);

        // 3 -> 10 -> 5 -> 16 -> 8 -> 4 -> 2: first value below 3 after 6 steps.
        let s = compute_trajectory(&big(3), 100, TrajectoryMode::Descent).unwrap();
        assert_eq!(s.steps, 6);
        assert_eq!(s.termination, Termination::Descended);
        assert_eq!(s.peak, big(16));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(compute_trajectory(&BigUint::zero(), 100, TrajectoryMode::FullConvergence).is_err());
        assert!(compute_trajectory(&big(5), 0, TrajectoryMode::FullConvergence).is_err());
    }

    #[test]
    fn test_default_step_bound_scales_with_bits() {
        let small = default_step_bound(&big(27));
        let huge = default_step_bound(&(BigUint::one() << 1000u32));
        assert!(small >= 1000);
        assert!(huge > small);
        // 111 steps for 27 must fit comfortably.
        assert!(small > 111);
    }

    #[test]
    fn test_huge_start_descends_within_bound() {
        // 2^1000 halves on every step; descent is immediate and exact.
        let n = BigUint::one() << 1000u32;
        let s = compute_trajectory(&n, default_step_bound(&n), TrajectoryMode::Descent).unwrap();
        assert_eq!(s.steps, 1);
        assert_eq!(s.peak, n);
    }
}
