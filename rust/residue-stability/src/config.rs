//! Explicit configuration for residue-class queries.

use collatz_core::TrajectoryMode;
use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Configuration for a single residue-class stability query.
///
/// Every knob of a query lives here rather than in ambient state: the
/// residue class itself, the sampling window, the trajectory mode, and the
/// anomaly baseline.
#[derive(Debug, Clone)]
pub struct ClassConfig {
    /// Class modulus m (must be >= 1).
    pub modulus: BigUint,
    /// Class residue r (must satisfy r < m).
    pub residue: BigUint,
    /// Number of representatives to sample (must be >= 1).
    pub sample_size: usize,
    /// Lower bound of the magnitude window; representatives start at the
    /// smallest class member >= max(window_floor, 1).
    pub window_floor: BigUint,
    /// Trajectory termination mode.
    pub mode: TrajectoryMode,
    /// Per-trajectory step bound. `None` derives a bound from each
    /// representative's bit length.
    pub max_steps: Option<u64>,
    /// Global baseline ratio the class mean is compared against.
    pub baseline_ratio: Option<f64>,
    /// Relative deviation from the baseline beyond which the class is
    /// flagged anomalous.
    pub anomaly_threshold: f64,
    /// When set, representatives are drawn at seeded-random offsets inside
    /// the window instead of consecutively. Identical seeds reproduce
    /// identical samples.
    pub sample_seed: Option<u64>,
}

impl Default for ClassConfig {
    fn default() -> Self {
        Self {
            modulus: BigUint::one(),
            residue: BigUint::zero(),
            sample_size: 100,
            window_floor: BigUint::one(),
            mode: TrajectoryMode::FullConvergence,
            max_steps: None,
            baseline_ratio: None,
            anomaly_threshold: 0.05,
            sample_seed: None,
        }
    }
}

impl ClassConfig {
    /// Convenience constructor for the common case: modulus, residue, and
    /// sample size, everything else defaulted.
    pub fn new(modulus: BigUint, residue: BigUint, sample_size: usize) -> Self {
        Self {
            modulus,
            residue,
            sample_size,
            ..Self::default()
        }
    }

    /// Same query over a different magnitude window.
    pub fn with_window_floor(&self, floor: BigUint) -> Self {
        Self {
            window_floor: floor,
            ..self.clone()
        }
    }
}
