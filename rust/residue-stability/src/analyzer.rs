//! Trajectory-sampled stability analysis of a residue class.
//!
//! Representatives of {mk + r} are enumerated inside a magnitude window,
//! each is run through the trajectory engine, and the per-representative
//! stability ratio (peak bit-length over step count) is aggregated into a
//! single statistic for the class. Representatives that fail to converge
//! within the step bound are excluded from ratio averaging but always
//! reported in the non-convergence count.

use crate::config::ClassConfig;
use collatz_core::{compute_trajectory, default_step_bound, CollatzError, Termination, TrajectorySummary};
use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;

/// Aggregate stability statistic for one (modulus, residue, window) query.
///
/// Big integers are carried as decimal strings so the statistic serializes
/// cleanly. Identical queries produce bit-identical statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StabilityStatistic {
    /// Class modulus, decimal.
    pub modulus: String,
    /// Class residue, decimal.
    pub residue: String,
    /// Magnitude window lower bound, decimal.
    pub window_floor: String,
    /// Number of representatives sampled.
    pub sample_size: usize,
    /// Representatives that terminated within the step bound.
    pub converged: usize,
    /// Representatives that hit the step bound. Never silently dropped.
    pub non_converged: usize,
    /// Mean step count over converged representatives.
    pub mean_steps: f64,
    /// Mean stability ratio over converged representatives.
    pub mean_ratio: f64,
    /// Population variance of the ratio over converged representatives.
    pub ratio_variance: f64,
    /// Smallest ratio observed.
    pub min_ratio: f64,
    /// Largest ratio observed.
    pub max_ratio: f64,
    /// Set when a baseline is configured and the class mean deviates from it
    /// by more than the configured threshold.
    pub anomalous: bool,
}

/// Stability ratio of a single trajectory: peak bit-length per step.
///
/// The denominator is clamped to 1 so the start value 1 (zero steps) stays
/// well-defined.
pub fn stability_ratio(summary: &TrajectorySummary) -> f64 {
    summary.peak.bits() as f64 / summary.steps.max(1) as f64
}

fn validate(config: &ClassConfig) -> Result<(), CollatzError> {
    if config.modulus.is_zero() {
        return Err(CollatzError::InvalidInput("modulus must be >= 1".into()));
    }
    if config.residue >= config.modulus {
        return Err(CollatzError::InvalidInput(format!(
            "residue {} is out of range for modulus {}",
            config.residue, config.modulus
        )));
    }
    if config.sample_size == 0 {
        return Err(CollatzError::InvalidInput(
            "sample size must be >= 1".into(),
        ));
    }
    Ok(())
}

/// Enumerate the representatives a query will simulate.
///
/// The first representative is the smallest class member >=
/// max(window_floor, 1); subsequent ones step by the modulus. With a sample
/// seed configured, the multiples of m are drawn at seeded-random offsets
/// inside an N*1024-wide window instead of consecutively.
pub fn representatives(config: &ClassConfig) -> Result<Vec<BigUint>, CollatzError> {
    validate(config)?;

    let one = BigUint::one();
    let floor = if config.window_floor.is_zero() {
        one.clone()
    } else {
        config.window_floor.clone()
    };

    // Smallest value >= floor congruent to r (mod m).
    let rem = &floor % &config.modulus;
    let offset = (&config.residue + &config.modulus - &rem) % &config.modulus;
    // floor >= 1, so the r = 0 class can never hand out 0.
    let first = &floor + &offset;

    let values = match config.sample_seed {
        None => (0..config.sample_size)
            .map(|i| &first + &config.modulus * BigUint::from(i))
            .collect(),
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            let span = (config.sample_size as u64).saturating_mul(1024);
            (0..config.sample_size)
                .map(|_| {
                    let k = rng.gen_range(0..span);
                    &first + &config.modulus * BigUint::from(k)
                })
                .collect()
        }
    };

    Ok(values)
}

/// Sample a residue class and aggregate its [`StabilityStatistic`].
///
/// Trajectories run in parallel; the reduction over their summaries is
/// sequential and deterministic.
pub fn analyze_residue_class(config: &ClassConfig) -> Result<StabilityStatistic, CollatzError> {
    let values = representatives(config)?;

    let summaries: Vec<TrajectorySummary> = values
        .par_iter()
        .map(|v| {
            let bound = config.max_steps.unwrap_or_else(|| default_step_bound(v));
            compute_trajectory(v, bound, config.mode)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut ratios = Vec::with_capacity(summaries.len());
    let mut steps_sum = 0u64;
    let mut non_converged = 0usize;
    for s in &summaries {
        if s.termination == Termination::BoundExceeded {
            non_converged += 1;
        } else {
            steps_sum += s.steps;
            ratios.push(stability_ratio(s));
        }
    }

    if non_converged > 0 {
        log::warn!(
            "class {} mod {}: {} of {} representatives hit the step bound",
            config.residue,
            config.modulus,
            non_converged,
            summaries.len()
        );
    }

    let converged = ratios.len();
    let (mean_ratio, ratio_variance, min_ratio, max_ratio, mean_steps) = if converged == 0 {
        (f64::NAN, f64::NAN, f64::NAN, f64::NAN, f64::NAN)
    } else {
        let mean = ratios.iter().sum::<f64>() / converged as f64;
        let var = ratios.iter().map(|r| (r - mean) * (r - mean)).sum::<f64>() / converged as f64;
        let min = ratios.iter().copied().fold(f64::INFINITY, f64::min);
        let max = ratios.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (mean, var, min, max, steps_sum as f64 / converged as f64)
    };

    let anomalous = match config.baseline_ratio {
        Some(base) if base != 0.0 && converged > 0 => {
            ((mean_ratio - base) / base).abs() > config.anomaly_threshold
        }
        _ => false,
    };

    Ok(StabilityStatistic {
        modulus: config.modulus.to_string(),
        residue: config.residue.to_string(),
        window_floor: config.window_floor.to_string(),
        sample_size: config.sample_size,
        converged,
        non_converged,
        mean_steps,
        mean_ratio,
        ratio_variance,
        min_ratio,
        max_ratio,
        anomalous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use collatz_core::TrajectoryMode;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_representatives_align_to_class() {
        let config = ClassConfig {
            modulus: big(5),
            residue: big(3),
            sample_size: 4,
            window_floor: big(7),
            ..ClassConfig::default()
        };
        let values = representatives(&config).unwrap();
        assert_eq!(values, vec![big(8), big(13), big(18), big(23)]);
    }

    #[test]
    fn test_representatives_never_include_zero() {
        let config = ClassConfig {
            modulus: big(4),
            residue: big(0),
            sample_size: 3,
            window_floor: big(0),
            ..ClassConfig::default()
        };
        let values = representatives(&config).unwrap();
        assert_eq!(values, vec![big(4), big(8), big(12)]);
    }

    #[test]
    fn test_residue_out_of_range_is_rejected() {
        let config = ClassConfig::new(big(5), big(5), 10);
        assert!(matches!(
            analyze_residue_class(&config),
            Err(CollatzError::InvalidInput(_))
        ));
        let config = ClassConfig::new(big(0), big(0), 10);
        assert!(analyze_residue_class(&config).is_err());
        let config = ClassConfig::new(big(5), big(2), 0);
        assert!(analyze_residue_class(&config).is_err());
    }

    #[test]
    fn test_trivial_class_covers_all_integers() {
        // m = 1, r = 0 from L = 1 samples 1..=100; everything converges.
        let config = ClassConfig::new(big(1), big(0), 100);
        let stat = analyze_residue_class(&config).unwrap();
        assert_eq!(stat.converged, 100);
        assert_eq!(stat.non_converged, 0);
        assert!(stat.mean_ratio > 0.0);
        assert!(stat.ratio_variance >= 0.0);
        assert!(stat.min_ratio <= stat.mean_ratio && stat.mean_ratio <= stat.max_ratio);
    }

    #[test]
    fn test_idempotence() {
        let config = ClassConfig::new(big(7), big(3), 40);
        let a = analyze_residue_class(&config).unwrap();
        let b = analyze_residue_class(&config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seeded_sampling_reproduces() {
        let config = ClassConfig {
            sample_seed: Some(0x5eed),
            ..ClassConfig::new(big(7), big(3), 25)
        };
        let a = analyze_residue_class(&config).unwrap();
        let b = analyze_residue_class(&config).unwrap();
        assert_eq!(a, b);

        let other = ClassConfig {
            sample_seed: Some(0x5eee),
            ..config
        };
        let c = analyze_residue_class(&other).unwrap();
        // Different seed, different sample. Mean ratios agreeing to full
        // precision would be astonishing.
        assert!(a.mean_ratio != c.mean_ratio || a.mean_steps != c.mean_steps);
    }

    #[test]
    fn test_tight_bound_counts_non_convergence() {
        // One step is never enough for odd starts > 1.
        let config = ClassConfig {
            max_steps: Some(1),
            window_floor: big(3),
            ..ClassConfig::new(big(2), big(1), 10)
        };
        let stat = analyze_residue_class(&config).unwrap();
        assert_eq!(stat.non_converged, 10);
        assert_eq!(stat.converged, 0);
        assert!(stat.mean_ratio.is_nan());
    }

    #[test]
    fn test_anomaly_flag_tracks_baseline() {
        let mut config = ClassConfig::new(big(3), big(2), 30);
        let stat = analyze_residue_class(&config).unwrap();
        assert!(!stat.anomalous);

        // Baseline equal to the observed mean: within any threshold.
        config.baseline_ratio = Some(stat.mean_ratio);
        assert!(!analyze_residue_class(&config).unwrap().anomalous);

        // Baseline far away: flagged.
        config.baseline_ratio = Some(stat.mean_ratio * 2.0);
        assert!(analyze_residue_class(&config).unwrap().anomalous);
    }

    #[test]
    fn test_descent_mode_aggregates() {
        let config = ClassConfig {
            mode: TrajectoryMode::Descent,
            ..ClassConfig::new(big(2), big(0), 50)
        };
        let stat = analyze_residue_class(&config).unwrap();
        // Even starts descend in one step.
        assert_eq!(stat.non_converged, 0);
        assert!((stat.mean_steps - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fibonacci_class_is_deterministic() {
        // The m = 987 query the anomaly experiment is built on.
        let config = ClassConfig {
            window_floor: big(1),
            ..ClassConfig::new(big(987), big(0), 50)
        };
        let a = analyze_residue_class(&config).unwrap();
        let b = analyze_residue_class(&config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.non_converged, 0);
        assert!(a.mean_ratio > 0.0);
    }
}
