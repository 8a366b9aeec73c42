//! Longitudinal "horizon" scans: the same residue-class query repeated
//! across exponentially increasing magnitude windows, so the trend of the
//! stability ratio against magnitude becomes visible.

use crate::analyzer::{analyze_residue_class, StabilityStatistic};
use crate::config::ClassConfig;
use collatz_core::CollatzError;
use num_bigint::BigUint;
use num_traits::One;
use serde::Serialize;

/// Ordered result of a horizon scan: one statistic per magnitude window,
/// in the order the windows were supplied.
#[derive(Debug, Clone, Serialize)]
pub struct HorizonScan {
    pub modulus: String,
    pub residue: String,
    pub sample_size: usize,
    pub windows: Vec<StabilityStatistic>,
}

/// Build 2^k magnitude windows from a list of exponents.
pub fn exponential_windows(exponents: &[u64]) -> Vec<BigUint> {
    exponents
        .iter()
        .map(|&e| BigUint::one() << (e as usize))
        .collect()
}

/// Run the configured query once per magnitude window.
///
/// The returned statistics are in window order, one per window; a window
/// whose sample fails validation aborts the whole scan.
pub fn scan_horizon(
    base: &ClassConfig,
    windows: &[BigUint],
) -> Result<HorizonScan, CollatzError> {
    let mut stats = Vec::with_capacity(windows.len());
    for floor in windows {
        log::info!(
            "horizon window {}: class {} mod {}",
            window_label(floor),
            base.residue,
            base.modulus
        );
        let config = base.with_window_floor(floor.clone());
        stats.push(analyze_residue_class(&config)?);
    }
    Ok(HorizonScan {
        modulus: base.modulus.to_string(),
        residue: base.residue.to_string(),
        sample_size: base.sample_size,
        windows: stats,
    })
}

/// Human-readable label for a window floor: `2^k` for exact powers of two,
/// the decimal value otherwise.
pub fn window_label(floor: &BigUint) -> String {
    if floor.count_ones() == 1 {
        format!("2^{}", floor.bits() - 1)
    } else {
        floor.to_string()
    }
}

/// Aligned-table rendering of a horizon scan.
pub fn print_summary(scan: &HorizonScan) {
    println!(
        "\n=== Horizon scan: class {} mod {} ({} samples/window) ===",
        scan.residue, scan.modulus, scan.sample_size
    );
    println!(
        "{:>10} {:>10} {:>8} {:>12} {:>12} {:>10}  {}",
        "window", "converged", "stuck", "mean steps", "mean ratio", "variance", ""
    );
    println!("{}", "-".repeat(72));
    for stat in &scan.windows {
        let floor: BigUint = stat
            .window_floor
            .parse()
            .unwrap_or_else(|_| BigUint::one());
        let mark = if stat.anomalous { "ANOMALY" } else { "" };
        if stat.converged == 0 {
            println!(
                "{:>10} {:>10} {:>8}  (no converged representatives)",
                window_label(&floor),
                stat.converged,
                stat.non_converged
            );
        } else {
            println!(
                "{:>10} {:>10} {:>8} {:>12.2} {:>12.4} {:>10.4}  {}",
                window_label(&floor),
                stat.converged,
                stat.non_converged,
                stat.mean_steps,
                stat.mean_ratio,
                stat.ratio_variance,
                mark
            );
        }
    }
}
