//! Stability analysis of Collatz residue classes.
//!
//! A residue class {mk + r : k >= 0} is probed two ways:
//!
//! - **Trajectory sampling** ([`analyzer`]): enumerate representatives of the
//!   class inside a magnitude window, run each through the big-integer
//!   trajectory engine, and aggregate a per-class stability ratio
//!   (peak bit-length over step count).
//! - **Symbolic class map** ([`class_map`]): step the entire class through
//!   the Collatz map at once, counting deterministic merges against parity
//!   bifurcations.
//!
//! [`horizon`] repeats the sampled analysis across exponentially increasing
//! magnitude windows (up to 2^1000) to expose the trend of the ratio versus
//! magnitude, and [`experiments`] carries the Fibonacci-residue stress test.

pub mod analyzer;
pub mod class_map;
pub mod config;
pub mod experiments;
pub mod horizon;

pub use analyzer::{analyze_residue_class, representatives, StabilityStatistic};
pub use class_map::{class_stability_ratio, ClassNode, ClassStep};
pub use config::ClassConfig;
pub use horizon::{exponential_windows, print_summary, scan_horizon, HorizonScan};
