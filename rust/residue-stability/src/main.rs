/// Residue-class stability analysis — CLI
///
/// Usage:
///   residue-stability --mode=class     [--modulus=987] [--residue=0] [--samples=50] [--floor=1]
///                                      [--descent] [--max-steps=N] [--baseline=R] [--threshold=0.05]
///                                      [--sample-seed=N]
///   residue-stability --mode=horizon   [--modulus=3] [--residue=1] [--samples=25]
///                                      [--windows=10,50,100,300,500,750,1000] [--node-limit=3000]
///   residue-stability --mode=fibonacci [--node-limit=400] [--seed=N]
///   residue-stability --mode=quick     (fast smoke test: tiny samples, small windows)
///
/// Any mode accepts --json=PATH to export the results.
use num_bigint::BigUint;
use residue_stability::experiments::{
    fibonacci_stress_test, horizon_sweep, print_fibonacci_rows, print_horizon_rows,
    HORIZON_SCALES,
};
use residue_stability::{
    analyze_residue_class, exponential_windows, print_summary, scan_horizon, ClassConfig,
    StabilityStatistic,
};
use collatz_core::TrajectoryMode;
use std::collections::HashMap;

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = parse_args(&args);

    let mode = opts.get("mode").map(|s| s.as_str()).unwrap_or("class");
    match mode {
        "class" => run_class(&opts),
        "horizon" => run_horizon(&opts),
        "fibonacci" => run_fibonacci(&opts),
        "quick" => run_quick(),
        other => {
            eprintln!("Unknown mode: {other}. Use --mode=class|horizon|fibonacci|quick");
            std::process::exit(1);
        }
    }
}

fn class_config(opts: &HashMap<String, String>) -> ClassConfig {
    ClassConfig {
        modulus: parse_biguint(opts, "modulus", 987u32.into()),
        residue: parse_biguint(opts, "residue", 0u32.into()),
        sample_size: parse_usize(opts, "samples", 50),
        window_floor: parse_biguint(opts, "floor", 1u32.into()),
        mode: if opts.contains_key("descent") {
            TrajectoryMode::Descent
        } else {
            TrajectoryMode::FullConvergence
        },
        max_steps: opts.get("max-steps").and_then(|v| v.parse().ok()),
        baseline_ratio: opts.get("baseline").and_then(|v| v.parse().ok()),
        anomaly_threshold: parse_f64(opts, "threshold", 0.05),
        sample_seed: opts.get("sample-seed").and_then(|v| v.parse().ok()),
    }
}

fn run_class(opts: &HashMap<String, String>) {
    let config = class_config(opts);
    println!(
        "CLASS mode: {} samples of class {} mod {} from {}",
        config.sample_size, config.residue, config.modulus, config.window_floor
    );

    match analyze_residue_class(&config) {
        Ok(stat) => {
            print_statistic(&stat);
            if let Some(path) = opts.get("json") {
                write_json(&stat, path);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run_horizon(opts: &HashMap<String, String>) {
    let mut config = class_config(opts);
    config.modulus = parse_biguint(opts, "modulus", 3u32.into());
    config.residue = parse_biguint(opts, "residue", 1u32.into());
    config.sample_size = parse_usize(opts, "samples", 25);
    let scales = parse_scales(opts, &HORIZON_SCALES);
    let node_limit = parse_usize(opts, "node-limit", 3000);
    let seed = parse_u64(opts, "seed", 0x4e32_c011_a72a_0001);

    println!(
        "HORIZON mode: class {} mod {} over {} windows, {} samples each",
        config.residue,
        config.modulus,
        scales.len(),
        config.sample_size
    );
    println!("Seed: 0x{seed:016x}\n");

    let windows = exponential_windows(&scales);
    match scan_horizon(&config, &windows) {
        Ok(scan) => {
            print_summary(&scan);
            if let Some(path) = opts.get("json") {
                write_json(&scan, path);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    // The symbolic counterpart over the same scales.
    match horizon_sweep(&scales, node_limit, seed) {
        Ok(rows) => print_horizon_rows(&rows),
        Err(e) => eprintln!("Error in symbolic sweep: {e}"),
    }
}

fn run_fibonacci(opts: &HashMap<String, String>) {
    let node_limit = parse_usize(opts, "node-limit", 400);
    let seed = parse_u64(opts, "seed", 0x4e32_c011_a72a_0002);
    println!("FIBONACCI mode: F_3..F_25 against random controls");
    println!("Node limit: {node_limit}, seed: 0x{seed:016x}");

    match fibonacci_stress_test(node_limit, seed) {
        Ok(rows) => {
            print_fibonacci_rows(&rows);
            if let Some(path) = opts.get("json") {
                write_json(&rows, path);
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn run_quick() {
    println!("QUICK mode: smoke test (small sample)");
    let config = ClassConfig::new(987u32.into(), 0u32.into(), 10);
    match analyze_residue_class(&config) {
        Ok(stat) => print_statistic(&stat),
        Err(e) => eprintln!("Error: {e}"),
    }
    match fibonacci_stress_test(50, 42) {
        Ok(rows) => print_fibonacci_rows(&rows[..6]),
        Err(e) => eprintln!("Error: {e}"),
    }
}

fn print_statistic(stat: &StabilityStatistic) {
    println!(
        "\nClass {} mod {} (window floor {})",
        stat.residue, stat.modulus, stat.window_floor
    );
    println!(
        "  converged {}/{}  non-converged {}",
        stat.converged, stat.sample_size, stat.non_converged
    );
    if stat.converged > 0 {
        println!("  mean steps    {:>10.2}", stat.mean_steps);
        println!("  mean ratio    {:>10.4}", stat.mean_ratio);
        println!("  variance      {:>10.4}", stat.ratio_variance);
        println!(
            "  ratio range   [{:.4}, {:.4}]",
            stat.min_ratio, stat.max_ratio
        );
    }
    if stat.anomalous {
        println!("  ANOMALY: mean ratio deviates from the configured baseline");
    }
}

// ---------------------------------------------------------------------------
// Argument parsing helpers
// ---------------------------------------------------------------------------

fn parse_args(args: &[String]) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for arg in args {
        if let Some(kv) = arg.strip_prefix("--") {
            if let Some((k, v)) = kv.split_once('=') {
                map.insert(k.to_string(), v.to_string());
            } else {
                map.insert(kv.to_string(), "true".to_string());
            }
        }
    }
    map
}

fn parse_biguint(opts: &HashMap<String, String>, key: &str, default: BigUint) -> BigUint {
    opts.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_u64(opts: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    opts.get(key)
        .and_then(|v| {
            if let Some(hex) = v.strip_prefix("0x") {
                u64::from_str_radix(hex, 16).ok()
            } else {
                v.parse().ok()
            }
        })
        .unwrap_or(default)
}

fn parse_usize(opts: &HashMap<String, String>, key: &str, default: usize) -> usize {
    opts.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_f64(opts: &HashMap<String, String>, key: &str, default: f64) -> f64 {
    opts.get(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_scales(opts: &HashMap<String, String>, default: &[u64]) -> Vec<u64> {
    opts.get("windows")
        .map(|v| v.split(',').filter_map(|s| s.trim().parse().ok()).collect())
        .unwrap_or_else(|| default.to_vec())
}

fn write_json<T: serde::Serialize>(value: &T, path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Warning: could not create directory {parent:?}: {e}");
                return;
            }
        }
    }
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("Warning: could not write {path}: {e}");
            } else {
                println!("\nResults written to {path}");
            }
        }
        Err(e) => eprintln!("Warning: could not serialize results: {e}"),
    }
}
