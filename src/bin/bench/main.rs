// Wright Benchmark Runner v0.1.0: Calibration and Optimizer Validation
// Monte Carlo (N=30), seeded synthetic histories, per-run audit trail
//
// Usage:
//   cargo run --release --bin bench                          # All scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5              # Quick mode (5 runs each)
//   cargo run --release --bin bench -- RISK                  # Filter by name/label/category
//   cargo run --release --bin bench -- --seed 42             # Custom base seed
//   cargo run --release --bin bench -- --config wright.toml  # Engine thresholds from TOML

mod report;
mod scenarios;
mod monte_carlo;

use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use wright_engine::{BudgetEngine, EngineConfig};

const PASS_THRESHOLD: f64 = 0.9;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

struct CliArgs {
    runs: usize,
    seed: u64,
    config: Option<PathBuf>,
    filter: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut cli = CliArgs {
        runs: 30,
        seed: 0,
        config: None,
        filter: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--runs" => {
                i += 1;
                if i < args.len() {
                    cli.runs = args[i].parse().unwrap_or(30);
                }
            }
            "--seed" => {
                i += 1;
                if i < args.len() {
                    cli.seed = args[i].parse().unwrap_or(0);
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    cli.config = Some(PathBuf::from(&args[i]));
                }
            }
            arg if !arg.starts_with('-') => {
                cli.filter = Some(arg.to_string());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
            }
        }
        i += 1;
    }

    cli
}

fn load_config(path: Option<&PathBuf>) -> EngineConfig {
    match path {
        Some(p) => match EngineConfig::load_from_file(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("  {}", e);
                std::process::exit(2);
            }
        },
        None => EngineConfig::load(),
    }
}

fn write_report(report: &BenchReport, timestamp: &str) -> std::io::Result<PathBuf> {
    let dir = std::path::Path::new("benchmark-results");
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("bench-{}.json", timestamp));
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = parse_args();
    let config = load_config(cli.config.as_ref());
    let engine = match BudgetEngine::new(config.clone()) {
        Ok(e) => e,
        Err(e) => {
            eprintln!("  {}", e);
            std::process::exit(2);
        }
    };

    let all_scenarios = scenarios();
    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        std::process::exit(1);
    }

    println!("\n  Wright Benchmark Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<36} {:>5} {:>14} {:>8} {:>10} {:>10} {:>8}",
        "Scenario", "Pass%", "|e-e0|", "R2", "|x/x0-1|", "Wright", "Time");
    println!("  {}", "-".repeat(100));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(&engine, scenario, cli.runs, cli.seed);

        let pass_pct = report.pass_rate * 100.0;
        let status = if report.pass_rate >= PASS_THRESHOLD { "PASS" } else { "FAIL" };

        println!("  {:<36} {:>4}% {:>7.4}±{:<6.4} {:>8.4} {:>10.2e} {:>10.2e} {:>6.0}us  {}",
            report.label,
            pass_pct as u32,
            report.elasticity_error.mean, report.elasticity_error.half_width(),
            report.r_squared.mean,
            report.investment_rel_error.mean,
            report.wright_residual.max,
            report.elapsed_us.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= PASS_THRESHOLD).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(100));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: "0.1.0",
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        config,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: mc_reports,
    };

    match write_report(&report, &timestamp) {
        Ok(path) => println!("  Results saved to: {}\n", path.display()),
        Err(e) => eprintln!("  Warning: failed to write report: {}", e),
    }

    if failed > 0 {
        std::process::exit(1);
    }
}
