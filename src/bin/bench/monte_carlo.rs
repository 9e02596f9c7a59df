// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Each run draws a fresh history with seed base+i, calibrates, then optimizes

use wright_engine::synthetic::{HistoryGenerator, SyntheticCurve};
use wright_engine::*;

use crate::report::*;
use crate::scenarios::Scenario;

use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(engine: &BudgetEngine, scenario: &Scenario, seed: u64) -> BenchResult {
    let start = Instant::now();
    let curve = SyntheticCurve::exact(scenario.k0, scenario.e0)
        .with_noise(scenario.noise)
        .with_range(scenario.min_investment, scenario.max_investment);
    let history = HistoryGenerator::new(curve, seed).generate(scenario.observations);
    let true_optimum = scenario.true_optimum();

    let mut result = BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass: false,
        error: None,
        observations: history.len(),
        fitted_elasticity: f64::NAN,
        fitted_k: f64::NAN,
        elasticity_error: f64::NAN,
        log_k_error: f64::NAN,
        r_squared: f64::NAN,
        poor_fit_warning: false,
        optimal_investment: f64::NAN,
        true_optimal_investment: true_optimum,
        investment_rel_error: f64::NAN,
        first_derivative: f64::NAN,
        wright_residual: f64::NAN,
        sensitivity_ordered: false,
        extrapolation_level: None,
        elapsed_us: 0,
    };

    let calibration = match engine.calibrate(&history) {
        Ok(c) => c,
        Err(e) => {
            result.error = Some(e.to_string());
            result.pass = scenario.criteria.allow_engine_error;
            result.elapsed_us = start.elapsed().as_micros();
            return result;
        }
    };
    result.fitted_elasticity = calibration.elasticity;
    result.fitted_k = calibration.constant_k;
    result.elasticity_error = (calibration.elasticity - scenario.e0).abs();
    result.log_k_error = (calibration.constant_k.ln() - scenario.k0.ln()).abs();
    result.r_squared = calibration.r_squared;
    result.poor_fit_warning =
        quality::is_poor_fit(Some(calibration.r_squared), &engine.config().quality);

    let input = OptimizationInput::new(scenario.margin, calibration.constant_k, calibration.elasticity);
    let optimization = engine.optimize(&input, &CalibrationContext::from(&calibration));
    result.elapsed_us = start.elapsed().as_micros();

    let optimization = match optimization {
        Ok(o) => o,
        Err(e) => {
            result.error = Some(e.to_string());
            result.pass = scenario.criteria.allow_engine_error
                && (!scenario.criteria.require_poor_fit_warning || result.poor_fit_warning);
            return result;
        }
    };

    let x = optimization.optimal_investment;
    result.optimal_investment = x;
    result.investment_rel_error = (x - true_optimum).abs() / true_optimum;
    result.first_derivative = optimization.first_derivative_value.abs();
    result.wright_residual =
        (x - calibration.elasticity * optimization.projected_gross_profit).abs() / x;
    result.sensitivity_ordered = match (&optimization.pessimistic_scenario, &optimization.optimistic_scenario) {
        (Some(p), Some(o)) => p.investment <= x && x <= o.investment,
        _ => false,
    };
    result.extrapolation_level = optimization
        .extrapolation_level
        .map(|l| l.description().to_string());

    result.pass = evaluate(scenario, &result, optimization.extrapolation_level);
    result
}

fn within(value: f64, limit: Option<f64>) -> bool {
    limit.map_or(true, |l| value <= l)
}

fn evaluate(scenario: &Scenario, r: &BenchResult, level: Option<ExtrapolationLevel>) -> bool {
    let c = &scenario.criteria;
    within(r.elasticity_error, c.max_elasticity_error)
        && within(r.log_k_error, c.max_log_k_error)
        && within(r.investment_rel_error, c.max_investment_rel_error)
        && c.min_r_squared.map_or(true, |min| r.r_squared >= min)
        && c.expected_extrapolation.map_or(true, |expected| level == Some(expected))
        && (!c.require_sensitivity_ordering || r.sensitivity_ordered)
        && (!c.require_poor_fit_warning || r.poor_fit_warning)
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    engine: &BudgetEngine,
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
) -> MonteCarloReport {
    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        results.push(run_single(engine, scenario, seed));
    }

    aggregate(scenario, results)
}

fn finite_samples(results: &[BenchResult], metric: impl Fn(&BenchResult) -> f64) -> Stats {
    let samples: Vec<f64> = results.iter().map(metric).filter(|v| v.is_finite()).collect();
    Stats::from_samples(&samples)
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n > 0 { passed as f64 / n as f64 } else { 0.0 };

    let mut extrapolation_counts = [0usize; 3];
    for level in results.iter().filter_map(|r| r.extrapolation_level.as_deref()) {
        let idx = match level {
            l if l == ExtrapolationLevel::WithinRange.description() => 0,
            l if l == ExtrapolationLevel::Moderate.description() => 1,
            _ => 2,
        };
        extrapolation_counts[idx] += 1;
    }

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        failure_count: results.iter().filter(|r| r.error.is_some()).count(),
        elasticity_error: finite_samples(&results, |r| r.elasticity_error),
        log_k_error: finite_samples(&results, |r| r.log_k_error),
        r_squared: finite_samples(&results, |r| r.r_squared),
        investment_rel_error: finite_samples(&results, |r| r.investment_rel_error),
        first_derivative: finite_samples(&results, |r| r.first_derivative),
        wright_residual: finite_samples(&results, |r| r.wright_residual),
        elapsed_us: finite_samples(&results, |r| r.elapsed_us as f64),
        extrapolation_counts,
        individual_runs: results,
    }
}
