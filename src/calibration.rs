// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Curve Calibration

//! Log-log least-squares fit of the power-law response `sales = k * x^e`.
//!
//! ```text
//! ln(sales) = ln(k) + e * ln(investment)
//! ```
//!
//! Exact ordinary least squares on the transformed pairs; no iterative solver.

use tracing::{debug, info, warn};

use crate::config::QualityConfig;
use crate::errors::EngineError;
use crate::quality::{self, FitDiagnostics};
use crate::types::{CalibrationResult, HistoricalObservation};

/// A slope needs at least two distinct points.
pub const MIN_OBSERVATIONS: usize = 2;

/// Straight-line fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl LinearFit {
    /// Ordinary least squares with an intercept.
    ///
    /// Fails with `NoInvestmentVariation` when every `x` is identical. The
    /// inputs are log-spends, so the error reports `exp(x)`.
    pub fn ordinary_least_squares(xs: &[f64], ys: &[f64]) -> Result<Self, EngineError> {
        let n = xs.len().min(ys.len());
        if n < MIN_OBSERVATIONS {
            return Err(EngineError::InsufficientData {
                valid: n,
                required: MIN_OBSERVATIONS,
            });
        }
        let (lo, hi) = xs[..n]
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        if !(hi > lo) {
            return Err(EngineError::NoInvestmentVariation { investment: lo.exp() });
        }

        let nf = n as f64;
        let mean_x = xs[..n].iter().sum::<f64>() / nf;
        let mean_y = ys[..n].iter().sum::<f64>() / nf;

        let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
        for (x, y) in xs[..n].iter().zip(&ys[..n]) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxx += dx * dx;
            sxy += dx * dy;
            syy += dy * dy;
        }

        if !(sxx > 0.0) {
            return Err(EngineError::NoInvestmentVariation {
                investment: mean_x.exp(),
            });
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let ss_res: f64 = xs[..n]
            .iter()
            .zip(&ys[..n])
            .map(|(x, y)| {
                let r = y - (intercept + slope * x);
                r * r
            })
            .sum();

        // Constant response: the horizontal line is an exact fit.
        let r_squared = if syy > 0.0 {
            (1.0 - ss_res / syy).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Ok(Self { slope, intercept, r_squared })
    }
}

/// Fit `(elasticity, k)` from historical spend/sales pairs.
///
/// Rows with non-positive or non-finite values are dropped and counted.
pub fn calibrate(
    observations: &[HistoricalObservation],
    quality_config: &QualityConfig,
) -> Result<CalibrationResult, EngineError> {
    let valid: Vec<&HistoricalObservation> =
        observations.iter().filter(|o| o.is_valid()).collect();
    let discarded = observations.len() - valid.len();

    if discarded > 0 {
        debug!(discarded, total = observations.len(), "Dropping non-positive observations");
    }
    if valid.len() < MIN_OBSERVATIONS {
        warn!(valid = valid.len(), "Not enough valid observations to calibrate");
        return Err(EngineError::InsufficientData {
            valid: valid.len(),
            required: MIN_OBSERVATIONS,
        });
    }

    let ln_x: Vec<f64> = valid.iter().map(|o| o.investment.ln()).collect();
    let ln_y: Vec<f64> = valid.iter().map(|o| o.sales.ln()).collect();
    let fit = LinearFit::ordinary_least_squares(&ln_x, &ln_y)?;

    let constant_k = fit.intercept.exp();
    if !(constant_k.is_finite() && constant_k > 0.0) || !fit.slope.is_finite() {
        return Err(EngineError::NumericalDegeneracy(format!(
            "ajuste log-log produziu parâmetros não finitos (intercepto={}, inclinação={})",
            fit.intercept, fit.slope
        )));
    }

    let historical_max_investment = valid
        .iter()
        .map(|o| o.investment)
        .fold(f64::NEG_INFINITY, f64::max);

    let warnings = quality::assess(
        &FitDiagnostics {
            r_squared: fit.r_squared,
            elasticity: fit.slope,
            observations_used: valid.len(),
            observations_discarded: discarded,
        },
        quality_config,
    );
    for w in warnings.iter().filter(|w| w.is_model_warning()) {
        warn!(warning = ?w, "Calibration quality warning");
    }

    info!(
        elasticity = fit.slope,
        constant_k,
        r_squared = fit.r_squared,
        used = valid.len(),
        discarded,
        "Calibrated response curve"
    );

    Ok(CalibrationResult {
        elasticity: fit.slope,
        constant_k,
        r_squared: fit.r_squared,
        warning: quality::summarize(&warnings),
        historical_max_investment,
        observations_used: valid.len(),
        observations_discarded: discarded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noiseless(k: f64, e: f64, spends: &[f64]) -> Vec<HistoricalObservation> {
        spends
            .iter()
            .map(|&x| HistoricalObservation { investment: x, sales: k * x.powf(e) })
            .collect()
    }

    #[test]
    fn recovers_known_parameters_without_noise() {
        let obs = noiseless(3.5, 0.42, &[100.0, 250.0, 400.0, 900.0, 1500.0, 3000.0]);
        let cal = calibrate(&obs, &QualityConfig::default()).expect("test: calibrate");
        assert!((cal.elasticity - 0.42).abs() < 1e-10, "e={}", cal.elasticity);
        assert!((cal.constant_k - 3.5).abs() < 1e-8, "k={}", cal.constant_k);
        assert!((cal.r_squared - 1.0).abs() < 1e-12);
        assert_eq!(cal.historical_max_investment, 3000.0);
        assert_eq!(cal.observations_used, 6);
        assert_eq!(cal.observations_discarded, 0);
        assert_eq!(cal.warning, None);
    }

    #[test]
    fn two_points_are_enough() {
        let obs = noiseless(2.0, 0.5, &[4.0, 16.0]);
        let cal = calibrate(&obs, &QualityConfig::default()).expect("test: calibrate");
        assert!((cal.elasticity - 0.5).abs() < 1e-12);
        assert!((cal.constant_k - 2.0).abs() < 1e-12);
        // Small sample is advisory only.
        assert!(cal.warning.as_deref().unwrap_or("").contains("Apenas 2"));
    }

    #[test]
    fn non_positive_rows_are_dropped_and_counted() {
        let mut obs = noiseless(1.0, 0.3, &[10.0, 20.0, 40.0, 80.0, 160.0]);
        obs.push(HistoricalObservation { investment: 0.0, sales: 12.0 });
        obs.push(HistoricalObservation { investment: 500.0, sales: -3.0 });
        obs.push(HistoricalObservation { investment: 9000.0, sales: 0.0 });
        let cal = calibrate(&obs, &QualityConfig::default()).expect("test: calibrate");
        assert_eq!(cal.observations_used, 5);
        assert_eq!(cal.observations_discarded, 3);
        // The discarded 9000 row must not become the historical max.
        assert_eq!(cal.historical_max_investment, 160.0);
        assert!((cal.elasticity - 0.3).abs() < 1e-10);
        assert!(cal.warning.expect("test: warning").contains("3 linha(s)"));
    }

    #[test]
    fn fewer_than_two_valid_rows_fails() {
        let obs = vec![
            HistoricalObservation { investment: 10.0, sales: 5.0 },
            HistoricalObservation { investment: -1.0, sales: 5.0 },
        ];
        assert_eq!(
            calibrate(&obs, &QualityConfig::default()),
            Err(EngineError::InsufficientData { valid: 1, required: 2 })
        );
        assert_eq!(
            calibrate(&[], &QualityConfig::default()),
            Err(EngineError::InsufficientData { valid: 0, required: 2 })
        );
    }

    #[test]
    fn identical_spend_levels_are_rejected() {
        let obs = vec![
            HistoricalObservation { investment: 50.0, sales: 5.0 },
            HistoricalObservation { investment: 50.0, sales: 7.0 },
            HistoricalObservation { investment: 50.0, sales: 6.0 },
        ];
        match calibrate(&obs, &QualityConfig::default()) {
            Err(EngineError::NoInvestmentVariation { investment }) => {
                assert!((investment - 50.0).abs() < 1e-9);
            }
            other => panic!("expected NoInvestmentVariation, got {other:?}"),
        }
    }

    #[test]
    fn increasing_returns_fit_still_returned_with_warning() {
        let obs = noiseless(0.5, 1.3, &[10.0, 20.0, 30.0, 40.0, 50.0]);
        let cal = calibrate(&obs, &QualityConfig::default()).expect("test: calibrate");
        assert!((cal.elasticity - 1.3).abs() < 1e-10);
        assert!(cal.warning.expect("test: warning").contains(">= 1"));
    }

    #[test]
    fn scattered_data_flags_poor_fit() {
        let obs = vec![
            HistoricalObservation { investment: 10.0, sales: 900.0 },
            HistoricalObservation { investment: 20.0, sales: 100.0 },
            HistoricalObservation { investment: 30.0, sales: 1200.0 },
            HistoricalObservation { investment: 40.0, sales: 150.0 },
            HistoricalObservation { investment: 50.0, sales: 1000.0 },
            HistoricalObservation { investment: 60.0, sales: 200.0 },
        ];
        let cal = calibrate(&obs, &QualityConfig::default()).expect("test: calibrate");
        assert!(cal.r_squared < 0.5, "r2={}", cal.r_squared);
        assert!((0.0..=1.0).contains(&cal.r_squared));
        assert!(cal.warning.expect("test: warning").contains("Ajuste fraco"));
    }

    #[test]
    fn constant_sales_is_an_exact_flat_fit() {
        let fit = LinearFit::ordinary_least_squares(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0])
            .expect("test: fit");
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 4.0);
        assert_eq!(fit.r_squared, 1.0);
    }

    #[test]
    fn calibration_is_deterministic() {
        let obs = vec![
            HistoricalObservation { investment: 12.0, sales: 40.0 },
            HistoricalObservation { investment: 30.0, sales: 61.0 },
            HistoricalObservation { investment: 75.0, sales: 70.0 },
            HistoricalObservation { investment: 140.0, sales: 103.0 },
        ];
        let a = calibrate(&obs, &QualityConfig::default()).expect("test");
        let b = calibrate(&obs, &QualityConfig::default()).expect("test");
        assert_eq!(a, b);
    }
}
