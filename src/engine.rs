// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Engine Facade

//! Wires the components together for the two client operations.
//!
//! Calibrate:  observations -> calibration (+ quality warnings)
//! Optimize:   parameters   -> optimum -> sensitivity, risk, curve, justification

use tracing::info;

use crate::calibration;
use crate::config::{ConfigError, EngineConfig};
use crate::curve::CurveSampler;
use crate::errors::EngineError;
use crate::justification;
use crate::optimizer;
use crate::quality;
use crate::risk;
use crate::sensitivity;
use crate::types::{CalibrationResult, HistoricalObservation, OptimizationInput, OptimizationResult};

/// Calibration facts the caller may carry over into an optimization.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibrationContext {
    pub historical_max_investment: Option<f64>,
    pub r_squared: Option<f64>,
}

impl From<&CalibrationResult> for CalibrationContext {
    fn from(c: &CalibrationResult) -> Self {
        Self {
            historical_max_investment: Some(c.historical_max_investment),
            r_squared: Some(c.r_squared),
        }
    }
}

/// Holds only immutable configuration; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct BudgetEngine {
    config: EngineConfig,
}

impl BudgetEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn calibrate(
        &self,
        observations: &[HistoricalObservation],
    ) -> Result<CalibrationResult, EngineError> {
        calibration::calibrate(observations, &self.config.quality)
    }

    pub fn optimize(
        &self,
        input: &OptimizationInput,
        context: &CalibrationContext,
    ) -> Result<OptimizationResult, EngineError> {
        let optimum = optimizer::optimize(input, &self.config.optimizer)?;

        let scenarios = sensitivity::analyze(input, &self.config.sensitivity, &self.config.optimizer);

        let extrapolation = context
            .historical_max_investment
            .map(|hist| risk::assess(optimum.investment, hist, &self.config.extrapolation))
            .transpose()?;

        let curve_points = CurveSampler::around_optimum(
            *input,
            optimum.investment,
            context.historical_max_investment,
            &self.config.curve,
        )?
        .sample();

        let level = extrapolation.as_ref().map(|a| a.level);
        let poor_fit = quality::is_poor_fit(context.r_squared, &self.config.quality);
        let justification = justification::build(input, &optimum, level, poor_fit);

        info!(
            investment = optimum.investment,
            profit = optimum.profit,
            extrapolation = ?level,
            "Optimized advertising budget"
        );

        Ok(OptimizationResult {
            optimal_investment: optimum.investment,
            projected_profit: optimum.profit,
            is_maximum: optimum.second_derivative < 0.0,
            elasticity_used: input.elasticity,
            constant_k_used: input.constant_k,
            margin_used: input.margin,
            first_derivative_value: optimum.first_derivative,
            second_derivative_value: optimum.second_derivative,
            projected_sales: optimum.sales,
            projected_gross_profit: optimum.gross_profit,
            gross_profit_share_pct: optimum.gross_profit_share_pct(),
            risk_alert: extrapolation.as_ref().and_then(|a| a.alert.clone()),
            extrapolation_level: level,
            historical_max_investment: context.historical_max_investment,
            pessimistic_scenario: scenarios.pessimistic,
            optimistic_scenario: scenarios.optimistic,
            curve_points,
            justification,
        })
    }

    /// Calibrate, then optimize with the fitted parameters and the given margin.
    pub fn calibrate_and_optimize(
        &self,
        observations: &[HistoricalObservation],
        margin: f64,
    ) -> Result<(CalibrationResult, OptimizationResult), EngineError> {
        let calibration = self.calibrate(observations)?;
        let input = OptimizationInput::new(margin, calibration.constant_k, calibration.elasticity);
        let result = self.optimize(&input, &CalibrationContext::from(&calibration))?;
        Ok((calibration, result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExtrapolationLevel;

    #[test]
    fn reference_example_end_to_end() {
        let engine = BudgetEngine::default();
        let r = engine
            .optimize(&OptimizationInput::new(50.0, 1.0, 0.11), &CalibrationContext::default())
            .expect("test: optimize");
        assert!(r.is_maximum);
        assert!(r.optimal_investment > 0.0);
        assert!(r.second_derivative_value < 0.0);
        assert_eq!(r.extrapolation_level, None);
        assert_eq!(r.risk_alert, None);
        let pess = r.pessimistic_scenario.expect("test: pessimistic");
        let opti = r.optimistic_scenario.expect("test: optimistic");
        assert!(pess.investment <= r.optimal_investment && r.optimal_investment <= opti.investment);
        assert!(!r.curve_points.is_empty());
    }

    #[test]
    fn historical_context_drives_risk() {
        let engine = BudgetEngine::default();
        let input = OptimizationInput::new(50.0, 1.0, 0.11);
        let ctx = CalibrationContext { historical_max_investment: Some(3.0), r_squared: Some(0.9) };
        let r = engine.optimize(&input, &ctx).expect("test: optimize");
        // x* ~ 6.79 > 2 * 3
        assert_eq!(r.extrapolation_level, Some(ExtrapolationLevel::High));
        assert!(r.risk_alert.is_some());
        assert_eq!(r.historical_max_investment, Some(3.0));
    }

    #[test]
    fn unplottable_history_is_an_error_not_a_nan_curve() {
        let engine = BudgetEngine::default();
        let ctx = CalibrationContext { historical_max_investment: Some(1e308), r_squared: None };
        let err = engine
            .optimize(&OptimizationInput::new(50.0, 1.0, 0.11), &ctx)
            .expect_err("test: curve domain overflows");
        assert!(matches!(err, EngineError::NumericalDegeneracy(_)), "{err}");
    }

    #[test]
    fn no_interior_maximum_propagates() {
        let engine = BudgetEngine::default();
        let err = engine
            .optimize(&OptimizationInput::new(50.0, 1.0, 1.0), &CalibrationContext::default())
            .expect_err("test: e = 1");
        assert!(err.is_optimization_failure());
    }

    #[test]
    fn invalid_config_rejected_at_construction() {
        let mut config = EngineConfig::default();
        config.curve.points = 0;
        assert!(BudgetEngine::new(config).is_err());
    }
}
