// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Profit Optimizer

//! Closed-form profit maximization under a power-law response.
//!
//! ```text
//! profit(x)  = m * k * x^e - x
//! profit'(x) = m * k * e * x^(e-1) - 1           = 0
//! x*         = (m * k * e)^(1 / (1 - e))          for 0 < e < 1
//! profit''(x*) = m * k * e * (e - 1) * x*^(e-2)   < 0
//! ```
//!
//! At the optimum spend equals elasticity times gross profit
//! (`x* = e * m * k * x*^e`, the Wright relation); it is checked on every solve.

use tracing::debug;

use crate::config::OptimizerConfig;
use crate::errors::EngineError;
use crate::types::OptimizationInput;

// ─── Response Model ─────────────────────────────────────────────────────────

impl OptimizationInput {
    /// Projected sales `k * x^e`.
    pub fn sales_at(&self, x: f64) -> f64 {
        self.constant_k * x.powf(self.elasticity)
    }

    /// Gross profit `m * k * x^e` (before paying for the ads).
    pub fn gross_profit_at(&self, x: f64) -> f64 {
        self.margin * self.sales_at(x)
    }

    /// Net profit `m * k * x^e - x`.
    pub fn profit_at(&self, x: f64) -> f64 {
        self.gross_profit_at(x) - x
    }

    pub fn marginal_profit_at(&self, x: f64) -> f64 {
        self.margin * self.constant_k * self.elasticity * x.powf(self.elasticity - 1.0) - 1.0
    }

    pub fn curvature_at(&self, x: f64) -> f64 {
        self.margin
            * self.constant_k
            * self.elasticity
            * (self.elasticity - 1.0)
            * x.powf(self.elasticity - 2.0)
    }

    /// `margin` and `k` positive and finite, `elasticity` finite.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.margin.is_finite() && self.margin > 0.0) {
            return Err(EngineError::InvalidParameter { name: "margem", value: self.margin });
        }
        if !(self.constant_k.is_finite() && self.constant_k > 0.0) {
            return Err(EngineError::InvalidParameter { name: "k", value: self.constant_k });
        }
        if !self.elasticity.is_finite() {
            return Err(EngineError::InvalidParameter { name: "e", value: self.elasticity });
        }
        Ok(())
    }
}

// ─── Optimum ────────────────────────────────────────────────────────────────

/// A verified interior maximum of the profit function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Optimum {
    pub investment: f64,
    pub profit: f64,
    pub sales: f64,
    pub gross_profit: f64,
    pub first_derivative: f64,
    pub second_derivative: f64,
    /// `|x* - e * gross_profit(x*)| / x*`.
    pub wright_residual: f64,
}

impl Optimum {
    /// Spend as a percentage of gross profit.
    pub fn gross_profit_share_pct(&self) -> f64 {
        100.0 * self.investment / self.gross_profit
    }
}

/// Solve for the profit-maximizing spend and verify it.
///
/// Elasticity outside `(0, 1)` has no positive finite optimum and fails with
/// `NoInteriorMaximum`; a solution that does not pass the first-order,
/// second-order or Wright checks fails with `NumericalDegeneracy`.
pub fn optimize(
    input: &OptimizationInput,
    config: &OptimizerConfig,
) -> Result<Optimum, EngineError> {
    input.validate()?;
    let OptimizationInput { margin, elasticity: e, constant_k: k } = *input;

    if e >= 1.0 {
        return Err(EngineError::NoInteriorMaximum {
            elasticity: e,
            reason: "retornos não decrescentes, o lucro cresce sem limite com o investimento",
        });
    }
    if e <= 0.0 {
        return Err(EngineError::NoInteriorMaximum {
            elasticity: e,
            reason: "o lucro é estritamente decrescente no investimento",
        });
    }

    // Log space keeps the 1/(1-e) power from overflowing for e near 1.
    let x = ((margin * k * e).ln() / (1.0 - e)).exp();
    if !(x.is_finite() && x > 0.0) {
        return Err(EngineError::NumericalDegeneracy(format!(
            "investimento ótimo fora do intervalo representável (m={margin}, k={k}, e={e})"
        )));
    }

    let first = input.marginal_profit_at(x);
    if !(first.abs() <= config.first_order_tolerance) {
        return Err(EngineError::NumericalDegeneracy(format!(
            "condição de primeira ordem não satisfeita: L'(A*) = {first:e}"
        )));
    }

    let second = input.curvature_at(x);
    if !(second.is_finite() && second < 0.0) {
        return Err(EngineError::NumericalDegeneracy(format!(
            "derivada segunda não negativa em A* = {x}: L''(A*) = {second:e}"
        )));
    }

    let sales = input.sales_at(x);
    let gross_profit = margin * sales;
    let wright_residual = (x - e * gross_profit).abs() / x;
    if !(wright_residual <= config.wright_tolerance) {
        return Err(EngineError::NumericalDegeneracy(format!(
            "relação de Wright violada: |A* - e·G(A*)| / A* = {wright_residual:e}"
        )));
    }

    let optimum = Optimum {
        investment: x,
        profit: gross_profit - x,
        sales,
        gross_profit,
        first_derivative: first,
        second_derivative: second,
        wright_residual,
    };
    debug!(
        margin, k, e,
        investment = optimum.investment,
        profit = optimum.profit,
        second_derivative = optimum.second_derivative,
        "Solved profit optimum"
    );
    Ok(optimum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(m: f64, k: f64, e: f64) -> Result<Optimum, EngineError> {
        optimize(&OptimizationInput::new(m, k, e), &OptimizerConfig::default())
    }

    #[test]
    fn reference_example_is_a_true_maximum() {
        let opt = solve(50.0, 1.0, 0.11).expect("test: solve");
        // (50 * 0.11)^(1/0.89)
        let expected = 5.5_f64.powf(1.0 / 0.89);
        assert!((opt.investment - expected).abs() < 1e-9, "x*={}", opt.investment);
        assert!(opt.investment > 0.0);
        assert!(opt.second_derivative < 0.0);
        assert!(opt.first_derivative.abs() < 1e-9);
        assert!(opt.profit > 0.0);
    }

    #[test]
    fn wright_relation_holds() {
        for &(m, k, e) in &[(50.0, 1.0, 0.11), (12.0, 3.5, 0.42), (2.0, 0.8, 0.9), (1000.0, 0.02, 0.05)] {
            let opt = solve(m, k, e).expect("test: solve");
            let rhs = e * m * k * opt.investment.powf(e);
            assert!(
                (opt.investment - rhs).abs() <= 1e-9 * opt.investment,
                "m={m} k={k} e={e}: x*={} e*G={}",
                opt.investment,
                rhs
            );
            assert!((opt.gross_profit_share_pct() - 100.0 * e).abs() < 1e-6);
        }
    }

    #[test]
    fn optimum_beats_its_neighbours() {
        let input = OptimizationInput::new(30.0, 2.0, 0.35);
        let opt = optimize(&input, &OptimizerConfig::default()).expect("test: solve");
        for factor in [0.5, 0.9, 0.99, 1.01, 1.1, 2.0] {
            assert!(
                input.profit_at(opt.investment * factor) < opt.profit,
                "profit at {factor}x* should be lower"
            );
        }
    }

    #[test]
    fn elasticity_boundaries_have_no_interior_maximum() {
        for e in [0.0, 1.0, -0.3, 1.5] {
            match solve(50.0, 1.0, e) {
                Err(EngineError::NoInteriorMaximum { elasticity, .. }) => assert_eq!(elasticity, e),
                other => panic!("e={e}: expected NoInteriorMaximum, got {other:?}"),
            }
        }
    }

    #[test]
    fn invalid_parameters_rejected() {
        assert_eq!(
            solve(0.0, 1.0, 0.5),
            Err(EngineError::InvalidParameter { name: "margem", value: 0.0 })
        );
        assert_eq!(
            solve(10.0, -2.0, 0.5),
            Err(EngineError::InvalidParameter { name: "k", value: -2.0 })
        );
        assert!(matches!(
            solve(10.0, 1.0, f64::NAN),
            Err(EngineError::InvalidParameter { name: "e", .. })
        ));
    }

    #[test]
    fn overflowing_optimum_is_degenerate_not_infinite() {
        // (1e6 * 0.999)^(1000) overflows f64.
        match solve(1e6, 1.0, 0.999) {
            Err(EngineError::NumericalDegeneracy(msg)) => assert!(msg.contains("representável"), "{msg}"),
            other => panic!("expected NumericalDegeneracy, got {other:?}"),
        }
    }

    #[test]
    fn optimum_increases_with_elasticity() {
        let mut last = 0.0;
        for i in 1..20 {
            let e = i as f64 * 0.05;
            let opt = solve(50.0, 1.0, e).expect("test: solve");
            assert!(opt.investment > last, "e={e}: {} <= {}", opt.investment, last);
            last = opt.investment;
        }
    }

    #[test]
    fn response_model_values() {
        let input = OptimizationInput::new(10.0, 2.0, 0.5);
        assert!((input.sales_at(16.0) - 8.0).abs() < 1e-12);
        assert!((input.gross_profit_at(16.0) - 80.0).abs() < 1e-12);
        assert!((input.profit_at(16.0) - 64.0).abs() < 1e-12);
        assert_eq!(input.profit_at(0.0), 0.0);
        // f'(x) = 10*2*0.5*x^-0.5 - 1 -> 10/4 - 1 at x=16
        assert!((input.marginal_profit_at(16.0) - 1.5).abs() < 1e-12);
        assert!(input.curvature_at(16.0) < 0.0);
    }
}
