// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Sensitivity Analysis

//! Perturb-and-resolve: the optimizer is re-run from scratch with the
//! elasticity scaled down and up, margin and k held fixed.

use tracing::debug;

use crate::config::{OptimizerConfig, SensitivityConfig};
use crate::errors::EngineError;
use crate::optimizer;
use crate::types::{OptimizationInput, SensitivityScenario};

/// Pessimistic and optimistic re-solves. A side is `None` when its perturbed
/// elasticity has no interior maximum.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensitivityAnalysis {
    pub pessimistic: Option<SensitivityScenario>,
    pub optimistic: Option<SensitivityScenario>,
}

/// Full optimization at `elasticity * factor`.
pub fn scenario(
    base: &OptimizationInput,
    factor: f64,
    config: &OptimizerConfig,
) -> Result<SensitivityScenario, EngineError> {
    let perturbed = base.with_scaled_elasticity(factor);
    let opt = optimizer::optimize(&perturbed, config)?;
    Ok(SensitivityScenario {
        investment: opt.investment,
        profit: opt.profit,
        elasticity: perturbed.elasticity,
    })
}

pub fn analyze(
    base: &OptimizationInput,
    sensitivity: &SensitivityConfig,
    optimizer_config: &OptimizerConfig,
) -> SensitivityAnalysis {
    let run = |label: &str, factor: f64| match scenario(base, factor, optimizer_config) {
        Ok(s) => Some(s),
        Err(e) => {
            debug!(scenario = label, factor, error = %e, "Sensitivity scenario has no optimum");
            None
        }
    };
    SensitivityAnalysis {
        pessimistic: run("pessimistic", sensitivity.pessimistic_factor),
        optimistic: run("optimistic", sensitivity.optimistic_factor),
    }
}
