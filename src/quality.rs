// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Data Quality Assessment

//! Advisory checks on a finished calibration.
//!
//! Nothing here fails a calibration: every finding becomes a
//! [`QualityWarning`] and the best-fit numbers are still returned.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::QualityConfig;

/// Numbers the assessor looks at, taken from a finished fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitDiagnostics {
    pub r_squared: f64,
    pub elasticity: f64,
    pub observations_used: usize,
    pub observations_discarded: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum QualityWarning {
    /// R² below the configured threshold.
    PoorFit { r_squared: f64, threshold: f64 },
    /// Elasticity outside (0, 1): no interior profit maximum exists.
    ElasticityOutOfRange { elasticity: f64 },
    SmallSample { observations: usize, recommended: usize },
    DiscardedRows { discarded: usize },
}

impl QualityWarning {
    /// Warnings that make the model itself unreliable, as opposed to
    /// bookkeeping notes about the input.
    pub fn is_model_warning(&self) -> bool {
        matches!(self, Self::PoorFit { .. } | Self::ElasticityOutOfRange { .. })
    }
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PoorFit { r_squared, threshold } => write!(
                f,
                "Ajuste fraco do modelo: R² = {:.3} abaixo de {:.2}; as vendas históricas não seguem bem a curva de potência.",
                r_squared, threshold
            ),
            Self::ElasticityOutOfRange { elasticity } if *elasticity >= 1.0 => write!(
                f,
                "Elasticidade {:.4} >= 1: retornos não decrescentes, o lucro não tem máximo finito.",
                elasticity
            ),
            Self::ElasticityOutOfRange { elasticity } => write!(
                f,
                "Elasticidade {:.4} <= 0: investir mais não aumenta as vendas, o lucro só diminui.",
                elasticity
            ),
            Self::SmallSample { observations, recommended } => write!(
                f,
                "Apenas {} observações válidas (recomendado: pelo menos {}).",
                observations, recommended
            ),
            Self::DiscardedRows { discarded } => write!(
                f,
                "{} linha(s) descartada(s) por investimento ou vendas não positivos ou não finitos.",
                discarded
            ),
        }
    }
}

/// Run every advisory check against a fit.
pub fn assess(diag: &FitDiagnostics, config: &QualityConfig) -> Vec<QualityWarning> {
    let mut warnings = Vec::new();

    if diag.r_squared < config.min_r_squared {
        warnings.push(QualityWarning::PoorFit {
            r_squared: diag.r_squared,
            threshold: config.min_r_squared,
        });
    }
    if !(diag.elasticity > 0.0 && diag.elasticity < 1.0) {
        warnings.push(QualityWarning::ElasticityOutOfRange {
            elasticity: diag.elasticity,
        });
    }
    if diag.observations_used < config.min_recommended_observations {
        warnings.push(QualityWarning::SmallSample {
            observations: diag.observations_used,
            recommended: config.min_recommended_observations,
        });
    }
    if diag.observations_discarded > 0 {
        warnings.push(QualityWarning::DiscardedRows {
            discarded: diag.observations_discarded,
        });
    }

    warnings
}

/// Collapse warnings into the single `aviso_dados` text the client shows.
pub fn summarize(warnings: &[QualityWarning]) -> Option<String> {
    if warnings.is_empty() {
        return None;
    }
    Some(
        warnings
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "),
    )
}

/// True when an R² is known and below the threshold.
pub fn is_poor_fit(r_squared: Option<f64>, config: &QualityConfig) -> bool {
    r_squared.map_or(false, |r2| r2 < config.min_r_squared)
}
