// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Error Types

//! Engine error taxonomy.
//!
//! Errors replace a result; advisory warnings (poor fit, extrapolation) travel
//! alongside a successful result instead. Messages are user-facing and cross
//! the wire as the `erro` field, so they are written in Portuguese like the
//! rest of the client text.

use serde::{Deserialize, Serialize};

/// Faults raised by calibration and optimization.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("dados insuficientes: {valid} observação(ões) válida(s), mínimo de {required}")]
    InsufficientData { valid: usize, required: usize },

    #[error("observação inválida (investimento={investment}, vendas={sales}): ambos devem ser positivos e finitos")]
    InvalidObservation { investment: f64, sales: f64 },

    #[error("todas as observações válidas têm o mesmo investimento ({investment}); a elasticidade não é identificável")]
    NoInvestmentVariation { investment: f64 },

    #[error("parâmetro inválido: {name}={value} (deve ser positivo e finito)")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("sem máximo interior para elasticidade {elasticity}: {reason}")]
    NoInteriorMaximum { elasticity: f64, reason: &'static str },

    #[error("degeneração numérica: {0}")]
    NumericalDegeneracy(String),
}

impl EngineError {
    /// Whether the failure happened while searching for the optimum, in which
    /// case the wire response also reports `is_maximo: false`.
    pub fn is_optimization_failure(&self) -> bool {
        matches!(
            self,
            Self::NoInteriorMaximum { .. } | Self::NumericalDegeneracy(_)
        )
    }
}

/// Structured error body returned to the client in place of a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub erro: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_maximo: Option<bool>,
}

impl From<&EngineError> for ErrorBody {
    fn from(err: &EngineError) -> Self {
        Self {
            erro: err.to_string(),
            is_maximo: err.is_optimization_failure().then_some(false),
        }
    }
}

impl From<EngineError> for ErrorBody {
    fn from(err: EngineError) -> Self {
        Self::from(&err)
    }
}
