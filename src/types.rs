// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Type Definitions

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::justification::Justification;

// ─── Historical Observation ─────────────────────────────────────────────────

/// One historical period: advertising spend and the sales it produced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct HistoricalObservation {
    #[serde(rename = "investimento")]
    pub investment: f64,
    #[serde(rename = "vendas")]
    pub sales: f64,
}

impl HistoricalObservation {
    /// Strict constructor: rejects rows the log-log fit cannot use.
    pub fn new(investment: f64, sales: f64) -> Result<Self, EngineError> {
        let obs = Self { investment, sales };
        if obs.is_valid() {
            Ok(obs)
        } else {
            Err(EngineError::InvalidObservation { investment, sales })
        }
    }

    /// Both values strictly positive and finite (required for `ln`).
    pub fn is_valid(&self) -> bool {
        self.investment.is_finite()
            && self.sales.is_finite()
            && self.investment > 0.0
            && self.sales > 0.0
    }
}

// ─── Calibration Result ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationResult {
    #[serde(rename = "elasticidade")]
    pub elasticity: f64,
    #[serde(rename = "constante_k")]
    pub constant_k: f64,
    pub r_squared: f64,
    /// Advisory text; the numbers above are still the best fit.
    #[serde(rename = "aviso_dados", skip_serializing_if = "Option::is_none", default)]
    pub warning: Option<String>,
    #[serde(rename = "max_investimento_historico")]
    pub historical_max_investment: f64,
    #[serde(rename = "n_observacoes")]
    pub observations_used: usize,
    #[serde(rename = "n_descartadas")]
    pub observations_discarded: usize,
}

// ─── Optimization Input ─────────────────────────────────────────────────────

/// Parameters of `profit(x) = margin * k * x^elasticity - x`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OptimizationInput {
    #[serde(rename = "margem")]
    pub margin: f64,
    #[serde(rename = "e")]
    pub elasticity: f64,
    #[serde(rename = "k")]
    pub constant_k: f64,
}

impl OptimizationInput {
    pub fn new(margin: f64, constant_k: f64, elasticity: f64) -> Self {
        Self { margin, elasticity, constant_k }
    }

    /// Same margin and k, elasticity scaled by `factor`.
    pub fn with_scaled_elasticity(&self, factor: f64) -> Self {
        Self { elasticity: self.elasticity * factor, ..*self }
    }
}

// ─── Extrapolation Level ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExtrapolationLevel {
    #[serde(rename = "dentro_do_intervalo")]
    WithinRange,
    #[serde(rename = "moderado")]
    Moderate,
    #[serde(rename = "alto")]
    High,
}

impl ExtrapolationLevel {
    pub fn is_extrapolating(&self) -> bool {
        !matches!(self, Self::WithinRange)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::WithinRange => "dentro do intervalo histórico",
            Self::Moderate => "extrapolação moderada",
            Self::High => "extrapolação alta",
        }
    }
}

// ─── Sensitivity / Curve ────────────────────────────────────────────────────

/// A full re-solve of the optimum under a perturbed elasticity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SensitivityScenario {
    #[serde(rename = "investimento")]
    pub investment: f64,
    #[serde(rename = "lucro")]
    pub profit: f64,
    #[serde(rename = "elasticidade")]
    pub elasticity: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CurvePoint {
    #[serde(rename = "investimento")]
    pub investment: f64,
    #[serde(rename = "lucro")]
    pub profit: f64,
}

// ─── Optimization Result ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationResult {
    #[serde(rename = "investimento_otimo")]
    pub optimal_investment: f64,
    #[serde(rename = "lucro_projetado")]
    pub projected_profit: f64,
    #[serde(rename = "is_maximo")]
    pub is_maximum: bool,
    #[serde(rename = "elasticidade_usada")]
    pub elasticity_used: f64,
    #[serde(rename = "constante_k_usada")]
    pub constant_k_used: f64,
    #[serde(rename = "margem_usada")]
    pub margin_used: f64,
    #[serde(rename = "derivada_primeira_valor")]
    pub first_derivative_value: f64,
    #[serde(rename = "derivada_segunda_valor")]
    pub second_derivative_value: f64,
    #[serde(rename = "vendas_projetadas")]
    pub projected_sales: f64,
    #[serde(rename = "lucro_bruto_projetado")]
    pub projected_gross_profit: f64,
    /// Spend as a percentage of gross profit; equals `100 * elasticity`.
    #[serde(rename = "percentual_lucro_bruto")]
    pub gross_profit_share_pct: f64,
    #[serde(rename = "alerta_risco", skip_serializing_if = "Option::is_none", default)]
    pub risk_alert: Option<String>,
    #[serde(rename = "nivel_extrapolacao", skip_serializing_if = "Option::is_none", default)]
    pub extrapolation_level: Option<ExtrapolationLevel>,
    #[serde(rename = "max_investimento_historico", skip_serializing_if = "Option::is_none", default)]
    pub historical_max_investment: Option<f64>,
    #[serde(rename = "cenario_pessimista", skip_serializing_if = "Option::is_none", default)]
    pub pessimistic_scenario: Option<SensitivityScenario>,
    #[serde(rename = "cenario_otimista", skip_serializing_if = "Option::is_none", default)]
    pub optimistic_scenario: Option<SensitivityScenario>,
    #[serde(rename = "pontos_curva")]
    pub curve_points: Vec<CurvePoint>,
    #[serde(rename = "justificativa")]
    pub justification: Justification,
}
