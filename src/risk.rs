// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Extrapolation Risk

//! Classifies how far a recommended spend lies beyond the data the curve was
//! calibrated on.
//!
//! ```text
//! x* <= max_hist * t1  -> within range
//! x* <= max_hist * t2  -> moderate
//! otherwise            -> high
//! ```

use tracing::{info, warn};

use crate::config::ExtrapolationConfig;
use crate::errors::EngineError;
use crate::money::{format_decimal_comma, format_reais};
use crate::types::ExtrapolationLevel;

#[derive(Debug, Clone, PartialEq)]
pub struct ExtrapolationAssessment {
    pub level: ExtrapolationLevel,
    /// `x* / max_hist`.
    pub ratio: f64,
    /// Present for `Moderate` and `High`.
    pub alert: Option<String>,
}

pub fn classify(
    optimal_investment: f64,
    historical_max_investment: f64,
    config: &ExtrapolationConfig,
) -> ExtrapolationLevel {
    if optimal_investment <= historical_max_investment * config.moderate_multiplier {
        ExtrapolationLevel::WithinRange
    } else if optimal_investment <= historical_max_investment * config.high_multiplier {
        ExtrapolationLevel::Moderate
    } else {
        ExtrapolationLevel::High
    }
}

/// Classify and attach the user-facing alert.
pub fn assess(
    optimal_investment: f64,
    historical_max_investment: f64,
    config: &ExtrapolationConfig,
) -> Result<ExtrapolationAssessment, EngineError> {
    if !(historical_max_investment.is_finite() && historical_max_investment > 0.0) {
        return Err(EngineError::InvalidParameter {
            name: "max_investimento_historico",
            value: historical_max_investment,
        });
    }

    let level = classify(optimal_investment, historical_max_investment, config);
    let ratio = optimal_investment / historical_max_investment;
    let alert = level
        .is_extrapolating()
        .then(|| alert_text(level, optimal_investment, historical_max_investment, ratio));

    if level.is_extrapolating() {
        warn!(?level, ratio, "Recommended spend extrapolates beyond historical data");
    } else {
        info!(ratio, "Recommended spend within historical range");
    }

    Ok(ExtrapolationAssessment { level, ratio, alert })
}

fn alert_text(level: ExtrapolationLevel, optimal: f64, hist_max: f64, ratio: f64) -> String {
    let confidence = match level {
        ExtrapolationLevel::High => "muito reduzida; considere testar aumentos graduais de investimento",
        _ => "reduzida",
    };
    format!(
        "Risco de {}: o investimento recomendado ({}) é {}x o maior investimento histórico ({}). \
         A curva não foi observada nessa faixa; confiança {}.",
        level.description(),
        format_reais(optimal),
        format_decimal_comma(ratio, 2),
        format_reais(hist_max),
        confidence
    )
}
