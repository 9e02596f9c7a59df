//! Adapter layer: converts between the client's wire shapes and engine types.
//!
//! Field names here are the client's fixed contract (`/upload`, `/calcular`).

use serde::{Deserialize, Serialize};

use crate::engine::{BudgetEngine, CalibrationContext};
use crate::errors::{EngineError, ErrorBody};
use crate::types::{CalibrationResult, HistoricalObservation, OptimizationInput, OptimizationResult};

/// Body of a `/calcular` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalcularRequest {
    pub margem: f64,
    pub k: f64,
    pub e: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_investimento_historico: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
}

impl CalcularRequest {
    pub fn input(&self) -> OptimizationInput {
        OptimizationInput::new(self.margem, self.k, self.e)
    }

    pub fn context(&self) -> CalibrationContext {
        CalibrationContext {
            historical_max_investment: self.max_investimento_historico,
            r_squared: self.r_squared,
        }
    }
}

/// Either the result object or `{erro}`, serialized without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireResponse<T> {
    Ok(T),
    Err(ErrorBody),
}

impl<T> From<Result<T, EngineError>> for WireResponse<T> {
    fn from(r: Result<T, EngineError>) -> Self {
        match r {
            Ok(v) => Self::Ok(v),
            Err(e) => Self::Err(ErrorBody::from(&e)),
        }
    }
}

/// `/upload` after CSV parsing: calibrate the parsed rows.
pub fn handle_upload(
    engine: &BudgetEngine,
    observations: &[HistoricalObservation],
) -> WireResponse<CalibrationResult> {
    engine.calibrate(observations).into()
}

/// `/calcular`: optimize the submitted parameters.
pub fn handle_calcular(
    engine: &BudgetEngine,
    request: &CalcularRequest,
) -> WireResponse<OptimizationResult> {
    engine.optimize(&request.input(), &request.context()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calcular_request_from_client_json() {
        let req: CalcularRequest =
            serde_json::from_str(r#"{"margem": 50, "k": 1.5, "e": 0.5}"#).expect("test: parse");
        assert_eq!(req.input(), OptimizationInput::new(50.0, 1.5, 0.5));
        assert_eq!(req.context(), CalibrationContext::default());

        let req: CalcularRequest = serde_json::from_str(
            r#"{"margem": 50, "k": 1.5, "e": 0.5, "max_investimento_historico": 900, "r_squared": 0.8}"#,
        )
        .expect("test: parse");
        assert_eq!(req.context().historical_max_investment, Some(900.0));
        assert_eq!(req.context().r_squared, Some(0.8));
    }

    #[test]
    fn success_serializes_flat() {
        let engine = BudgetEngine::default();
        let req = CalcularRequest { margem: 50.0, k: 1.5, e: 0.5, max_investimento_historico: None, r_squared: None };
        let v = serde_json::to_value(handle_calcular(&engine, &req)).expect("test: serialize");
        assert!(v.get("erro").is_none());
        assert_eq!(v["is_maximo"], true);
        assert!(v["investimento_otimo"].as_f64().expect("test: number") > 0.0);
        assert!(v["pontos_curva"].is_array());
        assert!(v["cenario_pessimista"]["elasticidade"].is_number());
        assert!(v.get("nivel_extrapolacao").is_none());
    }

    #[test]
    fn failure_serializes_as_erro() {
        let engine = BudgetEngine::default();
        let req = CalcularRequest { margem: 50.0, k: 1.0, e: 1.2, max_investimento_historico: None, r_squared: None };
        let v = serde_json::to_value(handle_calcular(&engine, &req)).expect("test: serialize");
        assert!(v["erro"].as_str().expect("test: erro").contains("sem máximo interior"));
        assert_eq!(v["is_maximo"], false);
        assert!(v.get("investimento_otimo").is_none());
    }

    #[test]
    fn upload_errors_are_structured() {
        let engine = BudgetEngine::default();
        let resp = handle_upload(&engine, &[HistoricalObservation { investment: 1.0, sales: 1.0 }]);
        match resp {
            WireResponse::Err(body) => {
                assert!(body.erro.contains("dados insuficientes"));
                assert_eq!(body.is_maximo, None);
            }
            WireResponse::Ok(c) => panic!("expected error body, got {c:?}"),
        }
    }
}
