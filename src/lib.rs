// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine ("Wright")

pub mod types;
pub mod errors;
pub mod config;
pub mod calibration;
pub mod quality;
pub mod optimizer;
pub mod sensitivity;
pub mod risk;
pub mod curve;
pub mod justification;
pub mod money;
pub mod engine;
pub mod adapter;

// Seeded data generation for tests and the bench binary
#[cfg(not(target_arch = "wasm32"))]
pub mod synthetic;

pub use types::*;
pub use errors::{EngineError, ErrorBody};
pub use config::{ConfigError, EngineConfig};
pub use engine::{BudgetEngine, CalibrationContext};
pub use adapter::{CalcularRequest, WireResponse};

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser-facing handle. Every method takes and returns plain JS objects
/// shaped like the `/upload` and `/calcular` JSON bodies.
#[wasm_bindgen]
pub struct WrightEngine {
    inner: BudgetEngine,
}

#[wasm_bindgen]
impl WrightEngine {
    /// `config` may be `undefined`/`null` for defaults, or a partial config
    /// object whose missing sections fall back to defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<WrightEngine, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("configuração inválida: {e}")))?
        };
        let inner = BudgetEngine::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    /// Fit the curve to an array of `{investimento, vendas}` rows.
    pub fn calibrar(&self, observations: JsValue) -> JsValue {
        let rows: Vec<HistoricalObservation> = match serde_wasm_bindgen::from_value(observations) {
            Ok(rows) => rows,
            Err(e) => return malformed_request(e),
        };
        let response = adapter::handle_upload(&self.inner, &rows);
        serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
    }

    /// Optimize `{margem, k, e, max_investimento_historico?, r_squared?}`.
    pub fn calcular(&self, request: JsValue) -> JsValue {
        let request: CalcularRequest = match serde_wasm_bindgen::from_value(request) {
            Ok(r) => r,
            Err(e) => return malformed_request(e),
        };
        let response = adapter::handle_calcular(&self.inner, &request);
        serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
    }

    /// Effective configuration, defaults filled in.
    pub fn config(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.inner.config()).unwrap_or(JsValue::NULL)
    }
}

fn malformed_request(err: serde_wasm_bindgen::Error) -> JsValue {
    let body = ErrorBody { erro: format!("requisição malformada: {err}"), is_maximo: None };
    log(&body.erro);
    serde_wasm_bindgen::to_value(&body).unwrap_or(JsValue::NULL)
}
