// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Configuration

//! Engine configuration - every tunable threshold as a TOML/JSON value.
//!
//! Each section implements `Default` with the documented defaults, so an
//! absent file (or an empty JSON object from the browser) behaves exactly
//! like the built-in settings.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONFIG_ENV_VAR: &str = "WRIGHT_CONFIG";
const LOCAL_CONFIG_FILE: &str = "wright_config.toml";

/// Upper bound on curve samples; keeps every call bounded in time.
pub const MAX_CURVE_POINTS: usize = 10_000;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Top-Level Config
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub quality: QualityConfig,
    #[serde(default)]
    pub extrapolation: ExtrapolationConfig,
    #[serde(default)]
    pub sensitivity: SensitivityConfig,
    #[serde(default)]
    pub curve: CurveConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// Data quality cutoffs applied to a calibration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Below this R² the fit is flagged as poor.
    pub min_r_squared: f64,
    /// Fewer valid rows than this triggers a small-sample warning.
    pub min_recommended_observations: usize,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            min_r_squared: 0.5,
            min_recommended_observations: 5,
        }
    }
}

/// Multipliers on the historical maximum spend (t1 < t2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtrapolationConfig {
    pub moderate_multiplier: f64,
    pub high_multiplier: f64,
}

impl Default for ExtrapolationConfig {
    fn default() -> Self {
        Self {
            moderate_multiplier: 1.2,
            high_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub pessimistic_factor: f64,
    pub optimistic_factor: f64,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            pessimistic_factor: 0.9,
            optimistic_factor: 1.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveConfig {
    /// Number of evenly spaced samples (the optimum may add one more).
    pub points: usize,
    /// Plot domain ends at this multiple of `max(x*, historical max)`.
    pub domain_multiplier: f64,
    /// First sample as a fraction of the domain when `x = 0` is singular.
    pub epsilon_fraction: f64,
    /// Insert `x*` itself into the sequence.
    pub include_optimum: bool,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            points: 100,
            domain_multiplier: 2.0,
            epsilon_fraction: 0.001,
            include_optimum: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Max |f'(x*)| accepted at the closed-form optimum.
    pub first_order_tolerance: f64,
    /// Max relative error of `x* = e * gross_profit(x*)`.
    pub wright_tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            first_order_tolerance: 1e-6,
            wright_tolerance: 1e-6,
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl EngineConfig {
    /// Search order: `$WRIGHT_CONFIG`, `./wright_config.toml`, built-in defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            match Self::load_from_file(&p) {
                Ok(config) => {
                    info!(path = %p.display(), "Loaded engine config from {}", CONFIG_ENV_VAR);
                    return config;
                }
                Err(e) => {
                    warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                }
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded engine config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No engine config found, using built-in defaults");
        Self::default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject settings that would break the engine's guarantees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let q = &self.quality;
        if !(0.0..=1.0).contains(&q.min_r_squared) {
            errors.push(format!(
                "quality.min_r_squared ({}) must lie in [0, 1]",
                q.min_r_squared
            ));
        }

        let x = &self.extrapolation;
        if !(x.moderate_multiplier > 0.0 && x.moderate_multiplier < x.high_multiplier)
            || !x.high_multiplier.is_finite()
        {
            errors.push(format!(
                "extrapolation multipliers must satisfy 0 < moderate ({}) < high ({})",
                x.moderate_multiplier, x.high_multiplier
            ));
        }

        let s = &self.sensitivity;
        if !(s.pessimistic_factor > 0.0 && s.pessimistic_factor < 1.0) {
            errors.push(format!(
                "sensitivity.pessimistic_factor ({}) must lie in (0, 1)",
                s.pessimistic_factor
            ));
        }
        if !(s.optimistic_factor > 1.0 && s.optimistic_factor.is_finite()) {
            errors.push(format!(
                "sensitivity.optimistic_factor ({}) must be > 1",
                s.optimistic_factor
            ));
        }

        let c = &self.curve;
        if !(2..=MAX_CURVE_POINTS).contains(&c.points) {
            errors.push(format!(
                "curve.points ({}) must lie in [2, {}]",
                c.points, MAX_CURVE_POINTS
            ));
        }
        if !(c.domain_multiplier >= 1.0 && c.domain_multiplier.is_finite()) {
            errors.push(format!(
                "curve.domain_multiplier ({}) must be >= 1",
                c.domain_multiplier
            ));
        }
        if !(c.epsilon_fraction > 0.0 && c.epsilon_fraction < 1.0) {
            errors.push(format!(
                "curve.epsilon_fraction ({}) must lie in (0, 1)",
                c.epsilon_fraction
            ));
        }

        let o = &self.optimizer;
        if !(o.first_order_tolerance > 0.0) || !(o.wright_tolerance > 0.0) {
            errors.push("optimizer tolerances must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }
}
