// Scenario Definitions
// Each scenario is a known response curve plus the history a client would upload

use wright_engine::ExtrapolationLevel;

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    /// True curve `sales = k0 * x^e0`.
    pub k0: f64,
    pub e0: f64,
    pub margin: f64,
    /// Log-sales noise standard deviation.
    pub noise: f64,
    pub observations: usize,
    pub min_investment: f64,
    pub max_investment: f64,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    pub max_elasticity_error: Option<f64>,
    pub max_log_k_error: Option<f64>,
    pub max_investment_rel_error: Option<f64>,
    pub min_r_squared: Option<f64>,
    pub expected_extrapolation: Option<ExtrapolationLevel>,
    pub require_sensitivity_ordering: bool,
    /// The quality assessor must flag the fit.
    pub require_poor_fit_warning: bool,
    /// A structured engine error counts as a pass (noise may push ê out of (0,1)).
    pub allow_engine_error: bool,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            max_elasticity_error: None,
            max_log_k_error: None,
            max_investment_rel_error: None,
            min_r_squared: None,
            expected_extrapolation: None,
            require_sensitivity_ordering: false,
            require_poor_fit_warning: false,
            allow_engine_error: false,
        }
    }
}

impl Scenario {
    /// Closed-form optimum of the true curve.
    pub fn true_optimum(&self) -> f64 {
        (self.margin * self.k0 * self.e0).powf(1.0 / (1.0 - self.e0))
    }
}

// ─── Scenario Registry ──────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        // x* = (20 * 5 * 0.5)^2 = 2500
        Scenario {
            name: "CAL_EXACT_RECOVERY",
            label: "Noiseless recovery",
            category: "calibration",
            k0: 5.0,
            e0: 0.5,
            margin: 20.0,
            noise: 0.0,
            observations: 24,
            min_investment: 200.0,
            max_investment: 5_000.0,
            criteria: PassCriteria {
                max_elasticity_error: Some(1e-9),
                max_log_k_error: Some(1e-8),
                max_investment_rel_error: Some(1e-6),
                min_r_squared: Some(0.999_999),
                expected_extrapolation: Some(ExtrapolationLevel::WithinRange),
                require_sensitivity_ordering: true,
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "CAL_NOISY_TYPICAL",
            label: "Noisy history (sigma 0.15, n=36)",
            category: "calibration",
            k0: 5.0,
            e0: 0.5,
            margin: 20.0,
            noise: 0.15,
            observations: 36,
            min_investment: 200.0,
            max_investment: 5_000.0,
            criteria: PassCriteria {
                max_elasticity_error: Some(0.08),
                min_r_squared: Some(0.8),
                require_sensitivity_ordering: true,
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "CAL_SMALL_SAMPLE",
            label: "Short history (sigma 0.1, n=8)",
            category: "calibration",
            k0: 5.0,
            e0: 0.5,
            margin: 20.0,
            noise: 0.1,
            observations: 8,
            min_investment: 200.0,
            max_investment: 5_000.0,
            criteria: PassCriteria {
                max_elasticity_error: Some(0.15),
                ..PassCriteria::default()
            },
        },
        // x* = (5 * 2 * 0.8)^5 = 32768
        Scenario {
            name: "OPT_HIGH_ELASTICITY",
            label: "Elastic market (e0=0.8)",
            category: "optimizer",
            k0: 2.0,
            e0: 0.8,
            margin: 5.0,
            noise: 0.02,
            observations: 30,
            min_investment: 1_000.0,
            max_investment: 40_000.0,
            criteria: PassCriteria {
                max_elasticity_error: Some(0.02),
                require_sensitivity_ordering: true,
                ..PassCriteria::default()
            },
        },
        // x* = 2500 against a historical max of 1800 (ratio ~1.39)
        Scenario {
            name: "RISK_MODERATE",
            label: "Moderate extrapolation",
            category: "risk",
            k0: 5.0,
            e0: 0.5,
            margin: 20.0,
            noise: 0.005,
            observations: 30,
            min_investment: 100.0,
            max_investment: 1_800.0,
            criteria: PassCriteria {
                expected_extrapolation: Some(ExtrapolationLevel::Moderate),
                ..PassCriteria::default()
            },
        },
        // x* ~ 6.79 against a historical max of 3
        Scenario {
            name: "RISK_HIGH_LOW_ELASTICITY",
            label: "High extrapolation (e0=0.11)",
            category: "risk",
            k0: 1.0,
            e0: 0.11,
            margin: 50.0,
            noise: 0.002,
            observations: 24,
            min_investment: 1.0,
            max_investment: 3.0,
            criteria: PassCriteria {
                expected_extrapolation: Some(ExtrapolationLevel::High),
                require_sensitivity_ordering: true,
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "QUALITY_NOISE_DOMINATED",
            label: "Noise-dominated history",
            category: "quality",
            k0: 5.0,
            e0: 0.05,
            margin: 20.0,
            noise: 0.8,
            observations: 12,
            min_investment: 200.0,
            max_investment: 5_000.0,
            criteria: PassCriteria {
                require_poor_fit_warning: true,
                allow_engine_error: true,
                ..PassCriteria::default()
            },
        },
    ]
}
