// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Synthetic Histories

//! Seedable generator of spend/sales histories with a known response curve.
//! Drives the recovery tests and the bench runner.
//!
//! `sales = k0 * x^e0 * exp(sigma * z)`, `z ~ N(0, 1)`.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::types::HistoricalObservation;

/// Known curve plus the shape of the history drawn from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticCurve {
    pub constant_k: f64,
    pub elasticity: f64,
    /// Standard deviation of the log-sales noise; 0 gives exact points.
    pub noise_sigma: f64,
    /// Spend range `[min, max]` the history is drawn from.
    pub min_investment: f64,
    pub max_investment: f64,
}

impl SyntheticCurve {
    pub fn exact(constant_k: f64, elasticity: f64) -> Self {
        Self {
            constant_k,
            elasticity,
            noise_sigma: 0.0,
            min_investment: 100.0,
            max_investment: 10_000.0,
        }
    }

    pub fn with_noise(mut self, sigma: f64) -> Self {
        self.noise_sigma = sigma;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min_investment = min;
        self.max_investment = max;
        self
    }

    pub fn sales_at(&self, investment: f64) -> f64 {
        self.constant_k * investment.powf(self.elasticity)
    }
}

pub struct HistoryGenerator {
    rng: ChaCha8Rng,
    curve: SyntheticCurve,
}

impl HistoryGenerator {
    pub fn new(curve: SyntheticCurve, seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed), curve }
    }

    /// Spends spread log-uniformly over the range, so every decade of
    /// spend carries similar weight in the log-log fit.
    pub fn generate(&mut self, n: usize) -> Vec<HistoricalObservation> {
        let lo = self.curve.min_investment.ln();
        let hi = self.curve.max_investment.ln();
        (0..n)
            .map(|_| {
                let x = self.rng.gen_range(lo..=hi).exp();
                self.observe(x)
            })
            .collect()
    }

    /// Evenly spaced spends from min to max, endpoints included.
    pub fn generate_grid(&mut self, n: usize) -> Vec<HistoricalObservation> {
        let SyntheticCurve { min_investment: lo, max_investment: hi, .. } = self.curve;
        let steps = n.saturating_sub(1).max(1) as f64;
        (0..n)
            .map(|i| self.observe(lo + (hi - lo) * i as f64 / steps))
            .collect()
    }

    fn observe(&mut self, investment: f64) -> HistoricalObservation {
        let noise = if self.curve.noise_sigma > 0.0 {
            (self.curve.noise_sigma * standard_normal(&mut self.rng)).exp()
        } else {
            1.0
        };
        HistoricalObservation {
            investment,
            sales: self.curve.sales_at(investment) * noise,
        }
    }
}

/// Box-Muller transform.
fn standard_normal(rng: &mut ChaCha8Rng) -> f64 {
    // 1 - u keeps the argument of ln in (0, 1]
    let u1: f64 = 1.0 - rng.gen::<f64>();
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_normal_moments() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        assert!(mean.abs() < 0.05, "mean {}", mean);
        assert!((var - 1.0).abs() < 0.05, "variance {}", var);
    }

    #[test]
    fn test_exact_curve_has_no_noise() {
        let curve = SyntheticCurve::exact(2.0, 0.5);
        let obs = HistoryGenerator::new(curve, 7).generate(50);
        assert_eq!(obs.len(), 50);
        for o in &obs {
            assert!(o.investment >= 100.0 && o.investment <= 10_000.0);
            assert!((o.sales - curve.sales_at(o.investment)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_same_seed_same_history() {
        let curve = SyntheticCurve::exact(1.5, 0.3).with_noise(0.2);
        let a = HistoryGenerator::new(curve, 99).generate(20);
        let b = HistoryGenerator::new(curve, 99).generate(20);
        let c = HistoryGenerator::new(curve, 100).generate(20);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_grid_includes_endpoints() {
        let curve = SyntheticCurve::exact(1.0, 0.2).with_range(10.0, 100.0);
        let obs = HistoryGenerator::new(curve, 0).generate_grid(10);
        assert_eq!(obs.first().map(|o| o.investment), Some(10.0));
        assert_eq!(obs.last().map(|o| o.investment), Some(100.0));
    }
}
