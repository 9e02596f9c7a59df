// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Profit Curve Sampling

//! Discretized profit-vs-spend curve for plotting.
//!
//! The sampler is a plain value: iterating it twice yields the same sequence.

use crate::config::CurveConfig;
use crate::errors::EngineError;
use crate::types::{CurvePoint, OptimizationInput};

#[derive(Debug, Clone, PartialEq)]
pub struct CurveSampler {
    input: OptimizationInput,
    start: f64,
    end: f64,
    points: usize,
    optimum: Option<f64>,
}

impl CurveSampler {
    /// `points` evenly spaced samples over `[start, end]` (at least two).
    pub fn new(input: OptimizationInput, start: f64, end: f64, points: usize) -> Self {
        Self {
            input,
            start,
            end: end.max(start),
            points: points.max(2),
            optimum: None,
        }
    }

    /// Domain `[0, domain_multiplier * max(x*, historical max)]`. The start
    /// moves to a small positive epsilon when `x^e` is singular at zero.
    ///
    /// Fails with `NumericalDegeneracy` when the domain end is not finite.
    pub fn around_optimum(
        input: OptimizationInput,
        optimal_investment: f64,
        historical_max_investment: Option<f64>,
        config: &CurveConfig,
    ) -> Result<Self, EngineError> {
        let reference = historical_max_investment
            .filter(|h| h.is_finite() && *h > 0.0)
            .map_or(optimal_investment, |h| h.max(optimal_investment));
        let end = config.domain_multiplier * reference;
        if !end.is_finite() {
            return Err(EngineError::NumericalDegeneracy(format!(
                "domínio da curva fora do intervalo representável ({} × {reference})",
                config.domain_multiplier
            )));
        }
        let start = if input.elasticity > 0.0 {
            0.0
        } else {
            config.epsilon_fraction * end
        };

        let mut sampler = Self::new(input, start, end, config.points);
        if config.include_optimum {
            sampler.optimum = Some(optimal_investment);
        }
        Ok(sampler)
    }

    pub fn domain(&self) -> (f64, f64) {
        (self.start, self.end)
    }

    fn grid(&self, i: usize) -> f64 {
        if i + 1 == self.points {
            self.end
        } else {
            self.start + (self.end - self.start) * i as f64 / (self.points - 1) as f64
        }
    }

    fn point(&self, x: f64) -> CurvePoint {
        CurvePoint { investment: x, profit: self.input.profit_at(x) }
    }

    pub fn iter(&self) -> CurveIter<'_> {
        CurveIter {
            sampler: self,
            index: 0,
            pending_optimum: self
                .optimum
                .filter(|x| *x >= self.start && *x <= self.end),
        }
    }

    pub fn sample(&self) -> Vec<CurvePoint> {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a CurveSampler {
    type Item = CurvePoint;
    type IntoIter = CurveIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ordered by investment; the optimum is merged in place and never repeated.
pub struct CurveIter<'a> {
    sampler: &'a CurveSampler,
    index: usize,
    pending_optimum: Option<f64>,
}

impl Iterator for CurveIter<'_> {
    type Item = CurvePoint;

    fn next(&mut self) -> Option<CurvePoint> {
        if self.index >= self.sampler.points {
            return self.pending_optimum.take().map(|x| self.sampler.point(x));
        }
        let x = self.sampler.grid(self.index);
        if let Some(opt) = self.pending_optimum {
            if opt < x {
                self.pending_optimum = None;
                return Some(self.sampler.point(opt));
            }
            if opt == x {
                self.pending_optimum = None;
            }
        }
        self.index += 1;
        Some(self.sampler.point(x))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.sampler.points - self.index + usize::from(self.pending_optimum.is_some());
        (n.saturating_sub(1), Some(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(points: usize, include_optimum: bool) -> CurveConfig {
        CurveConfig { points, include_optimum, ..CurveConfig::default() }
    }

    #[test]
    fn domain_spans_multiple_of_the_larger_reference() {
        let input = OptimizationInput::new(50.0, 1.0, 0.11);
        let s = CurveSampler::around_optimum(input, 6.8, Some(100.0), &config(11, false))
            .expect("test: finite domain");
        assert_eq!(s.domain(), (0.0, 200.0));
        let s = CurveSampler::around_optimum(input, 6.8, None, &config(11, false))
            .expect("test: finite domain");
        assert_eq!(s.domain(), (0.0, 13.6));
    }

    #[test]
    fn evenly_spaced_and_ends_exactly_at_domain_end() {
        let input = OptimizationInput::new(10.0, 2.0, 0.5);
        let pts = CurveSampler::new(input, 0.0, 100.0, 11).sample();
        assert_eq!(pts.len(), 11);
        assert_eq!(pts[0].investment, 0.0);
        assert_eq!(pts[0].profit, 0.0);
        assert_eq!(pts[10].investment, 100.0);
        assert!((pts[3].investment - 30.0).abs() < 1e-12);
        assert!((pts[4].profit - input.profit_at(40.0)).abs() < 1e-12);
    }

    #[test]
    fn optimum_is_merged_in_order() {
        let input = OptimizationInput::new(10.0, 2.0, 0.5);
        // x* = (10*2*0.5)^2 = 100
        let s = CurveSampler::around_optimum(input, 100.0, Some(45.0), &config(8, true))
            .expect("test: finite domain");
        let pts = s.sample();
        assert!(pts.windows(2).all(|w| w[0].investment < w[1].investment));
        assert!(pts.iter().any(|p| p.investment == 100.0));
        // Grid step over [0, 200] is 200/7, so 100 is an extra point.
        assert_eq!(pts.len(), 9);
        let peak = pts
            .iter()
            .cloned()
            .fold(f64::NEG_INFINITY, |m, p| m.max(p.profit));
        assert_eq!(peak, input.profit_at(100.0));
    }

    #[test]
    fn optimum_on_grid_is_not_duplicated() {
        let input = OptimizationInput::new(10.0, 2.0, 0.5);
        let s = CurveSampler::around_optimum(input, 100.0, None, &config(5, true))
            .expect("test: finite domain");
        let pts = s.sample();
        // Grid [0, 50, 100, 150, 200] already contains 100.
        assert_eq!(pts.len(), 5);
        assert_eq!(pts.iter().filter(|p| p.investment == 100.0).count(), 1);
    }

    #[test]
    fn negative_elasticity_starts_at_epsilon() {
        let input = OptimizationInput::new(10.0, 2.0, -0.3);
        let s = CurveSampler::around_optimum(input, 10.0, None, &config(5, false))
            .expect("test: finite domain");
        let (start, end) = s.domain();
        assert!(start > 0.0);
        assert!((start - 0.001 * end).abs() < 1e-12);
        assert!(s.iter().all(|p| p.profit.is_finite()));
    }

    #[test]
    fn overflowing_domain_is_rejected() {
        let input = OptimizationInput::new(50.0, 1.0, 0.11);
        match CurveSampler::around_optimum(input, 6.79, Some(1e308), &CurveConfig::default()) {
            Err(EngineError::NumericalDegeneracy(msg)) => assert!(msg.contains("representável"), "{msg}"),
            other => panic!("expected NumericalDegeneracy, got {other:?}"),
        }
        // Largest finite history still yields a finite grid.
        let s = CurveSampler::around_optimum(input, 6.79, Some(1e307), &CurveConfig::default())
            .expect("test: finite domain");
        assert!(s.iter().all(|p| p.investment.is_finite()));
    }

    #[test]
    fn sampler_is_restartable() {
        let input = OptimizationInput::new(50.0, 1.0, 0.11);
        let s = CurveSampler::around_optimum(input, 6.79, Some(20.0), &CurveConfig::default())
            .expect("test: finite domain");
        let first: Vec<_> = s.iter().collect();
        let second: Vec<_> = (&s).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 101);
    }
}
