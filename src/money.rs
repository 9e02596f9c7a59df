// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Wright Budget Engine - Currency Amounts

//! Brazilian Real amounts for user-facing text.
//!
//! The engine computes in `f64`; anything shown to the user as money is
//! converted once to `rust_decimal::Decimal` and rounded to cents so the
//! printed figures add up exactly.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Convert f64 to Decimal (lossy; `None` for NaN, infinities and values
/// beyond Decimal's range).
pub fn to_decimal(v: f64) -> Option<Decimal> {
    Decimal::from_f64(v)
}

/// An amount in reais, always held at cent precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reais(Decimal);

impl Reais {
    /// Round half away from zero to cents.
    pub fn from_decimal(d: Decimal) -> Self {
        Self(d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn from_f64(v: f64) -> Option<Self> {
        to_decimal(v).map(Self::from_decimal)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl std::ops::Sub for Reais {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

/// `R$ 1.234.567,89` (pt-BR grouping).
impl fmt::Display for Reais {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = format!("{:.2}", self.0.abs());
        let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let digits: Vec<char> = int_part.chars().collect();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.iter().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(*c);
        }

        let sign = if self.0.is_sign_negative() && !self.0.is_zero() { "-" } else { "" };
        write!(f, "{}R$ {},{}", sign, grouped, frac_part)
    }
}

/// Money text for any f64; falls back to scientific notation when the value
/// does not fit a Decimal.
pub fn format_reais(v: f64) -> String {
    match Reais::from_f64(v) {
        Some(r) => r.to_string(),
        None => format!("R$ {:.3e}", v),
    }
}

/// Plain number with a decimal comma, e.g. `2,50`.
pub fn format_decimal_comma(v: f64, places: usize) -> String {
    format!("{:.*}", places, v).replace('.', ",")
}
