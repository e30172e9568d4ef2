//! Nominal-to-periodic rate conversion and the level-payment annuity.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MortgageCalcError;
use crate::types::{Money, Rate};
use crate::MortgageCalcResult;

/// Payment periods per year. Payments are monthly under every convention.
pub const PERIODS_PER_YEAR: u32 = 12;

const ROOT_TOLERANCE: Decimal = dec!(0.0000000000000000000001);
const ROOT_MAX_ITERATIONS: u32 = 60;

/// Compounding convention for the quoted nominal annual rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    #[default]
    Monthly,
    /// Compounded twice a year, as quoted on Canadian fixed-rate mortgages.
    SemiAnnual,
}

impl fmt::Display for Compounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compounding::Monthly => f.write_str("monthly"),
            Compounding::SemiAnnual => f.write_str("semi-annual"),
        }
    }
}

impl FromStr for Compounding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(Compounding::Monthly),
            "semi-annual" | "semi_annual" | "semiannual" => Ok(Compounding::SemiAnnual),
            other => Err(format!(
                "unknown compounding '{other}' (expected monthly or semi-annual)"
            )),
        }
    }
}

/// Monthly rate equivalent to a nominal annual percentage (5 = 5%).
///
/// Monthly compounding divides the nominal rate by 12. Semi-annual
/// compounding first finds the effective semi-annual rate
/// `(1 + r/2)^2 - 1` and takes its twelfth root.
pub fn periodic_rate(
    nominal_annual_pct: Decimal,
    compounding: Compounding,
) -> MortgageCalcResult<Rate> {
    let nominal = nominal_annual_pct / dec!(100);
    match compounding {
        Compounding::Monthly => Ok(nominal / Decimal::from(PERIODS_PER_YEAR)),
        Compounding::SemiAnnual => {
            let half = Decimal::ONE + nominal / dec!(2);
            let growth = half
                .checked_mul(half)
                .ok_or_else(|| rate_out_of_range(nominal_annual_pct))?;
            Ok(nth_root(growth, PERIODS_PER_YEAR)? - Decimal::ONE)
        }
    }
}

/// Effective annual rate implied by a monthly periodic rate.
pub fn effective_annual_rate(periodic: Rate) -> MortgageCalcResult<Rate> {
    (Decimal::ONE + periodic)
        .checked_powu(PERIODS_PER_YEAR as u64)
        .map(|factor| factor - Decimal::ONE)
        .ok_or_else(|| MortgageCalcError::InvalidInput {
            field: "periodic_rate".into(),
            reason: format!("Effective annual rate for {periodic} is out of range"),
        })
}

/// `(1 + rate)^-periods`, or zero once the compound factor leaves
/// Decimal range.
pub fn discount_factor(rate: Rate, periods: u32) -> Decimal {
    match (Decimal::ONE + rate).checked_powu(periods as u64) {
        Some(factor) if !factor.is_zero() => Decimal::ONE / factor,
        _ => Decimal::ZERO,
    }
}

/// Level payment that fully amortizes `principal` over `periods`.
///
/// A zero rate pays off principal in equal instalments.
pub fn level_payment(principal: Money, rate: Rate, periods: u32) -> MortgageCalcResult<Money> {
    if periods == 0 {
        return Err(MortgageCalcError::InvalidInput {
            field: "periods".into(),
            reason: "Number of periods must be > 0".into(),
        });
    }

    if rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let annuity_denominator = Decimal::ONE - discount_factor(rate, periods);
    if annuity_denominator.is_zero() {
        return Err(MortgageCalcError::DivisionByZero {
            context: "level payment annuity factor".into(),
        });
    }

    principal
        .checked_mul(rate)
        .and_then(|interest| interest.checked_div(annuity_denominator))
        .ok_or_else(|| MortgageCalcError::InvalidInput {
            field: "principal".into(),
            reason: format!("Payment on {principal} at periodic rate {rate} is out of range"),
        })
}

fn rate_out_of_range(nominal_annual_pct: Decimal) -> MortgageCalcError {
    MortgageCalcError::InvalidInput {
        field: "annual_rate_pct".into(),
        reason: format!("Rate of {nominal_annual_pct}% is out of range"),
    }
}

/// nth root by Newton's method, seeded from `exp(ln(x) / n)`.
fn nth_root(x: Decimal, n: u32) -> MortgageCalcResult<Decimal> {
    if n <= 1 || x.is_zero() || x == Decimal::ONE {
        return Ok(if n == 0 { Decimal::ONE } else { x });
    }
    if x < Decimal::ZERO {
        return Err(MortgageCalcError::InvalidInput {
            field: "growth_factor".into(),
            reason: format!("Cannot take root of negative value {x}"),
        });
    }

    let n_dec = Decimal::from(n);
    let mut guess = x
        .checked_ln()
        .and_then(|ln| (ln / n_dec).checked_exp())
        .filter(|g| *g > Decimal::ZERO)
        .unwrap_or(Decimal::ONE);
    let mut delta = Decimal::ZERO;

    for _ in 0..ROOT_MAX_ITERATIONS {
        let step = guess.checked_powu((n - 1) as u64).and_then(|g_n_minus_1| {
            let f = g_n_minus_1.checked_mul(guess)? - x;
            let f_prime = n_dec.checked_mul(g_n_minus_1)?;
            if f_prime.is_zero() {
                return None;
            }
            f.checked_div(f_prime)
        });
        delta = match step {
            Some(d) => d,
            None => break,
        };
        guess -= delta;

        if delta.abs() < ROOT_TOLERANCE {
            return Ok(guess);
        }
    }

    Err(MortgageCalcError::ConvergenceFailure {
        function: format!("{n}th root of {x}"),
        iterations: ROOT_MAX_ITERATIONS,
        last_delta: delta,
    })
}
