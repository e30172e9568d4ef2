//! Level-payment amortization schedule.
//!
//! Derives the monthly rate from the quoted nominal rate, solves for the
//! level payment and walks the balance down month by month, producing one
//! dated row per payment plus aggregate totals.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::rates::{self, Compounding, PERIODS_PER_YEAR};
use crate::error::MortgageCalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageCalcResult;

/// Longest amortization accepted, in years.
pub const MAX_AMORTIZATION_YEARS: u32 = 100;

const LONG_AMORTIZATION_YEARS: u32 = 40;
const HIGH_RATE_PCT: Decimal = dec!(25);

// ---------------------------------------------------------------------------
// Input / output types
// ---------------------------------------------------------------------------

/// Amortization input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationInput {
    /// Loan principal.
    pub principal: Money,
    /// Nominal annual rate as a percentage (5 = 5%).
    pub annual_rate_pct: Decimal,
    #[serde(default)]
    pub compounding: Compounding,
    pub amortization_years: u32,
    /// Date of the first payment.
    pub start_date: NaiveDate,
}

/// One payment in the schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    pub period: u32,
    pub date: NaiveDate,
    pub payment: Money,
    pub principal: Money,
    pub interest: Money,
    pub balance: Money,
}

/// Aggregates over the whole schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationTotals {
    pub total_principal: Money,
    pub total_interest: Money,
    /// Level payment times number of payments.
    pub total_cost: Money,
}

/// Amortization result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    pub periodic_rate: Rate,
    pub effective_annual_rate: Rate,
    pub number_of_payments: u32,
    pub periodic_payment: Money,
    pub totals: AmortizationTotals,
    pub schedule: Vec<PaymentRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the level payment, full schedule and totals for a loan.
pub fn compute_amortization(
    input: &AmortizationInput,
) -> MortgageCalcResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate(input)?;

    if input.principal.is_zero() {
        warnings.push("Principal is zero; every payment is zero".into());
    }
    if input.annual_rate_pct > HIGH_RATE_PCT {
        warnings.push(format!(
            "Annual rate of {}% is unusually high",
            input.annual_rate_pct
        ));
    }
    if input.amortization_years > LONG_AMORTIZATION_YEARS {
        warnings.push(format!(
            "Amortization of {} years exceeds {} years",
            input.amortization_years, LONG_AMORTIZATION_YEARS
        ));
    }

    let periodic_rate = rates::periodic_rate(input.annual_rate_pct, input.compounding)?;
    let periods = input.amortization_years * PERIODS_PER_YEAR;
    let payment = rates::level_payment(input.principal, periodic_rate, periods)?;

    log::debug!(
        "amortization: periodic_rate={periodic_rate} periods={periods} payment={payment}"
    );

    let schedule = build_schedule(
        input.principal,
        periodic_rate,
        payment,
        periods,
        input.start_date,
    )?;

    let totals = AmortizationTotals {
        total_principal: checked_total(schedule.iter().map(|r| r.principal), "total principal")?,
        total_interest: checked_total(schedule.iter().map(|r| r.interest), "total interest")?,
        total_cost: payment
            .checked_mul(Decimal::from(periods))
            .ok_or_else(|| out_of_range("total cost"))?,
    };

    let output = AmortizationOutput {
        periodic_rate,
        effective_annual_rate: rates::effective_annual_rate(periodic_rate)?,
        number_of_payments: periods,
        periodic_payment: payment,
        totals,
        schedule,
    };

    let methodology = match input.compounding {
        Compounding::Monthly => "Level-Payment Amortization (monthly compounding)",
        Compounding::SemiAnnual => "Level-Payment Amortization (semi-annual compounding)",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(methodology, input, warnings, elapsed, output))
}

/// Walk the balance down over `periods` monthly payments.
///
/// Each payment covers the month's interest first. The principal portion is
/// capped at the outstanding balance so the final payment never overpays.
pub fn build_schedule(
    principal: Money,
    periodic_rate: Rate,
    payment: Money,
    periods: u32,
    start_date: NaiveDate,
) -> MortgageCalcResult<Vec<PaymentRow>> {
    let mut rows = Vec::with_capacity(periods as usize);
    let mut balance = principal;

    for period in 1..=periods {
        let interest = balance
            .checked_mul(periodic_rate)
            .ok_or_else(|| out_of_range("interest"))?;
        let principal_portion = balance.min(payment - interest);
        let paid = principal_portion
            .checked_add(interest)
            .ok_or_else(|| out_of_range("payment"))?;

        balance -= principal_portion;
        if balance < Decimal::ZERO {
            balance = Decimal::ZERO;
        }

        rows.push(PaymentRow {
            period,
            date: payment_date(start_date, period)?,
            payment: paid,
            principal: principal_portion,
            interest,
            balance,
        });
    }

    Ok(rows)
}

/// Date of payment `period` (1-based): the start date advanced by
/// `period - 1` calendar months, clamped to the end of shorter months.
pub fn payment_date(start_date: NaiveDate, period: u32) -> MortgageCalcResult<NaiveDate> {
    let offset = period.saturating_sub(1);
    start_date
        .checked_add_months(Months::new(offset))
        .ok_or_else(|| {
            MortgageCalcError::DateError(format!(
                "{start_date} plus {offset} months is out of range"
            ))
        })
}

fn checked_total(mut values: impl Iterator<Item = Money>, what: &str) -> MortgageCalcResult<Money> {
    values.try_fold(Decimal::ZERO, |acc, v| {
        acc.checked_add(v).ok_or_else(|| out_of_range(what))
    })
}

fn out_of_range(what: &str) -> MortgageCalcError {
    MortgageCalcError::InvalidInput {
        field: "principal".into(),
        reason: format!("Principal is too large: {what} is out of range"),
    }
}

fn validate(input: &AmortizationInput) -> MortgageCalcResult<()> {
    if input.principal < Decimal::ZERO {
        return Err(MortgageCalcError::InvalidInput {
            field: "principal".into(),
            reason: "Principal cannot be negative".into(),
        });
    }
    if input.annual_rate_pct < Decimal::ZERO {
        return Err(MortgageCalcError::InvalidInput {
            field: "annual_rate_pct".into(),
            reason: "Interest rate cannot be negative".into(),
        });
    }
    if input.amortization_years == 0 {
        return Err(MortgageCalcError::InvalidInput {
            field: "amortization_years".into(),
            reason: "Amortization must be at least 1 year".into(),
        });
    }
    if input.amortization_years > MAX_AMORTIZATION_YEARS {
        return Err(MortgageCalcError::InvalidInput {
            field: "amortization_years".into(),
            reason: format!("Amortization cannot exceed {MAX_AMORTIZATION_YEARS} years"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TOL: Decimal = dec!(0.01);

    fn assert_close(actual: Decimal, expected: Decimal, tol: Decimal, msg: &str) {
        let diff = (actual - expected).abs();
        assert!(
            diff <= tol,
            "{}: expected ~{}, got {} (diff = {})",
            msg,
            expected,
            actual,
            diff
        );
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn standard_input() -> AmortizationInput {
        AmortizationInput {
            principal: dec!(300_000),
            annual_rate_pct: dec!(5),
            compounding: Compounding::Monthly,
            amortization_years: 25,
            start_date: date(2025, 1, 1),
        }
    }

    #[test]
    fn test_first_row_split() {
        let out = compute_amortization(&standard_input()).unwrap().result;
        let first = &out.schedule[0];
        assert_eq!(first.period, 1);
        assert_eq!(first.date, date(2025, 1, 1));
        assert_close(first.interest, dec!(1250), TOL, "first interest");
        assert_close(first.principal, dec!(503.77), TOL, "first principal");
        assert_close(first.balance, dec!(299_496.23), TOL, "first balance");
    }

    #[test]
    fn test_schedule_length_and_order() {
        let out = compute_amortization(&standard_input()).unwrap().result;
        assert_eq!(out.number_of_payments, 300);
        assert_eq!(out.schedule.len(), 300);
        for (i, row) in out.schedule.iter().enumerate() {
            assert_eq!(row.period, i as u32 + 1);
        }
    }

    #[test]
    fn test_balance_never_negative_and_decreasing() {
        let out = compute_amortization(&standard_input()).unwrap().result;
        let mut prev = dec!(300_000);
        for row in &out.schedule {
            assert!(row.balance >= Decimal::ZERO);
            assert!(row.balance <= prev);
            prev = row.balance;
        }
    }

    #[test]
    fn test_zero_principal_warns() {
        let mut input = standard_input();
        input.principal = Decimal::ZERO;
        let out = compute_amortization(&input).unwrap();
        assert_eq!(out.result.periodic_payment, Decimal::ZERO);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_long_amortization_warns() {
        let mut input = standard_input();
        input.amortization_years = 50;
        let out = compute_amortization(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("50 years")));
    }

    #[test]
    fn test_validation_negative_principal() {
        let mut input = standard_input();
        input.principal = dec!(-1);
        match compute_amortization(&input).unwrap_err() {
            MortgageCalcError::InvalidInput { field, .. } => assert_eq!(field, "principal"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_negative_rate() {
        let mut input = standard_input();
        input.annual_rate_pct = dec!(-0.5);
        assert!(compute_amortization(&input).is_err());
    }

    #[test]
    fn test_validation_zero_term() {
        let mut input = standard_input();
        input.amortization_years = 0;
        assert!(compute_amortization(&input).is_err());
    }

    #[test]
    fn test_validation_term_too_long() {
        let mut input = standard_input();
        input.amortization_years = MAX_AMORTIZATION_YEARS + 1;
        assert!(compute_amortization(&input).is_err());
    }

    #[test]
    fn test_payment_date_clamps_month_end() {
        let start = date(2024, 1, 31);
        assert_eq!(payment_date(start, 1).unwrap(), date(2024, 1, 31));
        assert_eq!(payment_date(start, 2).unwrap(), date(2024, 2, 29));
        assert_eq!(payment_date(start, 3).unwrap(), date(2024, 3, 31));
        assert_eq!(payment_date(date(2025, 1, 31), 2).unwrap(), date(2025, 2, 28));
    }

    #[test]
    fn test_payment_column_is_level() {
        let out = compute_amortization(&standard_input()).unwrap().result;
        for row in &out.schedule[..299] {
            assert_close(row.payment, out.periodic_payment, dec!(0.000001), "level payment");
        }
    }

    #[test]
    fn test_interest_totals_overflow_is_error() {
        let mut input = standard_input();
        input.principal = dec!(1_000_000_000_000_000_000_000_000_000);
        input.annual_rate_pct = dec!(1200);
        match compute_amortization(&input).unwrap_err() {
            MortgageCalcError::InvalidInput { field, reason } => {
                assert_eq!(field, "principal");
                assert!(reason.contains("total interest"), "{reason}");
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_schedule_interest_overflow_is_error() {
        let huge = Decimal::MAX / dec!(2);
        let err = build_schedule(huge, dec!(3), huge, 12, date(2025, 1, 1)).unwrap_err();
        assert!(matches!(err, MortgageCalcError::InvalidInput { .. }));
    }

    #[test]
    fn test_huge_semi_annual_rate_is_error() {
        let mut input = standard_input();
        input.principal = dec!(100_000);
        input.annual_rate_pct = dec!(1_000_000_000_000_000_000_000_000_000);
        input.compounding = Compounding::SemiAnnual;
        assert!(compute_amortization(&input).is_err());
    }

    #[test]
    fn test_metadata_populated() {
        let out = compute_amortization(&standard_input()).unwrap();
        assert!(out.methodology.contains("monthly"));
        assert_eq!(out.metadata.precision, "rust_decimal_128bit");
    }
}
