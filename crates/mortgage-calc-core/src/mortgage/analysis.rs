use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::rates::Compounding;
use crate::amortization::schedule::{self, AmortizationInput, AmortizationOutput};
use crate::down_payment::calculator::{
    self, DownPaymentInput, DownPaymentOutput, DownPaymentTier, TieredInsurancePolicy,
};
use crate::error::MortgageCalcError;
use crate::types::*;
use crate::MortgageCalcResult;

/// Everything the calculator form collects for one recalculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInputs {
    pub purchase_price: Option<Money>,
    #[serde(default)]
    pub down_payment_tier: DownPaymentTier,
    #[serde(default)]
    pub tiered_insurance_policy: TieredInsurancePolicy,
    /// Nominal annual rate as a percentage (5 = 5%).
    pub annual_rate_pct: Decimal,
    #[serde(default)]
    pub compounding: Compounding,
    pub amortization_years: u32,
    pub start_date: NaiveDate,
    /// Amount borrowed when it differs from price less down payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Money>,
    /// Add the insurance premium to the amount borrowed.
    #[serde(default)]
    pub finance_insurance: bool,
}

/// Down payment, amount financed and the resulting amortization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub down_payment: DownPaymentOutput,
    pub principal: Money,
    pub amortization: AmortizationOutput,
}

/// Run the down-payment calculator and feed its result into the
/// amortization engine.
pub fn analyze_mortgage(input: &LoanInputs) -> MortgageCalcResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let price = match input.purchase_price {
        Some(p) if p > Decimal::ZERO => p,
        _ => {
            return Err(MortgageCalcError::InvalidInput {
                field: "purchase_price".into(),
                reason: "Purchase price must be a positive number".into(),
            })
        }
    };
    if input.amortization_years == 0 {
        return Err(MortgageCalcError::InvalidInput {
            field: "amortization_years".into(),
            reason: "Amortization must be at least 1 year".into(),
        });
    }

    let dp = calculator::compute_down_payment(&DownPaymentInput {
        purchase_price: Some(price),
        tier: input.down_payment_tier,
        tiered_insurance_policy: input.tiered_insurance_policy,
    })?;
    warnings.extend(dp.warnings);
    let down_payment = dp.result;

    let mut principal = input.principal.unwrap_or(down_payment.mortgage_amount);
    if input.finance_insurance {
        principal = principal
            .checked_add(down_payment.insurance_premium.amount())
            .ok_or_else(|| MortgageCalcError::InvalidInput {
                field: "principal".into(),
                reason: "Principal plus financed premium is out of range".into(),
            })?;
    }
    if let Some(requested) = input.principal.filter(|p| *p > price) {
        warnings.push(format!(
            "Principal {requested} exceeds purchase price {price}"
        ));
    }

    let amortization = schedule::compute_amortization(&AmortizationInput {
        principal,
        annual_rate_pct: input.annual_rate_pct,
        compounding: input.compounding,
        amortization_years: input.amortization_years,
        start_date: input.start_date,
    })?;
    warnings.extend(amortization.warnings);

    let output = MortgageOutput {
        down_payment,
        principal,
        amortization: amortization.result,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage Analysis (down payment, insurance, amortization)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
