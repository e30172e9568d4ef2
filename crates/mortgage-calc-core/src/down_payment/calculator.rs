//! Minimum down payment and mortgage default insurance premium.
//!
//! Supports the tiered minimum (5% of the first 500,000 and 10% of the
//! remainder) and fixed-percentage down payments. The insurance premium is
//! charged on the mortgage amount (price less down payment) at a rate chosen
//! by tier; once the down payment reaches 20% of the price no insurance is
//! required. All math in `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::MortgageCalcResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Price threshold splitting the 5% and 10% portions of the tiered minimum.
pub const TIERED_THRESHOLD: Money = dec!(500_000);

const TIERED_LOWER_RATE: Rate = dec!(0.05);
const TIERED_UPPER_RATE: Rate = dec!(0.10);

/// Down-payment ratio at or above which insurance is never required.
pub const INSURANCE_EXEMPT_RATIO: Rate = dec!(0.20);

const TIERED_PREMIUM_RATE: Rate = dec!(0.04);
const TEN_PCT_PREMIUM_RATE: Rate = dec!(0.031);
const FIFTEEN_PCT_PREMIUM_RATE: Rate = dec!(0.028);

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Down-payment selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DownPaymentTier {
    /// 5% of the first 500,000 plus 10% of any amount above it.
    #[default]
    #[serde(rename = "tiered")]
    Tiered,
    #[serde(rename = "10")]
    Pct10,
    #[serde(rename = "15")]
    Pct15,
    #[serde(rename = "20")]
    Pct20,
    #[serde(rename = "25")]
    Pct25,
    #[serde(rename = "35")]
    Pct35,
}

impl DownPaymentTier {
    /// Fixed fraction of the price, or `None` for the tiered rule.
    pub fn fixed_fraction(self) -> Option<Rate> {
        match self {
            DownPaymentTier::Tiered => None,
            DownPaymentTier::Pct10 => Some(dec!(0.10)),
            DownPaymentTier::Pct15 => Some(dec!(0.15)),
            DownPaymentTier::Pct20 => Some(dec!(0.20)),
            DownPaymentTier::Pct25 => Some(dec!(0.25)),
            DownPaymentTier::Pct35 => Some(dec!(0.35)),
        }
    }
}

impl fmt::Display for DownPaymentTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DownPaymentTier::Tiered => "tiered",
            DownPaymentTier::Pct10 => "10",
            DownPaymentTier::Pct15 => "15",
            DownPaymentTier::Pct20 => "20",
            DownPaymentTier::Pct25 => "25",
            DownPaymentTier::Pct35 => "35",
        };
        f.write_str(s)
    }
}

impl FromStr for DownPaymentTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches('%').to_ascii_lowercase().as_str() {
            "tiered" => Ok(DownPaymentTier::Tiered),
            "10" => Ok(DownPaymentTier::Pct10),
            "15" => Ok(DownPaymentTier::Pct15),
            "20" => Ok(DownPaymentTier::Pct20),
            "25" => Ok(DownPaymentTier::Pct25),
            "35" => Ok(DownPaymentTier::Pct35),
            other => Err(format!(
                "unknown down payment tier '{other}' (expected tiered, 10, 15, 20, 25 or 35)"
            )),
        }
    }
}

/// How the 4% premium applies to the tiered minimum down payment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieredInsurancePolicy {
    /// Charge the premium only while the down payment is below 20% of price.
    #[default]
    Conditional,
    /// Always charge the premium on the tiered minimum.
    Unconditional,
}

impl FromStr for TieredInsurancePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "conditional" => Ok(TieredInsurancePolicy::Conditional),
            "unconditional" => Ok(TieredInsurancePolicy::Unconditional),
            other => Err(format!(
                "unknown tiered insurance policy '{other}' (expected conditional or unconditional)"
            )),
        }
    }
}

/// Down payment and insurance input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownPaymentInput {
    /// Purchase price. `None` when the caller could not read a number.
    #[serde(default)]
    pub purchase_price: Option<Money>,
    #[serde(default)]
    pub tier: DownPaymentTier,
    #[serde(default)]
    pub tiered_insurance_policy: TieredInsurancePolicy,
}

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Whether the purchase price was usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DownPaymentStatus {
    Complete,
    /// Price missing or negative; amounts are zero and must not be displayed
    /// as a real result.
    Incomplete,
}

/// Mortgage default insurance premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsurancePremium {
    /// Premium owed on the mortgage amount.
    Required(Money),
    /// The tier carries no insurance.
    NotApplicable,
}

impl InsurancePremium {
    /// Cost added by the premium; zero when not applicable.
    pub fn amount(&self) -> Money {
        match self {
            InsurancePremium::Required(amount) => *amount,
            InsurancePremium::NotApplicable => Decimal::ZERO,
        }
    }

    pub fn is_applicable(&self) -> bool {
        matches!(self, InsurancePremium::Required(_))
    }
}

/// Down payment and insurance result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownPaymentOutput {
    pub status: DownPaymentStatus,
    pub down_payment: Money,
    /// Down payment as a fraction of the purchase price.
    pub down_payment_ratio: Rate,
    /// Purchase price less down payment.
    pub mortgage_amount: Money,
    pub insurance_rate: Rate,
    pub insurance_premium: InsurancePremium,
}

impl DownPaymentOutput {
    fn incomplete() -> Self {
        DownPaymentOutput {
            status: DownPaymentStatus::Incomplete,
            down_payment: Decimal::ZERO,
            down_payment_ratio: Decimal::ZERO,
            mortgage_amount: Decimal::ZERO,
            insurance_rate: Decimal::ZERO,
            insurance_premium: InsurancePremium::NotApplicable,
        }
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the down payment and insurance premium for a purchase price.
///
/// A missing or negative price is not an error: the result is returned with
/// `DownPaymentStatus::Incomplete` and zeroed amounts so the caller can show
/// an incomplete-input state.
pub fn compute_down_payment(
    input: &DownPaymentInput,
) -> MortgageCalcResult<ComputationOutput<DownPaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = match input.purchase_price {
        Some(price) if price >= Decimal::ZERO => {
            price_down_payment(price, input.tier, input.tiered_insurance_policy)
        }
        Some(price) => {
            warnings.push(format!(
                "Purchase price {price} is negative; down payment not computed"
            ));
            DownPaymentOutput::incomplete()
        }
        None => {
            warnings.push("Purchase price missing; down payment not computed".into());
            DownPaymentOutput::incomplete()
        }
    };

    log::debug!(
        "down payment: tier={} down_payment={} premium={:?}",
        input.tier,
        output.down_payment,
        output.insurance_premium
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Down Payment & Mortgage Insurance",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Down payment required under the given tier.
pub fn down_payment_amount(price: Money, tier: DownPaymentTier) -> Money {
    match tier.fixed_fraction() {
        Some(fraction) => price * fraction,
        None => {
            let first = price.min(TIERED_THRESHOLD);
            let remainder = (price - TIERED_THRESHOLD).max(Decimal::ZERO);
            first * TIERED_LOWER_RATE + remainder * TIERED_UPPER_RATE
        }
    }
}

/// Premium rate charged on the mortgage amount.
pub fn insurance_rate(
    price: Money,
    down_payment: Money,
    tier: DownPaymentTier,
    policy: TieredInsurancePolicy,
) -> Rate {
    match tier {
        DownPaymentTier::Tiered => match policy {
            TieredInsurancePolicy::Unconditional => TIERED_PREMIUM_RATE,
            TieredInsurancePolicy::Conditional => {
                if down_payment < price * INSURANCE_EXEMPT_RATIO {
                    TIERED_PREMIUM_RATE
                } else {
                    Decimal::ZERO
                }
            }
        },
        DownPaymentTier::Pct10 => TEN_PCT_PREMIUM_RATE,
        DownPaymentTier::Pct15 => FIFTEEN_PCT_PREMIUM_RATE,
        DownPaymentTier::Pct20 | DownPaymentTier::Pct25 | DownPaymentTier::Pct35 => Decimal::ZERO,
    }
}

fn price_down_payment(
    price: Money,
    tier: DownPaymentTier,
    policy: TieredInsurancePolicy,
) -> DownPaymentOutput {
    let down_payment = down_payment_amount(price, tier);
    let mortgage_amount = price - down_payment;
    let rate = insurance_rate(price, down_payment, tier, policy);

    let insurance_premium = if rate > Decimal::ZERO {
        InsurancePremium::Required(mortgage_amount * rate)
    } else {
        InsurancePremium::NotApplicable
    };

    let down_payment_ratio = if price > Decimal::ZERO {
        down_payment / price
    } else {
        Decimal::ZERO
    };

    DownPaymentOutput {
        status: DownPaymentStatus::Complete,
        down_payment,
        down_payment_ratio,
        mortgage_amount,
        insurance_rate: rate,
        insurance_premium,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn run(price: Option<Money>, tier: DownPaymentTier) -> DownPaymentOutput {
        let input = DownPaymentInput {
            purchase_price: price,
            tier,
            tiered_insurance_policy: TieredInsurancePolicy::Conditional,
        };
        compute_down_payment(&input).unwrap().result
    }

    #[test]
    fn test_tiered_below_threshold_is_flat_five_percent() {
        let out = run(Some(dec!(400_000)), DownPaymentTier::Tiered);
        assert_eq!(out.down_payment, dec!(20_000));
        assert_eq!(out.mortgage_amount, dec!(380_000));
        assert_eq!(out.insurance_rate, dec!(0.04));
        assert_eq!(out.insurance_premium, InsurancePremium::Required(dec!(15_200)));
    }

    #[test]
    fn test_tiered_at_threshold() {
        let out = run(Some(dec!(500_000)), DownPaymentTier::Tiered);
        assert_eq!(out.down_payment, dec!(25_000));
    }

    #[test]
    fn test_tiered_above_threshold() {
        let out = run(Some(dec!(600_000)), DownPaymentTier::Tiered);
        assert_eq!(out.down_payment, dec!(35_000));
        assert_eq!(out.insurance_premium, InsurancePremium::Required(dec!(22_600)));
    }

    #[test]
    fn test_ten_percent_tier_premium() {
        let out = run(Some(dec!(400_000)), DownPaymentTier::Pct10);
        assert_eq!(out.down_payment, dec!(40_000));
        assert_eq!(out.insurance_rate, dec!(0.031));
        assert_eq!(out.insurance_premium, InsurancePremium::Required(dec!(11_160)));
    }

    #[test]
    fn test_fifteen_percent_tier_premium() {
        let out = run(Some(dec!(400_000)), DownPaymentTier::Pct15);
        assert_eq!(out.down_payment, dec!(60_000));
        assert_eq!(out.insurance_premium, InsurancePremium::Required(dec!(9_520)));
    }

    #[test]
    fn test_twenty_percent_and_above_not_applicable() {
        for tier in [
            DownPaymentTier::Pct20,
            DownPaymentTier::Pct25,
            DownPaymentTier::Pct35,
        ] {
            let out = run(Some(dec!(750_000)), tier);
            assert_eq!(out.insurance_rate, Decimal::ZERO);
            assert_eq!(out.insurance_premium, InsurancePremium::NotApplicable);
            assert_eq!(out.insurance_premium.amount(), Decimal::ZERO);
        }
    }

    #[test]
    fn test_missing_price_is_incomplete() {
        let out = run(None, DownPaymentTier::Tiered);
        assert_eq!(out.status, DownPaymentStatus::Incomplete);
        assert_eq!(out.down_payment, Decimal::ZERO);
        assert_eq!(out.insurance_premium, InsurancePremium::NotApplicable);
    }

    #[test]
    fn test_negative_price_is_incomplete_with_warning() {
        let input = DownPaymentInput {
            purchase_price: Some(dec!(-1)),
            tier: DownPaymentTier::Pct10,
            tiered_insurance_policy: TieredInsurancePolicy::default(),
        };
        let out = compute_down_payment(&input).unwrap();
        assert_eq!(out.result.status, DownPaymentStatus::Incomplete);
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_zero_price_tiered_not_applicable() {
        // 0 < 0 is false, so the strict comparison exempts a zero price
        let out = run(Some(Decimal::ZERO), DownPaymentTier::Tiered);
        assert_eq!(out.status, DownPaymentStatus::Complete);
        assert_eq!(out.insurance_premium, InsurancePremium::NotApplicable);
        assert_eq!(out.down_payment_ratio, Decimal::ZERO);
    }

    #[test]
    fn test_tiered_boundary_is_strict() {
        // Exactly 20% down is exempt; anything below is not.
        let rate = insurance_rate(
            dec!(100),
            dec!(20),
            DownPaymentTier::Tiered,
            TieredInsurancePolicy::Conditional,
        );
        assert_eq!(rate, Decimal::ZERO);
        let rate = insurance_rate(
            dec!(100),
            dec!(19.99),
            DownPaymentTier::Tiered,
            TieredInsurancePolicy::Conditional,
        );
        assert_eq!(rate, dec!(0.04));
    }

    #[test]
    fn test_unconditional_policy_always_charges() {
        let rate = insurance_rate(
            dec!(100),
            dec!(50),
            DownPaymentTier::Tiered,
            TieredInsurancePolicy::Unconditional,
        );
        assert_eq!(rate, dec!(0.04));
    }

    #[test]
    fn test_tier_parsing() {
        assert_eq!("tiered".parse::<DownPaymentTier>(), Ok(DownPaymentTier::Tiered));
        assert_eq!("15%".parse::<DownPaymentTier>(), Ok(DownPaymentTier::Pct15));
        assert_eq!("35".parse::<DownPaymentTier>(), Ok(DownPaymentTier::Pct35));
        assert!("5".parse::<DownPaymentTier>().is_err());
    }

    #[test]
    fn test_tier_serde_names() {
        let json = serde_json::to_string(&DownPaymentTier::Pct25).unwrap();
        assert_eq!(json, "\"25\"");
        let tier: DownPaymentTier = serde_json::from_str("\"tiered\"").unwrap();
        assert_eq!(tier, DownPaymentTier::Tiered);
    }
}
