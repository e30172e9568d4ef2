use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::amortization::rates::Compounding;
use mortgage_calc_core::down_payment::calculator::{DownPaymentTier, TieredInsurancePolicy};
use mortgage_calc_core::mortgage::analysis::{self, LoanInputs};

use crate::input;

/// Arguments for the combined mortgage analysis
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct MortgageArgs {
    /// Purchase price of the property
    #[arg(long, alias = "price")]
    pub purchase_price: Option<Decimal>,

    /// Down payment tier: tiered, 10, 15, 20, 25 or 35
    #[arg(long, default_value = "tiered")]
    pub tier: DownPaymentTier,

    /// Premium rule for the tiered minimum: conditional or unconditional
    #[arg(long, default_value = "conditional")]
    pub tiered_insurance_policy: TieredInsurancePolicy,

    /// Nominal annual interest rate in percent (e.g. 5 for 5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Amortization period in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Compounding convention: monthly or semi-annual
    #[arg(long, default_value = "monthly")]
    pub compounding: Compounding,

    /// First payment date (YYYY-MM-DD, defaults to today)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Amount borrowed, when it differs from price less down payment
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Add the insurance premium to the amount borrowed
    #[arg(long)]
    pub finance_insurance: bool,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loan: LoanInputs = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        LoanInputs {
            purchase_price: Some(
                args.purchase_price
                    .ok_or("--purchase-price is required (or provide --input)")?,
            ),
            down_payment_tier: args.tier,
            tiered_insurance_policy: args.tiered_insurance_policy,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            compounding: args.compounding,
            amortization_years: args.years.ok_or("--years is required (or provide --input)")?,
            start_date: args.start_date.unwrap_or_else(super::today),
            principal: args.principal,
            finance_insurance: args.finance_insurance,
        }
    };
    let result = analysis::analyze_mortgage(&loan)?;
    Ok(serde_json::to_value(result)?)
}
