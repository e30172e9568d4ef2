use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::down_payment::calculator::{
    self, DownPaymentInput, DownPaymentTier, TieredInsurancePolicy,
};

use crate::input;

/// Arguments for the down payment calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct DownPaymentArgs {
    /// Purchase price of the property
    #[arg(long, alias = "price")]
    pub purchase_price: Option<Decimal>,

    /// Down payment tier: tiered, 10, 15, 20, 25 or 35
    #[arg(long, default_value = "tiered")]
    pub tier: DownPaymentTier,

    /// Premium rule for the tiered minimum: conditional or unconditional
    #[arg(long, default_value = "conditional")]
    pub tiered_insurance_policy: TieredInsurancePolicy,

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_down_payment(args: DownPaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dp_input: DownPaymentInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        // A missing price is reported as an incomplete result, not an error
        DownPaymentInput {
            purchase_price: args.purchase_price,
            tier: args.tier,
            tiered_insurance_policy: args.tiered_insurance_policy,
        }
    };
    let result = calculator::compute_down_payment(&dp_input)?;
    Ok(serde_json::to_value(result)?)
}
