use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use mortgage_calc_core::amortization::rates::Compounding;
use mortgage_calc_core::amortization::schedule::{self, AmortizationInput};

use crate::input;

/// Arguments for the amortization schedule
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AmortizationArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

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

    /// Path to JSON or YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_amortization(args: AmortizationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let am_input: AmortizationInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(piped) = input::stdin::read_stdin()? {
        piped
    } else {
        AmortizationInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_pct: args.rate.ok_or("--rate is required (or provide --input)")?,
            compounding: args.compounding,
            amortization_years: args.years.ok_or("--years is required (or provide --input)")?,
            start_date: args.start_date.unwrap_or_else(super::today),
        }
    };
    let result = schedule::compute_amortization(&am_input)?;
    Ok(serde_json::to_value(result)?)
}
