mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::process;

use commands::amortization::AmortizationArgs;
use commands::down_payment::DownPaymentArgs;
use commands::mortgage::MortgageArgs;

/// Mortgage down payment, insurance and amortization calculations
#[derive(Parser)]
#[command(
    name = "mortgage",
    version,
    about = "Mortgage down payment, insurance and amortization calculations",
    long_about = "A CLI for computing minimum down payments, mortgage default insurance \
                  premiums and level-payment amortization schedules with decimal precision. \
                  Supports monthly and Canadian semi-annual compounding."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Down payment and mortgage insurance premium for a purchase price
    DownPayment(DownPaymentArgs),
    /// Level payment and amortization schedule for a loan
    Amortization(AmortizationArgs),
    /// Down payment, amount financed and amortization in one pass
    Mortgage(MortgageArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    /// Schedule rows, then a blank line and the remaining figures
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::DownPayment(args) => commands::down_payment::run_down_payment(args),
        Commands::Amortization(args) => commands::amortization::run_amortization(args),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args),
        Commands::Version => {
            println!("mortgage {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
