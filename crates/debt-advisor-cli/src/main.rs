mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::advisor::{AnalyzeArgs, BoostArgs, BorrowerArgs, RiskArgs};
use commands::loans::{CardPayoffArgs, InstallmentArgs, ScheduleArgs};

/// Loan amortization and debt health analysis
#[derive(Parser)]
#[command(
    name = "dadv",
    version,
    about = "Loan amortization and debt health analysis",
    long_about = "A CLI for amortizing loans and assessing debt health with decimal \
                  precision. Supports installment loans, card payoff simulation, \
                  risk scoring, payment boost suggestions, and full borrower analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "debt_advisor_core=trace")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Level-payment installment loan (payment, totals, schedule)
    InstallmentLoan(InstallmentArgs),
    /// Pay down a card balance at a fixed monthly payment
    CardPayoff(CardPayoffArgs),
    /// Month-by-month amortization schedule for a term or a fixed payment
    Schedule(ScheduleArgs),
    /// Classify debt risk from DTI and interest rate
    Risk(RiskArgs),
    /// Suggest an affordable extra monthly payment
    Boost(BoostArgs),
    /// Full debt health analysis (risk, advice, boost, optional prediction)
    Analyze(AnalyzeArgs),
    /// Print the model feature vector for a borrower
    Features(BorrowerArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::InstallmentLoan(args) => commands::loans::run_installment_loan(args),
        Commands::CardPayoff(args) => commands::loans::run_card_payoff(args),
        Commands::Schedule(args) => commands::loans::run_schedule(args),
        Commands::Risk(args) => commands::advisor::run_risk(args),
        Commands::Boost(args) => commands::advisor::run_boost(args),
        Commands::Analyze(args) => commands::advisor::run_analyze(args),
        Commands::Features(args) => commands::advisor::run_features(args),
        Commands::Version => {
            println!("dadv {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
