mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::irr::IrrArgs;
use commands::model::ModelArgs;
use commands::sensitivity::SensitivityArgs;

/// Battery storage project finance simulations
#[derive(Parser)]
#[command(
    name = "bess",
    version,
    about = "Battery storage project finance simulations",
    long_about = "Simulates the annual cash-flow waterfall of a grid-scale battery \
                  storage project (floor, tolling and merchant revenues, debt, \
                  Italian IRES/IRAP taxes, decommissioning reserve) with decimal \
                  precision and reports equity/project IRR, NPV and DSCR."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Full model run: year table, debt schedule and KPIs
    Run(ModelArgs),
    /// Year-by-year cash-flow table only
    Simulate(ModelArgs),
    /// Equity/project IRR, NPV and minimum DSCR
    Kpis(ModelArgs),
    /// Derived metrics (CAPEX, OPEX, debt sizing, cycled energy)
    Derived(ModelArgs),
    /// Debt amortization schedule
    DebtSchedule(ModelArgs),
    /// IRR and NPV of an ad-hoc cash-flow series
    Irr(IrrArgs),
    /// Sweep one or two inputs and tabulate a KPI
    Sensitivity(SensitivityArgs),
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
    logging::init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Run(args) => commands::model::run_model(args),
        Commands::Simulate(args) => commands::model::run_simulate(args),
        Commands::Kpis(args) => commands::model::run_kpis(args),
        Commands::Derived(args) => commands::model::run_derived(args),
        Commands::DebtSchedule(args) => commands::model::run_debt_schedule(args),
        Commands::Irr(args) => commands::irr::run_irr(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Version => {
            println!("bess {}", env!("CARGO_PKG_VERSION"));
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
