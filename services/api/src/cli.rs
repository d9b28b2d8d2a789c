use crate::report::{run_calculation, run_charge_validation, CalculateArgs, ValidateChargesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use concession_billing::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Concession Billing",
    about = "Serve and run concession contract billing calculations from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Calculate one period's obligation from a billing snapshot
    Calculate(CalculateArgs),
    /// Inspect stored charge definitions
    Charges {
        #[command(subcommand)]
        command: ChargesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ChargesCommand {
    /// Report every defect in a charge CSV export; exits non-zero if any are found
    Validate(ValidateChargesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Billing snapshot JSON to serve (overrides BILLING_SNAPSHOT_PATH)
    #[arg(long)]
    pub(crate) snapshot: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Calculate(args) => run_calculation(args),
        Command::Charges {
            command: ChargesCommand::Validate(args),
        } => run_charge_validation(args),
    }
}
