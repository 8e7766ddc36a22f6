use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fx_converter::cli::setup::setup;
use fx_converter::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List supported currencies
    Currencies,
    /// Convert an amount between two currencies
    Convert {
        /// Amount to convert
        #[arg(short, long)]
        amount: Option<f64>,
        /// Currency to convert from, e.g. AUD
        #[arg(short, long)]
        from: Option<String>,
        /// Currency to convert to, e.g. USD
        #[arg(short, long)]
        to: Option<String>,
        /// Historical date (YYYY-MM-DD); latest rate when omitted
        #[arg(short, long)]
        date: Option<String>,
        /// Use the configured historical date
        #[arg(long, conflicts_with = "date")]
        historical: bool,
    },
    /// Show rates from one currency to several others
    Rates {
        /// Base currency
        #[arg(short, long)]
        from: String,
        /// Comma separated target currencies, e.g. USD,EUR
        #[arg(short, long)]
        to: String,
        /// Amount to convert
        #[arg(short, long)]
        amount: Option<f64>,
        /// Historical date (YYYY-MM-DD); latest rates when omitted
        #[arg(short, long)]
        date: Option<String>,
    },
}

impl From<Commands> for fx_converter::AppCommand {
    fn from(cmd: Commands) -> fx_converter::AppCommand {
        match cmd {
            Commands::Currencies => fx_converter::AppCommand::Currencies,
            Commands::Convert {
                amount,
                from,
                to,
                date,
                historical,
            } => fx_converter::AppCommand::Convert(fx_converter::ConvertArgs {
                amount,
                from,
                to,
                date,
                historical,
            }),
            Commands::Rates {
                from,
                to,
                amount,
                date,
            } => fx_converter::AppCommand::Rates(fx_converter::RatesArgs {
                from,
                to,
                amount,
                date,
            }),
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => fx_converter::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
