use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use dzrate::cli::show::ShowOptions;
use dzrate::core::log::init_logging;

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
    /// Fetch the EUR/DZD quote once and store the rate
    Fetch,
    /// Serve the HTTP trigger for the fetcher
    Serve,
    /// Refresh the rate periodically
    Schedule,
    /// Display the cached exchange rates
    Show {
        /// Amount to convert into the display currency
        #[arg(short, long)]
        amount: Option<f64>,

        /// Currency the amount is expressed in
        #[arg(short, long, default_value = "EUR")]
        from: String,

        /// Display currency, overriding the configured one
        #[arg(short, long)]
        to: Option<String>,

        /// Ignore the local rate cache
        #[arg(short, long)]
        refresh: bool,
    },
}

impl From<Commands> for dzrate::AppCommand {
    fn from(cmd: Commands) -> dzrate::AppCommand {
        match cmd {
            Commands::Fetch => dzrate::AppCommand::Fetch,
            Commands::Serve => dzrate::AppCommand::Serve,
            Commands::Schedule => dzrate::AppCommand::Schedule,
            Commands::Show {
                amount,
                from,
                to,
                refresh,
            } => dzrate::AppCommand::Show(ShowOptions {
                amount,
                from,
                to,
                refresh,
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
        Some(Commands::Setup) => dzrate::cli::setup::setup(),
        Some(cmd) => dzrate::run_command(cmd.into(), cli.config_path.as_deref()).await,
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
