use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod host;
mod logging;

#[derive(Parser)]
#[command(name = "intervalo", version, about = "Intervalo interval timer CLI")]
struct Cli {
    /// Settings file (defaults to ~/.config/intervalo/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session plan with a live countdown
    Run(commands::run::RunArgs),
    /// Plan inspection
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Preview the background alert schedule for a plan
    Alerts(commands::alerts::AlertsArgs),
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    logging::init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args, config_path),
        Commands::Plan { action } => commands::plan::run(action),
        Commands::Alerts(args) => commands::alerts::run(args, config_path),
        Commands::Config { action } => commands::config::run(action, config_path),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
