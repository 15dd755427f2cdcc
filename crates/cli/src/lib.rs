pub mod commands;
pub mod logging;

use clap::{Parser, Subcommand};
use landed_core::config::{AppConfig, LoadOptions};
use std::process::ExitCode;

use crate::commands::evaluate::EvaluateArgs;

#[derive(Debug, Parser)]
#[command(
    name = "landed",
    about = "Landed pricing calculator",
    long_about = "Derive break-even selling prices, landing prices and profit per margin from a \
                  supplier cost, freight, ineffectivity and acquisition-cost inputs.",
    after_help = "Examples:\n  \
                  landed evaluate --cost 100000 --item \"Inefectividad=25\" --margin 20\n  \
                  landed evaluate --cost 35 --country PE --custom-margin 27.5 --json\n  \
                  landed countries\n  \
                  landed config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Price a product across the requested margins")]
    Evaluate(EvaluateArgs),
    #[command(about = "List the country profiles known to the calculator")]
    Countries {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        if let Err(error) = logging::init(&config) {
            eprintln!("{error}");
        }
    }

    let result = match cli.command {
        Command::Evaluate(args) => commands::evaluate::run(&args),
        Command::Countries { json } => commands::countries::run(json),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
