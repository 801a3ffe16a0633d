pub mod commands;

use clap::{Parser, Subcommand};
use cotiza_core::config::{AppConfig, LoadOptions, LogFormat};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "cotiza",
    about = "Cotiza operator CLI",
    long_about = "Operate Cotiza migrations, exchange-rate recording, and config inspection.",
    after_help = "Examples:\n  cotiza migrate\n  cotiza rates record VES=36.55 EUR=1.09\n  cotiza rates today\n  cotiza rates history VES --limit 5"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Record and inspect exchange rates")]
    Rates {
        #[command(subcommand)]
        action: RatesCommand,
    },
    #[command(about = "Inspect effective configuration values")]
    Config,
}

#[derive(Debug, Subcommand)]
enum RatesCommand {
    #[command(about = "Append CODE=RATE observations to the ledger and save them as current")]
    Record {
        #[arg(required = true, value_name = "CODE=RATE")]
        pairs: Vec<String>,
    },
    #[command(about = "Show the per-currency rates in effect today")]
    Today,
    #[command(about = "List recorded rate history for one currency, newest first")]
    History {
        currency: String,
        #[arg(long, default_value_t = 10)]
        limit: u32,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Rates { action } => match action {
            RatesCommand::Record { pairs } => commands::rates::record(&pairs),
            RatesCommand::Today => commands::rates::today(),
            RatesCommand::History { currency, limit } => commands::rates::history(&currency, limit),
        },
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging() {
    use tracing::Level;

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);
    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
