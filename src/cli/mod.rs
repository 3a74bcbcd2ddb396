//! CLI module - handles argument parsing and command execution

mod parser;

pub use parser::*;

use anyhow::Result;
use std::io::IsTerminal;
use tracing::debug;

use crate::config::Config;
use crate::output::{ColorScheme, OutputFormatter, OutputMode, Spinner};
use crate::recommend::{create_client, SensorReading};
use crate::validation::check_realistic_ranges;

/// Main entry point for the CLI
pub async fn run(args: Args) -> Result<()> {
    // Handle special commands first
    if args.version {
        println!("agrisense {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.make_config {
        println!("{}", crate::config::DEFAULT_CONFIG_TEMPLATE);
        return Ok(());
    }

    // Handle completions generation
    if let Some(ref shell) = args.completions {
        crate::completions::generate_completions(shell);
        return Ok(());
    }

    if args.color == Some(false) {
        colored::control::set_override(false);
    }

    if !args.errors.is_empty() {
        for error in &args.errors {
            ColorScheme::print_error(error);
        }
        anyhow::bail!("Invalid arguments. Run 'agrisense --help' for usage.");
    }

    // Load configuration
    let config = Config::load()?;
    let config = config.with_cli_overrides(&args);
    debug!(?config, "effective configuration");

    let formatter = OutputFormatter::new(&args);

    if args.health {
        return check_health(&config, &formatter).await;
    }

    let reading = args.reading.complete().map_err(|e| anyhow::anyhow!("{}", e))?;

    for warning in check_realistic_ranges(&reading) {
        ColorScheme::print_warning(&warning);
    }

    recommend(&config, &formatter, &reading).await
}

async fn recommend(config: &Config, formatter: &OutputFormatter, reading: &SensorReading) -> Result<()> {
    let client = create_client(config)?;
    debug!(settings = ?client.settings(), "recommendation client ready");

    let spinner = start_spinner(formatter, "Fetching recommendation");
    let outcome = client.get_recommendation(reading, None).await;

    // Stop spinner before output
    drop(spinner);

    match outcome {
        Ok(result) => {
            formatter.format_result(&result);
            if !result.is_success() {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(err) => {
            debug!(error = ?err, "recommendation failed");
            formatter.format_error(&err);
            std::process::exit(1);
        }
    }
}

async fn check_health(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    let client = create_client(config)?;

    let spinner = start_spinner(formatter, "Checking service");
    let outcome = client.health().await;
    drop(spinner);

    match outcome {
        Ok(health) => {
            formatter.format_health(&health);
            if !health.is_ok() {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(err) => {
            debug!(error = ?err, "health check failed");
            formatter.format_error(&err);
            std::process::exit(1);
        }
    }
}

/// Show spinner while waiting (only in terminal, not raw/json)
fn start_spinner(formatter: &OutputFormatter, message: &str) -> Option<Spinner> {
    let use_spinner = formatter.mode() == OutputMode::Pretty && std::io::stderr().is_terminal();
    use_spinner.then(|| Spinner::start(message))
}
