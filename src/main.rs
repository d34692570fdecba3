//! Gelang CLI - Audio Region Genre Classifier
//!
//! Command-line interface for the Gelang classification client.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use gelang::cli::{commands, Cli, Commands};
use gelang::Settings;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Gelang v{}", env!("CARGO_PKG_VERSION"));

    let mut settings =
        Settings::load(cli.config.as_deref()).context("failed to load settings")?;

    let result = match cli.command {
        Some(Commands::Inspect { file }) => commands::inspect(&file, &settings),
        Some(Commands::Preview {
            file,
            region,
            tick_ms,
        }) => commands::preview(&file, region, tick_ms, &settings),
        Some(Commands::Classify {
            file,
            region,
            endpoint,
            json,
        }) => {
            if let Some(endpoint) = endpoint {
                settings.endpoint = endpoint;
            }
            commands::classify(&file, region, json, &settings)
        }
        None => {
            println!("Gelang v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = &result {
        eprintln!("{}", e.friendly_message());
        for suggestion in e.recovery_suggestions() {
            eprintln!("  - {}", suggestion);
        }
    }
    result.with_context(|| "command failed".to_string())
}
