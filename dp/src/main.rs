//! Date Planner - CLI entry point
//!
//! Runs the HTTP service by default; `plan` and `categories` are offline helpers.

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use dateplanner::cli::{Cli, Command};
use dateplanner::config::Config;
use dateplanner::domain::DatePreferences;
use dateplanner::places::{CategoryTable, FALLBACK_CATEGORY};
use dateplanner::planner::DatePlanner;
use dateplanner::server;

fn setup_logging(cli_level: Option<&str>, config_level: Option<&str>) -> Result<()> {
    // CLI flag wins over config; INFO when neither is set
    let level = match cli_level.or(config_level) {
        Some(name) => name
            .parse::<tracing::Level>()
            .map_err(|_| eyre::eyre!("Invalid log level: {}", name))?,
        None => tracing::Level::INFO,
    };

    // Logs go to stderr so `plan` output on stdout stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!(%level, "Logging initialized");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "Date planner loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command.unwrap_or(Command::Serve { bind: None, port: None }) {
        Command::Serve { bind, port } => cmd_serve(config, bind, port).await,
        Command::Plan {
            location,
            date_type,
            food,
            activity,
        } => {
            let preferences = DatePreferences {
                location,
                date_type,
                food_preferences: food,
                activity_preferences: activity,
            };
            cmd_plan(&config, &preferences).await
        }
        Command::Categories => cmd_categories(&config),
    }
}

/// Run the HTTP service until Ctrl-C
async fn cmd_serve(mut config: Config, bind: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    config.validate().context("Configuration is incomplete")?;
    let planner = DatePlanner::from_config(&config).context("Failed to build planner")?;

    server::serve(&config.server, Arc::new(planner)).await
}

/// Generate a single plan and print it
async fn cmd_plan(config: &Config, preferences: &DatePreferences) -> Result<()> {
    config.validate().context("Configuration is incomplete")?;
    let planner = DatePlanner::from_config(config).context("Failed to build planner")?;

    let plan = planner
        .generate(preferences)
        .await
        .context("Failed to generate date plan")?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Print the label -> place type table
fn cmd_categories(config: &Config) -> Result<()> {
    let table = CategoryTable::with_overrides(&config.categories);
    let width = table.labels().iter().map(|l| l.len()).max().unwrap_or(0);

    println!("{}", "Categories".bright_cyan().bold());
    for (label, place_type) in table.iter() {
        println!("  {:<width$}  {}", label, place_type.dimmed(), width = width);
    }
    println!();
    println!(
        "{}",
        format!(
            "Unknown labels search as \"{}\"; add entries under `categories:` in dateplanner.yml",
            FALLBACK_CATEGORY
        )
        .dimmed()
    );
    Ok(())
}
