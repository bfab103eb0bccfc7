//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Date Planner - itinerary generation service
#[derive(Parser)]
#[command(
    name = "dp",
    about = "Plans dates from nearby venues and a completion service",
    version,
    after_help = "Credentials are read from GOOGLE_PLACES_API_KEY and OPENAI_API_KEY (a .env file is honored)"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level override
    #[arg(short, long, global = true, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,

    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to bind (overrides config)
        #[arg(short, long)]
        bind: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate one plan and print it as JSON
    Plan {
        /// City name or postal code
        #[arg(long)]
        location: String,

        /// Kind of date (Casual, Romantic, First Date, ...)
        #[arg(short, long, default_value = "Casual")]
        date_type: String,

        /// Food preference label (repeatable; the first drives the search)
        #[arg(short, long = "food", required = true)]
        food: Vec<String>,

        /// Activity preference label (repeatable; the first drives the search)
        #[arg(short, long = "activity", required = true)]
        activity: Vec<String>,
    },

    /// List known category labels and their place types
    Categories,
}
