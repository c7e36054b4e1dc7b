//! CLI definitions for CloudSentry.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// CloudSentry CLI.
#[derive(Parser)]
#[command(name = "cloudsentry")]
#[command(about = "Cloud monitoring configuration orchestrator")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the HTTP API server (default)
    Serve {
        /// Server host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Server port (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// List supported services
    Services,

    /// List the metric catalog of a service
    Metrics {
        /// Service identifier, e.g. EC2
        service: String,
    },

    /// List all regions visible to the account
    Regions,

    /// Discover live resources of a service across all regions
    Discover {
        /// Service identifier, e.g. RDS
        service: String,
    },

    /// Run one configuration request from a JSON file
    Configure {
        /// Path to the request JSON
        #[arg(short, long)]
        request: PathBuf,

        /// Credential file for a resource, as <resourceId>=<path>
        #[arg(short, long = "key", value_name = "ID=PATH")]
        keys: Vec<String>,
    },
}
