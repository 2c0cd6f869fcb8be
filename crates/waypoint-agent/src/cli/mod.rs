/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

/// Command-line interface module for the Waypoint agent.
pub mod commands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI configuration structure.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file layered over the built-in defaults
    #[arg(long, global = true, env = "WAYPOINT_CONFIG")]
    pub config: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve and normalize a kubeconfig, then print it
    Kubeconfig {
        /// Kubeconfig file tried before any other source
        #[arg(long)]
        file: Option<PathBuf>,
        /// Where to persist the normalized kubeconfig
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Resolve the reachable broker endpoint
    Endpoint {
        /// Pod-network broker address (host:port)
        #[arg(long)]
        internal: Option<String>,
        /// Externally exposed broker address (host:port)
        #[arg(long)]
        external: Option<String>,
        /// Kubernetes API server host; taken from the kubeconfig when omitted
        #[arg(long)]
        api_server_host: Option<String>,
        /// Kubeconfig file tried before any other source
        #[arg(long)]
        kubeconfig: Option<PathBuf>,
    },
    /// Check whether a client is connected to the broker
    Ping {
        /// Broker monitoring address (host:port)
        #[arg(long)]
        endpoint: String,
        /// Client connection name to look for
        #[arg(long)]
        client_name: String,
    },
}

/// Parses command-line arguments into the Cli structure.
///
/// # Returns
/// * `Cli` - Parsed CLI configuration
pub fn parse_cli() -> Cli {
    Cli::parse()
}
