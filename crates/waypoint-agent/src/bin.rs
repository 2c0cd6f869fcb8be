/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use waypoint_agent::cli::commands;
use waypoint_agent::cli::{parse_cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = parse_cli();
    let settings = commands::init(cli.config)?;

    match cli.command {
        Commands::Kubeconfig { file, output } => {
            commands::kubeconfig(&settings, file, output)?;
        }
        Commands::Endpoint {
            internal,
            external,
            api_server_host,
            kubeconfig,
        } => {
            commands::endpoint(&settings, internal, external, api_server_host, kubeconfig)
                .await?;
        }
        Commands::Ping {
            endpoint,
            client_name,
        } => {
            if !commands::ping(&settings, &endpoint, &client_name).await? {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
