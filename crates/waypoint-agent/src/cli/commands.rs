/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # CLI Commands Module
//!
//! Implements the command-line interface for the Waypoint agent.
//!
//! ## Commands
//!
//! - `kubeconfig`: resolve, normalize and print the kubeconfig in use
//! - `endpoint`: resolve the broker address the agent should dial
//! - `ping`: ask the broker whether a named client is connected
//!
//! ## Endpoint Resolution
//!
//! ```mermaid
//! flowchart TD
//!     A[Load Config] --> B[Init Logger]
//!     B --> C{--internal / --external given?}
//!     C -->|no| D[Resolve Kubeconfig]
//!     D --> E[Read Broker Status]
//!     C -->|yes| F{--api-server-host given?}
//!     E --> F
//!     F -->|no| G[Host from Kubeconfig]
//!     F -->|yes| H[Walk Tiers]
//!     G --> H
//! ```
//!
//! Every command loads [`Settings`] first and initializes logging with the
//! configured level and format. Errors are returned to the caller; only the
//! binary decides the exit status.

use crate::broker::{self, BrokerEndpointResolver, BrokerResource, ConnectivityProbe};
use crate::errors::ConnectError;
use crate::kubeconfig::{self, DiscoveryEnv, KubeconfigResolver, NormalizedKubeconfig};
use crate::net::{HostPort, TcpProbe};
use std::path::{Path, PathBuf};
use waypoint_models::models::broker_status::BrokerStatusEndpoints;
use waypoint_utils::config::Settings;
use waypoint_utils::logging::prelude::*;

type CommandResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Loads settings and starts the logger.
pub fn init(config_file: Option<String>) -> CommandResult<Settings> {
    let settings = Settings::new(config_file)?;
    waypoint_utils::logging::init_with_format(&settings.log.level, &settings.log.format)?;
    Ok(settings)
}

/// Runs kubeconfig discovery with an optional explicit file tried first.
pub fn resolve_kubeconfig(
    settings: &Settings,
    file: Option<&Path>,
    output: Option<PathBuf>,
) -> Result<NormalizedKubeconfig, ConnectError> {
    let explicit = match file {
        Some(path) => Some(std::fs::read(path).map_err(|e| {
            ConnectError::LoadConfig(format!("{}: {}", path.display(), e))
        })?),
        None => None,
    };

    let mut resolver =
        KubeconfigResolver::new(DiscoveryEnv::from_process(&settings.kubeconfig.env_var));
    if let Some(path) = output.or_else(|| settings.kubeconfig.output_path.as_ref().map(PathBuf::from))
    {
        resolver = resolver.with_output(path);
    }

    let sources = resolver.default_sources(explicit);
    kubeconfig::resolve_logged(&resolver, &sources)
}

pub fn kubeconfig(
    settings: &Settings,
    file: Option<PathBuf>,
    output: Option<PathBuf>,
) -> CommandResult<()> {
    let normalized = resolve_kubeconfig(settings, file.as_deref(), output)?;
    if let Some(path) = normalized.persisted_path() {
        info!("Normalized kubeconfig written to {}", path.display());
    }
    print!("{}", normalized.as_yaml());
    Ok(())
}

pub async fn endpoint(
    settings: &Settings,
    internal: Option<String>,
    external: Option<String>,
    api_server_host: Option<String>,
    kubeconfig_file: Option<PathBuf>,
) -> CommandResult<()> {
    let from_flags = internal.is_some() || external.is_some();
    let needs_kubeconfig = !from_flags || api_server_host.is_none();

    let normalized = if needs_kubeconfig {
        match resolve_kubeconfig(settings, kubeconfig_file.as_deref(), None) {
            Ok(n) => Some(n),
            Err(e) if from_flags => {
                warn!("Continuing without an API server host: {}", e);
                None
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        None
    };

    let status = match (&normalized, from_flags) {
        (Some(normalized), false) => {
            let client = broker::status::create_client(normalized).await?;
            let status = broker::fetch_broker_status(
                &client,
                &settings.broker.namespace,
                &settings.broker.name,
                &BrokerResource::from_settings(settings),
            )
            .await?;
            debug!("Broker status: {:?}", status);
            status
        }
        _ => BrokerStatusEndpoints::new(internal.as_deref(), external.as_deref()),
    };

    let api_server_host =
        api_server_host.or_else(|| normalized.as_ref().and_then(|n| n.api_server_host()));

    let resolver = BrokerEndpointResolver::new(TcpProbe::new(settings.probe.tcp_timeout()))
        .with_host_alias(settings.broker.host_alias.clone());
    let resolved =
        broker::resolve_logged(&resolver, &status, api_server_host.as_deref()).await?;

    println!("{}", resolved.address);
    Ok(())
}

/// Returns whether the client was found.
pub async fn ping(settings: &Settings, endpoint: &str, client_name: &str) -> CommandResult<bool> {
    let endpoint = HostPort::parse(endpoint)?;
    let probe = ConnectivityProbe::new(settings.probe.http_timeout());

    let connected = probe.probe(&endpoint, client_name).await;
    if connected {
        info!("Client '{}' is connected to broker at {}", client_name, endpoint);
    } else {
        warn!(
            "Client '{}' not found at {}",
            client_name,
            ConnectivityProbe::url(&endpoint)
        );
    }
    Ok(connected)
}
