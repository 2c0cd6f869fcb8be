/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

pub mod connz;
pub mod endpoint;
pub mod status;

pub use connz::ConnectivityProbe;
pub use endpoint::{BrokerEndpointResolver, EndpointTier, ResolvedEndpoint, TierOutcome};
pub use status::{fetch_broker_status, BrokerResource};

use crate::errors::ConnectError;
use crate::net::ReachabilityProbe;
use waypoint_models::models::broker_status::BrokerStatusEndpoints;
use waypoint_utils::logging::prelude::*;

/// Resolves the broker endpoint, logging every tier and the outcome.
pub async fn resolve_logged<P: ReachabilityProbe>(
    resolver: &BrokerEndpointResolver<P>,
    status: &BrokerStatusEndpoints,
    api_server_host: Option<&str>,
) -> Result<ResolvedEndpoint, ConnectError> {
    let result = resolver
        .resolve_with(status, api_server_host, |tier, outcome| match outcome {
            TierOutcome::Skipped => debug!("Broker tier {} has no usable address", tier),
            TierOutcome::Unreachable(address) => {
                debug!("Broker tier {} at {} is unreachable", tier, address)
            }
            TierOutcome::Reachable(address) => {
                debug!("Broker tier {} at {} is reachable", tier, address)
            }
        })
        .await;

    match &result {
        Ok(endpoint) => info!("Using broker endpoint {}", endpoint),
        Err(e) => warn!("{}", e),
    }
    result
}
