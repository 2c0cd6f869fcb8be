/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Broker Endpoint Resolution
//!
//! Picks the first reachable address for the message broker, trying four tiers
//! in order:
//!
//! | Tier        | Address                                      |
//! |-------------|----------------------------------------------|
//! | `Internal`  | `status.endpoint.internal`                   |
//! | `External`  | `status.endpoint.external`                   |
//! | `HostAlias` | host alias + external port                   |
//! | `ApiServer` | Kubernetes API server host + external port   |
//!
//! A tier whose address is missing or malformed is skipped without a probe.
//! Each remaining tier is probed at most once and the walk stops at the first
//! success.

use crate::errors::ConnectError;
use crate::net::{HostPort, ReachabilityProbe};
use std::fmt;
use waypoint_models::models::broker_status::BrokerStatusEndpoints;

pub const DEFAULT_HOST_ALIAS: &str = "host.docker.internal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointTier {
    Internal,
    External,
    HostAlias,
    ApiServer,
}

impl fmt::Display for EndpointTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointTier::Internal => "internal",
            EndpointTier::External => "external",
            EndpointTier::HostAlias => "host-alias",
            EndpointTier::ApiServer => "api-server",
        };
        f.write_str(name)
    }
}

/// The chosen broker address and the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    pub address: HostPort,
    pub tier: EndpointTier,
}

impl fmt::Display for ResolvedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address, self.tier)
    }
}

/// Outcome of a single tier, reported to observers of [`BrokerEndpointResolver::resolve_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TierOutcome {
    /// No usable address could be formed for the tier
    Skipped,
    Unreachable(HostPort),
    Reachable(HostPort),
}

pub struct BrokerEndpointResolver<P> {
    probe: P,
    host_alias: String,
}

impl<P: ReachabilityProbe> BrokerEndpointResolver<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            host_alias: DEFAULT_HOST_ALIAS.to_string(),
        }
    }

    pub fn with_host_alias(mut self, alias: impl Into<String>) -> Self {
        self.host_alias = alias.into();
        self
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Builds the ordered candidate list; `None` marks a tier with no usable address.
    pub fn candidates(
        &self,
        status: &BrokerStatusEndpoints,
        api_server_host: Option<&str>,
    ) -> Vec<(EndpointTier, Option<HostPort>)> {
        let internal = status.internal().and_then(|v| HostPort::parse(v).ok());
        let external = status.external().and_then(|v| HostPort::parse(v).ok());

        // The fallback tiers only borrow the external port, so a port-only
        // value such as `:31222` still feeds them.
        let external_port = status.external().and_then(|v| HostPort::parse_port(v).ok());
        let alias = external_port.and_then(|port| HostPort::new(self.host_alias.as_str(), port).ok());
        let api_server = match (external_port, api_server_host) {
            (Some(port), Some(host)) => HostPort::new(host, port).ok(),
            _ => None,
        };

        vec![
            (EndpointTier::Internal, internal),
            (EndpointTier::External, external),
            (EndpointTier::HostAlias, alias),
            (EndpointTier::ApiServer, api_server),
        ]
    }

    /// Returns the first reachable tier.
    ///
    /// # Errors
    /// `NoReachableBrokerEndpoint` when every tier is skipped or unreachable.
    pub async fn resolve(
        &self,
        status: &BrokerStatusEndpoints,
        api_server_host: Option<&str>,
    ) -> Result<ResolvedEndpoint, ConnectError> {
        self.resolve_with(status, api_server_host, |_, _| {}).await
    }

    /// Like [`resolve`](Self::resolve), reporting each tier's outcome to `observe`.
    pub async fn resolve_with<F>(
        &self,
        status: &BrokerStatusEndpoints,
        api_server_host: Option<&str>,
        mut observe: F,
    ) -> Result<ResolvedEndpoint, ConnectError>
    where
        F: FnMut(EndpointTier, &TierOutcome),
    {
        for (tier, candidate) in self.candidates(status, api_server_host) {
            let Some(address) = candidate else {
                observe(tier, &TierOutcome::Skipped);
                continue;
            };

            if self.probe.probe(&address).await {
                observe(tier, &TierOutcome::Reachable(address.clone()));
                return Ok(ResolvedEndpoint { address, tier });
            }
            observe(tier, &TierOutcome::Unreachable(address));
        }
        Err(ConnectError::NoReachableBrokerEndpoint)
    }
}
