/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Broker-side connectivity check.
//!
//! Asks the broker's connection diagnostics endpoint whether a client with a
//! given name currently holds a session. Any failure along the way (transport,
//! non-2xx status, unparsable body) reads as "not connected".

use crate::net::HostPort;
use reqwest::Client;
use std::time::Duration;
use waypoint_models::models::connections::Connections;

pub const BROKER_PING_ENDPOINT: &str = "/connz";

#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    client: Client,
    timeout: Duration,
}

impl ConnectivityProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(timeout: Duration) -> Self {
        Self::with_client(Client::new(), timeout)
    }

    /// Reuses an existing HTTP client; the timeout is applied per request.
    pub fn with_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn url(endpoint: &HostPort) -> String {
        format!("http://{}{}", endpoint, BROKER_PING_ENDPOINT)
    }

    /// True iff the broker at `endpoint` reports a connection named `client_name`.
    pub async fn probe(&self, endpoint: &HostPort, client_name: &str) -> bool {
        self.fetch(endpoint)
            .await
            .map(|connections| connections.contains_client(client_name))
            .unwrap_or(false)
    }

    async fn fetch(&self, endpoint: &HostPort) -> Option<Connections> {
        let response = self
            .client
            .get(Self::url(endpoint))
            .timeout(self.timeout)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.json::<Connections>().await.ok()
    }
}

impl Default for ConnectivityProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}
