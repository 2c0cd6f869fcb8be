/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # TCP Reachability Probe
//!
//! Opens a TCP connection to a target and drops it immediately; no payload is
//! sent. Unreachability (refused, timed out, unresolvable name) is a normal
//! `false` outcome, never an error. Malformed targets cannot reach this code:
//! they are rejected when the [`HostPort`] is built.

use crate::net::HostPort;
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;

/// Something that can tell whether a target accepts connections.
pub trait ReachabilityProbe: Send + Sync {
    fn probe(&self, target: &HostPort) -> impl Future<Output = bool> + Send;
}

/// TCP connect probe bounded by a fixed timeout.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    timeout: Duration,
}

impl TcpProbe {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpProbe {
    fn default() -> Self {
        Self::new(Self::DEFAULT_TIMEOUT)
    }
}

impl ReachabilityProbe for TcpProbe {
    async fn probe(&self, target: &HostPort) -> bool {
        // Name resolution counts against the same timeout as the connect.
        let connect = TcpStream::connect((target.host(), target.port()));
        matches!(tokio::time::timeout(self.timeout, connect).await, Ok(Ok(_)))
    }
}
