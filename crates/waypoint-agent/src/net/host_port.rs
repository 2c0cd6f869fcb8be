/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::errors::ConnectError;
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

/// A validated address and port.
///
/// The host is never empty and the port is never zero. IPv6 literals are
/// stored without brackets and rendered with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HostPort {
    host: String,
    port: u16,
}

impl HostPort {
    pub fn new(host: impl Into<String>, port: u16) -> Result<Self, ConnectError> {
        let host = host.into();
        let host = host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        if host.is_empty() {
            return Err(ConnectError::InvalidHostPort("empty host".to_string()));
        }
        if host.contains(':') && host.parse::<Ipv6Addr>().is_err() {
            return Err(ConnectError::InvalidHostPort(format!(
                "{:?} is neither a hostname nor an IPv6 address",
                host
            )));
        }
        if port == 0 {
            return Err(ConnectError::InvalidHostPort(format!(
                "{}: port must be non-zero",
                host
            )));
        }
        Ok(Self {
            host: host.to_string(),
            port,
        })
    }

    /// Parses `host:port` or `[v6addr]:port`.
    pub fn parse(value: &str) -> Result<Self, ConnectError> {
        let value = value.trim();
        let (host, port) = value.rsplit_once(':').ok_or_else(|| {
            ConnectError::InvalidHostPort(format!("{:?} has no port", value))
        })?;

        let bracketed = host.starts_with('[') && host.ends_with(']');
        if !bracketed && host.contains(':') {
            return Err(ConnectError::InvalidHostPort(format!(
                "{:?}: IPv6 addresses must be bracketed",
                value
            )));
        }

        let port = port.parse::<u16>().map_err(|_| {
            ConnectError::InvalidHostPort(format!("{:?} has a non-numeric port", value))
        })?;
        Self::new(host, port)
    }

    /// Extracts only the port of a `host:port` string. The host part is not
    /// validated and may be empty (`:31222`).
    pub fn parse_port(value: &str) -> Result<u16, ConnectError> {
        let value = value.trim();
        let (_, port) = value.rsplit_once(':').ok_or_else(|| {
            ConnectError::InvalidHostPort(format!("{:?} has no port", value))
        })?;
        match port.parse::<u16>() {
            Ok(0) => Err(ConnectError::InvalidHostPort(format!(
                "{:?}: port must be non-zero",
                value
            ))),
            Ok(port) => Ok(port),
            Err(_) => Err(ConnectError::InvalidHostPort(format!(
                "{:?} has a non-numeric port",
                value
            ))),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl FromStr for HostPort {
    type Err = ConnectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}
