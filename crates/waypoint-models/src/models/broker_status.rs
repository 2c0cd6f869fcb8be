/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

// src/models/broker_status.rs

use serde::{Deserialize, Serialize};

/// `status` block of the broker custom resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerStatus {
    #[serde(default)]
    pub endpoint: BrokerStatusEndpoints,
}

/// Last-known network endpoints the broker advertises, each in `host:port` form.
///
/// Either field may be missing or empty; empty strings are treated the same
/// as absent values by the accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerStatusEndpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<String>,
}

impl BrokerStatusEndpoints {
    pub fn new(internal: Option<&str>, external: Option<&str>) -> Self {
        Self {
            internal: internal.map(str::to_string),
            external: external.map(str::to_string),
        }
    }

    /// Pod-network endpoint, if set and non-empty.
    pub fn internal(&self) -> Option<&str> {
        non_empty(self.internal.as_deref())
    }

    /// Externally exposed endpoint, if set and non-empty.
    pub fn external(&self) -> Option<&str> {
        non_empty(self.external.as_deref())
    }
}

impl BrokerStatus {
    /// Reads the status block out of a raw custom resource status value.
    ///
    /// Unknown fields are ignored; a missing `endpoint` yields empty endpoints.
    pub fn from_value(status: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(status.clone())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
