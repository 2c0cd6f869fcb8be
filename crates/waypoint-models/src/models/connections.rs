/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

// src/models/connections.rs

use serde::{Deserialize, Serialize};

/// Body of the broker's `/connz` diagnostic endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connections {
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

/// A single client session reported by the broker.
///
/// Anonymous clients omit the name entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Connections {
    /// True when a session with exactly this name is present.
    pub fn contains_client(&self, name: &str) -> bool {
        self.connections
            .iter()
            .any(|c| c.name.as_deref() == Some(name))
    }
}
