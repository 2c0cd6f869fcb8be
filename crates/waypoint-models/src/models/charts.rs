/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

// src/models/charts.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether a chart request installs (or upgrades) a release or removes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartAction {
    Install,
    Uninstall,
}

/// Where a chart is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartLocation {
    pub repository: String,
    pub chart: String,
    /// Empty means the latest published version.
    #[serde(default)]
    pub version: String,
}

/// A request handed to the Helm lifecycle collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyChartRequest {
    pub namespace: String,
    pub release_name: String,
    pub location: ChartLocation,
    pub action: ChartAction,
    /// Ignored for `Uninstall`.
    pub create_namespace: bool,
    pub upgrade_if_installed: bool,
    #[serde(default)]
    pub override_values: BTreeMap<String, serde_json::Value>,
}

impl ApplyChartRequest {
    pub fn is_uninstall(&self) -> bool {
        self.action == ChartAction::Uninstall
    }
}
