/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Helm lifecycle boundary.
//!
//! Installing, upgrading and removing releases is delegated to a
//! [`ChartApplier`]. This module only decides what to ask for.

use crate::errors::{BoxError, ConnectError};
use std::collections::BTreeMap;
use std::future::Future;
use waypoint_models::models::charts::{ApplyChartRequest, ChartAction, ChartLocation};
use waypoint_utils::Settings;

/// Applies a chart request against the cluster described by `rest`.
pub trait ChartApplier: Send + Sync {
    fn apply_chart(
        &self,
        rest: &kube::Config,
        request: ApplyChartRequest,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Builds the operator chart request from configured release coordinates.
///
/// An empty `version` asks for the latest published chart.
pub fn operator_chart_request(
    settings: &Settings,
    version: &str,
    uninstall: bool,
    overrides: BTreeMap<String, serde_json::Value>,
) -> ApplyChartRequest {
    ApplyChartRequest {
        namespace: settings.operator.namespace.clone(),
        release_name: settings.operator.release_name.clone(),
        location: ChartLocation {
            repository: settings.operator.repository.clone(),
            chart: settings.operator.chart.clone(),
            version: version.to_string(),
        },
        action: if uninstall {
            ChartAction::Uninstall
        } else {
            ChartAction::Install
        },
        create_namespace: true,
        upgrade_if_installed: true,
        override_values: overrides,
    }
}

/// Installs, upgrades or removes the operator release.
pub async fn apply_operator_chart<A: ChartApplier>(
    applier: &A,
    rest: &kube::Config,
    settings: &Settings,
    version: &str,
    uninstall: bool,
    overrides: BTreeMap<String, serde_json::Value>,
) -> Result<(), ConnectError> {
    let request = operator_chart_request(settings, version, uninstall, overrides);
    applier
        .apply_chart(rest, request)
        .await
        .map_err(ConnectError::Collaborator)
}
