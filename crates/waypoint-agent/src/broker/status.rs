/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Reads the broker custom resource's advertised endpoints.

use crate::errors::ConnectError;
use crate::kubeconfig::NormalizedKubeconfig;
use kube::api::{DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use kube::{Api, Client};
use waypoint_models::models::broker_status::{BrokerStatus, BrokerStatusEndpoints};
use waypoint_utils::Settings;

/// Group, version and kind of the broker custom resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerResource {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl BrokerResource {
    pub fn new(group: &str, version: &str, kind: &str) -> Self {
        Self {
            group: group.to_string(),
            version: version.to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.broker.group,
            &settings.broker.version,
            &settings.broker.kind,
        )
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource::from_gvk(&GroupVersionKind::gvk(
            &self.group,
            &self.version,
            &self.kind,
        ))
    }
}

/// Builds a Kubernetes client from a normalized kubeconfig.
pub async fn create_client(kubeconfig: &NormalizedKubeconfig) -> Result<Client, ConnectError> {
    let config = kubeconfig.rest_config().await?;
    Client::try_from(config).map_err(|e| ConnectError::RestConfig(e.to_string()))
}

/// Fetches `status.endpoint` of the named broker resource.
///
/// # Errors
/// `BrokerStatus` when the resource cannot be read or its status block is malformed.
pub async fn fetch_broker_status(
    client: &Client,
    namespace: &str,
    name: &str,
    resource: &BrokerResource,
) -> Result<BrokerStatusEndpoints, ConnectError> {
    let api: Api<DynamicObject> =
        Api::namespaced_with(client.clone(), namespace, &resource.api_resource());
    let object = api.get(name).await.map_err(|e| {
        ConnectError::BrokerStatus(format!(
            "failed to get {} {}/{}: {}",
            resource.kind, namespace, name, e
        ))
    })?;
    endpoints_of(&object)
}

/// Extracts the endpoints from a broker object; a missing status yields empty endpoints.
pub fn endpoints_of(object: &DynamicObject) -> Result<BrokerStatusEndpoints, ConnectError> {
    match object.data.get("status") {
        Some(status) => BrokerStatus::from_value(status)
            .map(|s| s.endpoint)
            .map_err(|e| ConnectError::BrokerStatus(format!("malformed broker status: {}", e))),
        None => Ok(BrokerStatusEndpoints::default()),
    }
}
