/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::{closed_port, fake_broker, open_port};
use std::time::Duration;
use waypoint_agent::broker::{BrokerEndpointResolver, ConnectivityProbe, EndpointTier};
use waypoint_agent::net::TcpProbe;
use waypoint_agent::ConnectError;
use waypoint_models::models::broker_status::BrokerStatusEndpoints;

fn tcp_probe() -> TcpProbe {
    TcpProbe::new(Duration::from_millis(500))
}

#[tokio::test]
async fn test_unreachable_internal_falls_back_to_external() {
    let internal = closed_port().await;
    let external = open_port().await;

    let resolver = BrokerEndpointResolver::new(tcp_probe());
    let status = BrokerStatusEndpoints::new(
        Some(&internal.to_string()),
        Some(&external.address.to_string()),
    );

    let resolved = resolver.resolve(&status, None).await.unwrap();
    assert_eq!(resolved.tier, EndpointTier::External);
    assert_eq!(resolved.address, external.address);
}

#[tokio::test]
async fn test_reachable_internal_is_preferred() {
    let internal = open_port().await;
    let external = open_port().await;

    let resolver = BrokerEndpointResolver::new(tcp_probe());
    let status = BrokerStatusEndpoints::new(
        Some(&internal.address.to_string()),
        Some(&external.address.to_string()),
    );

    let resolved = resolver.resolve(&status, Some("127.0.0.1")).await.unwrap();
    assert_eq!(resolved.tier, EndpointTier::Internal);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_host_alias_reaches_published_port() {
    // 127.0.0.2 is loopback on Linux but the listener is bound to 127.0.0.1 only.
    let published = open_port().await;
    let external = format!("127.0.0.2:{}", published.address.port());

    let resolver = BrokerEndpointResolver::new(tcp_probe()).with_host_alias("127.0.0.1");
    let status = BrokerStatusEndpoints::new(Some("badhost"), Some(&external));

    let resolved = resolver.resolve(&status, None).await.unwrap();
    assert_eq!(resolved.tier, EndpointTier::HostAlias);
    assert_eq!(resolved.address, published.address);
}

#[tokio::test]
async fn test_port_only_external_reaches_host_alias() {
    let published = open_port().await;
    let external = format!(":{}", published.address.port());

    let resolver = BrokerEndpointResolver::new(tcp_probe()).with_host_alias("127.0.0.1");
    let status = BrokerStatusEndpoints::new(None, Some(&external));

    let resolved = resolver.resolve(&status, None).await.unwrap();
    assert_eq!(resolved.tier, EndpointTier::HostAlias);
    assert_eq!(resolved.address, published.address);
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_api_server_host_reaches_published_port() {
    let published = open_port().await;
    let external = format!("127.0.0.2:{}", published.address.port());

    let resolver =
        BrokerEndpointResolver::new(tcp_probe()).with_host_alias("waypoint-alias.invalid");
    let status = BrokerStatusEndpoints::new(None, Some(&external));

    let resolved = resolver.resolve(&status, Some("127.0.0.1")).await.unwrap();
    assert_eq!(resolved.tier, EndpointTier::ApiServer);
}

#[tokio::test]
async fn test_nothing_listening() {
    let internal = closed_port().await;
    let external = closed_port().await;

    let resolver =
        BrokerEndpointResolver::new(tcp_probe()).with_host_alias("waypoint-alias.invalid");
    let status = BrokerStatusEndpoints::new(
        Some(&internal.to_string()),
        Some(&external.to_string()),
    );

    let result = resolver.resolve(&status, Some("waypoint-api.invalid")).await;
    assert!(matches!(result, Err(ConnectError::NoReachableBrokerEndpoint)));
}

#[tokio::test]
async fn test_resolved_endpoint_reports_connected_client() {
    let monitor = fake_broker(&["agent-1"]).await;
    let internal = closed_port().await;

    let resolver = BrokerEndpointResolver::new(tcp_probe());
    let status =
        BrokerStatusEndpoints::new(Some(&internal.to_string()), Some(&monitor.to_string()));
    let resolved = resolver.resolve(&status, None).await.unwrap();

    let connz = ConnectivityProbe::new(Duration::from_secs(2));
    assert!(connz.probe(&resolved.address, "agent-1").await);
    assert!(!connz.probe(&resolved.address, "agent-2").await);
}
