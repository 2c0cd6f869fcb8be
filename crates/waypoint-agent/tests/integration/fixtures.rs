/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use waypoint_agent::broker::connz::BROKER_PING_ENDPOINT;
use waypoint_agent::net::HostPort;

/// A loopback port with a live listener. Dropping it closes the port.
pub struct OpenPort {
    pub address: HostPort,
    _listener: TcpListener,
}

pub async fn open_port() -> OpenPort {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind loopback listener");
    let port = listener.local_addr().unwrap().port();
    OpenPort {
        address: HostPort::new("127.0.0.1", port).unwrap(),
        _listener: listener,
    }
}

/// A loopback address nothing is listening on.
pub async fn closed_port() -> HostPort {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    HostPort::new("127.0.0.1", port).unwrap()
}

/// Serves a fake broker monitoring endpoint reporting the given client names.
pub async fn fake_broker(clients: &[&str]) -> HostPort {
    let connections: Vec<serde_json::Value> = clients
        .iter()
        .map(|name| serde_json::json!({ "cid": 1, "name": name }))
        .collect();
    let body = serde_json::json!({ "num_connections": clients.len(), "connections": connections })
        .to_string();

    let router = Router::new().route(
        BROKER_PING_ENDPOINT,
        get(move || {
            let body = body.clone();
            async move { body }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Fake broker failed");
    });
    HostPort::new("127.0.0.1", port).unwrap()
}

pub fn kubeconfig_yaml(context: &str, server: &str) -> String {
    format!(
        r#"apiVersion: v1
kind: Config
clusters:
- name: {context}
  cluster:
    server: {server}
    insecure-skip-tls-verify: true
users:
- name: {context}-user
  user:
    token: {context}-token
contexts:
- name: {context}
  context:
    cluster: {context}
    user: {context}-user
    namespace: meshery
current-context: {context}
"#
    )
}
