/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::{fake_broker, kubeconfig_yaml};
use std::fs;
use tempfile::tempdir;
use waypoint_agent::cli::commands;
use waypoint_utils::Settings;

#[tokio::test]
async fn test_ping_finds_client() {
    let settings = Settings::new(None).unwrap();
    let monitor = fake_broker(&["agent-1", "agent-7"]).await;

    let endpoint = monitor.to_string();
    assert!(commands::ping(&settings, &endpoint, "agent-7").await.unwrap());
    assert!(!commands::ping(&settings, &endpoint, "agent-2").await.unwrap());
}

#[tokio::test]
async fn test_ping_rejects_malformed_endpoint() {
    let settings = Settings::new(None).unwrap();
    assert!(commands::ping(&settings, "no-port", "agent-1").await.is_err());
}

#[test]
fn test_explicit_file_wins_and_is_persisted() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("explicit.yaml");
    let output = dir.path().join("normalized").join("config");
    fs::write(&file, kubeconfig_yaml("explicit", "https://10.0.0.9:6443")).unwrap();

    let settings = Settings::new(None).unwrap();
    let resolved =
        commands::resolve_kubeconfig(&settings, Some(&file), Some(output.clone())).unwrap();

    assert_eq!(resolved.current_context(), "explicit");
    assert_eq!(resolved.persisted_path(), Some(output.as_path()));
    assert_eq!(resolved.api_server_host().as_deref(), Some("10.0.0.9"));
}

#[test]
fn test_init_starts_logger_with_default_settings() {
    let settings = commands::init(None).unwrap();
    assert_eq!(settings.log.level, "info");

    // A second call reuses the installed logger.
    assert!(commands::init(None).is_ok());
}
