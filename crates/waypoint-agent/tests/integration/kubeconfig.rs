/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

use crate::fixtures::kubeconfig_yaml;
use secrecy::ExposeSecret;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;
use waypoint_agent::kubeconfig::{DiscoveryEnv, KubeconfigResolver, KubeconfigSource};
use waypoint_agent::ConnectError;

#[test]
fn test_home_kubeconfig_with_relative_credentials() {
    let home = tempdir().unwrap();
    let kube_dir = home.path().join(".kube");
    fs::create_dir_all(&kube_dir).unwrap();
    fs::write(kube_dir.join("ca.crt"), b"-----BEGIN CERTIFICATE-----").unwrap();
    fs::write(kube_dir.join("token"), b"file-token\n").unwrap();
    fs::write(
        kube_dir.join("config"),
        r#"
clusters:
- name: kind
  cluster:
    server: https://127.0.0.1:6443
    certificate-authority: ca.crt
users:
- name: kind
  user:
    tokenFile: token
contexts:
- name: kind
  context:
    cluster: kind
    user: kind
current-context: kind
"#,
    )
    .unwrap();

    let env = DiscoveryEnv {
        home: Some(home.path().to_path_buf()),
        ..DiscoveryEnv::default()
    };
    let output = home.path().join("out").join("kubeconfig");
    let resolver = KubeconfigResolver::new(env).with_output(&output);

    let sources = resolver.default_sources(None);
    assert_eq!(sources.len(), 2);

    let resolved = resolver.resolve(&sources).unwrap();
    assert_eq!(resolved.current_context(), "kind");
    let cluster = resolved.active_cluster().unwrap();
    assert!(cluster.certificate_authority.is_none());
    assert!(cluster.certificate_authority_data.is_some());
    let user = resolved.active_user().unwrap();
    assert_eq!(
        user.token.as_ref().map(|t| t.expose_secret().as_str()),
        Some("file-token")
    );
    assert!(user.token_file.is_none());

    let written = fs::read_to_string(&output).unwrap();
    assert_eq!(written, resolved.as_yaml());
    assert!(written.contains("kind: Config"));
}

#[cfg(unix)]
#[test]
fn test_persisted_kubeconfig_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let output = dir.path().join("kubeconfig");
    let resolver = KubeconfigResolver::default().with_output(&output);

    resolver
        .resolve(&[KubeconfigSource::ExplicitBytes(
            kubeconfig_yaml("dev", "https://10.0.0.1:6443").into_bytes(),
        )])
        .unwrap();

    let mode = fs::metadata(&output).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_invalid_explicit_falls_back_to_env_path() {
    let dir = tempdir().unwrap();
    let env_file = dir.path().join("config");
    fs::write(&env_file, kubeconfig_yaml("from-env", "https://10.0.0.2:6443")).unwrap();

    let env = DiscoveryEnv {
        kubeconfig_env: Some(env_file.display().to_string()),
        ..DiscoveryEnv::default()
    };
    let resolver = KubeconfigResolver::new(env);
    let sources = resolver.default_sources(Some(b"current-context: missing".to_vec()));

    let resolved = resolver.resolve(&sources).unwrap();
    assert_eq!(resolved.current_context(), "from-env");
}

#[test]
fn test_every_source_failing() {
    let env = DiscoveryEnv {
        kubeconfig_env: Some("/nonexistent/kubeconfig".to_string()),
        home: Some(PathBuf::from("/nonexistent-home")),
        ..DiscoveryEnv::default()
    };
    let resolver = KubeconfigResolver::new(env);

    let err = resolver.resolve(&resolver.default_sources(None)).unwrap_err();
    assert!(matches!(err, ConnectError::NoReachableKubeconfig { last: Some(_) }));
    assert!(err.to_string().contains("/nonexistent-home"));
}

#[tokio::test]
async fn test_rest_config_from_resolved_kubeconfig() {
    let resolver = KubeconfigResolver::default();
    let resolved = resolver
        .resolve(&[KubeconfigSource::ExplicitBytes(
            kubeconfig_yaml("dev", "https://[fd00::1]:6443").into_bytes(),
        )])
        .unwrap();

    assert_eq!(resolved.api_server_host().as_deref(), Some("fd00::1"));
    let rest = resolved.rest_config().await.unwrap();
    assert_eq!(rest.default_namespace, "meshery");
}

#[test]
#[serial]
fn test_discovery_env_reads_configured_variable() {
    std::env::set_var("WAYPOINT_TEST_KUBECONFIG", "/tmp/first:/tmp/second");
    let env = DiscoveryEnv::from_process("WAYPOINT_TEST_KUBECONFIG");
    std::env::remove_var("WAYPOINT_TEST_KUBECONFIG");

    assert_eq!(env.env_path(), Some(PathBuf::from("/tmp/first")));
}
