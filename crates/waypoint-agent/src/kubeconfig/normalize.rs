/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Kubeconfig Normalization
//!
//! Turns raw kubeconfig bytes (or a file) into a self-contained, single-context
//! document. Each stage aborts the pipeline with its own error kind:
//!
//! | stage | failure |
//! |---|---|
//! | parse | `LoadConfig` |
//! | minify to the active context | `ValidateConfig` |
//! | flatten referenced files into `*-data` | `ValidateConfig` |
//! | validate | `ValidateConfig` |
//! | serialize | `ConvertToByte` |
//! | persist (only with an output path) | `WriteFile` |
//!
//! The structured config and its canonical bytes come out of the same pass and
//! are never updated independently afterwards.

use crate::errors::ConnectError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kube::config::{
    AuthInfo, Cluster, KubeConfigOptions, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext,
};
use secrecy::{ExposeSecret, SecretString};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const API_VERSION: &str = "v1";
const KIND: &str = "Config";

/// A validated kubeconfig together with its canonical serialized form.
#[derive(Debug, Clone)]
pub struct NormalizedKubeconfig {
    config: Kubeconfig,
    bytes: Vec<u8>,
    persisted: Option<PathBuf>,
}

impl NormalizedKubeconfig {
    pub fn config(&self) -> &Kubeconfig {
        &self.config
    }

    /// Canonical YAML bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_yaml(&self) -> &str {
        // Produced by serde_yaml, always UTF-8.
        std::str::from_utf8(&self.bytes).unwrap_or_default()
    }

    /// Where the canonical bytes were written, when persistence was requested.
    pub fn persisted_path(&self) -> Option<&Path> {
        self.persisted.as_deref()
    }

    pub fn current_context(&self) -> &str {
        self.config.current_context.as_deref().unwrap_or_default()
    }

    /// The single cluster left after minification.
    pub fn active_cluster(&self) -> Option<&Cluster> {
        let context = find_context(&self.config, self.current_context())?
            .context
            .as_ref()?;
        find_cluster(&self.config, &context.cluster)?.cluster.as_ref()
    }

    /// Credentials of the active context, if it names a user.
    pub fn active_user(&self) -> Option<&AuthInfo> {
        let context = find_context(&self.config, self.current_context())?
            .context
            .as_ref()?;
        find_auth_info(&self.config, &context.user)?.auth_info.as_ref()
    }

    /// Hostname of the active cluster's API server, without brackets or port.
    pub fn api_server_host(&self) -> Option<String> {
        let server = self.active_cluster()?.server.as_deref()?;
        let url = url::Url::parse(server).ok()?;
        url.host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_string())
    }

    /// Builds the client configuration handed to Kubernetes collaborators.
    pub async fn rest_config(&self) -> Result<kube::Config, ConnectError> {
        kube::Config::from_custom_kubeconfig(self.config.clone(), &KubeConfigOptions::default())
            .await
            .map_err(|e| ConnectError::RestConfig(e.to_string()))
    }
}

/// Normalizes in-memory kubeconfig bytes.
///
/// Relative credential paths inside the document resolve against the current
/// working directory.
pub fn normalize_bytes(
    raw: &[u8],
    output: Option<&Path>,
) -> Result<NormalizedKubeconfig, ConnectError> {
    let config = load(raw)?;
    process(config, None, output)
}

/// Normalizes a kubeconfig file. Relative credential paths resolve against the
/// file's directory.
pub fn normalize_file(
    path: &Path,
    output: Option<&Path>,
) -> Result<NormalizedKubeconfig, ConnectError> {
    let raw = fs::read(path)
        .map_err(|e| ConnectError::LoadConfig(format!("{}: {}", path.display(), e)))?;
    let config = load(&raw)?;
    process(config, path.parent(), output)
}

/// Normalizes an already-structured config, skipping the parse stage.
pub fn normalize_config(
    config: Kubeconfig,
    output: Option<&Path>,
) -> Result<NormalizedKubeconfig, ConnectError> {
    process(config, None, output)
}

/// Parses one or more YAML (or JSON) documents; multiple documents merge with
/// the first occurrence of each name winning.
fn load(raw: &[u8]) -> Result<Kubeconfig, ConnectError> {
    let text = std::str::from_utf8(raw)
        .map_err(|e| ConnectError::LoadConfig(format!("kubeconfig is not UTF-8: {}", e)))?;
    if text.trim().is_empty() {
        return Err(ConnectError::LoadConfig("kubeconfig is empty".to_string()));
    }
    let config = Kubeconfig::from_yaml(text).map_err(|e| ConnectError::LoadConfig(e.to_string()))?;
    match config.kind.as_deref() {
        None | Some("") | Some(KIND) => Ok(config),
        Some(other) => Err(ConnectError::LoadConfig(format!(
            "unexpected kind {:?}, expected {:?}",
            other, KIND
        ))),
    }
}

fn process(
    config: Kubeconfig,
    base_dir: Option<&Path>,
    output: Option<&Path>,
) -> Result<NormalizedKubeconfig, ConnectError> {
    let mut config = minify(config)?;
    flatten(&mut config, base_dir)?;
    validate(&config)?;

    config.api_version = Some(API_VERSION.to_string());
    config.kind = Some(KIND.to_string());
    let bytes = serde_yaml::to_string(&config)
        .map_err(|e| ConnectError::ConvertToByte(e.to_string()))?
        .into_bytes();

    let persisted = match output {
        Some(path) => {
            persist(path, &bytes)?;
            Some(path.to_path_buf())
        }
        None => None,
    };

    Ok(NormalizedKubeconfig {
        config,
        bytes,
        persisted,
    })
}

fn find_context<'a>(config: &'a Kubeconfig, name: &str) -> Option<&'a NamedContext> {
    config.contexts.iter().find(|c| c.name == name)
}

fn find_cluster<'a>(config: &'a Kubeconfig, name: &str) -> Option<&'a NamedCluster> {
    config.clusters.iter().find(|c| c.name == name)
}

fn find_auth_info<'a>(config: &'a Kubeconfig, name: &str) -> Option<&'a NamedAuthInfo> {
    config.auth_infos.iter().find(|u| u.name == name)
}

/// Reduces the config to the active context and the cluster/user it names.
fn minify(mut config: Kubeconfig) -> Result<Kubeconfig, ConnectError> {
    let current = config
        .current_context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            ConnectError::ValidateConfig("current-context must be set to minify".to_string())
        })?
        .to_string();

    let context = find_context(&config, &current).cloned().ok_or_else(|| {
        ConnectError::ValidateConfig(format!("cannot locate context {:?}", current))
    })?;
    let (cluster_name, user_name) = context
        .context
        .as_ref()
        .map(|c| (c.cluster.clone(), c.user.clone()))
        .unwrap_or_default();

    let cluster = find_cluster(&config, &cluster_name)
        .cloned()
        .ok_or_else(|| {
            ConnectError::ValidateConfig(format!("cannot locate cluster {:?}", cluster_name))
        })?;
    let user = if user_name.is_empty() {
        None
    } else {
        let user = find_auth_info(&config, &user_name).cloned().ok_or_else(|| {
            ConnectError::ValidateConfig(format!("cannot locate user {:?}", user_name))
        })?;
        Some(user)
    };

    config.contexts = vec![context];
    config.clusters = vec![cluster];
    config.auth_infos = user.into_iter().collect();
    config.current_context = Some(current);
    Ok(config)
}

/// Inlines every file-referenced credential so the config is self-contained.
///
/// A field given both as a path and inline is rejected rather than letting
/// either form silently win.
fn flatten(config: &mut Kubeconfig, base_dir: Option<&Path>) -> Result<(), ConnectError> {
    for named in &mut config.clusters {
        let Some(cluster) = named.cluster.as_mut() else {
            continue;
        };
        if let Some(path) = take_path(&mut cluster.certificate_authority) {
            if cluster.certificate_authority_data.is_some() {
                return Err(both_set(&named.name, "certificate-authority"));
            }
            cluster.certificate_authority_data =
                Some(STANDARD.encode(read_referenced(&path, base_dir, "certificate-authority")?));
        }
    }

    for named in &mut config.auth_infos {
        let Some(user) = named.auth_info.as_mut() else {
            continue;
        };
        if let Some(path) = take_path(&mut user.client_certificate) {
            if user.client_certificate_data.is_some() {
                return Err(both_set(&named.name, "client-certificate"));
            }
            user.client_certificate_data =
                Some(STANDARD.encode(read_referenced(&path, base_dir, "client-certificate")?));
        }
        if let Some(path) = take_path(&mut user.client_key) {
            if user.client_key_data.is_some() {
                return Err(both_set(&named.name, "client-key"));
            }
            user.client_key_data = Some(SecretString::new(
                STANDARD.encode(read_referenced(&path, base_dir, "client-key")?),
            ));
        }
        if let Some(path) = take_path(&mut user.token_file) {
            if user.token.is_some() {
                return Err(ConnectError::ValidateConfig(format!(
                    "{:?}: token and tokenFile are both set",
                    named.name
                )));
            }
            let token = read_referenced(&path, base_dir, "tokenFile")?;
            let token = String::from_utf8(token).map_err(|_| {
                ConnectError::ValidateConfig(format!("tokenFile {} is not UTF-8", path))
            })?;
            user.token = Some(SecretString::new(token.trim().to_string()));
        }
    }
    Ok(())
}

fn both_set(owner: &str, field: &str) -> ConnectError {
    ConnectError::ValidateConfig(format!(
        "{:?}: {} and {}-data are both set",
        owner, field, field
    ))
}

fn take_path(field: &mut Option<String>) -> Option<String> {
    field.take().filter(|p| !p.trim().is_empty())
}

fn read_referenced(
    path: &str,
    base_dir: Option<&Path>,
    field: &str,
) -> Result<Vec<u8>, ConnectError> {
    let path = Path::new(path);
    let resolved = match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    };
    fs::read(&resolved).map_err(|e| {
        ConnectError::ValidateConfig(format!(
            "unable to read {} {}: {}",
            field,
            resolved.display(),
            e
        ))
    })
}

/// Checks required fields and internal references, reporting every problem at once.
fn validate(config: &Kubeconfig) -> Result<(), ConnectError> {
    let mut problems = Vec::new();

    if config.contexts.is_empty() {
        problems.push("no contexts defined".to_string());
    }
    if let Some(current) = config.current_context.as_deref() {
        if find_context(config, current).is_none() {
            problems.push(format!("current-context {:?} does not exist", current));
        }
    }

    for named in &config.contexts {
        let (cluster, user) = named
            .context
            .as_ref()
            .map(|c| (c.cluster.as_str(), c.user.as_str()))
            .unwrap_or_default();
        if cluster.is_empty() {
            problems.push(format!("context {:?}: cluster is required", named.name));
        } else if find_cluster(config, cluster).is_none() {
            problems.push(format!(
                "context {:?}: cluster {:?} does not exist",
                named.name, cluster
            ));
        }
        if !user.is_empty() && find_auth_info(config, user).is_none() {
            problems.push(format!(
                "context {:?}: user {:?} does not exist",
                named.name, user
            ));
        }
    }

    let no_cluster = Cluster::default();
    for named in &config.clusters {
        validate_cluster(
            &named.name,
            named.cluster.as_ref().unwrap_or(&no_cluster),
            &mut problems,
        );
    }
    for named in &config.auth_infos {
        if let Some(user) = named.auth_info.as_ref() {
            validate_user(&named.name, user, &mut problems);
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ConnectError::ValidateConfig(problems.join("; ")))
    }
}

fn validate_cluster(name: &str, cluster: &Cluster, problems: &mut Vec<String>) {
    match cluster.server.as_deref().map(str::trim) {
        None | Some("") => problems.push(format!("cluster {:?}: server is required", name)),
        Some(server) => {
            if let Err(e) = url::Url::parse(server) {
                problems.push(format!("cluster {:?}: invalid server {:?}: {}", name, server, e));
            }
        }
    }
    if cluster.insecure_skip_tls_verify == Some(true)
        && (cluster.certificate_authority.is_some() || cluster.certificate_authority_data.is_some())
    {
        problems.push(format!(
            "cluster {:?}: insecure-skip-tls-verify cannot be combined with a certificate authority",
            name
        ));
    }
    check_base64(
        name,
        "certificate-authority-data",
        cluster.certificate_authority_data.as_deref(),
        problems,
    );
}

fn validate_user(name: &str, user: &AuthInfo, problems: &mut Vec<String>) {
    let has_cert = user.client_certificate.is_some() || user.client_certificate_data.is_some();
    let has_key = user.client_key.is_some() || user.client_key_data.is_some();
    if has_cert != has_key {
        problems.push(format!(
            "user {:?}: client certificate and client key must be set together",
            name
        ));
    }
    let has_basic = user.username.is_some() || user.password.is_some();
    if user.token.is_some() && has_basic {
        problems.push(format!(
            "user {:?}: token and basic auth are mutually exclusive",
            name
        ));
    }
    if user.exec.is_some() && user.auth_provider.is_some() {
        problems.push(format!(
            "user {:?}: exec and auth-provider are mutually exclusive",
            name
        ));
    }
    check_base64(
        name,
        "client-certificate-data",
        user.client_certificate_data.as_deref(),
        problems,
    );
    check_base64(
        name,
        "client-key-data",
        user.client_key_data
            .as_ref()
            .map(|key| key.expose_secret().as_str()),
        problems,
    );
}

fn check_base64(owner: &str, field: &str, value: Option<&str>, problems: &mut Vec<String>) {
    if let Some(value) = value {
        if STANDARD.decode(value.trim()).is_err() {
            problems.push(format!("{:?}: {} is not valid base64", owner, field));
        }
    }
}

fn persist(path: &Path, bytes: &[u8]) -> Result<(), ConnectError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ConnectError::write_file(path, e))?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .map_err(|e| ConnectError::write_file(path, e))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .map_err(|e| ConnectError::write_file(path, e))
}
