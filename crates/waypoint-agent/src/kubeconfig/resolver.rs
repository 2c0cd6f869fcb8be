/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Kubeconfig Discovery
//!
//! Walks kubeconfig sources in a fixed priority order and returns the first one
//! that normalizes successfully:
//!
//! ```mermaid
//! flowchart LR
//!     A[Explicit bytes] -->|fails| B[In-cluster service account]
//!     B -->|fails| C[$KUBECONFIG path]
//!     C -->|fails| D[~/.kube/config]
//!     D -->|fails| E[NoReachableKubeconfig]
//! ```
//!
//! Sources are never merged. Everything read from the process environment is
//! captured once in a [`DiscoveryEnv`] so resolution itself stays free of
//! ambient reads.

use crate::errors::ConnectError;
use crate::kubeconfig::normalize::{
    normalize_bytes, normalize_config, normalize_file, NormalizedKubeconfig,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use kube::config::{
    AuthInfo, Cluster, Context, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext,
};
use secrecy::SecretString;
use std::fs;
use std::path::{Path, PathBuf};

pub const SERVICE_ACCOUNT_TOKEN_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";
pub const SERVICE_ACCOUNT_CA_PATH: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";
pub const SERVICE_HOST_ENV: &str = "KUBERNETES_SERVICE_HOST";
pub const SERVICE_PORT_ENV: &str = "KUBERNETES_SERVICE_PORT";
const IN_CLUSTER_NAME: &str = "in-cluster";

/// One place a kubeconfig may come from. Variant order is resolution priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeconfigSource {
    /// Raw content supplied by the caller
    ExplicitBytes(Vec<u8>),
    /// Service-account credentials of the workload running inside the cluster
    InCluster,
    /// Path named by the kubeconfig environment variable
    EnvPath(PathBuf),
    /// `<home>/.kube/config`
    DefaultPath(PathBuf),
}

impl KubeconfigSource {
    pub fn priority(&self) -> u8 {
        match self {
            KubeconfigSource::ExplicitBytes(_) => 0,
            KubeconfigSource::InCluster => 1,
            KubeconfigSource::EnvPath(_) => 2,
            KubeconfigSource::DefaultPath(_) => 3,
        }
    }

    /// Short description for diagnostics; never includes credential content.
    pub fn describe(&self) -> String {
        match self {
            KubeconfigSource::ExplicitBytes(bytes) => format!("explicit ({} bytes)", bytes.len()),
            KubeconfigSource::InCluster => "in-cluster service account".to_string(),
            KubeconfigSource::EnvPath(path) => format!("env path {}", path.display()),
            KubeconfigSource::DefaultPath(path) => format!("default path {}", path.display()),
        }
    }
}

/// In-cluster service-account settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InClusterEnv {
    pub service_host: Option<String>,
    pub service_port: Option<String>,
    pub token_path: PathBuf,
    pub ca_path: PathBuf,
}

impl Default for InClusterEnv {
    fn default() -> Self {
        Self {
            service_host: None,
            service_port: None,
            token_path: PathBuf::from(SERVICE_ACCOUNT_TOKEN_PATH),
            ca_path: PathBuf::from(SERVICE_ACCOUNT_CA_PATH),
        }
    }
}

/// Snapshot of the environment kubeconfig discovery depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryEnv {
    /// Value of the kubeconfig environment variable
    pub kubeconfig_env: Option<String>,
    /// Home directory of the current user
    pub home: Option<PathBuf>,
    pub in_cluster: InClusterEnv,
}

impl DiscoveryEnv {
    /// Captures the current process environment.
    ///
    /// # Arguments
    /// * `env_var` - Name of the variable holding a kubeconfig path, usually `KUBECONFIG`
    pub fn from_process(env_var: &str) -> Self {
        Self {
            kubeconfig_env: std::env::var(env_var).ok(),
            home: dirs::home_dir(),
            in_cluster: InClusterEnv {
                service_host: std::env::var(SERVICE_HOST_ENV).ok(),
                service_port: std::env::var(SERVICE_PORT_ENV).ok(),
                ..InClusterEnv::default()
            },
        }
    }

    /// First non-empty entry of the kubeconfig variable, which may hold a path list.
    pub fn env_path(&self) -> Option<PathBuf> {
        let value = self.kubeconfig_env.as_deref()?.trim();
        if value.is_empty() {
            return None;
        }
        std::env::split_paths(value).find(|p| !p.as_os_str().is_empty())
    }

    pub fn default_path(&self) -> Option<PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(".kube").join("config"))
    }
}

/// Resolves the first usable kubeconfig out of an ordered set of sources.
#[derive(Debug, Clone, Default)]
pub struct KubeconfigResolver {
    env: DiscoveryEnv,
    output: Option<PathBuf>,
}

impl KubeconfigResolver {
    pub fn new(env: DiscoveryEnv) -> Self {
        Self { env, output: None }
    }

    /// Persist the winning kubeconfig to `path`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    pub fn env(&self) -> &DiscoveryEnv {
        &self.env
    }

    /// The conventional source list for this environment.
    ///
    /// Explicit bytes are included only when non-empty; the env and default
    /// paths only when they can be determined.
    pub fn default_sources(&self, explicit: Option<Vec<u8>>) -> Vec<KubeconfigSource> {
        let mut sources = Vec::with_capacity(4);
        if let Some(bytes) = explicit.filter(|b| !b.is_empty()) {
            sources.push(KubeconfigSource::ExplicitBytes(bytes));
        }
        sources.push(KubeconfigSource::InCluster);
        if let Some(path) = self.env.env_path() {
            sources.push(KubeconfigSource::EnvPath(path));
        }
        if let Some(path) = self.env.default_path() {
            sources.push(KubeconfigSource::DefaultPath(path));
        }
        sources
    }

    /// Returns the first source that normalizes successfully.
    ///
    /// # Errors
    /// `NoReachableKubeconfig` carrying the last attempted source's error when
    /// every source fails, or no inner error when `sources` is empty.
    pub fn resolve(
        &self,
        sources: &[KubeconfigSource],
    ) -> Result<NormalizedKubeconfig, ConnectError> {
        self.resolve_with(sources, |_, _| {})
    }

    /// Like [`resolve`](Self::resolve), reporting each attempt's outcome to `observe`.
    pub fn resolve_with<F>(
        &self,
        sources: &[KubeconfigSource],
        mut observe: F,
    ) -> Result<NormalizedKubeconfig, ConnectError>
    where
        F: FnMut(&KubeconfigSource, Result<&NormalizedKubeconfig, &ConnectError>),
    {
        let mut ordered: Vec<&KubeconfigSource> = sources.iter().collect();
        ordered.sort_by_key(|s| s.priority());

        let mut last = None;
        for source in ordered {
            match self.attempt(source) {
                Ok(normalized) => {
                    observe(source, Ok(&normalized));
                    return Ok(normalized);
                }
                Err(e) => {
                    observe(source, Err(&e));
                    last = Some(Box::new(e));
                }
            }
        }
        Err(ConnectError::NoReachableKubeconfig { last })
    }

    /// Loads and normalizes a single source.
    pub fn attempt(&self, source: &KubeconfigSource) -> Result<NormalizedKubeconfig, ConnectError> {
        let output = self.output.as_deref();
        match source {
            KubeconfigSource::ExplicitBytes(bytes) => normalize_bytes(bytes, output),
            KubeconfigSource::InCluster => normalize_config(self.in_cluster_config()?, output),
            KubeconfigSource::EnvPath(path) | KubeconfigSource::DefaultPath(path) => {
                normalize_file(path, output)
            }
        }
    }

    /// Materializes a single-context kubeconfig from service-account credentials.
    fn in_cluster_config(&self) -> Result<Kubeconfig, ConnectError> {
        let in_cluster = &self.env.in_cluster;
        let (host, port) = match (
            non_empty(in_cluster.service_host.as_deref()),
            non_empty(in_cluster.service_port.as_deref()),
        ) {
            (Some(host), Some(port)) => (host, port),
            _ => {
                return Err(ConnectError::LoadConfig(format!(
                    "not running in a cluster: {} and {} must be set",
                    SERVICE_HOST_ENV, SERVICE_PORT_ENV
                )))
            }
        };

        let token = read_credential(&in_cluster.token_path)?;
        let token = String::from_utf8(token).map_err(|_| {
            ConnectError::LoadConfig(format!(
                "{} is not UTF-8",
                in_cluster.token_path.display()
            ))
        })?;
        let ca = read_credential(&in_cluster.ca_path)?;

        let server = if host.contains(':') {
            format!("https://[{}]:{}", host, port)
        } else {
            format!("https://{}:{}", host, port)
        };

        Ok(Kubeconfig {
            clusters: vec![NamedCluster {
                name: IN_CLUSTER_NAME.to_string(),
                cluster: Some(Cluster {
                    server: Some(server),
                    certificate_authority_data: Some(STANDARD.encode(ca)),
                    ..Cluster::default()
                }),
            }],
            auth_infos: vec![NamedAuthInfo {
                name: IN_CLUSTER_NAME.to_string(),
                auth_info: Some(AuthInfo {
                    token: Some(SecretString::new(token.trim().to_string())),
                    ..AuthInfo::default()
                }),
            }],
            contexts: vec![NamedContext {
                name: IN_CLUSTER_NAME.to_string(),
                context: Some(Context {
                    cluster: IN_CLUSTER_NAME.to_string(),
                    user: IN_CLUSTER_NAME.to_string(),
                    ..Context::default()
                }),
            }],
            current_context: Some(IN_CLUSTER_NAME.to_string()),
            ..Kubeconfig::default()
        })
    }
}

fn read_credential(path: &Path) -> Result<Vec<u8>, ConnectError> {
    fs::read(path).map_err(|e| ConnectError::LoadConfig(format!("{}: {}", path.display(), e)))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
