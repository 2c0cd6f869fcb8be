/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Error type shared by the connectivity resolution components.
//!
//! Unreachable candidates are not errors: a tier or source that cannot be
//! reached only disqualifies itself. Errors surface when input is malformed
//! or when every candidate has been exhausted.

use std::fmt;
use std::path::PathBuf;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum ConnectError {
    /// The kubeconfig source could not be read or parsed
    LoadConfig(String),
    /// The kubeconfig is structurally invalid or inconsistent
    ValidateConfig(String),
    /// A validated kubeconfig could not be serialized
    ConvertToByte(String),
    /// The normalized kubeconfig could not be persisted
    WriteFile { path: PathBuf, reason: String },
    /// Every kubeconfig source failed; carries the last source's error
    NoReachableKubeconfig { last: Option<Box<ConnectError>> },
    /// Every broker endpoint tier was unreachable or malformed
    NoReachableBrokerEndpoint,
    /// A collaborator resource locator is missing required segments
    InvalidSourceUrl(String),
    /// An address/port pair was empty or had a non-numeric port
    InvalidHostPort(String),
    /// The normalized kubeconfig could not be turned into a client configuration
    RestConfig(String),
    /// The broker custom resource could not be read
    BrokerStatus(String),
    /// An external collaborator failed
    Collaborator(BoxError),
}

impl fmt::Display for ConnectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectError::LoadConfig(e) => write!(f, "failed to load kubeconfig: {}", e),
            ConnectError::ValidateConfig(e) => write!(f, "invalid kubeconfig: {}", e),
            ConnectError::ConvertToByte(e) => {
                write!(f, "failed to serialize kubeconfig: {}", e)
            }
            ConnectError::WriteFile { path, reason } => {
                write!(f, "failed to write {}: {}", path.display(), reason)
            }
            ConnectError::NoReachableKubeconfig { last: Some(last) } => {
                write!(f, "no usable kubeconfig found, last error: {}", last)
            }
            ConnectError::NoReachableKubeconfig { last: None } => {
                write!(f, "no usable kubeconfig found: no sources given")
            }
            ConnectError::NoReachableBrokerEndpoint => {
                write!(f, "no reachable broker endpoint")
            }
            ConnectError::InvalidSourceUrl(e) => write!(f, "invalid source url: {}", e),
            ConnectError::InvalidHostPort(e) => write!(f, "invalid host:port: {}", e),
            ConnectError::RestConfig(e) => {
                write!(f, "failed to build client configuration: {}", e)
            }
            ConnectError::BrokerStatus(e) => write!(f, "failed to read broker status: {}", e),
            ConnectError::Collaborator(e) => write!(f, "collaborator failed: {}", e),
        }
    }
}

impl std::error::Error for ConnectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectError::NoReachableKubeconfig { last: Some(last) } => Some(last.as_ref()),
            ConnectError::Collaborator(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl ConnectError {
    pub(crate) fn write_file(path: impl Into<PathBuf>, reason: impl fmt::Display) -> Self {
        ConnectError::WriteFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_exhausted_kubeconfig_keeps_last_error() {
        let err = ConnectError::NoReachableKubeconfig {
            last: Some(Box::new(ConnectError::LoadConfig("no such file".to_string()))),
        };

        assert!(err.to_string().contains("no such file"));
        let source = err.source().expect("source should be set");
        assert!(matches!(
            source.downcast_ref::<ConnectError>(),
            Some(ConnectError::LoadConfig(_))
        ));
    }

    #[test]
    fn test_write_file_names_path() {
        let err = ConnectError::write_file("/tmp/out/config", "permission denied");
        assert_eq!(
            err.to_string(),
            "failed to write /tmp/out/config: permission denied"
        );
    }
}
