/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

pub mod normalize;
pub mod resolver;

pub use kube::config::Kubeconfig;
pub use normalize::{normalize_bytes, normalize_config, normalize_file, NormalizedKubeconfig};
pub use resolver::{DiscoveryEnv, InClusterEnv, KubeconfigResolver, KubeconfigSource};

use crate::errors::ConnectError;
use waypoint_utils::logging::prelude::*;

/// Resolves a kubeconfig, logging every attempt and the outcome.
pub fn resolve_logged(
    resolver: &KubeconfigResolver,
    sources: &[KubeconfigSource],
) -> Result<NormalizedKubeconfig, ConnectError> {
    let result = resolver.resolve_with(sources, |source, outcome| match outcome {
        Ok(_) => debug!("Kubeconfig source {} is usable", source.describe()),
        Err(e) => debug!("Kubeconfig source {} rejected: {}", source.describe(), e),
    });

    match &result {
        Ok(normalized) => info!(
            "Using kubeconfig context '{}'",
            normalized.current_context()
        ),
        Err(e) => warn!("{}", e),
    }
    result
}
