/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! # Waypoint Agent
//!
//! Waypoint Agent finds a working path from a workload to a Kubernetes cluster
//! and to the message broker running inside it. It works in unpredictable
//! environments: inside the cluster, on a developer laptop, or in a container
//! on the host that runs a local cluster.
//!
//! ## Architecture
//!
//! ### Net Module
//! ```rust,ignore
//! pub mod net;
//! ```
//! Address handling and TCP reachability:
//! - `host:port` parsing and IPv6 bracketing
//! - Timeout-bounded connect probe
//!
//! ### Kubeconfig Module
//! ```rust,ignore
//! pub mod kubeconfig;
//! ```
//! Kubeconfig discovery and normalization:
//! - Prioritized sources (explicit, in-cluster, `$KUBECONFIG`, `~/.kube/config`)
//! - Minify, flatten, validate, serialize, persist
//! - Handoff to a `kube` client configuration
//!
//! ### Broker Module
//! ```rust,ignore
//! pub mod broker;
//! ```
//! Broker reachability:
//! - Broker custom resource status lookup
//! - Tiered endpoint resolution
//! - `/connz` client connectivity check
//!
//! ### Collaborators Module
//! ```rust,ignore
//! pub mod collaborators;
//! ```
//! Boundaries to Helm and repository walking.
//!
//! ## Operation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Agent
//!     participant K8s
//!     participant Broker
//!
//!     Agent->>Agent: Resolve Kubeconfig
//!     Agent->>K8s: Read Broker Status
//!     K8s-->>Agent: internal / external endpoints
//!
//!     loop Tiers until one answers
//!         Agent->>Broker: TCP connect
//!     end
//!
//!     Agent->>Broker: GET /connz
//!     Broker-->>Agent: Connected clients
//! ```
//!
//! ## Configuration
//!
//! ```toml
//! [probe]
//! tcp_timeout_ms = 2000
//! http_timeout_ms = 5000
//!
//! [broker]
//! host_alias = "host.docker.internal"
//! namespace = "meshery"
//! name = "meshery-broker"
//! ```

pub mod broker;
pub mod cli;
pub mod collaborators;
pub mod errors;
pub mod kubeconfig;
pub mod net;

pub use errors::ConnectError;
