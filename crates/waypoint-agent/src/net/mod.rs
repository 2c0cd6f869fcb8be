/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Network primitives: validated `host:port` pairs and TCP reachability probing.

pub mod host_port;
pub mod probe;

pub use host_port::HostPort;
pub use probe::{ReachabilityProbe, TcpProbe};
