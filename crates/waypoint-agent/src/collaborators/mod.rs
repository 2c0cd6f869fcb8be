/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Boundaries to external systems the agent drives but does not implement:
//! Helm release management and repository walking.

pub mod charts;
pub mod git;

pub use charts::{apply_operator_chart, operator_chart_request, ChartApplier};
pub use git::{
    collect_manifests, ChartToManifestConverter, GitSourceUrl, RepoWalker, WalkRequest,
    WalkVisitor, WalkedDir, WalkedFile,
};
