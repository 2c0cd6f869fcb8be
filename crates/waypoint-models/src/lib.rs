/*
 * Copyright (c) 2025 Dylan Storey
 * Licensed under the Elastic License 2.0.
 * See LICENSE file in the project root for full license text.
 */

//! Data types shared across the Waypoint crates: broker status records,
//! broker diagnostic payloads and Helm chart requests.
pub mod models;
