// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod directory;
pub mod processing;
pub mod vision;

// Re-export main types
pub use api::{create_app, AppState};
pub use config::ServiceConfig;
pub use directory::{DirectoryClient, StackExchangeClient, TopUsersQuery, UserRecord};
pub use processing::{ProcessedResult, UserProcessor};
pub use vision::{Detection, DetectorAdapter, ObjectDetector};
