// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Core types for the StackExchange user directory

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// StackExchange site queried for top users
pub const DEFAULT_SITE: &str = "stackoverflow";

fn default_page() -> u32 {
    1
}

fn default_pagesize() -> u32 {
    10
}

fn default_order() -> String {
    "desc".to_string()
}

fn default_sort() -> String {
    "reputation".to_string()
}

/// Pagination and sort parameters for the `/users` endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUsersQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_pagesize")]
    pub pagesize: u32,
    /// `asc` or `desc`
    #[serde(default = "default_order")]
    pub order: String,
    /// Sort field (reputation, creation, name, modified)
    #[serde(default = "default_sort")]
    pub sort: String,
}

impl Default for TopUsersQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            pagesize: default_pagesize(),
            order: default_order(),
            sort: default_sort(),
        }
    }
}

/// A user entry as returned by the directory API
///
/// Only the fields this service reads are kept; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: i64,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

/// Envelope of a `/users` response
#[derive(Debug, Deserialize)]
pub(crate) struct UsersEnvelope {
    #[serde(default)]
    pub items: Vec<UserRecord>,
}

/// The directory answered with a non-success status
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ProxyError {
    /// HTTP status reported by the remote API
    pub status: u16,
    pub message: String,
}

impl ProxyError {
    pub fn from_status(status: u16) -> Self {
        Self {
            status,
            message: format!(
                "Failed to fetch top users from the StackExchange API (status code {})",
                status
            ),
        }
    }
}

/// Errors that can occur while talking to the directory
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error(transparent)]
    Proxy(#[from] ProxyError),

    #[error("Directory request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid directory response: {0}")]
    InvalidBody(String),
}
