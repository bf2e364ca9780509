// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! StackExchange users API client

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{DirectoryError, ProxyError, TopUsersQuery, UserRecord, UsersEnvelope};

pub const DEFAULT_BASE_URL: &str = "https://api.stackexchange.com/2.2";

const USER_AGENT: &str = concat!("avatar-object-detector/", env!("CARGO_PKG_VERSION"));

/// Source of "top users" records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetch one page of users
    ///
    /// A non-success status from the remote API is returned as
    /// [`DirectoryError::Proxy`].
    async fn fetch_top_users(
        &self,
        query: &TopUsersQuery,
    ) -> Result<Vec<UserRecord>, DirectoryError>;
}

/// Directory client backed by the public StackExchange API
pub struct StackExchangeClient {
    client: Client,
    users_endpoint: String,
    site: String,
}

impl StackExchangeClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://api.stackexchange.com/2.2`
    /// * `site` - StackExchange site parameter
    /// * `timeout` - Optional request timeout; `None` waits indefinitely
    pub fn new(base_url: &str, site: &str, timeout: Option<Duration>) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid directory base URL: {}", base_url))?;

        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        let users_endpoint = format!("{}/users", base.as_str().trim_end_matches('/'));
        info!(
            "Directory client configured: endpoint={}, site={}, timeout={:?}",
            users_endpoint, site, timeout
        );

        Ok(Self {
            client,
            users_endpoint,
            site: site.to_string(),
        })
    }

    /// Fully qualified `/users` endpoint
    pub fn users_endpoint(&self) -> &str {
        &self.users_endpoint
    }
}

#[async_trait]
impl DirectoryClient for StackExchangeClient {
    async fn fetch_top_users(
        &self,
        query: &TopUsersQuery,
    ) -> Result<Vec<UserRecord>, DirectoryError> {
        debug!(
            "Fetching top users: page={}, pagesize={}, order={}, sort={}",
            query.page, query.pagesize, query.order, query.sort
        );

        let response = self
            .client
            .get(&self.users_endpoint)
            .query(&[
                ("site", self.site.as_str()),
                ("page", &query.page.to_string()),
                ("pagesize", &query.pagesize.to_string()),
                ("order", query.order.as_str()),
                ("sort", query.sort.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Directory request failed with status {}", status);
            return Err(ProxyError::from_status(status.as_u16()).into());
        }

        let envelope: UsersEnvelope = response
            .json()
            .await
            .map_err(|e| DirectoryError::InvalidBody(e.to_string()))?;

        debug!("Directory returned {} users", envelope.items.len());
        Ok(envelope.items)
    }
}
