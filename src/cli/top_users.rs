// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use clap::Args;
use thiserror::Error;
use tracing::info;

use crate::directory::{
    DirectoryClient, DirectoryError, StackExchangeClient, TopUsersQuery, UserRecord,
    DEFAULT_BASE_URL, DEFAULT_SITE,
};

/// Arguments for the top-users listing
#[derive(Args, Debug, Clone)]
pub struct TopUsersArgs {
    /// Page of results to request
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Users per page (1-100)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: u32,

    /// Sort direction (asc/desc)
    #[arg(long, default_value = "desc")]
    pub order: String,

    /// Sort field
    #[arg(long, default_value = "reputation")]
    pub sort: String,

    /// StackExchange site
    #[arg(long, env = "DIRECTORY_SITE", default_value = DEFAULT_SITE)]
    pub site: String,

    /// Directory API root
    #[arg(long, env = "DIRECTORY_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,
}

impl TopUsersArgs {
    pub fn query(&self) -> TopUsersQuery {
        TopUsersQuery {
            page: self.page,
            pagesize: self.page_size,
            order: self.order.clone(),
            sort: self.sort.clone(),
        }
    }
}

/// Outcome of a listing run
#[derive(Debug, Error)]
pub enum ListingError {
    /// Directory answered with a non-success status
    #[error("Error: {0}")]
    Status(u16),
    #[error("Error: {0}")]
    Other(anyhow::Error),
}

/// Fetch one page of top users from the directory
pub async fn fetch_top_users(args: &TopUsersArgs) -> Result<Vec<UserRecord>, ListingError> {
    let client = StackExchangeClient::new(&args.base_url, &args.site, None)
        .map_err(ListingError::Other)?;

    info!("Fetching top users from {}", client.users_endpoint());

    client
        .fetch_top_users(&args.query())
        .await
        .map_err(|e| match e {
            DirectoryError::Proxy(proxy) => ListingError::Status(proxy.status),
            other => ListingError::Other(other.into()),
        })
}

/// Two output lines per user
pub fn render_users(users: &[UserRecord]) -> Vec<String> {
    users
        .iter()
        .flat_map(|user| {
            [
                format!("Display Name: {}", user.display_name),
                format!(
                    "Profile Image: {}",
                    user.profile_image.as_deref().unwrap_or("")
                ),
            ]
        })
        .collect()
}

pub async fn list_top_users(args: TopUsersArgs) -> Result<(), ListingError> {
    let users = fetch_top_users(&args).await?;
    for line in render_users(&users) {
        println!("{}", line);
    }
    Ok(())
}
