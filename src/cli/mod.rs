// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod top_users;

use clap::Parser;

pub use top_users::{fetch_top_users, render_users, ListingError, TopUsersArgs};

/// List StackExchange top users
#[derive(Parser, Debug)]
#[command(name = "top-users")]
#[command(version)]
#[command(about = "Print display names and avatar URLs of top StackExchange users", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub args: TopUsersArgs,
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<(), ListingError> {
    top_users::list_top_users(cli.args).await
}
