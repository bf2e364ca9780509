// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote user directory (StackExchange "top users")

pub mod client;
pub mod types;

pub use client::{DirectoryClient, StackExchangeClient, DEFAULT_BASE_URL};
pub use types::{DirectoryError, ProxyError, TopUsersQuery, UserRecord, DEFAULT_SITE};

#[cfg(test)]
pub use client::MockDirectoryClient;
