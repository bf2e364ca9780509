// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Users API endpoint module
//!
//! Provides POST /api/v1/users for finding an object in top users' avatars.

pub mod handler;
pub mod request;

pub use handler::users_handler;
pub use request::{is_blank, DetectionQuery};
