// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-user avatar processing

pub mod types;
pub mod user;

pub use types::{ProcessedResult, ProcessingError};
pub use user::UserProcessor;
