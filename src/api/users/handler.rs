// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Users detection endpoint handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::request::{DetectionQuery, INVALID_JSON};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::processing::ProcessedResult;

/// POST /api/v1/users - Find top users whose avatar shows an object
///
/// # Request
/// - `query.object`: Object label to look for (required, e.g. "person")
///
/// # Response
/// 201 with one entry per directory user, in directory order:
/// - `user_id`, `display_name`, `profile_image`
/// - `object_detected`: whether any box matched
/// - `bounding_boxes`: matching detections (`label`, `score`, `box`)
/// - `detection_time_ms`: latency for this user
///
/// # Errors
/// - 400 Bad Request: missing or malformed `query.object`
/// - 500 Internal Server Error: directory failure (message carries the remote
///   status) or an unexpected processing failure
pub async fn users_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<ProcessedResult>>), ApiError> {
    // 1. Validate request
    let Json(body) = body.map_err(|rejection| {
        warn!("Rejected request body: {}", rejection);
        ApiError::ValidationError(INVALID_JSON.to_string())
    })?;

    let query = DetectionQuery::from_body(&body).map_err(|e| {
        warn!("Users request validation failed: {}", e);
        e
    })?;
    debug!("Users request received for object '{}'", query.object);

    // 2. Fetch top users
    let users = state
        .directory
        .fetch_top_users(&state.users_query)
        .await
        .map_err(|e| {
            error!("Failed to fetch top users: {}", e);
            ApiError::from(e)
        })?;

    // 3. Run detection per user, in order
    let start = Instant::now();
    let results = state
        .processor
        .process_users(&users, &query.object)
        .await
        .map_err(|e| {
            error!("User processing failed: {}", e);
            ApiError::InternalError
        })?;

    let detected = results.iter().filter(|r| r.object_detected).count();
    info!(
        "Users request complete: '{}' found in {}/{} avatars, {}ms",
        query.object,
        detected,
        results.len(),
        start.elapsed().as_millis()
    );

    Ok((StatusCode::CREATED, Json(results)))
}
