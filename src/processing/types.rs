// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-user detection results

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::directory::UserRecord;
use crate::vision::{Detection, FetchError};

/// Detection outcome for one user
///
/// `object_detected` is always `!bounding_boxes.is_empty()`; build values with
/// [`ProcessedResult::skeleton`] and [`ProcessedResult::with_detections`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResult {
    pub user_id: i64,
    pub display_name: String,
    pub profile_image: Option<String>,
    pub object_detected: bool,
    pub bounding_boxes: Vec<Detection>,
    pub detection_time_ms: f64,
}

impl ProcessedResult {
    /// Result with no detections and zero latency
    pub fn skeleton(user: &UserRecord) -> Self {
        Self {
            user_id: user.user_id,
            display_name: user.display_name.clone(),
            profile_image: user.profile_image.clone(),
            object_detected: false,
            bounding_boxes: Vec::new(),
            detection_time_ms: 0.0,
        }
    }

    pub fn with_detections(mut self, boxes: Vec<Detection>, elapsed: Duration) -> Self {
        self.object_detected = !boxes.is_empty();
        self.bounding_boxes = boxes;
        self.detection_time_ms = elapsed.as_secs_f64() * 1000.0;
        self
    }
}

/// Unexpected failures while processing a user
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Object detection failed for user {user_id}: {reason}")]
    Detection { user_id: i64, reason: String },

    #[error("Detection task for user {user_id} did not complete: {source}")]
    Task {
        user_id: i64,
        #[source]
        source: tokio::task::JoinError,
    },
}
