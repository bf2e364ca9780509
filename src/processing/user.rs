// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Fetch + detect for one user record

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

use super::types::{ProcessedResult, ProcessingError};
use crate::directory::UserRecord;
use crate::vision::{DetectorAdapter, ImageFetcher};

/// Runs the avatar pipeline for users, one at a time
pub struct UserProcessor {
    fetcher: Arc<dyn ImageFetcher>,
    adapter: DetectorAdapter,
}

impl UserProcessor {
    pub fn new(fetcher: Arc<dyn ImageFetcher>, adapter: DetectorAdapter) -> Self {
        Self { fetcher, adapter }
    }

    pub fn detector_name(&self) -> &'static str {
        self.adapter.detector_name()
    }

    /// Look for `label` in one user's profile image
    ///
    /// A missing or blank `profile_image` returns the empty result without any
    /// network call. When the image host answers with a non-success status the
    /// latency covers the failed fetch; otherwise it covers detection only.
    pub async fn process_user(
        &self,
        user: &UserRecord,
        label: &str,
    ) -> Result<ProcessedResult, ProcessingError> {
        let result = ProcessedResult::skeleton(user);

        let url = match user.profile_image.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => {
                debug!("User {} has no profile image, skipping", user.user_id);
                return Ok(result);
            }
        };

        let start = Instant::now();
        let Some(image) = self.fetcher.fetch(url).await? else {
            warn!(
                "Profile image for user {} unavailable, reporting no detection",
                user.user_id
            );
            return Ok(result.with_detections(Vec::new(), start.elapsed()));
        };

        let start = Instant::now();
        let adapter = self.adapter.clone();
        let target = label.to_string();
        let boxes = tokio::task::spawn_blocking(move || adapter.detect_object(&image, &target))
            .await
            .map_err(|source| ProcessingError::Task {
                user_id: user.user_id,
                source,
            })?
            .map_err(|e| ProcessingError::Detection {
                user_id: user.user_id,
                reason: format!("{:#}", e),
            })?;
        let elapsed = start.elapsed();

        debug!(
            "User {}: {} '{}' boxes in {:?}",
            user.user_id,
            boxes.len(),
            label,
            elapsed
        );

        Ok(result.with_detections(boxes, elapsed))
    }

    /// Process users sequentially, preserving input order
    ///
    /// Stops at the first unexpected failure.
    pub async fn process_users(
        &self,
        users: &[UserRecord],
        label: &str,
    ) -> Result<Vec<ProcessedResult>, ProcessingError> {
        let mut results = Vec::with_capacity(users.len());
        for user in users {
            results.push(self.process_user(user, label).await?);
        }
        Ok(results)
    }
}
