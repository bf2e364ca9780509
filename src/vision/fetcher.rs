// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Profile image download

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use super::image_utils::{decode_image_bytes, ImageError};

/// Image fetch error types
///
/// A non-success HTTP status is not an error; see [`ImageFetcher::fetch`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Image request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Image from {url} could not be decoded: {source}")]
    Decode {
        url: String,
        #[source]
        source: ImageError,
    },
}

/// Downloads and decodes a single image
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the image at `url`
    ///
    /// Returns `Ok(None)` when the host answers with a non-success status.
    async fn fetch(&self, url: &str) -> Result<Option<DynamicImage>, FetchError>;
}

/// [`ImageFetcher`] over plain HTTP(S)
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    /// Create a new fetcher; `timeout` of `None` waits indefinitely
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<Option<DynamicImage>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            warn!("Image host returned {} for {}", status, url);
            return Ok(None);
        }

        let bytes = response.bytes().await.map_err(transport)?;
        let (image, info) = decode_image_bytes(&bytes).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;

        debug!(
            "Fetched image {}: {}x{} {:?}, {} bytes",
            url, info.width, info.height, info.format, info.size_bytes
        );

        Ok(Some(image))
    }
}
