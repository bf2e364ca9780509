// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Defines settings for the HTTP listener, the user directory, outbound
//! timeouts and the detector.

use std::env;
use std::time::Duration;

use crate::directory::{TopUsersQuery, DEFAULT_BASE_URL, DEFAULT_SITE};
use crate::vision::detector::detr::DEFAULT_THRESHOLD;

/// Configuration for the avatar detection service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// HTTP bind address (default: 127.0.0.1:5000)
    pub listen_addr: String,
    /// Directory API root (default: https://api.stackexchange.com/2.2)
    pub directory_base_url: String,
    /// StackExchange site (default: stackoverflow)
    pub directory_site: String,
    /// Page of users requested on every call
    pub users_query: TopUsersQuery,
    /// Directory request timeout in seconds (default: none)
    pub directory_timeout_secs: Option<u64>,
    /// Image download timeout in seconds (default: none)
    pub image_timeout_secs: Option<u64>,
    /// ONNX model file
    pub detector_model_path: String,
    /// Optional label file, one label per line
    pub detector_labels_path: Option<String>,
    /// Minimum detection score (default: 0.5)
    pub detector_threshold: f32,
    /// Image run through the detector once at startup
    pub warmup_image: Option<String>,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ServiceConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let default_query = TopUsersQuery::default();

        Self {
            listen_addr: env_string("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            directory_base_url: env_string("DIRECTORY_BASE_URL")
                .unwrap_or(defaults.directory_base_url),
            directory_site: env_string("DIRECTORY_SITE").unwrap_or(defaults.directory_site),
            users_query: TopUsersQuery {
                page: env_parse("DIRECTORY_PAGE").unwrap_or(default_query.page),
                pagesize: env_parse("DIRECTORY_PAGE_SIZE").unwrap_or(default_query.pagesize),
                order: env_string("DIRECTORY_ORDER").unwrap_or(default_query.order),
                sort: env_string("DIRECTORY_SORT").unwrap_or(default_query.sort),
            },
            directory_timeout_secs: env_parse("DIRECTORY_TIMEOUT_SECS"),
            image_timeout_secs: env_parse("IMAGE_TIMEOUT_SECS"),
            detector_model_path: env_string("DETECTOR_MODEL_PATH")
                .unwrap_or(defaults.detector_model_path),
            detector_labels_path: env_string("DETECTOR_LABELS_PATH"),
            detector_threshold: env_parse("DETECTOR_THRESHOLD")
                .unwrap_or(defaults.detector_threshold),
            warmup_image: env_string("WARMUP_IMAGE"),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.users_query.page == 0 {
            return Err("DIRECTORY_PAGE must be at least 1".to_string());
        }
        if !(1..=100).contains(&self.users_query.pagesize) {
            return Err("DIRECTORY_PAGE_SIZE must be between 1 and 100".to_string());
        }
        if self.users_query.order != "asc" && self.users_query.order != "desc" {
            return Err(format!(
                "DIRECTORY_ORDER must be 'asc' or 'desc', got '{}'",
                self.users_query.order
            ));
        }
        if !(0.0..=1.0).contains(&self.detector_threshold) {
            return Err("DETECTOR_THRESHOLD must be between 0.0 and 1.0".to_string());
        }
        if self.directory_timeout_secs == Some(0) || self.image_timeout_secs == Some(0) {
            return Err("timeouts must be at least 1 second when set".to_string());
        }
        Ok(())
    }

    pub fn directory_timeout(&self) -> Option<Duration> {
        self.directory_timeout_secs.map(Duration::from_secs)
    }

    pub fn image_timeout(&self) -> Option<Duration> {
        self.image_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:5000".to_string(),
            directory_base_url: DEFAULT_BASE_URL.to_string(),
            directory_site: DEFAULT_SITE.to_string(),
            users_query: TopUsersQuery::default(),
            directory_timeout_secs: None,
            image_timeout_secs: None,
            detector_model_path: "./models/detr-resnet-50/model.onnx".to_string(),
            detector_labels_path: None,
            detector_threshold: DEFAULT_THRESHOLD,
            warmup_image: None,
        }
    }
}
