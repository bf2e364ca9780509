// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection
//!
//! Components:
//! - `detr` - DETR pipeline running on ONNX Runtime (CPU)
//! - `labels` - class id to label tables
//! - `preprocessing` - image resize/normalization for the DETR encoder
//!
//! [`DetectorAdapter`] narrows the raw pipeline output to a single label.

pub mod detr;
pub mod labels;
pub mod preprocessing;

use anyhow::{Context, Result};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::vision::image_utils::decode_image_bytes;

pub use detr::DetrDetector;
pub use labels::{coco_labels, load_labels};

/// Pixel bounding box in original image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

/// One detected object instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Confidence score (0.0-1.0)
    pub score: f32,
    pub label: String,
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
}

/// A pretrained detection pipeline
///
/// Implementations return every detection they find, in model order.
#[cfg_attr(test, mockall::automock)]
pub trait ObjectDetector: Send + Sync {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;

    /// Model name for logging and the health endpoint
    fn name(&self) -> &'static str;
}

/// Runs the pipeline and keeps only one label
#[derive(Clone)]
pub struct DetectorAdapter {
    detector: Arc<dyn ObjectDetector>,
}

impl DetectorAdapter {
    pub fn new(detector: Arc<dyn ObjectDetector>) -> Self {
        Self { detector }
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Detections whose label equals `label` exactly (case-sensitive)
    pub fn detect_object(&self, image: &DynamicImage, label: &str) -> Result<Vec<Detection>> {
        let detections = self.detector.detect(image)?;
        let total = detections.len();

        let matching: Vec<Detection> = detections
            .into_iter()
            .filter(|d| d.label == label)
            .collect();

        debug!(
            "{} of {} detections match label '{}'",
            matching.len(),
            total,
            label
        );
        Ok(matching)
    }
}

/// Run the detector once over a local image file and return what it saw
pub fn warm_up(detector: &dyn ObjectDetector, path: &Path) -> Result<Vec<Detection>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read warm-up image {}", path.display()))?;
    let (image, _) = decode_image_bytes(&bytes)
        .with_context(|| format!("Failed to decode warm-up image {}", path.display()))?;

    let detections = detector.detect(&image)?;
    info!(
        "Warm-up detection on {} found {} objects",
        path.display(),
        detections.len()
    );
    Ok(detections)
}
