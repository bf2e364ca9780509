// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for profile images
//!
//! This module provides:
//! - Avatar download and decoding (`fetcher`, `image_utils`)
//! - Object detection via DETR (`detector`)
//!
//! Detection runs on CPU only.

pub mod detector;
pub mod fetcher;
pub mod image_utils;

pub use detector::{BoundingBox, Detection, DetectorAdapter, DetrDetector, ObjectDetector};
pub use fetcher::{FetchError, HttpImageFetcher, ImageFetcher};
pub use image_utils::{decode_image_bytes, detect_format, ImageError, ImageInfo};

#[cfg(test)]
pub use detector::MockObjectDetector;
#[cfg(test)]
pub use fetcher::MockImageFetcher;
