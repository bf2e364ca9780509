// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Startup warm-up over a local image file

use avatar_object_detector::vision::detector::warm_up;
use std::io::Write;

use crate::common::{detection, png_bytes, StubDetector};

#[test]
fn test_warm_up_returns_all_detections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&png_bytes(32, 24)).unwrap();

    let detector = StubDetector::new(vec![
        detection("person", 0.9, [0, 0, 10, 10]),
        detection("tie", 0.6, [2, 2, 4, 8]),
    ]);

    let detections = warm_up(&detector, file.path()).unwrap();

    assert_eq!(detections.len(), 2);
    assert_eq!(detector.calls(), 1);
}

#[test]
fn test_warm_up_missing_file_fails() {
    let detector = StubDetector::new(Vec::new());
    let result = warm_up(&detector, std::path::Path::new("/nonexistent/warmup.png"));

    assert!(result.is_err());
    assert_eq!(detector.calls(), 0);
}

#[test]
fn test_warm_up_rejects_non_image() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"plain text, not an image").unwrap();

    let detector = StubDetector::new(Vec::new());
    let result = warm_up(&detector, file.path());

    assert!(result.is_err());
    assert_eq!(detector.calls(), 0);
}
