// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for DETR

use image::imageops::FilterType;
use image::DynamicImage;
use ndarray::Array4;

/// Target length of the shortest edge
pub const SHORTEST_EDGE: u32 = 800;

/// Upper bound for the longest edge
pub const LONGEST_EDGE: u32 = 1333;

/// ImageNet normalization mean values
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet normalization std values
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Output size `(width, height)` keeping aspect ratio
///
/// The shortest edge becomes `shortest_edge` unless that would push the
/// longest edge past `longest_edge`, in which case the target shrinks.
pub fn resize_output_size(
    width: u32,
    height: u32,
    shortest_edge: u32,
    longest_edge: u32,
) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (shortest_edge, shortest_edge);
    }

    let min_orig = width.min(height) as f32;
    let max_orig = width.max(height) as f32;

    let mut size = shortest_edge as f32;
    if max_orig / min_orig * size > longest_edge as f32 {
        size = (longest_edge as f32 * min_orig / max_orig).round();
    }
    let size = size as u32;

    if (height <= width && height == size) || (width <= height && width == size) {
        return (width, height);
    }

    if width < height {
        let new_h = (size as f32 * height as f32 / width as f32) as u32;
        (size, new_h)
    } else {
        let new_w = (size as f32 * width as f32 / height as f32) as u32;
        (new_w, size)
    }
}

/// Preprocess an image for the DETR encoder
///
/// Steps:
/// 1. Resize (bilinear) to [`resize_output_size`]
/// 2. Convert to RGB
/// 3. Normalize: (pixel/255 - mean) / std
/// 4. Convert to NCHW tensor format [1, 3, H, W]
pub fn preprocess_for_detr(image: &DynamicImage) -> Array4<f32> {
    let (new_w, new_h) = resize_output_size(
        image.width(),
        image.height(),
        SHORTEST_EDGE,
        LONGEST_EDGE,
    );

    let rgb = if (new_w, new_h) == (image.width(), image.height()) {
        image.to_rgb8()
    } else {
        image
            .resize_exact(new_w, new_h, FilterType::Triangle)
            .to_rgb8()
    };

    let (w, h) = (new_w as usize, new_h as usize);
    let mut tensor = Array4::zeros((1, 3, h, w));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] = (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    tensor
}
