// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! DETR object detection on ONNX Runtime
//!
//! Expects an export of a DETR-family model (e.g. facebook/detr-resnet-50)
//! with input `pixel_values` [1, 3, H, W] (optionally `pixel_mask` [1, H, W])
//! and outputs `logits` [1, Q, C+1] and `pred_boxes` [1, Q, 4], where the last
//! class is "no object" and boxes are normalized (cx, cy, w, h).

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use ndarray::{Array3, ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

use super::labels::label_for;
use super::preprocessing::preprocess_for_detr;
use super::{BoundingBox, Detection, ObjectDetector};

/// Default minimum score for a detection to be reported
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// DETR detector
///
/// Runs on CPU only. The session is loaded once and shared; inference takes
/// the session lock for the duration of one call.
pub struct DetrDetector {
    session: Mutex<Session>,
    input_name: String,
    mask_input_name: Option<String>,
    logits_index: usize,
    boxes_index: usize,
    labels: Vec<String>,
    threshold: f32,
}

impl std::fmt::Debug for DetrDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetrDetector")
            .field("input_name", &self.input_name)
            .field("mask_input_name", &self.mask_input_name)
            .field("labels", &self.labels.len())
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl DetrDetector {
    /// Load the DETR model from an ONNX file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - Model does not expose two outputs (logits, boxes)
    pub fn new<P: AsRef<Path>>(model_path: P, labels: Vec<String>, threshold: f32) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("DETR model not found: {}", model_path.display());
        }

        info!("Loading DETR model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load DETR model from {}", model_path.display()))?;

        let input_name = session
            .inputs
            .iter()
            .find(|input| input.name == "pixel_values")
            .or_else(|| session.inputs.first())
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "pixel_values".to_string());

        let mask_input_name = session
            .inputs
            .iter()
            .find(|input| input.name == "pixel_mask")
            .map(|input| input.name.clone());

        if session.outputs.len() < 2 {
            anyhow::bail!(
                "DETR model must expose logits and boxes outputs, found {}",
                session.outputs.len()
            );
        }

        let output_index = |name: &str, fallback: usize| {
            session
                .outputs
                .iter()
                .position(|output| output.name == name)
                .unwrap_or(fallback)
        };
        let logits_index = output_index("logits", 0);
        let boxes_index = output_index("pred_boxes", 1);

        debug!(
            "DETR model loaded - input: {}, mask: {:?}, logits: #{}, boxes: #{}",
            input_name, mask_input_name, logits_index, boxes_index
        );
        info!("✅ DETR model loaded successfully (CPU-only)");

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            mask_input_name,
            logits_index,
            boxes_index,
            labels,
            threshold: threshold.clamp(0.0, 1.0),
        })
    }

    /// Get current confidence threshold
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

impl ObjectDetector for DetrDetector {
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let (width, height) = (image.width(), image.height());
        let input = preprocess_for_detr(image);
        let (input_h, input_w) = (input.shape()[2], input.shape()[3]);

        let pixel_values =
            Value::from_array(input).context("Failed to create pixel_values tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("DETR session lock poisoned"))?;

        let outputs = match &self.mask_input_name {
            Some(mask_name) => {
                let mask = Value::from_array(Array3::<i64>::ones((1, input_h, input_w)))
                    .context("Failed to create pixel_mask tensor")?;
                session.run(ort::inputs![
                    self.input_name.as_str() => pixel_values,
                    mask_name.as_str() => mask
                ])
            }
            None => session.run(ort::inputs![self.input_name.as_str() => pixel_values]),
        }
        .context("DETR inference failed")?;

        let logits = outputs[self.logits_index]
            .try_extract_array::<f32>()
            .context("Failed to extract logits tensor")?;
        let boxes = outputs[self.boxes_index]
            .try_extract_array::<f32>()
            .context("Failed to extract boxes tensor")?;

        let detections = postprocess(
            logits.view(),
            boxes.view(),
            width,
            height,
            &self.labels,
            self.threshold,
        )?;

        debug!("DETR found {} objects above {}", detections.len(), self.threshold);
        Ok(detections)
    }

    fn name(&self) -> &'static str {
        "detr-resnet-50"
    }
}

/// Turn raw DETR outputs into detections
///
/// Softmax over the class logits, drop the trailing "no object" class, keep
/// queries whose best score is above `threshold`. Boxes are scaled to the
/// original image and truncated to whole pixels. Query order is preserved.
pub fn postprocess(
    logits: ArrayViewD<f32>,
    boxes: ArrayViewD<f32>,
    image_width: u32,
    image_height: u32,
    labels: &[String],
    threshold: f32,
) -> Result<Vec<Detection>> {
    let logits_shape = logits.shape();
    let boxes_shape = boxes.shape();

    if logits_shape.len() != 3 || boxes_shape.len() != 3 || boxes_shape[2] != 4 {
        anyhow::bail!(
            "Unexpected DETR output shapes: logits {:?}, boxes {:?}",
            logits_shape,
            boxes_shape
        );
    }
    if logits_shape[1] != boxes_shape[1] {
        anyhow::bail!(
            "DETR query count mismatch: logits {} vs boxes {}",
            logits_shape[1],
            boxes_shape[1]
        );
    }
    if logits_shape[2] < 2 {
        anyhow::bail!("DETR logits need at least one class plus no-object");
    }

    let num_queries = logits_shape[1];
    let num_classes = logits_shape[2] - 1;
    let (w, h) = (image_width as f32, image_height as f32);

    let mut detections = Vec::new();

    for q in 0..num_queries {
        let row: Vec<f32> = (0..=num_classes)
            .map(|c| logits[IxDyn(&[0, q, c])])
            .collect();

        let max_logit = row.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exp: Vec<f32> = row.iter().map(|v| (v - max_logit).exp()).collect();
        let sum: f32 = exp.iter().sum();

        let (class_id, score) = exp[..num_classes]
            .iter()
            .enumerate()
            .map(|(c, e)| (c, e / sum))
            .fold((0, f32::MIN), |best, cur| if cur.1 > best.1 { cur } else { best });

        if score <= threshold {
            continue;
        }

        let cx = boxes[IxDyn(&[0, q, 0])];
        let cy = boxes[IxDyn(&[0, q, 1])];
        let bw = boxes[IxDyn(&[0, q, 2])];
        let bh = boxes[IxDyn(&[0, q, 3])];

        detections.push(Detection {
            score,
            label: label_for(labels, class_id),
            bounding_box: BoundingBox {
                xmin: ((cx - 0.5 * bw) * w) as i32,
                ymin: ((cy - 0.5 * bh) * h) as i32,
                xmax: ((cx + 0.5 * bw) * w) as i32,
                ymax: ((cy + 0.5 * bh) * h) as i32,
            },
        });
    }

    Ok(detections)
}
