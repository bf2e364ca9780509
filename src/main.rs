// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Result};
use avatar_object_detector::{
    api::{start_server, AppState},
    config::ServiceConfig,
    directory::StackExchangeClient,
    processing::UserProcessor,
    vision::{
        detector::{coco_labels, load_labels, warm_up},
        DetectorAdapter, DetrDetector, HttpImageFetcher, ObjectDetector,
    },
};
use std::{env, path::Path, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting avatar object detector...\n");
    println!("📦 BUILD VERSION: {}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = ServiceConfig::from_env();
    config
        .validate()
        .map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    // Detector
    println!("🧠 Loading DETR detector...");
    let labels = match &config.detector_labels_path {
        Some(path) => load_labels(path)?,
        None => coco_labels(),
    };
    let detector = Arc::new(DetrDetector::new(
        &config.detector_model_path,
        labels,
        config.detector_threshold,
    )?);
    println!(
        "✅ Detector ready: {} (threshold {})",
        detector.name(),
        detector.threshold()
    );

    if let Some(path) = &config.warmup_image {
        let warm_detector = detector.clone();
        let warm_path = path.clone();
        let warm_result = tokio::task::spawn_blocking(move || {
            warm_up(warm_detector.as_ref(), Path::new(&warm_path))
        })
        .await;

        match warm_result {
            Ok(Ok(detections)) => {
                for detection in &detections {
                    info!(
                        "Warm-up detection: {} ({:.3}) {:?}",
                        detection.label, detection.score, detection.bounding_box
                    );
                }
            }
            Ok(Err(e)) => warn!("Warm-up detection failed: {:#}", e),
            Err(e) => warn!("Warm-up task failed: {}", e),
        }
    }

    // Remote collaborators
    let directory = Arc::new(StackExchangeClient::new(
        &config.directory_base_url,
        &config.directory_site,
        config.directory_timeout(),
    )?);
    info!("Directory endpoint: {}", directory.users_endpoint());

    let fetcher = Arc::new(HttpImageFetcher::new(config.image_timeout())?);
    let processor = Arc::new(UserProcessor::new(fetcher, DetectorAdapter::new(detector)));

    let state = Arc::new(AppState::new(
        directory,
        processor,
        config.users_query.clone(),
    ));

    println!("🌐 Listening on http://{}", config.listen_addr);
    println!("   POST /api/v1/users");
    println!("   GET  /health");
    println!("\nPress Ctrl+C to stop\n");

    start_server(state, &config.listen_addr).await?;

    println!("\n👋 Shutdown complete");
    Ok(())
}
