// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use avatar_object_detector::cli::{execute, Cli};
use clap::Parser;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    tracing_subscriber::fmt::init();

    // Parse CLI arguments
    let cli = Cli::parse();

    if let Err(e) = execute(cli).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
