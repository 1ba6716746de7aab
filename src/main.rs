// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use kube::Client;
use news_operator::{
    config::OperatorConfig,
    constants::TOKIO_WORKER_THREADS,
    context::{install_crypto_provider, Context},
    controller::{run_feed_controller, run_hotnews_controller},
    webhooks::{self, WebhookError, WebhookState},
};
use std::sync::Arc;
use tracing::{debug, error, info};

fn main() -> Result<()> {
    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("news-operator")
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

/// Initialize logging.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT` (`json` or `text`).
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_thread_names(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn run_webhooks(state: Arc<WebhookState>, disabled: bool) -> Result<(), WebhookError> {
    if disabled {
        info!("Admission webhooks disabled");
        return futures::future::pending().await;
    }
    webhooks::serve(state).await
}

async fn async_main() -> Result<()> {
    init_logging();

    let config = OperatorConfig::parse();
    info!(
        aggregator = %config.aggregator_url,
        watch_namespace = ?config.watch_namespace,
        config_map = %config.config_map_name,
        "Starting news operator"
    );

    install_crypto_provider();

    debug!("Initializing Kubernetes client");
    let client = Client::try_default().await?;
    debug!("Kubernetes client initialized successfully");

    let ctx = Arc::new(Context::new(client.clone(), config.clone())?);
    let webhook_state = Arc::new(WebhookState::new(client, config.clone()));

    info!("Starting all controllers");

    // Controllers return once a shutdown signal has drained them.
    tokio::select! {
        result = run_feed_controller(ctx.clone()) => {
            result?;
            info!("Shutting down after Feed controller stopped");
        }
        result = run_hotnews_controller(ctx.clone()) => {
            result?;
            info!("Shutting down after HotNews controller stopped");
        }
        result = run_webhooks(webhook_state, config.disable_webhooks) => {
            error!("CRITICAL: webhook server exited unexpectedly: {:?}", result);
            result?;
            anyhow::bail!("Webhook server exited unexpectedly without error")
        }
    }

    Ok(())
}
