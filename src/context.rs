// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Shared context for the `Feed` and `HotNews` controllers.
//!
//! Both controllers receive an `Arc<Context>` holding:
//! - the Kubernetes client
//! - the news aggregator client
//! - the operator configuration
//! - the per-object error backoff state

use crate::aggregator::AggregatorClient;
use crate::config::OperatorConfig;
use crate::errors::AggregatorError;
use crate::reconcilers::retry::RequeueBackoff;
use kube::Client;
use std::sync::Once;

static CRYPTO_PROVIDER: Once = Once::new();

/// Install `ring` as the process-wide rustls provider.
///
/// Must run before the first Kubernetes client or TLS listener is built:
/// with more than one rustls backend compiled in, rustls cannot pick one on
/// its own. Later calls are no-ops.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        // Err means another provider was installed first, which is fine
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Shared context passed to all controllers.
pub struct Context {
    /// Kubernetes client for API operations
    pub client: Client,

    /// HTTP client for the news aggregator API
    pub aggregator: AggregatorClient,

    /// Operator configuration
    pub config: OperatorConfig,

    /// Error requeue delays per object
    pub backoff: RequeueBackoff,
}

impl Context {
    /// Build the context from a Kubernetes client and the operator configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the aggregator URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(client: Client, config: OperatorConfig) -> Result<Self, AggregatorError> {
        let aggregator =
            AggregatorClient::new(&config.aggregator_url, config.aggregator_timeout())?;
        let backoff = RequeueBackoff::new(config.error_backoff_initial(), config.error_backoff_max());
        Ok(Self {
            client,
            aggregator,
            config,
            backoff,
        })
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
