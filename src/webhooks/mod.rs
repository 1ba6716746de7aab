// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Admission webhooks for `Feed`, `HotNews` and the feed-group ConfigMap.
//!
//! The API server calls these synchronously before persisting a write. Each
//! webhook either admits the object (possibly with warnings or a defaulting
//! patch) or denies it with every violation it found, joined into one message.
//!
//! The same HTTPS server also exposes `/metrics`, `/healthz` and `/readyz`.
//!
//! | Path | Kind | Webhook |
//! |------|------|---------|
//! | `/validate-feed` | `Feed` | validating |
//! | `/mutate-hotnews` | `HotNews` | mutating |
//! | `/validate-hotnews` | `HotNews` | validating |
//! | `/validate-configmap` | `ConfigMap` | validating |

pub mod configmap;
pub mod feed;
pub mod hotnews;

use crate::config::OperatorConfig;
use crate::constants::{
    PATH_MUTATE_HOT_NEWS, PATH_VALIDATE_CONFIG_MAP, PATH_VALIDATE_FEED, PATH_VALIDATE_HOT_NEWS,
    WEBHOOK_LIST_TIMEOUT_SECS,
};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use kube::api::ListParams;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use kube::core::DynamicObject;
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Outcome label for admitted requests
pub const OUTCOME_ALLOWED: &str = "allowed";
/// Outcome label for denied requests
pub const OUTCOME_DENIED: &str = "denied";
/// Outcome label for malformed reviews
pub const OUTCOME_INVALID: &str = "invalid";

/// Errors raised while starting or running the webhook server.
#[derive(Error, Debug)]
pub enum WebhookError {
    /// The serving certificate or key could not be loaded.
    #[error("failed to load TLS material from {cert} and {key}: {source}")]
    Tls {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The server stopped with an I/O error.
    #[error("webhook server on {addr} failed: {source}")]
    Serve {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Shared state handed to every webhook.
#[derive(Clone)]
pub struct WebhookState {
    /// Client used for the existence and uniqueness lookups
    pub client: Client,
    pub config: OperatorConfig,
}

impl WebhookState {
    #[must_use]
    pub fn new(client: Client, config: OperatorConfig) -> Self {
        Self { client, config }
    }
}

/// A single rejected field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// JSON path of the offending field, e.g. `spec.name`
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Join all field errors into one denial message.
#[must_use]
pub fn aggregate(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Admit with `warnings`, or deny with every error in `errors`.
#[must_use]
pub fn verdict(
    response: AdmissionResponse,
    errors: &[FieldError],
    warnings: Vec<String>,
) -> AdmissionResponse {
    if errors.is_empty() {
        with_warnings(response, warnings)
    } else {
        response.deny(aggregate(errors))
    }
}

fn with_warnings(mut response: AdmissionResponse, warnings: Vec<String>) -> AdmissionResponse {
    if !warnings.is_empty() {
        response.warnings = Some(warnings);
    }
    response
}

/// Unwrap the request of a review; a malformed review yields an `invalid` response.
pub fn admission_request<K: Resource>(
    webhook: &str,
    review: AdmissionReview<K>,
) -> Result<AdmissionRequest<K>, AdmissionResponse> {
    let request: Result<AdmissionRequest<K>, _> = review.try_into();
    request.map_err(|e| {
        error!(webhook = webhook, error = %e, "Invalid AdmissionReview");
        crate::metrics::record_admission(webhook, OUTCOME_INVALID);
        AdmissionResponse::invalid(e.to_string())
    })
}

/// Record the outcome of `response` and wrap it in a review.
pub fn reply(webhook: &str, response: AdmissionResponse) -> Json<AdmissionReview<DynamicObject>> {
    let outcome = if response.allowed {
        OUTCOME_ALLOWED
    } else {
        OUTCOME_DENIED
    };
    debug!(webhook = webhook, outcome = outcome, "Admission review answered");
    crate::metrics::record_admission(webhook, outcome);
    Json(response.into_review())
}

/// List objects in `namespace`, bounded by the webhook list timeout.
///
/// # Errors
///
/// Returns a message describing the API error or the timeout.
pub async fn list_in_namespace<K>(client: &Client, namespace: &str) -> Result<Vec<K>, String>
where
    K: Resource<DynamicType = (), Scope = kube::core::NamespaceResourceScope>
        + Clone
        + DeserializeOwned
        + fmt::Debug,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    let timeout = Duration::from_secs(WEBHOOK_LIST_TIMEOUT_SECS);
    match tokio::time::timeout(timeout, api.list(&ListParams::default())).await {
        Ok(Ok(list)) => Ok(list.items),
        Ok(Err(e)) => {
            warn!(kind = %K::kind(&()), namespace = %namespace, error = %e, "Admission lookup failed");
            Err(format!("failed to list {} in {namespace}: {e}", K::kind(&())))
        }
        Err(_) => {
            warn!(kind = %K::kind(&()), namespace = %namespace, "Admission lookup timed out");
            Err(format!(
                "timed out after {WEBHOOK_LIST_TIMEOUT_SECS}s listing {} in {namespace}",
                K::kind(&())
            ))
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn metrics() -> impl IntoResponse {
    match crate::metrics::gather_metrics() {
        Ok(body) => (StatusCode::OK, body),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Router serving all webhooks and the health and metrics endpoints.
pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route(PATH_VALIDATE_FEED, post(feed::validate_handler))
        .route(PATH_MUTATE_HOT_NEWS, post(hotnews::mutate_handler))
        .route(PATH_VALIDATE_HOT_NEWS, post(hotnews::validate_handler))
        .route(PATH_VALIDATE_CONFIG_MAP, post(configmap::validate_handler))
        .route("/metrics", get(metrics))
        .route("/healthz", get(healthz))
        .route("/readyz", get(healthz))
        .with_state(state)
}

/// Serve the webhooks over HTTPS until the server fails.
///
/// # Errors
///
/// Returns [`WebhookError`] if the TLS material cannot be loaded or the
/// listener fails.
pub async fn serve(state: Arc<WebhookState>) -> Result<(), WebhookError> {
    crate::context::install_crypto_provider();

    let cert = state.config.tls_cert_path.clone();
    let key = state.config.tls_key_path.clone();
    let tls = RustlsConfig::from_pem_file(&cert, &key)
        .await
        .map_err(|source| WebhookError::Tls { cert, key, source })?;

    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.webhook_port));
    info!(addr = %addr, "Starting admission webhook server");

    axum_server::bind_rustls(addr, tls)
        .serve(router(state).into_make_service())
        .await
        .map_err(|source| WebhookError::Serve { addr, source })
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod mod_tests;
