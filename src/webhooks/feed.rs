// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Validating webhook for `Feed`.
//!
//! Rules:
//! - `spec.name` is required and at most 20 characters
//! - `spec.url` is required and must be an absolute URL with scheme and host
//! - `spec.name` is unique among the `Feed`s of the namespace, the object itself excluded
//!
//! Uniqueness is a list-then-decide check, so two concurrent creates with the
//! same name can both pass.

use super::{admission_request, list_in_namespace, reply, verdict, FieldError, WebhookState};
use crate::constants::MAX_FEED_NAME_LEN;
use crate::crd::{Feed, FeedSpec};
use axum::extract::State;
use axum::Json;
use kube::core::admission::{AdmissionResponse, AdmissionReview, Operation};
use kube::core::DynamicObject;
use kube::ResourceExt;
use std::sync::Arc;
use tracing::info;
use url::Url;

const WEBHOOK: &str = "validate-feed";

/// Field errors of `spec` that need no cluster lookup.
#[must_use]
pub fn validate_feed_spec(spec: &FeedSpec) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let name = spec.name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("spec.name", "name is required"));
    } else if name.chars().count() > MAX_FEED_NAME_LEN {
        errors.push(FieldError::new(
            "spec.name",
            format!("name must not exceed {MAX_FEED_NAME_LEN} characters"),
        ));
    }

    let url = spec.url.trim();
    if url.is_empty() {
        errors.push(FieldError::new("spec.url", "url is required"));
    } else {
        match Url::parse(url) {
            Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => {}
            Ok(_) => errors.push(FieldError::new(
                "spec.url",
                format!("url '{url}' must include a scheme and a host"),
            )),
            Err(e) => errors.push(FieldError::new(
                "spec.url",
                format!("url '{url}' is not a valid absolute URL: {e}"),
            )),
        }
    }

    errors
}

/// Error when another `Feed` in `existing` already uses the name of `feed`.
///
/// The object itself is recognized by UID, so updates do not collide with
/// their own stored version.
#[must_use]
pub fn duplicate_name(feed: &Feed, existing: &[Feed]) -> Option<FieldError> {
    let name = feed.spec.name.trim();
    let own_uid = feed.metadata.uid.as_deref();
    existing
        .iter()
        .filter(|other| other.metadata.uid.as_deref() != own_uid || own_uid.is_none())
        .find(|other| other.spec.name.trim() == name)
        .map(|other| {
            FieldError::new(
                "spec.name",
                format!(
                    "name '{name}' is already used by Feed '{}' in this namespace",
                    other.name_any()
                ),
            )
        })
}

async fn review(state: &WebhookState, response: AdmissionResponse, feed: &Feed) -> AdmissionResponse {
    let mut errors = validate_feed_spec(&feed.spec);

    if !feed.spec.name.trim().is_empty() {
        let namespace = feed.namespace().unwrap_or_default();
        match list_in_namespace::<Feed>(&state.client, &namespace).await {
            Ok(existing) => errors.extend(duplicate_name(feed, &existing)),
            Err(message) => errors.push(FieldError::new("spec.name", message)),
        }
    }

    if !errors.is_empty() {
        info!(
            namespace = %feed.namespace().unwrap_or_default(),
            name = %feed.name_any(),
            violations = errors.len(),
            "Rejecting Feed"
        );
    }
    verdict(response, &errors, Vec::new())
}

/// `POST /validate-feed`
pub async fn validate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<Feed>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let request = match admission_request(WEBHOOK, body) {
        Ok(request) => request,
        Err(response) => return Json(response.into_review()),
    };
    let response = AdmissionResponse::from(&request);

    let response = match (&request.operation, &request.object) {
        (Operation::Create | Operation::Update, Some(feed)) => {
            let mut feed = feed.clone();
            if feed.metadata.namespace.is_none() {
                feed.metadata.namespace.clone_from(&request.namespace);
            }
            review(&state, response, &feed).await
        }
        _ => response,
    };

    reply(WEBHOOK, response)
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod feed_tests;
