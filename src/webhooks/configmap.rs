// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Validating webhook for the feed-group ConfigMap.
//!
//! Only the configured ConfigMap is checked; any other ConfigMap is admitted
//! untouched. Every value must be a non-empty comma-separated list of names of
//! existing `Feed`s in the namespace.

use super::{admission_request, list_in_namespace, reply, verdict, FieldError, WebhookState};
use crate::crd::Feed;
use crate::predicates::is_feed_groups_config_map;
use crate::reconcilers::hotnews::split_feed_list;
use axum::extract::State;
use axum::Json;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::core::admission::{AdmissionResponse, AdmissionReview, Operation};
use kube::core::DynamicObject;
use kube::ResourceExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

const WEBHOOK: &str = "validate-configmap";

/// Field errors of the feed groups in `data`, given the `Feed` names of the namespace.
#[must_use]
pub fn validate_feed_groups(
    data: &BTreeMap<String, String>,
    namespace_feeds: &[String],
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (group, value) in data {
        let field = format!("data.{group}");
        let mut names = split_feed_list(value).peekable();
        if names.peek().is_none() {
            errors.push(FieldError::new(field, "feed group must list at least one Feed"));
            continue;
        }
        for name in names {
            if !namespace_feeds.iter().any(|f| f == name) {
                errors.push(FieldError::new(
                    field.clone(),
                    format!("Feed '{name}' does not exist in this namespace"),
                ));
            }
        }
    }

    errors
}

/// `POST /validate-configmap`
pub async fn validate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<ConfigMap>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let request = match admission_request(WEBHOOK, body) {
        Ok(request) => request,
        Err(response) => return Json(response.into_review()),
    };
    let response = AdmissionResponse::from(&request);

    let response = match (&request.operation, &request.object) {
        (Operation::Create | Operation::Update, Some(config_map)) => {
            let mut config_map = config_map.clone();
            if config_map.metadata.namespace.is_none() {
                config_map.metadata.namespace.clone_from(&request.namespace);
            }
            if is_feed_groups_config_map(&state.config, &config_map) {
                review(&state, response, &config_map).await
            } else {
                response
            }
        }
        _ => response,
    };

    reply(WEBHOOK, response)
}

async fn review(
    state: &WebhookState,
    response: AdmissionResponse,
    config_map: &ConfigMap,
) -> AdmissionResponse {
    let namespace = config_map.namespace().unwrap_or_default();
    let data = config_map.data.clone().unwrap_or_default();

    let errors = match list_in_namespace::<Feed>(&state.client, &namespace).await {
        Ok(feeds) => {
            let names: Vec<String> = feeds.iter().map(|f| f.spec.name.trim().to_string()).collect();
            validate_feed_groups(&data, &names)
        }
        Err(message) => vec![FieldError::new("data", message)],
    };

    if !errors.is_empty() {
        info!(
            namespace = %namespace,
            name = %config_map.name_any(),
            violations = errors.len(),
            "Rejecting feed-group ConfigMap"
        );
    }
    verdict(response, &errors, Vec::new())
}

#[cfg(test)]
#[path = "configmap_tests.rs"]
mod configmap_tests;
