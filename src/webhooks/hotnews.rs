// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Mutating and validating webhooks for `HotNews`.
//!
//! Defaulting:
//! - `summaryConfig.titlesCount` of 0 becomes 10
//! - a `HotNews` with neither `feedsName` nor `feedGroups` queries every
//!   `Feed` of its namespace
//!
//! Validation collects every violation:
//! - `dateStart` and `dateEnd` are set together, as `YYYY-MM-DD`, start before end
//! - `keywords` is not empty
//! - every `feedsName` entry names an existing `Feed` of the namespace
//!
//! Updates of a `HotNews` being deleted are admitted untouched, so the
//! controller can drop its finalizer. Updates that leave `spec` untouched
//! skip the `Feed` lookup.

use super::{admission_request, list_in_namespace, reply, verdict, FieldError, WebhookState};
use crate::constants::{DATE_FORMAT, DEFAULT_TITLES_COUNT};
use crate::crd::{Feed, HotNews, HotNewsSpec, SummaryConfig};
use axum::extract::State;
use axum::Json;
use chrono::NaiveDate;
use json_patch::Patch;
use kube::core::admission::{AdmissionResponse, AdmissionReview, Operation};
use kube::core::DynamicObject;
use kube::ResourceExt;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

const MUTATE_WEBHOOK: &str = "mutate-hotnews";
const VALIDATE_WEBHOOK: &str = "validate-hotnews";

/// Outcome of defaulting a spec.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Defaulted {
    pub spec: HotNewsSpec,
    pub warnings: Vec<String>,
}

/// Apply defaults to `spec`, given the `Feed` names of its namespace.
#[must_use]
pub fn default_spec(spec: &HotNewsSpec, namespace_feeds: &[String]) -> Defaulted {
    let mut out = Defaulted {
        spec: spec.clone(),
        warnings: Vec::new(),
    };

    if spec.summary_config.titles_count == 0 {
        out.spec.summary_config = SummaryConfig {
            titles_count: DEFAULT_TITLES_COUNT,
        };
    }

    if spec.feeds_name.is_empty() && spec.feed_groups.is_empty() {
        if namespace_feeds.is_empty() {
            out.warnings.push(
                "neither feedsName nor feedGroups is set and the namespace has no Feeds; \
                 the HotNews will fail until a Feed exists"
                    .to_string(),
            );
        } else {
            out.spec.feeds_name = namespace_feeds.to_vec();
        }
    }

    out
}

/// JSON patch turning the admitted `object` into one carrying `spec`.
///
/// The patch is a diff against the raw request object, so fields the client
/// omitted are added rather than replaced.
///
/// # Errors
///
/// Returns an error if `spec` cannot be serialized.
pub fn mutation_patch(object: &Value, spec: &HotNewsSpec) -> Result<Patch, serde_json::Error> {
    let mut mutated = object.clone();
    let Value::Object(defaults) = serde_json::to_value(spec)? else {
        return Ok(Patch(Vec::new()));
    };
    match mutated.get_mut("spec") {
        Some(Value::Object(current)) => {
            for (field, value) in defaults {
                if current.get(&field) != Some(&value) {
                    current.insert(field, value);
                }
            }
        }
        _ => {
            if let Some(root) = mutated.as_object_mut() {
                root.insert("spec".to_string(), Value::Object(defaults));
            }
        }
    }
    Ok(json_patch::diff(object, &mutated))
}

fn parse_date(field: &str, value: &str, errors: &mut Vec<FieldError>) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(value.trim(), DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new(
                field,
                format!("'{value}' is not a date in YYYY-MM-DD format"),
            ));
            None
        }
    }
}

/// Field errors of the date range.
#[must_use]
pub fn validate_dates(spec: &HotNewsSpec) -> Vec<FieldError> {
    let mut errors = Vec::new();
    match (spec.date_start.as_deref(), spec.date_end.as_deref()) {
        (None, None) => {}
        (Some(_), None) | (None, Some(_)) => errors.push(FieldError::new(
            "spec.dateStart",
            "dateStart and dateEnd must be set together",
        )),
        (Some(start), Some(end)) => {
            let start = parse_date("spec.dateStart", start, &mut errors);
            let end = parse_date("spec.dateEnd", end, &mut errors);
            if let (Some(start), Some(end)) = (start, end) {
                if start >= end {
                    errors.push(FieldError::new(
                        "spec.dateStart",
                        format!("dateStart {start} must be before dateEnd {end}"),
                    ));
                }
            }
        }
    }
    errors
}

/// All field errors of `spec` given the `Feed` names of its namespace.
#[must_use]
pub fn validate_spec(spec: &HotNewsSpec, namespace_feeds: &[String]) -> Vec<FieldError> {
    let mut errors = validate_dates(spec);

    if spec.keywords.iter().all(|k| k.trim().is_empty()) {
        errors.push(FieldError::new("spec.keywords", "at least one keyword is required"));
    }

    for name in &spec.feeds_name {
        if !namespace_feeds.iter().any(|f| f == name.trim()) {
            errors.push(FieldError::new(
                "spec.feedsName",
                format!("Feed '{}' does not exist in this namespace", name.trim()),
            ));
        }
    }

    errors
}

fn feed_names(feeds: &[Feed]) -> Vec<String> {
    feeds.iter().map(|f| f.spec.name.trim().to_string()).collect()
}

async fn validate_against_namespace(
    state: &WebhookState,
    namespace: &str,
    spec: &HotNewsSpec,
) -> Vec<FieldError> {
    match list_in_namespace::<Feed>(&state.client, namespace).await {
        Ok(feeds) => validate_spec(spec, &feed_names(&feeds)),
        Err(message) => {
            let mut errors = validate_spec(spec, &[]);
            errors.retain(|e| e.field != "spec.feedsName");
            errors.push(FieldError::new("spec.feedsName", message));
            errors
        }
    }
}

fn namespace_of(request_namespace: Option<&String>, hotnews: &HotNews) -> String {
    hotnews
        .namespace()
        .or_else(|| request_namespace.cloned())
        .unwrap_or_default()
}

/// `POST /mutate-hotnews`
pub async fn mutate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<DynamicObject>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let request = match admission_request(MUTATE_WEBHOOK, body) {
        Ok(request) => request,
        Err(response) => return Json(response.into_review()),
    };
    let response = AdmissionResponse::from(&request);

    let response = match (&request.operation, &request.object) {
        (Operation::Update, Some(object)) if object.metadata.deletion_timestamp.is_some() => {
            response
        }
        (Operation::Create | Operation::Update, Some(object)) => {
            let namespace = object
                .namespace()
                .or_else(|| request.namespace.clone())
                .unwrap_or_default();
            match mutate(&state, &namespace, object).await {
                Ok((patch, warnings)) => {
                    let mut response = if patch.0.is_empty() {
                        response
                    } else {
                        info!(
                            namespace = %namespace,
                            name = %object.name_any(),
                            operations = patch.0.len(),
                            "Defaulting HotNews"
                        );
                        match response.clone().with_patch(patch) {
                            Ok(patched) => patched,
                            Err(e) => {
                                error!(error = %e, "Failed to serialize HotNews defaulting patch");
                                response.deny(e.to_string())
                            }
                        }
                    };
                    if !warnings.is_empty() {
                        response.warnings = Some(warnings);
                    }
                    response
                }
                Err(message) => response.deny(message),
            }
        }
        _ => response,
    };

    reply(MUTATE_WEBHOOK, response)
}

async fn mutate(
    state: &WebhookState,
    namespace: &str,
    object: &DynamicObject,
) -> Result<(Patch, Vec<String>), String> {
    let raw = serde_json::to_value(object).map_err(|e| e.to_string())?;
    let spec: HotNewsSpec = serde_json::from_value(raw.get("spec").cloned().unwrap_or_default())
        .map_err(|e| format!("invalid HotNews spec: {e}"))?;

    let feeds = if spec.feeds_name.is_empty() && spec.feed_groups.is_empty() {
        feed_names(&list_in_namespace::<Feed>(&state.client, namespace).await?)
    } else {
        Vec::new()
    };

    let defaulted = default_spec(&spec, &feeds);
    if defaulted.spec == spec {
        return Ok((Patch(Vec::new()), defaulted.warnings));
    }
    let patch = mutation_patch(&raw, &defaulted.spec).map_err(|e| e.to_string())?;
    Ok((patch, defaulted.warnings))
}

/// `POST /validate-hotnews`
pub async fn validate_handler(
    State(state): State<Arc<WebhookState>>,
    Json(body): Json<AdmissionReview<HotNews>>,
) -> Json<AdmissionReview<DynamicObject>> {
    let request = match admission_request(VALIDATE_WEBHOOK, body) {
        Ok(request) => request,
        Err(response) => return Json(response.into_review()),
    };
    let response = AdmissionResponse::from(&request);

    let response = match (&request.operation, &request.object) {
        (Operation::Update, Some(hotnews)) if hotnews.metadata.deletion_timestamp.is_some() => {
            debug!(name = %hotnews.name_any(), "Admitting update of a HotNews being deleted");
            response
        }
        (Operation::Create | Operation::Update, Some(hotnews)) => {
            let namespace = namespace_of(request.namespace.as_ref(), hotnews);
            let spec_unchanged = request
                .old_object
                .as_ref()
                .is_some_and(|old| old.spec == hotnews.spec);
            let errors = if spec_unchanged {
                // Feeds may have gone since the spec was admitted
                let listed: Vec<String> = hotnews
                    .spec
                    .feeds_name
                    .iter()
                    .map(|f| f.trim().to_string())
                    .collect();
                validate_spec(&hotnews.spec, &listed)
            } else {
                validate_against_namespace(&state, &namespace, &hotnews.spec).await
            };
            if !errors.is_empty() {
                info!(
                    namespace = %namespace,
                    name = %hotnews.name_any(),
                    violations = errors.len(),
                    "Rejecting HotNews"
                );
            }
            verdict(response, &errors, Vec::new())
        }
        _ => response,
    };

    reply(VALIDATE_WEBHOOK, response)
}

#[cfg(test)]
#[path = "hotnews_tests.rs"]
mod hotnews_tests;
