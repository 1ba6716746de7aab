// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Status condition helpers for `Feed` and `HotNews`.
//!
//! A status keeps at most one [`Condition`] per [`ConditionType`]. Recording a
//! new outcome replaces the previous entry of that type. When the outcome is
//! the same as the recorded one the old timestamp is kept, so an unchanged
//! status compares equal and the write can be skipped.
//!
//! # Example
//!
//! ```rust
//! use news_operator::crd::ConditionType;
//! use news_operator::reconcilers::status::{new_condition, upsert_condition};
//!
//! let mut conditions = Vec::new();
//! upsert_condition(
//!     &mut conditions,
//!     new_condition(ConditionType::Added, true, "SourceRegistered", "", "bbc"),
//! );
//! assert_eq!(conditions.len(), 1);
//! ```

use crate::crd::{Condition, ConditionType};
use anyhow::{Context as _, Result};
use chrono::Utc;
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

/// Create a condition stamped with the current time.
#[must_use]
pub fn new_condition(
    condition_type: ConditionType,
    success: bool,
    reason: &str,
    message: &str,
    last_updated_name: &str,
) -> Condition {
    Condition {
        r#type: condition_type,
        success,
        reason: reason.to_string(),
        message: message.to_string(),
        last_updated_name: last_updated_name.to_string(),
        last_update_time: Utc::now().to_rfc3339(),
    }
}

/// Find a condition by type.
#[must_use]
pub fn find_condition(conditions: &[Condition], condition_type: ConditionType) -> Option<&Condition> {
    conditions.iter().find(|c| c.r#type == condition_type)
}

/// Whether two conditions report the same outcome, ignoring timestamps.
#[must_use]
pub fn same_outcome(a: &Condition, b: &Condition) -> bool {
    a.r#type == b.r#type
        && a.success == b.success
        && a.reason == b.reason
        && a.message == b.message
        && a.last_updated_name == b.last_updated_name
}

/// Insert or replace the condition of `condition.r#type` (in-memory, no API call).
///
/// Returns `true` if the list changed.
pub fn upsert_condition(conditions: &mut Vec<Condition>, condition: Condition) -> bool {
    match conditions.iter_mut().find(|c| c.r#type == condition.r#type) {
        Some(existing) if same_outcome(existing, &condition) => false,
        Some(existing) => {
            *existing = condition;
            true
        }
        None => {
            conditions.push(condition);
            true
        }
    }
}

/// Write `status` to the status subresource of `resource`.
///
/// Skips the API call when `status` equals `current`, which keeps status
/// writes from triggering needless watch events.
///
/// # Errors
///
/// Returns an error if the status patch fails.
pub async fn patch_status<K, S>(
    client: &Client,
    resource: &K,
    current: Option<&S>,
    status: &S,
) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::de::DeserializeOwned,
    S: Serialize + PartialEq,
{
    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();

    if current == Some(status) {
        debug!(
            kind = %K::kind(&()),
            namespace = %namespace,
            name = %name,
            "Status unchanged, skipping update"
        );
        return Ok(());
    }

    let api: Api<K> = Api::namespaced(client.clone(), &namespace);
    let patch = json!({ "status": status });
    api.patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .with_context(|| format!("failed to update status of {} {namespace}/{name}", K::kind(&())))?;

    debug!(
        kind = %K::kind(&()),
        namespace = %namespace,
        name = %name,
        "Updated status"
    );
    Ok(())
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod status_tests;
