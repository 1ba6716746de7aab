// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Owner-reference synchronization between `HotNews` and the `Feed`s it queries.
//!
//! A `Feed` carries one owner reference per `HotNews` that currently lists it
//! in `spec.feedsName`. The cluster garbage collector cannot derive this
//! fan-out on its own, so every successful `HotNews` reconcile recomputes it:
//!
//! 1. [`plan_owner_changes`] compares desired ownership (`feed.spec.name` is
//!    listed) against actual ownership (our UID is referenced) for every
//!    `Feed` in the namespace.
//! 2. [`apply_owner_changes`] patches only the `Feed`s whose ownership differs.
//!
//! Running the plan twice yields no changes the second time.

use crate::constants::{API_GROUP_VERSION, KIND_HOT_NEWS};
use crate::crd::{Feed, HotNews};
use anyhow::{Context as _, Result};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use serde_json::json;
use tracing::{debug, info};

/// Direction of an ownership change on one `Feed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OwnerAction {
    Add,
    Remove,
}

/// One `Feed` whose owner references must be rewritten.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnerChange {
    /// `metadata.name` of the `Feed`
    pub feed: String,
    pub action: OwnerAction,
    /// Full owner-reference list after the change
    pub owner_references: Vec<OwnerReference>,
    /// `metadata.resourceVersion` the change was computed from
    pub resource_version: Option<String>,
}

/// Owner reference pointing at `hotnews`, or `None` if it has no UID yet.
#[must_use]
pub fn owner_reference(hotnews: &HotNews) -> Option<OwnerReference> {
    Some(OwnerReference {
        api_version: API_GROUP_VERSION.to_string(),
        kind: KIND_HOT_NEWS.to_string(),
        name: hotnews.name_any(),
        uid: hotnews.uid()?,
        block_owner_deletion: Some(false),
        controller: None,
    })
}

fn is_owned_by(feed: &Feed, uid: &str) -> bool {
    feed.owner_references().iter().any(|r| r.uid == uid)
}

/// Compute the ownership delta of `owner` over `feeds`.
///
/// `desired` holds `Feed.spec.name` values; entries are compared trimmed.
#[must_use]
pub fn plan_owner_changes(
    feeds: &[Feed],
    owner: &OwnerReference,
    desired: &[String],
) -> Vec<OwnerChange> {
    let mut changes = Vec::new();

    for feed in feeds {
        let wanted = desired.iter().any(|d| d.trim() == feed.spec.name.trim());
        let owned = is_owned_by(feed, &owner.uid);

        let action = match (wanted, owned) {
            (true, false) => OwnerAction::Add,
            (false, true) => OwnerAction::Remove,
            _ => continue,
        };

        let mut owner_references: Vec<OwnerReference> = feed
            .owner_references()
            .iter()
            .filter(|r| r.uid != owner.uid)
            .cloned()
            .collect();
        if action == OwnerAction::Add {
            owner_references.push(owner.clone());
        }

        changes.push(OwnerChange {
            feed: feed.name_any(),
            action,
            owner_references,
            resource_version: feed.resource_version(),
        });
    }

    changes
}

/// Patch each planned `Feed`, guarded by the resource version it was planned from.
///
/// # Errors
///
/// Returns an error on the first failed patch; the remaining changes are
/// retried on the next reconcile.
pub async fn apply_owner_changes(
    client: &Client,
    namespace: &str,
    changes: &[OwnerChange],
) -> Result<()> {
    let api: Api<Feed> = Api::namespaced(client.clone(), namespace);

    for change in changes {
        debug!(
            namespace = %namespace,
            feed = %change.feed,
            action = ?change.action,
            "Updating Feed owner references"
        );
        let patch = json!({
            "metadata": {
                "resourceVersion": change.resource_version,
                "ownerReferences": change.owner_references,
            }
        });
        api.patch(&change.feed, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .with_context(|| {
                format!(
                    "failed to update owner references of Feed {namespace}/{}",
                    change.feed
                )
            })?;
    }

    if !changes.is_empty() {
        info!(
            namespace = %namespace,
            changed = changes.len(),
            "Synchronized Feed owner references"
        );
    }
    Ok(())
}

/// Make `hotnews` own exactly the `Feed`s named in `desired`.
///
/// # Errors
///
/// Returns an error if listing or patching `Feed`s fails.
pub async fn sync_owner_references(
    client: &Client,
    hotnews: &HotNews,
    desired: &[String],
) -> Result<()> {
    let Some(owner) = owner_reference(hotnews) else {
        return Ok(());
    };
    let namespace = hotnews.namespace().unwrap_or_default();
    let feeds = Api::<Feed>::namespaced(client.clone(), &namespace)
        .list(&Default::default())
        .await
        .with_context(|| format!("failed to list Feeds in {namespace}"))?;

    let changes = plan_owner_changes(&feeds.items, &owner, desired);
    apply_owner_changes(client, &namespace, &changes).await
}

#[cfg(test)]
#[path = "owners_tests.rs"]
mod owners_tests;
