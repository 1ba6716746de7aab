// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Finalizer management for news resources.
//!
//! Deletion follows a three-state lifecycle computed from the object itself:
//!
//! - [`LifecycleState::Active`]: no deletion timestamp
//! - [`LifecycleState::Finalizing`]: deletion timestamp set, our finalizer still present
//! - [`LifecycleState::Gone`]: deletion timestamp set, our finalizer already removed
//!
//! Finalizer patches carry `metadata.resourceVersion`, so a concurrent write
//! makes the patch fail with a conflict and the reconcile is retried.
//!
//! # Example
//!
//! ```rust,ignore
//! use news_operator::reconcilers::finalizers::{ensure_finalizer, handle_deletion, LifecycleState};
//!
//! match LifecycleState::of(&feed, FEED_FINALIZER) {
//!     LifecycleState::Active => {
//!         let feed = ensure_finalizer(&ctx.client, &feed, FEED_FINALIZER).await?;
//!     }
//!     LifecycleState::Finalizing => return handle_deletion(&ctx, &feed, FEED_FINALIZER).await,
//!     LifecycleState::Gone => return Ok(()),
//! }
//! ```

use crate::context::Context;
use anyhow::Result;
use kube::api::{Patch, PatchParams};
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, Resource, ResourceExt};
use serde_json::json;
use tracing::info;

/// Where a resource stands in its deletion lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Active,
    Finalizing,
    Gone,
}

impl LifecycleState {
    /// Compute the state of `resource` with respect to `finalizer`.
    #[must_use]
    pub fn of<K: Resource>(resource: &K, finalizer: &str) -> Self {
        if resource.meta().deletion_timestamp.is_none() {
            Self::Active
        } else if has_finalizer(resource, finalizer) {
            Self::Finalizing
        } else {
            Self::Gone
        }
    }
}

/// Cleanup that must complete before a finalizer is released.
///
/// If `cleanup` returns an error the finalizer stays and deletion is blocked
/// until a later reconcile succeeds.
#[async_trait::async_trait]
pub trait FinalizerCleanup: Resource + ResourceExt + Clone {
    /// # Errors
    ///
    /// Returns an error if the external or cluster state could not be cleaned up.
    async fn cleanup(&self, ctx: &Context) -> Result<()>;
}

#[must_use]
pub fn has_finalizer<K: Resource>(resource: &K, finalizer: &str) -> bool {
    resource
        .meta()
        .finalizers
        .as_ref()
        .is_some_and(|f| f.iter().any(|x| x == finalizer))
}

/// Merge patch replacing the finalizer list, guarded by the resource version.
fn finalizers_patch<K: Resource>(resource: &K, finalizers: &[String]) -> serde_json::Value {
    json!({
        "metadata": {
            "resourceVersion": resource.meta().resource_version,
            "finalizers": finalizers,
        }
    })
}

/// Add a finalizer to a resource if not already present.
///
/// Returns the resource as stored after the call, so later version-guarded
/// writes use the new resource version. Idempotent: no API call is made when
/// the finalizer is already there.
///
/// # Errors
///
/// Returns an error if the patch fails, including a version conflict.
pub async fn ensure_finalizer<K>(client: &Client, resource: &K, finalizer: &str) -> Result<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::de::DeserializeOwned,
{
    if has_finalizer(resource, finalizer) {
        return Ok(resource.clone());
    }

    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();
    info!(
        "Adding finalizer {} to {} {}/{}",
        finalizer,
        K::kind(&()),
        namespace,
        name
    );

    let mut finalizers = resource.meta().finalizers.clone().unwrap_or_default();
    finalizers.push(finalizer.to_string());

    let api: Api<K> = Api::namespaced(client.clone(), &namespace);
    let patch = finalizers_patch(resource, &finalizers);
    let updated = api
        .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(updated)
}

/// Remove a finalizer from a resource.
///
/// Idempotent: no API call is made when the finalizer is already absent.
///
/// # Errors
///
/// Returns an error if the patch fails, including a version conflict.
pub async fn remove_finalizer<K>(client: &Client, resource: &K, finalizer: &str) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + ResourceExt
        + Clone
        + std::fmt::Debug
        + serde::de::DeserializeOwned,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    let namespace = resource.namespace().unwrap_or_default();
    let name = resource.name_any();
    info!(
        "Removing finalizer {} from {} {}/{}",
        finalizer,
        K::kind(&()),
        namespace,
        name
    );

    let finalizers: Vec<String> = resource
        .meta()
        .finalizers
        .iter()
        .flatten()
        .filter(|f| *f != finalizer)
        .cloned()
        .collect();

    let api: Api<K> = Api::namespaced(client.clone(), &namespace);
    let patch = finalizers_patch(resource, &finalizers);
    api.patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await?;

    Ok(())
}

/// Run cleanup and release the finalizer of a resource being deleted.
///
/// Does nothing when the finalizer is already gone.
///
/// # Errors
///
/// Returns an error if cleanup or the finalizer removal fails; the finalizer
/// then remains and the next reconcile tries again.
pub async fn handle_deletion<K>(ctx: &Context, resource: &K, finalizer: &str) -> Result<()>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + FinalizerCleanup
        + Clone
        + std::fmt::Debug
        + serde::de::DeserializeOwned
        + Send
        + Sync,
{
    if !has_finalizer(resource, finalizer) {
        return Ok(());
    }

    info!(
        "{} {}/{} is being deleted, running cleanup",
        K::kind(&()),
        resource.namespace().unwrap_or_default(),
        resource.name_any()
    );

    resource.cleanup(ctx).await?;
    remove_finalizer(&ctx.client, resource, finalizer).await?;
    crate::metrics::record_resource_deleted(&K::kind(&()));

    Ok(())
}

#[cfg(test)]
#[path = "finalizers_tests.rs"]
mod finalizers_tests;
