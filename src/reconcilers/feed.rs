// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! `Feed` reconciliation.
//!
//! A `Feed` is kept registered as a source with the news aggregator:
//!
//! - active feeds get the finalizer, then `POST /sources` with their URL
//! - feeds being deleted get `DELETE /sources` with their name, then lose the finalizer
//!
//! Every attempt makes at most one aggregator call and records its outcome
//! as an `Added` or `Deleted` condition. Registering is idempotent on the
//! aggregator side, so repeated reconciles are safe.

use crate::constants::FEED_FINALIZER;
use crate::context::Context;
use crate::crd::{ConditionType, Feed, FeedStatus};
use crate::errors::reason_for;
use crate::reconcilers::finalizers::{
    ensure_finalizer, handle_deletion, FinalizerCleanup, LifecycleState,
};
use crate::reconcilers::status::{new_condition, patch_status, upsert_condition};
use crate::status_reasons::REASON_SOURCE_REGISTERED;
use anyhow::{Context as _, Result};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[async_trait::async_trait]
impl FinalizerCleanup for Feed {
    async fn cleanup(&self, ctx: &Context) -> Result<()> {
        ctx.aggregator
            .delete_source(self.spec.name.trim())
            .await
            .with_context(|| format!("failed to delete source '{}' from aggregator", self.spec.name))
    }
}

/// Reconcile a `Feed` against the aggregator source registry.
///
/// # Errors
///
/// Returns an error if the aggregator call or a Kubernetes API call fails.
/// The outcome is recorded on the `Feed` status before returning.
pub async fn reconcile_feed(ctx: Arc<Context>, feed: Arc<Feed>) -> Result<Action> {
    let namespace = feed.namespace().unwrap_or_default();
    let name = feed.name_any();
    let api: Api<Feed> = Api::namespaced(ctx.client.clone(), &namespace);

    // Re-read to act on the latest resourceVersion
    let Some(feed) = api
        .get_opt(&name)
        .await
        .with_context(|| format!("failed to get Feed {namespace}/{name}"))?
    else {
        debug!(namespace = %namespace, name = %name, "Feed no longer exists");
        return Ok(Action::await_change());
    };

    match LifecycleState::of(&feed, FEED_FINALIZER) {
        LifecycleState::Gone => Ok(Action::await_change()),
        LifecycleState::Finalizing => {
            if let Err(e) = handle_deletion(&ctx, &feed, FEED_FINALIZER).await {
                error!(namespace = %namespace, name = %name, error = %e, "Failed to finalize Feed");
                record_outcome(&ctx, &feed, ConditionType::Deleted, Err(&e)).await;
                return Err(e);
            }
            info!(namespace = %namespace, name = %name, source = %feed.spec.name, "Feed source removed");
            Ok(Action::await_change())
        }
        LifecycleState::Active => {
            let feed = ensure_finalizer(&ctx.client, &feed, FEED_FINALIZER).await?;

            let result = ctx
                .aggregator
                .add_source(feed.spec.url.trim())
                .await
                .with_context(|| format!("failed to register source '{}'", feed.spec.url));

            match result {
                Ok(()) => {
                    info!(namespace = %namespace, name = %name, url = %feed.spec.url, "Feed source registered");
                    record_outcome(&ctx, &feed, ConditionType::Added, Ok(())).await;
                    Ok(Action::await_change())
                }
                Err(e) => {
                    error!(namespace = %namespace, name = %name, error = %e, "Failed to register Feed source");
                    record_outcome(&ctx, &feed, ConditionType::Added, Err(&e)).await;
                    Err(e)
                }
            }
        }
    }
}

/// Status `Feed` would have after recording `outcome` under `condition_type`.
#[must_use]
pub fn feed_status_with(
    feed: &Feed,
    condition_type: ConditionType,
    outcome: Result<(), &anyhow::Error>,
) -> FeedStatus {
    let mut status = feed.status.clone().unwrap_or_default();
    let condition = match outcome {
        Ok(()) => new_condition(
            condition_type,
            true,
            REASON_SOURCE_REGISTERED,
            "source registered with the news aggregator",
            &feed.spec.name,
        ),
        Err(e) => new_condition(
            condition_type,
            false,
            reason_for(e),
            &format!("{e:#}"),
            &feed.spec.name,
        ),
    };
    upsert_condition(&mut status.conditions, condition);
    status
}

/// Persist an outcome; a failed status write is logged, not returned.
async fn record_outcome(
    ctx: &Context,
    feed: &Feed,
    condition_type: ConditionType,
    outcome: Result<(), &anyhow::Error>,
) {
    let status = feed_status_with(feed, condition_type, outcome);
    if let Err(e) = patch_status(&ctx.client, feed, feed.status.as_ref(), &status).await {
        warn!(
            namespace = %feed.namespace().unwrap_or_default(),
            name = %feed.name_any(),
            error = %e,
            "Failed to record Feed status"
        );
    }
}

#[cfg(test)]
#[path = "feed_tests.rs"]
mod feed_tests;
