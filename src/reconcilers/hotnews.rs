// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! `HotNews` reconciliation.
//!
//! # Reconciliation Flow
//!
//! 1. Resolve `spec.feedGroups` against the feed-group ConfigMap. A non-empty
//!    result replaces `spec.feedsName` on the object.
//! 2. Build the aggregator query URL ([`create_url`]).
//! 3. Run the query and summarize the articles ([`top_titles`]).
//! 4. Make this `HotNews` own exactly the `Feed`s it queries.
//! 5. Record the outcome as an `Added` condition and requeue for a refresh.
//!
//! A `HotNews` being deleted only releases its owner references; it has no
//! aggregator-side state.

use crate::aggregator::Article;
use crate::constants::{DEFAULT_TITLES_COUNT, HOT_NEWS_FINALIZER, LIST_SEPARATOR};
use crate::context::Context;
use crate::crd::{ConditionType, Feed, HotNews, HotNewsSpec, HotNewsStatus};
use crate::errors::{reason_for, HotNewsError};
use crate::reconcilers::finalizers::{
    ensure_finalizer, handle_deletion, FinalizerCleanup, LifecycleState,
};
use crate::reconcilers::owners::{
    apply_owner_changes, owner_reference, plan_owner_changes, sync_owner_references,
};
use crate::reconcilers::status::{new_condition, patch_status, upsert_condition};
use crate::status_reasons::REASON_NEWS_FETCHED;
use anyhow::{Context as _, Result};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{ListParams, Patch, PatchParams};
use kube::runtime::controller::Action;
use kube::{Api, ResourceExt};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use url::Url;

#[async_trait::async_trait]
impl FinalizerCleanup for HotNews {
    async fn cleanup(&self, ctx: &Context) -> Result<()> {
        sync_owner_references(&ctx.client, self, &[])
            .await
            .context("failed to release Feed owner references")
    }
}

/// Result of one successful news query.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewsSummary {
    /// Feed names the query ran against
    pub feeds_name: Vec<String>,
    /// Query URL
    pub news_link: String,
    pub articles_count: i32,
    pub articles_titles: Vec<String>,
}

/// Split a comma-separated ConfigMap value into trimmed, non-empty names.
pub fn split_feed_list(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Resolve `groups` to feed names using the ConfigMap `data`.
///
/// Groups missing from `data` are skipped. Every resolved name must be one of
/// `known_feeds`. Duplicates are dropped, first occurrence wins.
///
/// # Errors
///
/// Returns [`HotNewsError::UnknownFeed`] for the first name no `Feed` carries.
pub fn resolve_feed_groups(
    groups: &[String],
    data: &BTreeMap<String, String>,
    known_feeds: &[String],
) -> Result<Vec<String>, HotNewsError> {
    let mut resolved: Vec<String> = Vec::new();

    for group in groups {
        let Some(value) = data.get(group.trim()) else {
            debug!(group = %group, "Feed group not defined in ConfigMap");
            continue;
        };
        for feed in split_feed_list(value) {
            if !known_feeds.iter().any(|k| k == feed) {
                return Err(HotNewsError::UnknownFeed {
                    group: group.clone(),
                    feed: feed.to_string(),
                });
            }
            if !resolved.iter().any(|r| r == feed) {
                resolved.push(feed.to_string());
            }
        }
    }

    Ok(resolved)
}

/// Build the aggregator query URL for `spec` on top of the news endpoint.
///
/// `sources` is mandatory; `keywords` is added when present; `startDate`
/// and `endDate` are added only when both are set.
///
/// # Errors
///
/// Returns [`HotNewsError::NoFeedsResolved`] when `spec.feedsName` is empty.
pub fn create_url(news_endpoint: &Url, spec: &HotNewsSpec) -> Result<Url, HotNewsError> {
    let sources: Vec<&str> = spec
        .feeds_name
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if sources.is_empty() {
        return Err(HotNewsError::NoFeedsResolved);
    }

    let separator = LIST_SEPARATOR.to_string();
    let mut url = news_endpoint.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("sources", &sources.join(&separator));

        let keywords: Vec<&str> = spec
            .keywords
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if !keywords.is_empty() {
            query.append_pair("keywords", &keywords.join(&separator));
        }

        if let (Some(start), Some(end)) = (&spec.date_start, &spec.date_end) {
            query.append_pair("startDate", start.trim());
            query.append_pair("endDate", end.trim());
        }
    }

    Ok(url)
}

/// First `min(n, articles.len())` titles, in input order.
#[must_use]
pub fn top_titles(articles: &[Article], n: usize) -> Vec<String> {
    articles.iter().take(n).map(|a| a.title.clone()).collect()
}

/// Number of titles to keep; zero or negative falls back to the default.
#[must_use]
pub fn effective_titles_count(spec: &HotNewsSpec) -> usize {
    let count = if spec.summary_config.titles_count > 0 {
        spec.summary_config.titles_count
    } else {
        DEFAULT_TITLES_COUNT
    };
    usize::try_from(count).unwrap_or_default()
}

/// Summarize a query response.
#[must_use]
pub fn summarize(spec: &HotNewsSpec, url: &Url, articles: &[Article]) -> NewsSummary {
    NewsSummary {
        feeds_name: spec.feeds_name.clone(),
        news_link: url.to_string(),
        articles_count: i32::try_from(articles.len()).unwrap_or(i32::MAX),
        articles_titles: top_titles(articles, effective_titles_count(spec)),
    }
}

/// Status `hotnews` would have after recording `outcome`.
///
/// A failure keeps the previous article data and only replaces the condition.
#[must_use]
pub fn hotnews_status_with(
    hotnews: &HotNews,
    outcome: Result<&NewsSummary, &anyhow::Error>,
) -> HotNewsStatus {
    let mut status = hotnews.status.clone().unwrap_or_default();
    let name = hotnews.name_any();
    let condition = match outcome {
        Ok(summary) => {
            status.articles_count = summary.articles_count;
            status.news_link.clone_from(&summary.news_link);
            status.articles_titles.clone_from(&summary.articles_titles);
            new_condition(
                ConditionType::Added,
                true,
                REASON_NEWS_FETCHED,
                &format!("fetched {} articles", summary.articles_count),
                &name,
            )
        }
        Err(e) => new_condition(
            ConditionType::Added,
            false,
            reason_for(e),
            &format!("{e:#}"),
            &name,
        ),
    };
    upsert_condition(&mut status.conditions, condition);
    status
}

/// Reconcile a `HotNews` query.
///
/// # Errors
///
/// Returns an error if feed resolution, the aggregator query, owner
/// synchronization or a Kubernetes API call fails. The outcome is recorded on
/// the `HotNews` status before returning.
pub async fn reconcile_hotnews(ctx: Arc<Context>, hotnews: Arc<HotNews>) -> Result<Action> {
    let namespace = hotnews.namespace().unwrap_or_default();
    let name = hotnews.name_any();
    let api: Api<HotNews> = Api::namespaced(ctx.client.clone(), &namespace);

    let Some(hotnews) = api
        .get_opt(&name)
        .await
        .with_context(|| format!("failed to get HotNews {namespace}/{name}"))?
    else {
        debug!(namespace = %namespace, name = %name, "HotNews no longer exists");
        return Ok(Action::await_change());
    };

    match LifecycleState::of(&hotnews, HOT_NEWS_FINALIZER) {
        LifecycleState::Gone => Ok(Action::await_change()),
        LifecycleState::Finalizing => {
            handle_deletion(&ctx, &hotnews, HOT_NEWS_FINALIZER).await?;
            info!(namespace = %namespace, name = %name, "HotNews released its Feeds");
            Ok(Action::await_change())
        }
        LifecycleState::Active => {
            let hotnews = ensure_finalizer(&ctx.client, &hotnews, HOT_NEWS_FINALIZER).await?;

            match refresh(&ctx, &hotnews).await {
                Ok(summary) => {
                    info!(
                        namespace = %namespace,
                        name = %name,
                        articles = summary.articles_count,
                        "HotNews refreshed"
                    );
                    let status = hotnews_status_with(&hotnews, Ok(&summary));
                    patch_status(&ctx.client, &hotnews, hotnews.status.as_ref(), &status).await?;
                    Ok(Action::requeue(ctx.config.hot_news_refresh()))
                }
                Err(e) => {
                    error!(namespace = %namespace, name = %name, error = %e, "Failed to refresh HotNews");
                    let status = hotnews_status_with(&hotnews, Err(&e));
                    if let Err(status_err) =
                        patch_status(&ctx.client, &hotnews, hotnews.status.as_ref(), &status).await
                    {
                        warn!(namespace = %namespace, name = %name, error = %status_err, "Failed to record HotNews status");
                    }
                    Err(e)
                }
            }
        }
    }
}

/// Resolve feeds, run the query and synchronize owner references.
async fn refresh(ctx: &Context, hotnews: &HotNews) -> Result<NewsSummary> {
    let namespace = hotnews.namespace().unwrap_or_default();
    let feeds = Api::<Feed>::namespaced(ctx.client.clone(), &namespace)
        .list(&ListParams::default())
        .await
        .with_context(|| format!("failed to list Feeds in {namespace}"))?
        .items;

    let mut spec = hotnews.spec.clone();
    let resolved = resolve_groups(ctx, hotnews, &feeds).await?;
    if !resolved.is_empty() && resolved != spec.feeds_name {
        persist_feeds_name(ctx, hotnews, &resolved).await?;
        spec.feeds_name = resolved;
    }

    let endpoint = ctx.aggregator.news_endpoint()?;
    let url = create_url(&endpoint, &spec)?;
    let articles = ctx
        .aggregator
        .fetch_news(&url)
        .await
        .context("failed to query news aggregator")?;
    let summary = summarize(&spec, &url, &articles);

    if let Some(owner) = owner_reference(hotnews) {
        let changes = plan_owner_changes(&feeds, &owner, &spec.feeds_name);
        apply_owner_changes(&ctx.client, &namespace, &changes).await?;
    }

    Ok(summary)
}

async fn resolve_groups(ctx: &Context, hotnews: &HotNews, feeds: &[Feed]) -> Result<Vec<String>> {
    let namespace = hotnews.namespace().unwrap_or_default();
    if hotnews.spec.feed_groups.is_empty() || !ctx.config.feed_groups_enabled_in(&namespace) {
        return Ok(Vec::new());
    }

    let config_map = Api::<ConfigMap>::namespaced(ctx.client.clone(), &namespace)
        .get_opt(&ctx.config.config_map_name)
        .await
        .with_context(|| {
            format!(
                "failed to read ConfigMap {namespace}/{}",
                ctx.config.config_map_name
            )
        })?;
    let Some(data) = config_map.and_then(|cm| cm.data) else {
        debug!(namespace = %namespace, "Feed-group ConfigMap absent, using feedsName as is");
        return Ok(Vec::new());
    };

    let known: Vec<String> = feeds.iter().map(|f| f.spec.name.trim().to_string()).collect();
    Ok(resolve_feed_groups(&hotnews.spec.feed_groups, &data, &known)?)
}

async fn persist_feeds_name(ctx: &Context, hotnews: &HotNews, feeds_name: &[String]) -> Result<()> {
    let namespace = hotnews.namespace().unwrap_or_default();
    let name = hotnews.name_any();
    info!(
        namespace = %namespace,
        name = %name,
        feeds = ?feeds_name,
        "Replacing feedsName with resolved feed groups"
    );

    let patch = json!({
        "metadata": { "resourceVersion": hotnews.resource_version() },
        "spec": { "feedsName": feeds_name },
    });
    Api::<HotNews>::namespaced(ctx.client.clone(), &namespace)
        .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
        .with_context(|| format!("failed to update feedsName of HotNews {namespace}/{name}"))?;
    Ok(())
}

#[cfg(test)]
#[path = "hotnews_tests.rs"]
mod hotnews_tests;
