// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Controller wiring for `Feed` and `HotNews`.
//!
//! Both controllers watch their primary resource through a reflector whose
//! events pass the generation predicate, so status-only writes never trigger
//! a reconcile. The `HotNews` controller is also woken by `Feed` and
//! feed-group ConfigMap changes through the handlers.
//!
//! Failed reconciles are requeued with a per-object exponential backoff that
//! resets on the next success.

use crate::constants::{KIND_FEED, KIND_HOT_NEWS};
use crate::context::Context;
use crate::crd::{Feed, HotNews};
use crate::errors::reason_for;
use crate::handlers::{config_map_triggers, feed_triggers};
use crate::predicates::generation_changed;
use crate::reconcilers::retry::RequeueBackoff;
use crate::reconcilers::{reconcile_feed, reconcile_hotnews};
use anyhow::Result;
use futures::StreamExt;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::core::NamespaceResourceScope;
use kube::runtime::controller::Action;
use kube::runtime::{reflector, watcher, Controller, WatchStreamExt};
use kube::{Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Requeue reason label for error backoff
pub const REQUEUE_REASON_ERROR: &str = "error";

/// Requeue reason label for scheduled refreshes after a success
pub const REQUEUE_REASON_REFRESH: &str = "refresh";

/// Reconciliation error wrapper
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] anyhow::Error);

/// Api over one namespace, or over all namespaces when `namespace` is `None`.
pub fn scoped_api<K>(client: &Client, namespace: Option<&str>) -> Api<K>
where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>,
{
    match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    }
}

/// Error policy shared by both controllers.
///
/// Returns a requeue after the next backoff delay of the failing object.
#[allow(clippy::needless_pass_by_value)] // Signature required by kube::runtime::Controller
pub fn error_policy<K>(resource: Arc<K>, err: &ReconcileError, ctx: Arc<Context>) -> Action
where
    K: Resource<DynamicType = ()> + ResourceExt,
{
    let key = RequeueBackoff::key_for(resource.as_ref());
    let delay = ctx.backoff.next_delay(&key);
    error!(
        object = %key,
        error = %err,
        "Reconciliation error - will retry in {:?}",
        delay
    );
    crate::metrics::record_reconciliation_requeue(&K::kind(&()), REQUEUE_REASON_ERROR);
    Action::requeue(delay)
}

/// Record metrics and backoff state for one reconcile outcome.
///
/// Errors are counted under their condition reason; a success that asks
/// for a requeue counts as a refresh.
pub fn finish(
    kind: &str,
    ctx: &Context,
    key: &str,
    started: Instant,
    result: Result<Action>,
) -> Result<Action, ReconcileError> {
    let duration = started.elapsed();
    match result {
        Ok(action) => {
            ctx.backoff.reset(key);
            crate::metrics::record_reconciliation_success(kind, duration);
            if action != Action::await_change() {
                crate::metrics::record_reconciliation_requeue(kind, REQUEUE_REASON_REFRESH);
            }
            debug!(object = %key, action = ?action, "Reconcile finished");
            Ok(action)
        }
        Err(e) => {
            crate::metrics::record_reconciliation_error(kind, duration);
            crate::metrics::record_error(kind, reason_for(&e));
            Err(e.into())
        }
    }
}

async fn reconcile_feed_wrapper(feed: Arc<Feed>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let key = RequeueBackoff::key_for(feed.as_ref());
    debug!(object = %key, "Reconcile wrapper called for Feed");
    let result = reconcile_feed(ctx.clone(), feed).await;
    finish(KIND_FEED, &ctx, &key, started, result)
}

async fn reconcile_hotnews_wrapper(
    hotnews: Arc<HotNews>,
    ctx: Arc<Context>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    let key = RequeueBackoff::key_for(hotnews.as_ref());
    debug!(object = %key, "Reconcile wrapper called for HotNews");
    let result = reconcile_hotnews(ctx.clone(), hotnews).await;
    finish(KIND_HOT_NEWS, &ctx, &key, started, result)
}

/// Reflector-backed primary stream filtered by the generation predicate.
fn primary_stream<K>(
    api: Api<K>,
) -> (
    reflector::Store<K>,
    impl futures::Stream<Item = Result<K, watcher::Error>> + Send + 'static,
)
where
    K: Resource<DynamicType = ()> + Clone + DeserializeOwned + Debug + Send + Sync + 'static,
{
    let (reader, writer) = reflector::store();
    let events = reflector(writer, watcher(api, watcher::Config::default()).default_backoff());
    (reader, generation_changed(events))
}

/// Run the `Feed` controller until shutdown.
///
/// # Errors
///
/// Currently never fails; the signature leaves room for startup checks.
pub async fn run_feed_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting Feed controller");

    let api: Api<Feed> = scoped_api(&ctx.client, ctx.config.watch_namespace.as_deref());
    let (reader, stream) = primary_stream(api);

    Controller::for_stream(stream, reader)
        .shutdown_on_signal()
        .run(reconcile_feed_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    info!("Feed controller stopped");
    Ok(())
}

/// Run the `HotNews` controller until shutdown.
///
/// # Errors
///
/// Currently never fails; the signature leaves room for startup checks.
pub async fn run_hotnews_controller(ctx: Arc<Context>) -> Result<()> {
    info!("Starting HotNews controller");

    let client = ctx.client.clone();
    let config = ctx.config.clone();
    let watch_namespace = config.watch_namespace.as_deref();

    let api: Api<HotNews> = scoped_api(&client, watch_namespace);
    let feeds: Api<Feed> = scoped_api(&client, watch_namespace);
    let config_maps: Api<ConfigMap> = scoped_api(
        &client,
        config.config_map_namespace.as_deref().or(watch_namespace),
    );
    let (reader, stream) = primary_stream(api);

    Controller::for_stream(stream, reader)
        .reconcile_on(feed_triggers(client.clone(), feeds))
        .reconcile_on(config_map_triggers(client, config.clone(), config_maps))
        .shutdown_on_signal()
        .run(reconcile_hotnews_wrapper, error_policy, ctx)
        .for_each(|_| futures::future::ready(()))
        .await;

    info!("HotNews controller stopped");
    Ok(())
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod controller_tests;
