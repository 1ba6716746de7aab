// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Map changes of related objects to the `HotNews` that must be reconciled.
//!
//! - A `Feed` change wakes every `HotNews` owning that `Feed`.
//! - A change of the feed-group ConfigMap wakes every `HotNews` in its
//!   namespace whose `feedGroups` names one of the ConfigMap keys.
//!
//! The mapping itself is pure; the async wrappers list `HotNews` from the API
//! and treat a failed list as "nothing to do" after logging it.

use crate::config::OperatorConfig;
use crate::crd::{Feed, HotNews};
use crate::predicates::is_feed_groups_config_map;
use futures::{future, stream, Stream, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::ListParams;
use kube::runtime::reflector::ObjectRef;
use kube::runtime::{watcher, WatchStreamExt};
use kube::{Api, Client, ResourceExt};
use tracing::{debug, warn};

fn object_ref(hotnews: &HotNews) -> ObjectRef<HotNews> {
    let r = ObjectRef::new(&hotnews.name_any());
    match hotnews.namespace() {
        Some(ns) => r.within(&ns),
        None => r,
    }
}

/// `HotNews` whose UID appears among the owner references of `feed`.
#[must_use]
pub fn hotnews_owned_by_feed(feed: &Feed, hotnews: &[HotNews]) -> Vec<ObjectRef<HotNews>> {
    let owners = feed.owner_references();
    hotnews
        .iter()
        .filter(|hn| {
            hn.metadata
                .uid
                .as_deref()
                .is_some_and(|uid| owners.iter().any(|o| o.uid == uid))
        })
        .map(object_ref)
        .collect()
}

/// `HotNews` whose `feedGroups` intersects the keys of `config_map`.
#[must_use]
pub fn hotnews_for_config_map(
    config_map: &ConfigMap,
    hotnews: &[HotNews],
) -> Vec<ObjectRef<HotNews>> {
    let Some(data) = config_map.data.as_ref() else {
        return Vec::new();
    };
    hotnews
        .iter()
        .filter(|hn| {
            hn.spec
                .feed_groups
                .iter()
                .any(|group| data.contains_key(group.trim()))
        })
        .map(object_ref)
        .collect()
}

/// List `HotNews` in `namespace`; a failure is logged and yields nothing.
async fn list_hotnews(client: &Client, namespace: &str) -> Vec<HotNews> {
    let api: Api<HotNews> = Api::namespaced(client.clone(), namespace);
    match api.list(&ListParams::default()).await {
        Ok(list) => list.items,
        Err(e) => {
            warn!(namespace = %namespace, error = %e, "Failed to list HotNews");
            Vec::new()
        }
    }
}

/// Requests caused by a change of `feed`.
pub async fn feed_changed(client: &Client, feed: &Feed) -> Vec<ObjectRef<HotNews>> {
    if feed.owner_references().is_empty() {
        return Vec::new();
    }
    let namespace = feed.namespace().unwrap_or_default();
    let requests = hotnews_owned_by_feed(feed, &list_hotnews(client, &namespace).await);
    debug!(
        namespace = %namespace,
        feed = %feed.name_any(),
        requests = requests.len(),
        "Feed change mapped to HotNews"
    );
    requests
}

/// Requests caused by a change of `config_map`.
pub async fn config_map_changed(
    client: &Client,
    config: &OperatorConfig,
    config_map: &ConfigMap,
) -> Vec<ObjectRef<HotNews>> {
    if !is_feed_groups_config_map(config, config_map) {
        return Vec::new();
    }
    let namespace = config_map.namespace().unwrap_or_default();
    let requests = hotnews_for_config_map(config_map, &list_hotnews(client, &namespace).await);
    debug!(
        namespace = %namespace,
        requests = requests.len(),
        "Feed-group ConfigMap change mapped to HotNews"
    );
    requests
}

/// Drop watcher errors after logging them.
fn log_watch_errors<K, S>(objects: S, kind: &'static str) -> impl Stream<Item = K> + Send
where
    K: Send,
    S: Stream<Item = Result<K, watcher::Error>> + Send,
{
    objects.filter_map(move |r| {
        future::ready(match r {
            Ok(obj) => Some(obj),
            Err(e) => {
                warn!(kind = kind, error = %e, "Watch error");
                None
            }
        })
    })
}

/// Reconcile triggers for `HotNews` driven by `Feed` changes.
pub fn feed_triggers(
    client: Client,
    feeds: Api<Feed>,
) -> impl Stream<Item = ObjectRef<HotNews>> + Send + 'static {
    let events = watcher(feeds, watcher::Config::default())
        .default_backoff()
        .touched_objects();
    log_watch_errors(events, "Feed")
        .then(move |feed| {
            let client = client.clone();
            async move { feed_changed(&client, &feed).await }
        })
        .flat_map(stream::iter)
}

/// Reconcile triggers for `HotNews` driven by feed-group ConfigMap changes.
pub fn config_map_triggers(
    client: Client,
    config: OperatorConfig,
    config_maps: Api<ConfigMap>,
) -> impl Stream<Item = ObjectRef<HotNews>> + Send + 'static {
    let selector = format!("metadata.name={}", config.config_map_name);
    let events = watcher(config_maps, watcher::Config::default().fields(&selector))
        .default_backoff()
        .touched_objects();
    log_watch_errors(events, "ConfigMap")
        .then(move |config_map| {
            let client = client.clone();
            let config = config.clone();
            async move { config_map_changed(&client, &config, &config_map).await }
        })
        .flat_map(stream::iter)
}

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod handlers_tests;
