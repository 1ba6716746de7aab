// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Event filters deciding which watch events are worth a reconcile.
//!
//! - [`GenerationChanged`]: creates and deletes always pass, updates pass only
//!   when `metadata.generation` moved. Status, finalizer and owner-reference
//!   writes do not bump the generation, so the controllers never wake up on
//!   their own writes.
//! - Deletes of objects this filter never saw are dropped, since their prior
//!   state is unknown.
//! - A relist (`Init` .. `InitDone`) forgets objects that were not listed
//!   again, so deletes missed while the watch was down do not leak entries.
//! - [`is_feed_groups_config_map`]: only the configured ConfigMap passes.

use crate::config::OperatorConfig;
use futures::{future, Stream, StreamExt};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::runtime::watcher;
use kube::{Resource, ResourceExt};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Stateful generation predicate over watcher events.
#[derive(Debug, Default)]
pub struct GenerationChanged {
    /// Last generation seen per object key
    seen: HashMap<String, Option<i64>>,
    /// Keys listed since the last `Init`, while a relist is in progress
    relisted: Option<HashSet<String>>,
}

impl GenerationChanged {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether `event` triggers a reconcile, returning the object if so.
    pub fn admit<K: Resource>(&mut self, event: watcher::Event<K>) -> Option<K> {
        match event {
            watcher::Event::Apply(obj) | watcher::Event::InitApply(obj) => {
                let key = object_key(&obj);
                let generation = obj.meta().generation;
                if let Some(relisted) = self.relisted.as_mut() {
                    relisted.insert(key.clone());
                }
                match self.seen.insert(key, generation) {
                    None => Some(obj),
                    Some(previous) if previous != generation => Some(obj),
                    Some(_) => None,
                }
            }
            watcher::Event::Delete(obj) => {
                let key = object_key(&obj);
                if self.seen.remove(&key).is_some() {
                    Some(obj)
                } else {
                    debug!(object = %key, "Ignoring delete of an object never seen");
                    None
                }
            }
            watcher::Event::Init => {
                self.relisted = Some(HashSet::new());
                None
            }
            watcher::Event::InitDone => {
                if let Some(relisted) = self.relisted.take() {
                    let before = self.seen.len();
                    self.seen.retain(|key, _| relisted.contains(key));
                    let pruned = before - self.seen.len();
                    if pruned > 0 {
                        debug!(pruned = pruned, "Forgot objects missing from relist");
                    }
                }
                None
            }
        }
    }

    /// Number of objects currently tracked.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.seen.len()
    }
}

/// Key of an object: its UID, or `namespace/name` when it has none yet.
fn object_key<K: Resource>(obj: &K) -> String {
    obj.meta().uid.clone().unwrap_or_else(|| {
        format!(
            "{}/{}",
            obj.meta().namespace.as_deref().unwrap_or_default(),
            obj.meta().name.as_deref().unwrap_or_default()
        )
    })
}

/// Apply [`GenerationChanged`] to a stream of watcher events.
///
/// Watcher errors pass through so the controller can log and back off.
pub fn generation_changed<K, S>(events: S) -> impl Stream<Item = Result<K, watcher::Error>> + Send
where
    K: Resource + Send + 'static,
    S: Stream<Item = Result<watcher::Event<K>, watcher::Error>> + Send + 'static,
{
    let mut predicate = GenerationChanged::new();
    events.filter_map(move |event| {
        future::ready(match event {
            Ok(event) => predicate.admit(event).map(Ok),
            Err(e) => Some(Err(e)),
        })
    })
}

/// Whether `config_map` is the feed-group ConfigMap.
#[must_use]
pub fn is_feed_groups_config_map(config: &OperatorConfig, config_map: &ConfigMap) -> bool {
    config.is_feed_groups_config_map(config_map.namespace().as_deref(), &config_map.name_any())
}

#[cfg(test)]
#[path = "predicates_tests.rs"]
mod predicates_tests;
