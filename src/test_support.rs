// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Fixtures shared by unit tests.
//!
//! Kubernetes API calls are served by a `wiremock` server standing in for the
//! API server, so reconcilers can be exercised without a cluster.

use crate::config::OperatorConfig;
use crate::context::Context;
use crate::crd::{Feed, FeedSpec, HotNews, HotNewsSpec};
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::Client;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use wiremock::MockServer;

pub const TEST_NAMESPACE: &str = "news";

/// Kubernetes client talking to `server` over plain HTTP.
pub fn fake_kube_client(server: &MockServer) -> Client {
    crate::context::install_crypto_provider();
    let config = kube::Config::new(server.uri().parse().unwrap());
    Client::try_from(config).unwrap()
}

/// Context whose Kubernetes API is `api` and whose aggregator is `aggregator`.
pub fn test_context(api: &MockServer, aggregator: &MockServer) -> Arc<Context> {
    let config = OperatorConfig {
        aggregator_url: aggregator.uri(),
        aggregator_timeout_secs: 2,
        ..OperatorConfig::default()
    };
    Arc::new(Context::new(fake_kube_client(api), config).unwrap())
}

pub fn feed(name: &str, uid: &str) -> Feed {
    let mut feed = Feed::new(
        name,
        FeedSpec {
            name: name.to_string(),
            url: format!("https://{name}.example.com/rss"),
        },
    );
    feed.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    feed.metadata.uid = Some(uid.to_string());
    feed.metadata.resource_version = Some("1".to_string());
    feed
}

pub fn owned_feed(name: &str, uid: &str, owners: &[(&str, &str)]) -> Feed {
    let mut feed = feed(name, uid);
    feed.metadata.owner_references = Some(
        owners
            .iter()
            .map(|(owner_name, owner_uid)| OwnerReference {
                api_version: crate::constants::API_GROUP_VERSION.to_string(),
                kind: crate::constants::KIND_HOT_NEWS.to_string(),
                name: (*owner_name).to_string(),
                uid: (*owner_uid).to_string(),
                block_owner_deletion: Some(false),
                controller: None,
            })
            .collect(),
    );
    feed
}

pub fn hotnews(name: &str, uid: &str, spec: HotNewsSpec) -> HotNews {
    let mut hn = HotNews::new(name, spec);
    hn.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    hn.metadata.uid = Some(uid.to_string());
    hn.metadata.resource_version = Some("1".to_string());
    hn.metadata.generation = Some(1);
    hn
}

pub fn config_map(name: &str, data: &[(&str, &str)]) -> ConfigMap {
    let mut cm = ConfigMap::default();
    cm.metadata.name = Some(name.to_string());
    cm.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    cm.data = Some(
        data.iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect::<BTreeMap<_, _>>(),
    );
    cm
}

/// A list response as returned by the API server.
pub fn list_body<T: serde::Serialize>(kind: &str, items: &[T]) -> Value {
    json!({
        "apiVersion": crate::constants::API_GROUP_VERSION,
        "kind": format!("{kind}List"),
        "metadata": { "resourceVersion": "1" },
        "items": items,
    })
}

/// An `admission.k8s.io/v1` review carrying `object`.
pub fn admission_review<T: serde::Serialize>(
    group: &str,
    kind: &str,
    resource: &str,
    operation: &str,
    object: &T,
) -> Value {
    let version = crate::constants::API_VERSION;
    json!({
        "apiVersion": "admission.k8s.io/v1",
        "kind": "AdmissionReview",
        "request": {
            "uid": "7d3d4c9e-0000-4000-8000-000000000001",
            "kind": { "group": group, "version": version, "kind": kind },
            "resource": { "group": group, "version": version, "resource": resource },
            "namespace": TEST_NAMESPACE,
            "operation": operation,
            "userInfo": { "username": "tester" },
            "object": object,
            "dryRun": false
        }
    })
}
