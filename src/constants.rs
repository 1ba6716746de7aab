// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Global constants for the news operator.
//!
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all news CRDs
pub const API_GROUP: &str = "newsaggregator.io";

/// API version for all news CRDs
pub const API_VERSION: &str = "v1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "newsaggregator.io/v1";

/// Kind name for `Feed` resource
pub const KIND_FEED: &str = "Feed";

/// Kind name for `HotNews` resource
pub const KIND_HOT_NEWS: &str = "HotNews";

/// Kind name for the core `ConfigMap` resource
pub const KIND_CONFIG_MAP: &str = "ConfigMap";

// ============================================================================
// Finalizers
// ============================================================================

/// Finalizer guarding removal of a `Feed` until its aggregator source is deleted
pub const FEED_FINALIZER: &str = "feed.newsaggregator.io/finalizer";

/// Finalizer guarding removal of a `HotNews` until Feed owner references are released
pub const HOT_NEWS_FINALIZER: &str = "hotnews.newsaggregator.io/finalizer";

// ============================================================================
// Resource Defaults and Limits
// ============================================================================

/// Maximum length of `Feed.spec.name`
pub const MAX_FEED_NAME_LEN: usize = 20;

/// Default number of titles kept in a `HotNews` summary
pub const DEFAULT_TITLES_COUNT: i32 = 10;

/// Date format used by `HotNews.spec.dateStart` / `dateEnd` and the aggregator query
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Separator between feed names in ConfigMap values and query parameters
pub const LIST_SEPARATOR: char = ',';

// ============================================================================
// Aggregator API
// ============================================================================

/// Path of the aggregator source registry endpoint
pub const AGGREGATOR_SOURCES_PATH: &str = "sources";

/// Path of the aggregator news query endpoint
pub const AGGREGATOR_NEWS_PATH: &str = "news";

/// Default aggregator base URL (in-cluster service)
pub const DEFAULT_AGGREGATOR_URL: &str = "https://news-aggregator.news-system.svc.cluster.local:8443";

/// Default timeout for outbound aggregator HTTP calls
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// ConfigMap
// ============================================================================

/// Default name of the ConfigMap defining feed groups
pub const DEFAULT_FEED_GROUPS_CONFIG_MAP: &str = "feed-group-source";

// ============================================================================
// Webhook Server
// ============================================================================

/// Default HTTPS port of the admission webhook server
pub const DEFAULT_WEBHOOK_PORT: u16 = 9443;

/// Default TLS certificate path (mounted from the webhook certificate Secret)
pub const DEFAULT_TLS_CERT_PATH: &str = "/tmp/k8s-webhook-server/serving-certs/tls.crt";

/// Default TLS private key path (mounted from the webhook certificate Secret)
pub const DEFAULT_TLS_KEY_PATH: &str = "/tmp/k8s-webhook-server/serving-certs/tls.key";

/// Timeout for list calls made while validating an admission request
pub const WEBHOOK_LIST_TIMEOUT_SECS: u64 = 10;

/// Admission path validating `Feed` writes
pub const PATH_VALIDATE_FEED: &str = "/validate-feed";

/// Admission path validating `HotNews` writes
pub const PATH_VALIDATE_HOT_NEWS: &str = "/validate-hotnews";

/// Admission path defaulting `HotNews` writes
pub const PATH_MUTATE_HOT_NEWS: &str = "/mutate-hotnews";

/// Admission path validating writes of the feed-group ConfigMap
pub const PATH_VALIDATE_CONFIG_MAP: &str = "/validate-configmap";

// ============================================================================
// Controller Timing
// ============================================================================

/// Default interval between successful `HotNews` refreshes
pub const DEFAULT_HOT_NEWS_REFRESH_SECS: u64 = 300;

/// Initial requeue delay after a failed reconcile
pub const DEFAULT_ERROR_BACKOFF_INITIAL_MILLIS: u64 = 500;

/// Upper bound of the requeue delay after repeated failures
pub const DEFAULT_ERROR_BACKOFF_MAX_SECS: u64 = 300;

/// Number of tokio worker threads
pub const TOKIO_WORKER_THREADS: usize = 4;
