// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Operator configuration.
//!
//! Every setting is a command-line flag that can also be supplied through an
//! environment variable, which is how the Deployment manifest configures it.

use crate::constants::{
    DEFAULT_AGGREGATOR_URL, DEFAULT_ERROR_BACKOFF_INITIAL_MILLIS, DEFAULT_ERROR_BACKOFF_MAX_SECS,
    DEFAULT_FEED_GROUPS_CONFIG_MAP, DEFAULT_HOT_NEWS_REFRESH_SECS, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_TLS_CERT_PATH, DEFAULT_TLS_KEY_PATH, DEFAULT_WEBHOOK_PORT,
};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration of the news operator.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "news-operator", version, about)]
pub struct OperatorConfig {
    /// Base URL of the news aggregator HTTP API
    #[arg(long, env = "AGGREGATOR_URL", default_value = DEFAULT_AGGREGATOR_URL)]
    pub aggregator_url: String,

    /// Timeout in seconds for each aggregator request
    #[arg(long, env = "AGGREGATOR_TIMEOUT_SECS", default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub aggregator_timeout_secs: u64,

    /// Name of the ConfigMap that maps feed groups to feed names
    #[arg(long, env = "FEED_GROUPS_CONFIG_MAP", default_value = DEFAULT_FEED_GROUPS_CONFIG_MAP)]
    pub config_map_name: String,

    /// Only honour the feed-group ConfigMap in this namespace (every
    /// namespace when unset)
    #[arg(long, env = "FEED_GROUPS_NAMESPACE")]
    pub config_map_namespace: Option<String>,

    /// Restrict watches to one namespace (all namespaces when unset)
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// HTTPS port of the admission webhook server
    #[arg(long, env = "WEBHOOK_PORT", default_value_t = DEFAULT_WEBHOOK_PORT)]
    pub webhook_port: u16,

    /// PEM certificate served by the webhook server
    #[arg(long, env = "TLS_CERT_PATH", default_value = DEFAULT_TLS_CERT_PATH)]
    pub tls_cert_path: PathBuf,

    /// PEM private key served by the webhook server
    #[arg(long, env = "TLS_KEY_PATH", default_value = DEFAULT_TLS_KEY_PATH)]
    pub tls_key_path: PathBuf,

    /// Run the controllers without the admission webhook server
    #[arg(long, env = "DISABLE_WEBHOOKS", default_value_t = false)]
    pub disable_webhooks: bool,

    /// Seconds between refreshes of a successfully reconciled `HotNews`
    #[arg(long, env = "HOT_NEWS_REFRESH_SECS", default_value_t = DEFAULT_HOT_NEWS_REFRESH_SECS)]
    pub hot_news_refresh_secs: u64,

    /// First requeue delay after a failed reconcile, in milliseconds
    #[arg(long, env = "ERROR_BACKOFF_INITIAL_MILLIS", default_value_t = DEFAULT_ERROR_BACKOFF_INITIAL_MILLIS)]
    pub error_backoff_initial_millis: u64,

    /// Maximum requeue delay after repeated failures, in seconds
    #[arg(long, env = "ERROR_BACKOFF_MAX_SECS", default_value_t = DEFAULT_ERROR_BACKOFF_MAX_SECS)]
    pub error_backoff_max_secs: u64,
}

impl OperatorConfig {
    #[must_use]
    pub fn aggregator_timeout(&self) -> Duration {
        Duration::from_secs(self.aggregator_timeout_secs)
    }

    #[must_use]
    pub fn hot_news_refresh(&self) -> Duration {
        Duration::from_secs(self.hot_news_refresh_secs)
    }

    #[must_use]
    pub fn error_backoff_initial(&self) -> Duration {
        Duration::from_millis(self.error_backoff_initial_millis)
    }

    #[must_use]
    pub fn error_backoff_max(&self) -> Duration {
        Duration::from_secs(self.error_backoff_max_secs)
    }

    /// Whether feed groups are read from the ConfigMap in `namespace`.
    #[must_use]
    pub fn feed_groups_enabled_in(&self, namespace: &str) -> bool {
        self.config_map_namespace
            .as_deref()
            .is_none_or(|allowed| allowed == namespace)
    }

    /// Whether `namespace/name` is the feed-group ConfigMap.
    #[must_use]
    pub fn is_feed_groups_config_map(&self, namespace: Option<&str>, name: &str) -> bool {
        name == self.config_map_name && namespace.is_some_and(|ns| self.feed_groups_enabled_in(ns))
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            aggregator_url: DEFAULT_AGGREGATOR_URL.to_string(),
            aggregator_timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
            config_map_name: DEFAULT_FEED_GROUPS_CONFIG_MAP.to_string(),
            config_map_namespace: None,
            watch_namespace: None,
            webhook_port: DEFAULT_WEBHOOK_PORT,
            tls_cert_path: PathBuf::from(DEFAULT_TLS_CERT_PATH),
            tls_key_path: PathBuf::from(DEFAULT_TLS_KEY_PATH),
            disable_webhooks: false,
            hot_news_refresh_secs: DEFAULT_HOT_NEWS_REFRESH_SECS,
            error_backoff_initial_millis: DEFAULT_ERROR_BACKOFF_INITIAL_MILLIS,
            error_backoff_max_secs: DEFAULT_ERROR_BACKOFF_MAX_SECS,
        }
    }
}
