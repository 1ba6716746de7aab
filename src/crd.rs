// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions (CRDs) for news management.
//!
//! # Resource Types
//!
//! - [`Feed`] - A named external news source registered with the aggregator
//! - [`HotNews`] - A saved, parameterized news query over a set of feeds
//!
//! # Example: Creating a Feed
//!
//! ```rust,no_run
//! use news_operator::crd::FeedSpec;
//!
//! let spec = FeedSpec {
//!     name: "bbc".to_string(),
//!     url: "https://feeds.bbci.co.uk/news/rss.xml".to_string(),
//! };
//! ```
//!
//! # Example: Creating a HotNews query
//!
//! ```rust,no_run
//! use news_operator::crd::{HotNewsSpec, SummaryConfig};
//!
//! let spec = HotNewsSpec {
//!     keywords: vec!["rust".to_string()],
//!     date_start: Some("2024-01-01".to_string()),
//!     date_end: Some("2024-01-31".to_string()),
//!     feeds_name: vec!["bbc".to_string()],
//!     feed_groups: vec![],
//!     summary_config: SummaryConfig { titles_count: 5 },
//! };
//! ```

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The aspect of a resource a [`Condition`] reports on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionType {
    /// The resource was registered with (or queried from) the aggregator.
    Added,
    /// The resource was removed from the aggregator.
    Deleted,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Added => f.write_str("Added"),
            Self::Deleted => f.write_str("Deleted"),
        }
    }
}

/// Condition represents the outcome of the latest reconcile attempt of one type.
///
/// A status holds at most one condition per [`ConditionType`]; newer outcomes
/// overwrite older ones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition: `Added` or `Deleted`.
    pub r#type: ConditionType,

    /// Whether the attempt succeeded.
    pub success: bool,

    /// Brief CamelCase reason for the outcome.
    #[serde(default)]
    pub reason: String,

    /// Human-readable details, usually the error text on failure.
    #[serde(default)]
    pub message: String,

    /// Name of the object the condition was recorded for.
    #[serde(default)]
    pub last_updated_name: String,

    /// Time the condition was recorded (RFC3339 format).
    #[serde(default)]
    pub last_update_time: String,
}

/// `Feed` registers an external news source with the aggregator.
///
/// # Example
///
/// ```yaml
/// apiVersion: newsaggregator.io/v1
/// kind: Feed
/// metadata:
///   name: bbc
///   namespace: news
/// spec:
///   name: bbc
///   url: https://feeds.bbci.co.uk/news/rss.xml
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "newsaggregator.io",
    version = "v1",
    kind = "Feed",
    namespaced,
    shortname = "fd",
    doc = "Feed is a named external news source kept registered with the news aggregator."
)]
#[kube(status = "FeedStatus")]
#[kube(printcolumn = r#"{"name":"Source","type":"string","jsonPath":".spec.name"}"#)]
#[kube(printcolumn = r#"{"name":"URL","type":"string","jsonPath":".spec.url"}"#)]
#[serde(rename_all = "camelCase")]
pub struct FeedSpec {
    /// Source name used by the aggregator. Unique within a namespace, at most 20 characters.
    pub name: String,

    /// Absolute URL of the source (RSS, Atom, JSON or HTML page).
    pub url: String,
}

/// `Feed` status
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FeedStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Summary settings of a `HotNews` query.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryConfig {
    /// Number of article titles kept in `status.articlesTitles`. Defaults to 10.
    #[serde(default)]
    pub titles_count: i32,
}

/// `HotNews` is a saved news query evaluated against the aggregator.
///
/// Feeds are selected either directly through `feedsName` or indirectly
/// through `feedGroups`, keys of the feed-group ConfigMap. When groups
/// resolve, the controller rewrites `feedsName` with the resolved names.
///
/// # Example
///
/// ```yaml
/// apiVersion: newsaggregator.io/v1
/// kind: HotNews
/// metadata:
///   name: rust-news
///   namespace: news
/// spec:
///   keywords: ["rust"]
///   dateStart: "2024-01-01"
///   dateEnd: "2024-01-31"
///   feedGroups: ["tech"]
///   summaryConfig:
///     titlesCount: 5
/// ```
#[derive(CustomResource, Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "newsaggregator.io",
    version = "v1",
    kind = "HotNews",
    plural = "hotnews",
    namespaced,
    shortname = "hn",
    doc = "HotNews is a saved, parameterized news query over a set of Feeds."
)]
#[kube(status = "HotNewsStatus")]
#[kube(printcolumn = r#"{"name":"Articles","type":"integer","jsonPath":".status.articlesCount"}"#)]
#[kube(printcolumn = r#"{"name":"Link","type":"string","jsonPath":".status.newsLink"}"#)]
#[serde(rename_all = "camelCase")]
pub struct HotNewsSpec {
    /// Keywords an article must match. At least one is required.
    pub keywords: Vec<String>,

    /// Start of the publication window (`YYYY-MM-DD`). Requires `dateEnd`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_start: Option<String>,

    /// End of the publication window (`YYYY-MM-DD`). Requires `dateStart`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_end: Option<String>,

    /// `Feed.spec.name` values to query.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feeds_name: Vec<String>,

    /// Keys of the feed-group ConfigMap whose feeds should be queried.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feed_groups: Vec<String>,

    /// Summary settings.
    #[serde(default)]
    pub summary_config: SummaryConfig,
}

/// `HotNews` status
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotNewsStatus {
    #[serde(default)]
    pub articles_count: i32,

    #[serde(default)]
    pub news_link: String,

    #[serde(default)]
    pub articles_titles: Vec<String>,

    #[serde(default)]
    pub conditions: Vec<Condition>,
}
