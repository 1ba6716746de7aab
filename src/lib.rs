// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! # News Operator - Kubernetes operator for a news aggregator
//!
//! The operator keeps two custom resources in sync with an external news
//! aggregator service:
//!
//! - [`crd::Feed`] registers an RSS source with the aggregator and removes it
//!   when the resource is deleted.
//! - [`crd::HotNews`] runs a news query over a set of feeds and publishes the
//!   matching articles and top titles in its status.
//!
//! Feed groups are named lists of feeds kept in a well-known ConfigMap. A
//! `HotNews` may reference groups instead of, or in addition to, individual
//! feeds.
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types
//! - [`reconcilers`] - Reconciliation logic for `Feed` and `HotNews`
//! - [`controller`] - Controller wiring, error policy and backoff
//! - [`handlers`] - Secondary triggers from `Feed` and ConfigMap changes
//! - [`predicates`] - Event filtering for the primary watches
//! - [`webhooks`] - Validating and mutating admission webhooks
//! - [`aggregator`] - HTTP client for the news aggregator
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust,no_run
//! use news_operator::crd::{Feed, FeedSpec};
//!
//! let feed = Feed::new(
//!     "bbc",
//!     FeedSpec {
//!         name: "bbc".to_string(),
//!         url: "https://feeds.bbci.co.uk/news/rss.xml".to_string(),
//!     },
//! );
//! ```

pub mod aggregator;
pub mod config;
pub mod constants;
pub mod context;
pub mod controller;
pub mod crd;
pub mod errors;
pub mod handlers;
pub mod http_errors;
pub mod metrics;
pub mod predicates;
pub mod reconcilers;
pub mod status_reasons;
pub mod webhooks;

#[cfg(test)]
mod test_support;
