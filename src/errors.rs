// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Typed errors for aggregator calls and `HotNews` resolution.
//!
//! These errors feed both the returned reconcile error (which triggers a
//! requeue) and the `reason`/`message` recorded on status conditions.

use crate::status_reasons::{
    REASON_AGGREGATOR_UNREACHABLE, REASON_INVALID_RESPONSE, REASON_INVALID_URL,
    REASON_NO_FEEDS_RESOLVED, REASON_UNKNOWN_FEED,
};
use thiserror::Error;

/// Errors that can occur while talking to the news aggregator HTTP API.
#[derive(Error, Debug)]
pub enum AggregatorError {
    /// The request could not be sent or no response was received.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Target URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The aggregator answered with an unexpected status code.
    #[error("aggregator returned HTTP {status} for {url}: {body}")]
    Status {
        /// Target URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, if readable
        body: String,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        /// Target URL
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// The configured base URL or a derived endpoint is not a valid URL.
    #[error("invalid aggregator URL '{url}': {source}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Parser error
        #[source]
        source: url::ParseError,
    },
}

impl AggregatorError {
    /// Condition reason describing this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Transport { .. } => REASON_AGGREGATOR_UNREACHABLE,
            Self::Status { status, .. } => crate::http_errors::map_http_error_to_reason(*status).0,
            Self::Decode { .. } => REASON_INVALID_RESPONSE,
            Self::InvalidUrl { .. } => REASON_INVALID_URL,
        }
    }
}

/// Errors raised while resolving the feeds a `HotNews` queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotNewsError {
    /// Neither `feedsName` nor `feedGroups` produced any feed.
    #[error("no feeds resolved: feedsName is empty and no feedGroups matched")]
    NoFeedsResolved,

    /// A feed group references a name no `Feed` in the namespace carries.
    #[error("feed group '{group}' references unknown feed '{feed}'")]
    UnknownFeed {
        /// ConfigMap key
        group: String,
        /// Unresolvable feed name
        feed: String,
    },
}

impl HotNewsError {
    /// Condition reason describing this error.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NoFeedsResolved => REASON_NO_FEEDS_RESOLVED,
            Self::UnknownFeed { .. } => REASON_UNKNOWN_FEED,
        }
    }
}

/// Best-effort condition reason for an arbitrary reconcile error.
///
/// Walks the error chain looking for a typed error and falls back to
/// [`REASON_RECONCILE_FAILED`](crate::status_reasons::REASON_RECONCILE_FAILED).
#[must_use]
pub fn reason_for(err: &anyhow::Error) -> &'static str {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<AggregatorError>() {
            return e.reason();
        }
        if let Some(e) = cause.downcast_ref::<HotNewsError>() {
            return e.reason();
        }
        if cause.downcast_ref::<kube::Error>().is_some() {
            return crate::status_reasons::REASON_KUBE_API_ERROR;
        }
    }
    crate::status_reasons::REASON_RECONCILE_FAILED
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
