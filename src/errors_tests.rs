// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `errors.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::status_reasons::{
        REASON_GATEWAY_ERROR, REASON_RECONCILE_FAILED, REASON_SOURCE_NOT_FOUND,
    };
    use anyhow::Context;

    #[test]
    fn test_status_error_display_includes_code_and_body() {
        let err = AggregatorError::Status {
            url: "http://aggregator/sources".into(),
            status: 503,
            body: "overloaded".into(),
        };
        let text = err.to_string();
        assert!(text.contains("503"));
        assert!(text.contains("overloaded"));
        assert!(text.contains("http://aggregator/sources"));
    }

    #[test]
    fn test_status_error_reason_follows_http_mapping() {
        let not_found = AggregatorError::Status {
            url: String::new(),
            status: 404,
            body: String::new(),
        };
        assert_eq!(not_found.reason(), REASON_SOURCE_NOT_FOUND);

        let unavailable = AggregatorError::Status {
            url: String::new(),
            status: 503,
            body: String::new(),
        };
        assert_eq!(unavailable.reason(), REASON_GATEWAY_ERROR);
    }

    #[test]
    fn test_invalid_url_reason() {
        let err = AggregatorError::InvalidUrl {
            url: "::nope".into(),
            source: url::Url::parse("::nope").unwrap_err(),
        };
        assert_eq!(err.reason(), REASON_INVALID_URL);
    }

    #[test]
    fn test_no_feeds_resolved_message() {
        let err = HotNewsError::NoFeedsResolved;
        assert!(err.to_string().contains("no feeds resolved"));
        assert_eq!(err.reason(), REASON_NO_FEEDS_RESOLVED);
    }

    #[test]
    fn test_unknown_feed_message_names_group_and_feed() {
        let err = HotNewsError::UnknownFeed {
            group: "tech".into(),
            feed: "missing".into(),
        };
        let text = err.to_string();
        assert!(text.contains("tech"));
        assert!(text.contains("missing"));
        assert_eq!(err.reason(), REASON_UNKNOWN_FEED);
    }

    #[test]
    fn test_reason_for_finds_typed_error_through_context() {
        let err = Err::<(), _>(HotNewsError::NoFeedsResolved)
            .context("failed to build news query")
            .unwrap_err();
        assert_eq!(reason_for(&err), REASON_NO_FEEDS_RESOLVED);
    }

    #[test]
    fn test_reason_for_falls_back_for_untyped_errors() {
        let err = anyhow::anyhow!("something odd");
        assert_eq!(reason_for(&err), REASON_RECONCILE_FAILED);
    }
}
