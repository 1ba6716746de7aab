// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `controller.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::HotNewsSpec;
    use crate::test_support::{feed, hotnews, test_context};
    use std::time::Duration;
    use wiremock::MockServer;

    #[tokio::test]
    async fn test_error_policy_backs_off_per_object() {
        let api = MockServer::start().await;
        let aggregator = MockServer::start().await;
        let ctx = test_context(&api, &aggregator);
        let failing = Arc::new(feed("bbc", "u1"));
        let err = ReconcileError::from(anyhow::anyhow!("aggregator down"));

        let first = error_policy(failing.clone(), &err, ctx.clone());
        let second = error_policy(failing, &err, ctx.clone());
        assert_eq!(first, Action::requeue(Duration::from_millis(500)));
        assert_eq!(second, Action::requeue(Duration::from_secs(1)));

        // Another object starts from the initial delay.
        let other = Arc::new(hotnews("rust", "hn-1", HotNewsSpec::default()));
        assert_eq!(
            error_policy(other, &err, ctx),
            Action::requeue(Duration::from_millis(500))
        );
    }

    #[tokio::test]
    async fn test_success_resets_backoff() {
        let api = MockServer::start().await;
        let aggregator = MockServer::start().await;
        let ctx = test_context(&api, &aggregator);
        let failing = Arc::new(feed("bbc", "u1"));
        let key = RequeueBackoff::key_for(failing.as_ref());
        let err = ReconcileError::from(anyhow::anyhow!("boom"));

        error_policy(failing.clone(), &err, ctx.clone());
        error_policy(failing.clone(), &err, ctx.clone());
        assert_eq!(ctx.backoff.tracked(), 1);

        let action = finish(KIND_FEED, &ctx, &key, Instant::now(), Ok(Action::await_change())).unwrap();
        assert_eq!(action, Action::await_change());
        assert_eq!(ctx.backoff.tracked(), 0);
        assert_eq!(
            error_policy(failing, &err, ctx),
            Action::requeue(Duration::from_millis(500))
        );
    }

    #[tokio::test]
    async fn test_requeueing_success_counts_as_refresh() {
        let api = MockServer::start().await;
        let aggregator = MockServer::start().await;
        let ctx = test_context(&api, &aggregator);
        let refreshes = || {
            crate::metrics::REQUEUE_TOTAL
                .with_label_values(&["RefreshKind", REQUEUE_REASON_REFRESH])
                .get()
        };
        let before = refreshes();

        finish("RefreshKind", &ctx, "k/ns/a", Instant::now(), Ok(Action::await_change())).unwrap();
        assert!((refreshes() - before).abs() < f64::EPSILON);

        finish(
            "RefreshKind",
            &ctx,
            "k/ns/a",
            Instant::now(),
            Ok(Action::requeue(Duration::from_secs(300))),
        )
        .unwrap();
        assert!((refreshes() - before - 1.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_errors_are_counted_by_reason() {
        let api = MockServer::start().await;
        let aggregator = MockServer::start().await;
        let ctx = test_context(&api, &aggregator);
        let errors = |reason: &str| {
            crate::metrics::ERRORS_TOTAL
                .with_label_values(&["ErrorReasonKind", reason])
                .get()
        };
        let before = errors(crate::status_reasons::REASON_NO_FEEDS_RESOLVED);

        let err = anyhow::Error::new(crate::errors::HotNewsError::NoFeedsResolved)
            .context("failed to build news query");
        let _ = finish("ErrorReasonKind", &ctx, "k/ns/b", Instant::now(), Err(err));

        assert!(
            (errors(crate::status_reasons::REASON_NO_FEEDS_RESOLVED) - before - 1.0).abs()
                < f64::EPSILON
        );
    }

    #[tokio::test]
    async fn test_failure_keeps_backoff_and_wraps_error() {
        let api = MockServer::start().await;
        let aggregator = MockServer::start().await;
        let ctx = test_context(&api, &aggregator);
        let key = RequeueBackoff::key_for(&feed("bbc", "u1"));
        ctx.backoff.next_delay(&key);

        let result = finish(
            KIND_FEED,
            &ctx,
            &key,
            Instant::now(),
            Err(anyhow::anyhow!("aggregator down")),
        );
        assert_eq!(result.unwrap_err().to_string(), "aggregator down");
        assert_eq!(ctx.backoff.tracked(), 1);
    }
}
