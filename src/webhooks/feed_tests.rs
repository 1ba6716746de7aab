// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `webhooks/feed.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::config::OperatorConfig;
    use crate::test_support::{admission_review, fake_kube_client, feed, list_body};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn spec(name: &str, url: &str) -> FeedSpec {
        FeedSpec {
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    fn fields(errors: &[FieldError]) -> Vec<&str> {
        errors.iter().map(|e| e.field.as_str()).collect()
    }

    #[test]
    fn test_valid_spec() {
        assert!(validate_feed_spec(&spec("bbc", "https://feeds.bbci.co.uk/news/rss.xml")).is_empty());
    }

    #[test]
    fn test_missing_fields_are_both_reported() {
        let errors = validate_feed_spec(&spec("", " "));
        assert_eq!(fields(&errors), vec!["spec.name", "spec.url"]);
    }

    #[test]
    fn test_name_length_limit() {
        assert!(validate_feed_spec(&spec(&"a".repeat(20), "https://a.example.com")).is_empty());
        let errors = validate_feed_spec(&spec(&"a".repeat(21), "https://a.example.com"));
        assert_eq!(fields(&errors), vec!["spec.name"]);
        assert!(errors[0].message.contains("20"));
    }

    #[test]
    fn test_url_needs_scheme_and_host() {
        assert_eq!(fields(&validate_feed_spec(&spec("a", "feeds/rss.xml"))), vec!["spec.url"]);
        assert_eq!(fields(&validate_feed_spec(&spec("a", "mailto:news@example.com"))), vec!["spec.url"]);
    }

    #[test]
    fn test_duplicate_name_in_namespace() {
        let existing = vec![feed("bbc", "u1")];
        let mut candidate = feed("bbc-copy", "u2");
        candidate.spec.name = "bbc".to_string();

        let error = duplicate_name(&candidate, &existing).unwrap();
        assert_eq!(error.field, "spec.name");
        assert!(error.message.contains("bbc"));
    }

    #[test]
    fn test_update_does_not_collide_with_itself() {
        let stored = feed("bbc", "u1");
        assert!(duplicate_name(&stored.clone(), &[stored]).is_none());
    }

    #[test]
    fn test_create_without_uid_checks_every_feed() {
        let mut candidate = feed("bbc", "u1");
        candidate.metadata.uid = None;
        assert!(duplicate_name(&candidate, &[feed("bbc", "u1")]).is_some());
    }

    async fn run(api: &MockServer, candidate: &Feed) -> AdmissionResponse {
        let state = Arc::new(WebhookState::new(fake_kube_client(api), OperatorConfig::default()));
        let body: AdmissionReview<Feed> = serde_json::from_value(admission_review(
            "newsaggregator.io",
            "Feed",
            "feeds",
            "CREATE",
            candidate,
        ))
        .unwrap();
        let Json(review) = validate_handler(State(state), Json(body)).await;
        review.response.unwrap()
    }

    #[tokio::test]
    async fn test_handler_rejects_duplicate_name() {
        let api = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/newsaggregator.io/v1/namespaces/news/feeds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(list_body("Feed", &[feed("bbc", "u1")])),
            )
            .mount(&api)
            .await;

        let mut candidate = feed("bbc-2", "u2");
        candidate.spec.name = "bbc".to_string();
        let response = run(&api, &candidate).await;
        assert!(!response.allowed);
        assert!(response.result.message.contains("already used"));
    }

    #[tokio::test]
    async fn test_handler_admits_unique_feed() {
        let api = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/newsaggregator.io/v1/namespaces/news/feeds"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(list_body("Feed", &[feed("cnn", "u1")])),
            )
            .mount(&api)
            .await;

        let response = run(&api, &feed("bbc", "u2")).await;
        assert!(response.allowed);
    }

    #[tokio::test]
    async fn test_handler_aggregates_all_violations() {
        let api = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body::<Feed>("Feed", &[])))
            .mount(&api)
            .await;

        let mut candidate = feed("bad", "u2");
        candidate.spec.name = "x".repeat(25);
        candidate.spec.url = "not-a-url".to_string();
        let response = run(&api, &candidate).await;
        assert!(!response.allowed);
        assert!(response.result.message.contains("spec.name"));
        assert!(response.result.message.contains("spec.url"));
    }
}
