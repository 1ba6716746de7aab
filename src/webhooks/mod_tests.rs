// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `webhooks/mod.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::Feed;
    use crate::test_support::{admission_review, fake_kube_client, feed, list_body};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn response_for(feed: &Feed) -> AdmissionResponse {
        let review: AdmissionReview<Feed> =
            serde_json::from_value(admission_review("newsaggregator.io", "Feed", "feeds", "CREATE", feed))
                .unwrap();
        let request = admission_request("test", review).unwrap();
        AdmissionResponse::from(&request)
    }

    #[test]
    fn test_aggregate_joins_every_error() {
        let errors = vec![
            FieldError::new("spec.name", "name is required"),
            FieldError::new("spec.url", "url is required"),
        ];
        assert_eq!(
            aggregate(&errors),
            "spec.name: name is required; spec.url: url is required"
        );
    }

    #[test]
    fn test_verdict_allows_with_warnings() {
        let response = verdict(
            response_for(&feed("bbc", "u1")),
            &[],
            vec!["heads up".to_string()],
        );
        assert!(response.allowed);
        assert_eq!(response.warnings, Some(vec!["heads up".to_string()]));
    }

    #[test]
    fn test_verdict_denies_with_all_errors() {
        let errors = vec![
            FieldError::new("spec.name", "too long"),
            FieldError::new("spec.url", "missing host"),
        ];
        let response = verdict(response_for(&feed("bbc", "u1")), &errors, Vec::new());
        assert!(!response.allowed);
        assert!(response.result.message.contains("too long"));
        assert!(response.result.message.contains("missing host"));
    }

    #[test]
    fn test_review_without_request_is_invalid() {
        let review: AdmissionReview<Feed> = serde_json::from_value(serde_json::json!({
            "apiVersion": "admission.k8s.io/v1",
            "kind": "AdmissionReview"
        }))
        .unwrap();
        let response = admission_request("test", review).unwrap_err();
        assert!(!response.allowed);
    }

    #[tokio::test]
    async fn test_list_in_namespace() {
        let api = MockServer::start().await;
        let feeds = vec![feed("bbc", "u1"), feed("cnn", "u2")];
        Mock::given(method("GET"))
            .and(path("/apis/newsaggregator.io/v1/namespaces/news/feeds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(list_body("Feed", &feeds)))
            .mount(&api)
            .await;

        let listed: Vec<Feed> = list_in_namespace(&fake_kube_client(&api), "news").await.unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_list_in_namespace_reports_failures() {
        let api = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&api)
            .await;

        let err = list_in_namespace::<Feed>(&fake_kube_client(&api), "news")
            .await
            .unwrap_err();
        assert!(err.contains("failed to list Feed in news"));
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(healthz().await, "ok");
    }
}
