// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `aggregator.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AggregatorClient {
        AggregatorClient::new(&server.uri(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client =
            AggregatorClient::new("http://aggregator:8080/api", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url().as_str(), "http://aggregator:8080/api/");
        assert_eq!(
            client.endpoint("sources").unwrap().as_str(),
            "http://aggregator:8080/api/sources"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let err = AggregatorClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, AggregatorError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_add_source_posts_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sources"))
            .and(body_json(json!({ "url": "https://example.com/rss" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server)
            .add_source("https://example.com/rss")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_add_source_surfaces_non_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sources"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .add_source("https://example.com/rss")
            .await
            .unwrap_err();
        match err {
            AggregatorError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_source_sends_name() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/sources"))
            .and(body_json(json!({ "name": "bbc" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server).delete_source("bbc").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_source_treats_404_as_gone() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/sources"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        client_for(&server).delete_source("bbc").await.unwrap();
    }

    #[tokio::test]
    async fn test_delete_source_surfaces_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/sources"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = client_for(&server).delete_source("bbc").await.unwrap_err();
        assert_eq!(err.reason(), crate::status_reasons::REASON_GATEWAY_ERROR);
    }

    #[tokio::test]
    async fn test_fetch_news_decodes_articles() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .and(query_param("sources", "bbc,cnn"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {
                    "title": "First",
                    "description": "d1",
                    "url": "https://example.com/1",
                    "publishedAt": "2024-01-02T00:00:00Z",
                    "sourceName": "bbc"
                },
                { "title": "Second" }
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut url = client.news_endpoint().unwrap();
        url.query_pairs_mut().append_pair("sources", "bbc,cnn");

        let articles = client.fetch_news(&url).await.unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].source_name, "bbc");
        assert_eq!(articles[0].published_at, "2024-01-02T00:00:00Z");
        assert_eq!(articles[1].title, "Second");
        assert!(articles[1].description.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_news_rejects_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.news_endpoint().unwrap();
        let err = client.fetch_news(&url).await.unwrap_err();
        assert!(matches!(err, AggregatorError::Status { status: 204, .. }));
    }

    #[tokio::test]
    async fn test_fetch_news_rejects_bad_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/news"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\":\"a list\"}"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.news_endpoint().unwrap();
        let err = client.fetch_news(&url).await.unwrap_err();
        assert!(matches!(err, AggregatorError::Decode { .. }));
        assert_eq!(err.reason(), crate::status_reasons::REASON_INVALID_RESPONSE);
    }

    #[tokio::test]
    async fn test_unreachable_aggregator_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept connections
        let client =
            AggregatorClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let err = client.add_source("https://example.com/rss").await.unwrap_err();
        assert!(matches!(err, AggregatorError::Transport { .. }));
    }
}
