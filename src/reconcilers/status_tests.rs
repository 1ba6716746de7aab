// Copyright (c) 2025 News Operator Authors
// SPDX-License-Identifier: MIT

//! Unit tests for `status.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::crd::{Feed, FeedSpec, FeedStatus};
    use crate::test_support::fake_kube_client;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_new_condition_fields() {
        let c = new_condition(ConditionType::Added, false, "GatewayError", "503", "bbc");
        assert_eq!(c.r#type, ConditionType::Added);
        assert!(!c.success);
        assert_eq!(c.reason, "GatewayError");
        assert_eq!(c.message, "503");
        assert_eq!(c.last_updated_name, "bbc");
        assert!(chrono::DateTime::parse_from_rfc3339(&c.last_update_time).is_ok());
    }

    #[test]
    fn test_upsert_adds_one_entry_per_type() {
        let mut conditions = Vec::new();
        assert!(upsert_condition(
            &mut conditions,
            new_condition(ConditionType::Added, true, "SourceRegistered", "", "bbc"),
        ));
        assert!(upsert_condition(
            &mut conditions,
            new_condition(ConditionType::Deleted, false, "GatewayError", "503", "bbc"),
        ));
        assert_eq!(conditions.len(), 2);
    }

    #[test]
    fn test_upsert_overwrites_same_type() {
        let mut conditions = vec![new_condition(
            ConditionType::Added,
            false,
            "AggregatorUnreachable",
            "connection refused",
            "bbc",
        )];
        assert!(upsert_condition(
            &mut conditions,
            new_condition(ConditionType::Added, true, "SourceRegistered", "", "bbc"),
        ));
        assert_eq!(conditions.len(), 1);
        let added = find_condition(&conditions, ConditionType::Added).unwrap();
        assert!(added.success);
        assert_eq!(added.reason, "SourceRegistered");
    }

    #[test]
    fn test_upsert_same_outcome_keeps_timestamp() {
        let mut first = new_condition(ConditionType::Added, true, "SourceRegistered", "", "bbc");
        first.last_update_time = "2024-01-01T00:00:00+00:00".to_string();
        let mut conditions = vec![first];

        let changed = upsert_condition(
            &mut conditions,
            new_condition(ConditionType::Added, true, "SourceRegistered", "", "bbc"),
        );
        assert!(!changed);
        assert_eq!(conditions[0].last_update_time, "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_find_condition_missing() {
        let conditions = vec![new_condition(ConditionType::Added, true, "x", "", "n")];
        assert!(find_condition(&conditions, ConditionType::Deleted).is_none());
    }

    #[tokio::test]
    async fn test_patch_status_skips_unchanged() {
        let api = MockServer::start().await;
        // Any request to the API server would fail this test
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&api)
            .await;

        let client = fake_kube_client(&api);
        let mut feed = Feed::new("bbc", FeedSpec::default());
        feed.metadata.namespace = Some("news".into());
        let status = FeedStatus::default();

        patch_status(&client, &feed, Some(&status), &status)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_patch_status_writes_subresource() {
        let api = MockServer::start().await;
        let mut feed = Feed::new("bbc", FeedSpec::default());
        feed.metadata.namespace = Some("news".into());

        Mock::given(method("PATCH"))
            .and(path(
                "/apis/newsaggregator.io/v1/namespaces/news/feeds/bbc/status",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(&feed))
            .expect(1)
            .mount(&api)
            .await;

        let client = fake_kube_client(&api);
        let status = FeedStatus {
            conditions: vec![new_condition(
                ConditionType::Added,
                true,
                "SourceRegistered",
                "",
                "bbc",
            )],
        };
        patch_status(&client, &feed, None, &status).await.unwrap();
    }
}
