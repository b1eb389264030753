//! Policy integration tests
//!
//! Per-record overrides, client defaults, batch-level filter inheritance and
//! generation checks.

#[cfg(test)]
mod tests {
    use crate::common::assertions::{assert_results, assert_untouched};
    use crate::common::{RecordFactory, TestClient, key, seed};
    use kvbatch::core::policy::{BatchWritePolicy, ClientPolicies};
    use kvbatch::{ClientError, ConfigBuilder, ResultCode, Value};
    use serde_json::json;

    fn client_with_ttl(ttl: i64) -> TestClient {
        let config = ConfigBuilder::new()
            .with_write_policy(BatchWritePolicy {
                ttl,
                ..Default::default()
            })
            .build()
            .unwrap();
        TestClient::with_config(config)
    }

    // ==================== Override Tests ====================

    #[tokio::test]
    async fn test_record_policy_overrides_default() {
        let t = client_with_ttl(300);
        let mut records = vec![
            RecordFactory::put("A", "x", json!(1)).with_policy(json!({"ttl": 60})),
            RecordFactory::put("B", "x", json!(1)),
        ];
        t.client.batch_operate(&mut records, None).await.unwrap();

        let sent = t.transport.last_batch().unwrap();
        assert_eq!(sent[0].ttl, Some(60));
        assert_eq!(sent[1].ttl, Some(300));

        assert_eq!(t.store().get(&key("A")).unwrap().expiration, 60);
        assert_eq!(t.store().get(&key("B")).unwrap().expiration, 300);
        assert_eq!(records[0].record.as_ref().unwrap().meta.ttl, 60);
    }

    #[tokio::test]
    async fn test_null_policy_uses_default() {
        let t = client_with_ttl(120);
        let mut records =
            vec![RecordFactory::put("A", "x", json!(1)).with_policy(serde_json::Value::Null)];
        t.client.batch_operate(&mut records, None).await.unwrap();
        assert_eq!(t.transport.last_batch().unwrap()[0].ttl, Some(120));
    }

    #[tokio::test]
    async fn test_ttl_keep_current() {
        let t = TestClient::new();
        let mut first =
            vec![RecordFactory::put("A", "x", json!(1)).with_policy(json!({"ttl": 90}))];
        t.client.batch_operate(&mut first, None).await.unwrap();

        let mut second =
            vec![RecordFactory::put("A", "y", json!(2)).with_policy(json!({"ttl": -2}))];
        t.client.batch_operate(&mut second, None).await.unwrap();

        let stored = t.store().get(&key("A")).unwrap();
        assert_eq!(stored.expiration, 90);
        assert_eq!(stored.generation, 2);
    }

    #[tokio::test]
    async fn test_policy_swap_applies_to_later_calls() {
        let t = TestClient::new();
        let mut policies = ClientPolicies::default();
        policies.batch_write.ttl = 42;
        t.client.set_policies(policies);

        let mut records = vec![RecordFactory::put("A", "x", json!(1))];
        t.client.batch_operate(&mut records, None).await.unwrap();
        assert_eq!(t.transport.last_batch().unwrap()[0].ttl, Some(42));
        assert_eq!(t.client.policies().batch_write.ttl, 42);
    }

    #[tokio::test]
    async fn test_batch_policy_reaches_transport() {
        let t = TestClient::new();
        let mut records = vec![RecordFactory::read_all("A")];
        t.client
            .batch_operate(
                &mut records,
                Some(&json!({"total_timeout": 250, "max_retries": 0})),
            )
            .await
            .unwrap();

        let policy = t.transport.last_policy().unwrap();
        assert_eq!(policy.total_timeout, 250);
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.socket_timeout, 30000);
    }

    // ==================== Exists Action Tests ====================

    #[tokio::test]
    async fn test_create_only_on_existing_record() {
        let t = TestClient::new();
        seed(t.store(), "A", &[("x", Value::Int(1))]);

        let mut records = vec![
            RecordFactory::put("A", "x", json!(2)).with_policy(json!({"exists": "create_only"})),
            RecordFactory::put("B", "x", json!(2)).with_policy(json!({"exists": "create_only"})),
            RecordFactory::put("C", "x", json!(2)).with_policy(json!({"exists": "update_only"})),
        ];
        t.client.batch_operate(&mut records, None).await.unwrap();

        assert_results(
            &records,
            &[ResultCode::KeyExists, ResultCode::Ok, ResultCode::KeyNotFound],
        );
        assert_eq!(t.store().get(&key("A")).unwrap().bin("x"), Some(&Value::Int(1)));
        assert!(!t.store().contains(&key("C")));
    }

    #[tokio::test]
    async fn test_replace_drops_other_bins() {
        let t = TestClient::new();
        seed(t.store(), "A", &[("x", Value::Int(1)), ("y", Value::Int(2))]);

        let mut records =
            vec![RecordFactory::put("A", "z", json!(3)).with_policy(json!({"exists": "replace"}))];
        t.client.batch_operate(&mut records, None).await.unwrap();

        let stored = t.store().get(&key("A")).unwrap();
        assert_eq!(stored.bins.len(), 1);
        assert_eq!(stored.bin("z"), Some(&Value::Int(3)));
    }

    // ==================== Generation Tests ====================

    #[tokio::test]
    async fn test_generation_checks() {
        let t = TestClient::new();
        seed(t.store(), "A", &[("x", Value::Int(1))]);
        seed(t.store(), "B", &[("x", Value::Int(1))]);

        let mut records = vec![
            RecordFactory::put("A", "x", json!(2)).with_policy(json!({"gen": "eq", "generation": 1})),
            RecordFactory::put("B", "x", json!(2)).with_policy(json!({"gen": "eq", "generation": 7})),
            RecordFactory::remove("B").with_policy(json!({"gen": "gt", "generation": 1})),
        ];
        t.client.batch_operate(&mut records, None).await.unwrap();

        assert_results(
            &records,
            &[
                ResultCode::Ok,
                ResultCode::GenerationError,
                ResultCode::GenerationError,
            ],
        );
        assert_eq!(t.store().get(&key("A")).unwrap().generation, 2);
        assert!(t.store().contains(&key("B")));
    }

    // ==================== Filter Tests ====================

    #[tokio::test]
    async fn test_record_filter_false_is_filtered_out() {
        let t = TestClient::new();
        seed(t.store(), "A", &[("age", Value::Int(30))]);
        seed(t.store(), "B", &[("age", Value::Int(10))]);

        let adults = json!({"expression": {"cmp": "ge", "bin": "age", "value": 18}});
        let mut records = vec![
            RecordFactory::read_all("A").with_policy(adults.clone()),
            RecordFactory::read_all("B").with_policy(adults),
        ];
        t.client.batch_operate(&mut records, None).await.unwrap();

        assert_results(&records, &[ResultCode::Ok, ResultCode::FilteredOut]);
        assert!(records[1].record.is_none());
    }

    #[tokio::test]
    async fn test_batch_filter_is_inherited() {
        let t = TestClient::new();
        seed(t.store(), "A", &[("flag", Value::Bool(true))]);
        seed(t.store(), "B", &[("other", Value::Int(1))]);

        let mut records = vec![
            RecordFactory::put("A", "x", json!(1)),
            RecordFactory::put("B", "x", json!(1)),
            RecordFactory::put("C", "x", json!(1))
                .with_policy(json!({"expression": {"const": true}})),
        ];
        t.client
            .batch_operate(
                &mut records,
                Some(&json!({"expression": {"bin_exists": "flag"}})),
            )
            .await
            .unwrap();

        let sent = t.transport.last_batch().unwrap();
        assert!(sent.iter().all(|e| e.has_filter));
        assert_results(
            &records,
            &[ResultCode::Ok, ResultCode::FilteredOut, ResultCode::Ok],
        );
        assert_eq!(t.store().get(&key("B")).unwrap().bin("x"), None);
    }

    #[tokio::test]
    async fn test_no_filter_without_expressions() {
        let t = TestClient::new();
        let mut records = vec![RecordFactory::read_all("A"), RecordFactory::remove("B")];
        t.client.batch_operate(&mut records, None).await.unwrap();
        assert!(t
            .transport
            .last_batch()
            .unwrap()
            .iter()
            .all(|e| !e.has_filter));
    }

    // ==================== Rejection Tests ====================

    #[tokio::test]
    async fn test_mistyped_policy_field_aborts_batch() {
        let t = TestClient::new();
        let mut records = vec![
            RecordFactory::read_all("A"),
            RecordFactory::put("B", "x", json!(1)).with_policy(json!({"ttl": "forever"})),
        ];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();

        assert!(matches!(err, ClientError::InvalidParameter(ref msg) if msg.contains("ttl")));
        assert_untouched(&records);
        assert_eq!(t.transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_batch_policy_aborts_batch() {
        let t = TestClient::new();
        let mut records = vec![RecordFactory::read_all("A")];
        let err = t
            .client
            .batch_operate(&mut records, Some(&json!("fast")))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidParameter(_)));
        assert_untouched(&records);

        let err = t
            .client
            .batch_operate(&mut records, Some(&json!({"expression": {"nope": 1}})))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::TranslationFailure(_)));
        assert_eq!(t.transport.calls(), 0);
        assert!(t.detector.is_balanced());
    }
}
