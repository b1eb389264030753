//! Validation integration tests
//!
//! A malformed record anywhere in the batch fails the whole call before the
//! transport is reached, and leaves every record as the caller passed it.

#[cfg(test)]
mod tests {
    use crate::common::assertions::assert_untouched;
    use crate::common::fixtures::key_tuple;
    use crate::common::{RecordFactory, ShortResponseTransport, TestClient, seed};
    use kvbatch::{
        BatchClient, BatchRecord, ClientConfig, ClientError, LeakDetector, MemoryStore,
        ResultCode, Value,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn healthy_batch() -> Vec<BatchRecord> {
        vec![
            RecordFactory::read_all("A"),
            RecordFactory::put("B", "x", json!(1)),
            RecordFactory::remove("C"),
            RecordFactory::apply("D", "m", "f", vec![json!(1)]),
        ]
    }

    // ==================== Malformed Record Tests ====================

    #[tokio::test]
    async fn test_malformed_record_in_any_position() {
        let malformed = [
            BatchRecord::new(serde_json::Value::Null, 0),
            BatchRecord::new(key_tuple("X"), 9),
            BatchRecord::new(json!(["test", "demo"]), 0),
            BatchRecord::write(key_tuple("X"), vec![]),
            BatchRecord::read(key_tuple("X"), vec![json!({"op": 0, "bin": "x", "val": 1})]),
        ];

        for bad in malformed.iter() {
            for position in 0..=4 {
                let t = TestClient::new();
                let mut records = healthy_batch();
                records.insert(position, bad.clone());

                let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
                assert!(
                    matches!(err, ClientError::InvalidParameter(ref msg)
                        if msg.starts_with(&format!("batch_records[{}]", position))),
                    "unexpected error {:?} at position {}",
                    err,
                    position
                );
                assert!(err.is_pre_submission());
                assert_untouched(&records);
                assert_eq!(t.transport.calls(), 0);
                assert!(t.detector.is_balanced());
            }
        }
    }

    #[tokio::test]
    async fn test_error_names_missing_key() {
        let t = TestClient::new();
        let mut records = vec![BatchRecord::remove(serde_json::Value::Null)];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
        assert!(err.to_string().contains("key is missing"));
    }

    #[tokio::test]
    async fn test_unknown_batch_type_is_named() {
        let t = TestClient::new();
        let mut records = vec![BatchRecord::new(key_tuple("A"), 42)];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
        assert!(err.to_string().contains("batch_type unknown: 42"));
    }

    #[tokio::test]
    async fn test_apply_missing_function() {
        let t = TestClient::new();
        let mut record = RecordFactory::apply("A", "m", "f", vec![]);
        record.function = None;
        let mut records = vec![record];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidParameter(ref msg) if msg.contains("function")));
        assert_untouched(&records);
    }

    // ==================== Policy Range Tests ====================

    #[tokio::test]
    async fn test_record_ttl_below_range_aborts_batch() {
        let t = TestClient::new();
        let mut records = vec![
            RecordFactory::read_all("A"),
            RecordFactory::put("B", "x", json!(1)).with_policy(json!({"ttl": -5})),
        ];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();

        assert!(
            matches!(err, ClientError::InvalidParameter(ref msg)
                if msg.starts_with("batch_records[1]: policy.ttl")),
            "unexpected error {:?}",
            err
        );
        assert_untouched(&records);
        assert_eq!(t.transport.calls(), 0);
        assert!(t.detector.is_balanced());
        assert!(!t.store().contains(&crate::common::key("B")));
    }

    #[tokio::test]
    async fn test_apply_ttl_below_range_aborts_batch() {
        let t = TestClient::new();
        let mut records =
            vec![RecordFactory::apply("A", "m", "f", vec![]).with_policy(json!({"ttl": -3}))];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidParameter(ref msg) if msg.contains("policy.ttl")));
        assert_untouched(&records);
        assert_eq!(t.transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_batch_retry_sleep_beyond_timeout_aborts_batch() {
        let t = TestClient::new();
        let mut records = vec![RecordFactory::put("A", "x", json!(1))];
        let err = t
            .client
            .batch_operate(
                &mut records,
                Some(&json!({"total_timeout": 10, "sleep_between_retries": 5000})),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidParameter(ref msg)
            if msg.contains("policy.sleep_between_retries")));
        assert_untouched(&records);
        assert_eq!(t.transport.calls(), 0);
        assert!(t.store().is_empty());
    }

    #[tokio::test]
    async fn test_ttl_keep_current_is_in_range() {
        let t = TestClient::new();
        let mut records =
            vec![RecordFactory::put("A", "x", json!(1)).with_policy(json!({"ttl": -2}))];
        t.client.batch_operate(&mut records, None).await.unwrap();
        assert_eq!(records[0].result, Some(ResultCode::Ok));
    }

    // ==================== Translation Failure Tests ====================

    #[tokio::test]
    async fn test_unconvertible_apply_argument() {
        let t = TestClient::new();
        let mut records = healthy_batch();
        records.push(RecordFactory::apply(
            "E",
            "m",
            "f",
            vec![json!(1), json!({"$decimal": "1.5"})],
        ));

        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
        assert!(matches!(err, ClientError::TranslationFailure(_)));
        assert_eq!(err.code(), ResultCode::ParamError);
        assert_untouched(&records);
        assert_eq!(t.transport.calls(), 0);
        assert!(t.detector.is_balanced());
        assert!(t.detector.acquired() > 0);
    }

    #[tokio::test]
    async fn test_unknown_operation_code() {
        let t = TestClient::new();
        let mut records = vec![
            RecordFactory::read_all("A"),
            BatchRecord::write(key_tuple("B"), vec![json!({"op": 4242, "bin": "x"})]),
        ];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
        assert!(matches!(err, ClientError::TranslationFailure(ref msg) if msg.contains("ops[0]")));
        assert_untouched(&records);
    }

    #[tokio::test]
    async fn test_failed_call_counts_as_aborted() {
        let t = TestClient::new();
        let mut records = vec![BatchRecord::new(key_tuple("A"), 7)];
        let _ = t.client.batch_operate(&mut records, None).await;

        let stats = t.client.stats();
        assert_eq!(stats.batches_aborted, 1);
        assert_eq!(stats.batches_executed, 0);
    }

    // ==================== Response Mismatch Tests ====================

    #[tokio::test]
    async fn test_short_response_is_execution_failure() {
        let store = MemoryStore::new();
        seed(&store, "A", &[("x", Value::Int(1))]);
        let detector = Arc::new(LeakDetector::new());
        let client = BatchClient::new(
            &ClientConfig::default(),
            Arc::new(ShortResponseTransport::new(store.clone())),
        )
        .unwrap()
        .with_observer(detector.clone());

        let mut records = vec![
            RecordFactory::read_all("A"),
            RecordFactory::put("B", "x", json!(1)),
        ];
        let err = client.batch_operate(&mut records, None).await.unwrap_err();

        assert!(matches!(err, ClientError::ExecutionFailure { .. }));
        assert!(!err.is_pre_submission());
        assert_untouched(&records);
        assert!(detector.is_balanced());
        assert_eq!(store.invocations(), 1);
    }
}
