//! Resource lifetime integration tests
//!
//! Every policy, expression, operation list and argument list a call
//! creates is released exactly once, whether the call succeeds or not.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::key_tuple;
    use crate::common::{RecordFactory, TestClient, seed};
    use kvbatch::core::batch::ResourceKind;
    use kvbatch::{BatchRecord, ResultCode, Value};
    use serde_json::json;

    fn policy_heavy_batch() -> Vec<BatchRecord> {
        vec![
            RecordFactory::read_bins("A", &["x", "y"])
                .with_policy(json!({"expression": {"bin_exists": "x"}})),
            RecordFactory::put("B", "x", json!(1)).with_policy(json!({"ttl": 10})),
            RecordFactory::apply("C", "m", "f", vec![json!("a"), json!([1, 2])])
                .with_policy(json!({"ttl": 5, "expression": {"const": true}})),
            RecordFactory::remove("D").with_policy(json!({"durable_delete": true})),
        ]
    }

    #[tokio::test]
    async fn test_balanced_after_success() {
        let t = TestClient::new();
        seed(t.store(), "A", &[("x", Value::Int(1))]);

        let mut records = policy_heavy_batch();
        t.client
            .batch_operate(&mut records, Some(&json!({"expression": {"const": true}})))
            .await
            .unwrap();

        // 4 policies, 2 record expressions, 1 batch expression, 2 op lists, 1 arg list
        assert_eq!(t.detector.acquired(), 10);
        assert!(t.detector.is_balanced());
        assert_eq!(t.detector.double_releases(), 0);
    }

    #[tokio::test]
    async fn test_balanced_after_translation_abort() {
        let t = TestClient::new();
        let mut records = policy_heavy_batch();
        records.push(BatchRecord::write(
            key_tuple("E"),
            vec![json!({"op": 0, "bin": "x", "val": {"$unknown": 1}})],
        ));

        assert!(t.client.batch_operate(&mut records, None).await.is_err());
        assert!(t.detector.acquired() > 0);
        assert!(t.detector.is_balanced());
        assert_eq!(t.detector.live_of(ResourceKind::Policy), 0);
        assert_eq!(t.detector.live_of(ResourceKind::Operations), 0);
        assert_eq!(t.detector.double_releases(), 0);
    }

    #[tokio::test]
    async fn test_balanced_after_execution_failure() {
        let t = TestClient::new();
        t.store().fail_next(ResultCode::Timeout);

        let mut records = policy_heavy_batch();
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();

        assert_eq!(err.code(), ResultCode::Timeout);
        assert!(t.detector.is_balanced());
        assert_eq!(t.detector.double_releases(), 0);
    }

    #[tokio::test]
    async fn test_repeated_calls_stay_balanced() {
        let t = TestClient::new();
        for round in 0..10 {
            let mut records = policy_heavy_batch();
            if round % 3 == 0 {
                records.push(BatchRecord::new(key_tuple("bad"), 99));
            }
            let _ = t.client.batch_operate(&mut records, None).await;
            assert_eq!(t.detector.live(), 0, "leak after round {}", round);
        }
        assert_eq!(t.detector.double_releases(), 0);
    }
}
