//! Error rate integration tests

#[cfg(test)]
mod tests {
    use crate::common::assertions::assert_untouched;
    use crate::common::{RecordFactory, TestClient};
    use kvbatch::{ClientError, ConfigBuilder, ResultCode};
    use std::time::Duration;

    fn client(max_error_rate: u32, tend_interval: Duration) -> TestClient {
        let config = ConfigBuilder::new()
            .with_max_error_rate(max_error_rate)
            .with_tend_interval(tend_interval)
            .build()
            .unwrap();
        TestClient::with_config(config)
    }

    #[tokio::test]
    async fn test_fail_fast_after_max_errors() {
        let max = 3;
        let t = client(max, Duration::from_secs(60));

        for call in 0..=max {
            t.store().fail_next(ResultCode::Timeout);
            let mut records = vec![RecordFactory::read_all("A")];
            let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
            assert_eq!(err.code(), ResultCode::Timeout, "call {}", call);
            assert_untouched(&records);
        }
        assert_eq!(t.transport.calls(), (max + 1) as usize);

        let mut records = vec![RecordFactory::read_all("A")];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::ExecutionFailure {
                code: ResultCode::MaxErrorRate,
                ..
            }
        ));
        assert_untouched(&records);
        assert_eq!(t.transport.calls(), (max + 1) as usize);

        let stats = t.client.stats();
        assert_eq!(stats.execution_failures, (max + 1) as u64);
        assert_eq!(stats.rejected_by_error_rate, 1);
        assert!(t.detector.is_balanced());
    }

    #[tokio::test]
    async fn test_recovers_after_tend_interval() {
        let t = client(1, Duration::from_millis(50));

        for _ in 0..2 {
            t.store().fail_next(ResultCode::Connection);
            let mut records = vec![RecordFactory::read_all("A")];
            assert!(t.client.batch_operate(&mut records, None).await.is_err());
        }
        let mut records = vec![RecordFactory::read_all("A")];
        let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
        assert_eq!(err.code(), ResultCode::MaxErrorRate);

        tokio::time::sleep(Duration::from_millis(80)).await;

        let mut records = vec![RecordFactory::read_all("A")];
        t.client.batch_operate(&mut records, None).await.unwrap();
        assert_eq!(records[0].result, Some(ResultCode::KeyNotFound));
    }

    #[tokio::test]
    async fn test_per_record_failures_do_not_count() {
        let t = client(1, Duration::from_secs(60));

        for _ in 0..5 {
            let mut records = vec![RecordFactory::remove("missing")];
            t.client.batch_operate(&mut records, None).await.unwrap();
            assert_eq!(records[0].result, Some(ResultCode::KeyNotFound));
        }
        assert_eq!(t.transport.calls(), 5);
        assert_eq!(t.client.stats().records_failed, 5);
    }

    #[tokio::test]
    async fn test_rejected_calls_do_not_count() {
        let t = client(1, Duration::from_secs(60));

        for _ in 0..5 {
            let mut records = vec![kvbatch::BatchRecord::new(serde_json::Value::Null, 0)];
            assert!(t.client.batch_operate(&mut records, None).await.is_err());
        }
        let mut records = vec![RecordFactory::read_all("A")];
        t.client.batch_operate(&mut records, None).await.unwrap();
        assert_eq!(t.transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_max_never_trips() {
        let t = client(0, Duration::from_secs(60));
        for _ in 0..5 {
            t.store().fail_next(ResultCode::ServerError);
            let mut records = vec![RecordFactory::read_all("A")];
            let err = t.client.batch_operate(&mut records, None).await.unwrap_err();
            assert_eq!(err.code(), ResultCode::ServerError);
        }
        assert_eq!(t.transport.calls(), 5);
    }
}
