//! Concurrency integration tests
//!
//! Independent calls on one client, or on several clients over one store,
//! run side by side without sharing per-call state.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::key;
    use crate::common::{RecordFactory, seed};
    use futures::future::join_all;
    use kvbatch::{BatchClient, BatchRecord, ClientConfig, LeakDetector, MemoryStore, ResultCode, Value};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn client_over(store: &MemoryStore, detector: &Arc<LeakDetector>) -> BatchClient {
        BatchClient::new(&ClientConfig::default(), Arc::new(store.clone()))
            .unwrap()
            .with_observer(detector.clone())
    }

    #[tokio::test]
    async fn test_parallel_calls_on_one_client() {
        let store = MemoryStore::new();
        let detector = Arc::new(LeakDetector::new());
        let client = client_over(&store, &detector);

        let calls = (0..16).map(|i| {
            let client = client.clone();
            async move {
                let mut records = vec![
                    RecordFactory::put(&format!("k{}", i), "n", json!(i)),
                    RecordFactory::read_all(&format!("k{}", i)),
                ];
                let summary = client.batch_operate(&mut records, None).await.unwrap();
                (summary, records)
            }
        });
        let results = join_all(calls).await;

        for (i, (summary, records)) in results.into_iter().enumerate() {
            assert_eq!(summary.succeeded, 2);
            assert_eq!(
                records[1].record.as_ref().unwrap().bin("n"),
                Some(&json!(i))
            );
        }
        assert_eq!(store.len(), 16);
        assert_eq!(client.stats().batches_executed, 16);
        assert!(detector.is_balanced());
    }

    #[tokio::test]
    async fn test_clients_share_one_store() {
        let store = MemoryStore::new();
        seed(&store, "counter", &[("n", Value::Int(0))]);
        let detector = Arc::new(LeakDetector::new());
        let clients: Vec<BatchClient> = (0..4).map(|_| client_over(&store, &detector)).collect();

        let calls = clients.iter().flat_map(|client| {
            (0..5).map(move |_| async move {
                let mut records = vec![BatchRecord::write(
                    crate::common::fixtures::key_tuple("counter"),
                    vec![json!({"op": 2, "bin": "n", "val": 1})],
                )];
                client.batch_operate(&mut records, None).await.unwrap();
                records[0].result
            })
        });
        let results = join_all(calls).await;

        assert!(results.iter().all(|r| *r == Some(ResultCode::Ok)));
        let stored = store.get(&key("counter")).unwrap();
        assert_eq!(stored.bin("n"), Some(&Value::Int(20)));
        assert_eq!(stored.generation, 21);
        assert!(detector.is_balanced());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stats_readable_while_call_in_flight() {
        let store = MemoryStore::new().with_latency(Duration::from_millis(200));
        let detector = Arc::new(LeakDetector::new());
        let client = client_over(&store, &detector);

        let in_flight = async {
            let mut records = vec![RecordFactory::put("slow", "x", json!(1))];
            client.batch_operate(&mut records, None).await.unwrap();
        };
        let observer = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let started = Instant::now();
            let stats = tokio::time::timeout(Duration::from_millis(100), async { client.stats() })
                .await
                .expect("stats blocked behind an in-flight call");
            assert!(started.elapsed() < Duration::from_millis(100));
            assert_eq!(stats.batches_executed, 0);
            client.set_policies(Default::default());
        };
        tokio::join!(in_flight, observer);

        assert_eq!(client.stats().batches_executed, 1);
        assert_eq!(store.invocations(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_spawned_calls() {
        let store = MemoryStore::new().with_latency(Duration::from_millis(20));
        let detector = Arc::new(LeakDetector::new());
        let client = client_over(&store, &detector);

        let started = Instant::now();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    let mut records = vec![RecordFactory::put(&format!("s{}", i), "x", json!(i))];
                    client.batch_operate(&mut records, None).await
                })
            })
            .collect();

        for handle in join_all(handles).await {
            handle.unwrap().unwrap();
        }
        assert!(started.elapsed() < Duration::from_millis(8 * 20));
        assert_eq!(store.len(), 8);
        assert!(detector.is_balanced());
    }
}
