//! Configuration integration tests
//!
//! A client built from a YAML file applies the file's policy defaults and
//! error-rate settings to its batch calls.

#[cfg(test)]
mod tests {
    use crate::common::{RecordFactory, RecordingTransport, key};
    use kvbatch::core::policy::RecordExistsAction;
    use kvbatch::{BatchClient, ClientConfig, ClientError, ResultCode};
    use serde_json::json;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_client_from_yaml_file() {
        let file = write_config(
            r#"
max_error_rate: 5
tend_interval_ms: 2000
policies:
  batch:
    total_timeout: 750
  batch_write:
    ttl: 3600
    exists: create_only
logging:
  level: debug
"#,
        );

        let config = ClientConfig::from_file(file.path()).await.unwrap();
        assert_eq!(config.max_error_rate, 5);
        assert_eq!(config.policies.batch_write.exists, RecordExistsAction::CreateOnly);

        let transport = Arc::new(RecordingTransport::new());
        let client = BatchClient::new(&config, transport.clone()).unwrap();

        let mut records = vec![
            RecordFactory::put("A", "x", json!(1)),
            RecordFactory::put("A", "x", json!(2)),
        ];
        client.batch_operate(&mut records, None).await.unwrap();

        assert_eq!(records[0].result, Some(ResultCode::Ok));
        assert_eq!(records[1].result, Some(ResultCode::KeyExists));
        assert_eq!(transport.store().get(&key("A")).unwrap().expiration, 3600);
        assert_eq!(transport.last_policy().unwrap().total_timeout, 750);
    }

    #[tokio::test]
    async fn test_invalid_file_is_config_error() {
        let file = write_config("tend_interval_ms: 0\n");
        let err = ClientConfig::from_file(file.path()).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));

        let file = write_config("policies: [1, 2]\n");
        assert!(ClientConfig::from_file(file.path()).await.is_err());

        assert!(
            ClientConfig::from_file("/nonexistent/kvbatch.yaml")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn test_client_rejects_invalid_config() {
        let config = ClientConfig {
            tend_interval_ms: 0,
            ..Default::default()
        };
        let err = BatchClient::new(&config, Arc::new(RecordingTransport::new())).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn test_yaml_round_trip_keeps_policies() -> anyhow::Result<()> {
        let mut config = ClientConfig::default();
        config.policies.batch_apply.ttl = 77;
        let yaml = config.to_yaml()?;
        assert!(yaml.contains("batch_apply"));
        assert_eq!(ClientConfig::from_yaml_str(&yaml)?, config);
        Ok(())
    }
}
