//! Test helpers for the Resource Manager client

use std::sync::Arc;
use std::time::Duration;

use crate::auth::StaticTokenAuthorizer;
use crate::client::{Client, ClientOptions, RetryConfig};

/// Client pointed at a mock server with near-instant retries and polling.
pub fn create_test_client(url: &str) -> Client {
    let options = ClientOptions {
        retry: RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 5,
            timeout_seconds: 5,
        },
        polling_interval: Duration::from_millis(10),
        ..ClientOptions::default()
    };
    Client::with_options(url, Arc::new(StaticTokenAuthorizer::new("test-token")), options)
        .unwrap()
}

mod tests {
    use super::*;

    #[test]
    fn retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff_ms, 500);
        assert_eq!(config.max_backoff_ms, 30000);
        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn client_options_defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.polling_interval, Duration::from_secs(10));
        assert_eq!(options.pool_max_idle_per_host, 10);
        assert!(options.user_agent.starts_with("azurerm-rs/"));
    }
}
