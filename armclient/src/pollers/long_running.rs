use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use super::{extract_json_value, PollResult, PollerError, PollerType, PollingStatus};
use crate::client::{retry_after, Client};
use crate::context::Context;
use crate::error::ApiError;

/// Tracks an operation through the URL Azure returned in the
/// `Azure-AsyncOperation`, `Operation-Location` or `Location` header.
pub struct LongRunningOperationPoller {
    client: Client,
    poll_url: String,
    default_interval: Duration,
    last_status: Option<String>,
    done: bool,
}

impl LongRunningOperationPoller {
    pub fn new(client: Client, poll_url: String, default_interval: Duration) -> Self {
        Self {
            client,
            poll_url,
            default_interval,
            last_status: None,
            done: false,
        }
    }

    pub fn poll_url(&self) -> &str {
        &self.poll_url
    }

    /// Last status string read from the operation body, if any.
    pub fn last_status(&self) -> Option<&str> {
        self.last_status.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

#[async_trait]
impl PollerType for LongRunningOperationPoller {
    async fn poll(&mut self, _ctx: &Context) -> Result<PollResult, PollerError> {
        let response = self.client.get_url(&self.poll_url).await?;
        let code = response.status;
        tracing::debug!("Polled {} and got HTTP {}", self.poll_url, code);

        if !code.is_success() {
            return Err(ApiError::from_body(code.as_u16(), &response.body).into());
        }

        let status = match extract_json_value(&response.body, "status")? {
            Some(status) => {
                let mapped = PollingStatus::from_api_status(&status)
                    .ok_or_else(|| PollerError::UnexpectedStatus(status.clone()))?;
                self.last_status = Some(status);
                mapped
            }
            None => match code {
                StatusCode::OK | StatusCode::CREATED | StatusCode::NO_CONTENT => {
                    PollingStatus::Succeeded
                }
                StatusCode::ACCEPTED => PollingStatus::InProgress,
                other => return Err(PollerError::UnexpectedStatus(other.to_string())),
            },
        };

        // Location-style operations may hand out a fresh URL on every 202
        if code == StatusCode::ACCEPTED {
            if let Some(next) = response.header("Location") {
                self.poll_url = next.to_string();
            }
        }

        self.done = status.is_terminal();

        Ok(PollResult {
            status,
            poll_interval: retry_after(&response.headers).unwrap_or(self.default_interval),
            response: Some(response),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_client;
    use mockito::Server;

    #[tokio::test]
    async fn status_field_drives_result() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/operations/op1")
            .with_header("retry-after", "2")
            .with_body(r#"{"status":"InProgress"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let mut poller = LongRunningOperationPoller::new(
            client,
            format!("{}/operations/op1", server.url()),
            Duration::from_millis(1),
        );

        let result = poller.poll(&Context::new()).await.unwrap();
        assert_eq!(result.status, PollingStatus::InProgress);
        assert_eq!(result.poll_interval, Duration::from_secs(2));
        assert_eq!(poller.last_status(), Some("InProgress"));
        assert!(!poller.is_done());
    }

    #[tokio::test]
    async fn location_polling_uses_status_codes() {
        let mut server = Server::new_async().await;
        let next = format!("{}/operations/op1/next", server.url());
        let _first = server
            .mock("GET", "/operations/op1")
            .with_status(202)
            .with_header("location", &next)
            .create_async()
            .await;
        let _second = server
            .mock("GET", "/operations/op1/next")
            .with_status(204)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let mut poller = LongRunningOperationPoller::new(
            client,
            format!("{}/operations/op1", server.url()),
            Duration::from_millis(1),
        );

        let first = poller.poll(&Context::new()).await.unwrap();
        assert_eq!(first.status, PollingStatus::InProgress);
        assert_eq!(poller.poll_url(), next);

        let second = poller.poll(&Context::new()).await.unwrap();
        assert_eq!(second.status, PollingStatus::Succeeded);
        assert!(poller.is_done());
        assert_eq!(poller.last_status(), None);
    }

    #[tokio::test]
    async fn zero_retry_after_keeps_default_interval() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/operations/op1")
            .with_header("retry-after", "0")
            .with_body(r#"{"status":"InProgress"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let mut poller = LongRunningOperationPoller::new(
            client,
            format!("{}/operations/op1", server.url()),
            Duration::from_millis(250),
        );

        let result = poller.poll(&Context::new()).await.unwrap();
        assert_eq!(result.status, PollingStatus::InProgress);
        assert_eq!(result.poll_interval, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn unknown_status_is_an_error() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/operations/op1")
            .with_body(r#"{"status":"Sideways"}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let mut poller = LongRunningOperationPoller::new(
            client,
            format!("{}/operations/op1", server.url()),
            Duration::from_millis(1),
        );

        let result = poller.poll(&Context::new()).await;
        assert!(matches!(result, Err(PollerError::UnexpectedStatus(s)) if s == "Sideways"));
    }

    #[tokio::test]
    async fn non_string_status_is_malformed() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/operations/op1")
            .with_body(r#"{"status":{"value":"Succeeded"}}"#)
            .create_async()
            .await;

        let client = create_test_client(&server.url());
        let mut poller = LongRunningOperationPoller::new(
            client,
            format!("{}/operations/op1", server.url()),
            Duration::from_millis(1),
        );

        let result = poller.poll(&Context::new()).await;
        assert!(matches!(result, Err(PollerError::MalformedBody(_))));
    }
}
