//! Long-running operation polling
//!
//! Mutating Resource Manager calls either finish with their first response
//! or hand back a URL to poll. [`poller_from_response`] inspects the first
//! response and picks a [`PollerType`]; [`Poller::poll_until_done`] drives it
//! until a terminal state, the caller's context ends, or a poll fails.
//!
//! The poller never retries failed requests itself: transient failures are
//! retried by [`Client`](crate::Client) before a poll sees them.

mod long_running;
mod provisioning_state;

pub use long_running::LongRunningOperationPoller;
pub use provisioning_state::ProvisioningStatePoller;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use std::time::Duration;
use thiserror::Error;

use crate::client::{retry_after, Client};
use crate::context::{Context, ContextError};
use crate::error::ApiError;
use crate::response::Response;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollingStatus {
    InProgress,
    Succeeded,
    Failed,
    Cancelled,
}

impl PollingStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollingStatus::InProgress)
    }

    /// Maps a status string from a polling body. `None` means the value
    /// isn't one Azure is known to send.
    pub fn from_api_status(status: &str) -> Option<Self> {
        match status.to_lowercase().as_str() {
            "succeeded" => Some(PollingStatus::Succeeded),
            "failed" => Some(PollingStatus::Failed),
            "canceled" | "cancelled" => Some(PollingStatus::Cancelled),
            "inprogress" | "accepted" | "running" | "creating" | "updating" | "deleting"
            | "provisioning" | "canceling" | "cancelling" | "notstarted" | "migrating"
            | "scaling" | "upgrading" | "starting" | "stopping" | "pending" | "ready" => {
                Some(PollingStatus::InProgress)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum PollerError {
    #[error("the operation failed: {0}")]
    Failed(String),

    #[error("the operation was cancelled: {0}")]
    Cancelled(String),

    #[error("polling stopped: {0}")]
    Context(#[from] ContextError),

    #[error("polling request failed: {0}")]
    Api(#[from] ApiError),

    #[error("unexpected polling status {0:?}")]
    UnexpectedStatus(String),

    #[error("malformed polling response: {0}")]
    MalformedBody(String),
}

#[derive(Debug, Clone)]
pub struct PollResult {
    pub status: PollingStatus,
    /// How long to wait before the next poll.
    pub poll_interval: Duration,
    pub response: Option<Response>,
}

/// A strategy for checking on one long-running operation.
#[async_trait]
pub trait PollerType: Send + Sync {
    async fn poll(&mut self, ctx: &Context) -> Result<PollResult, PollerError>;

    /// True when the operation already finished with its initial response.
    fn completed(&self) -> bool {
        false
    }
}

/// Poller for operations that completed synchronously.
pub struct NopPoller {
    response: Option<Response>,
}

impl NopPoller {
    pub fn new(response: Option<Response>) -> Self {
        Self { response }
    }
}

#[async_trait]
impl PollerType for NopPoller {
    async fn poll(&mut self, _ctx: &Context) -> Result<PollResult, PollerError> {
        Ok(PollResult {
            status: PollingStatus::Succeeded,
            poll_interval: Duration::ZERO,
            response: self.response.clone(),
        })
    }

    fn completed(&self) -> bool {
        true
    }
}

pub struct Poller {
    poller_type: Box<dyn PollerType>,
    interval: Duration,
    latest_status: Option<PollingStatus>,
    latest_response: Option<Response>,
}

impl Poller {
    pub fn new(poller_type: impl PollerType + 'static, initial_interval: Duration) -> Self {
        Self {
            poller_type: Box::new(poller_type),
            interval: initial_interval,
            latest_status: None,
            latest_response: None,
        }
    }

    /// `None` until the first poll completes.
    pub fn latest_status(&self) -> Option<PollingStatus> {
        self.latest_status
    }

    pub fn latest_response(&self) -> Option<&Response> {
        self.latest_response.as_ref()
    }

    /// Polls until the operation reaches a terminal state.
    pub async fn poll_until_done(&mut self, ctx: &Context) -> Result<(), PollerError> {
        if self.poller_type.completed() {
            tracing::debug!("Operation completed with its initial response, nothing to poll");
            self.latest_status = Some(PollingStatus::Succeeded);
            return Ok(());
        }

        loop {
            tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    return Err(ctx.err().unwrap_or(ContextError::Cancelled).into());
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let result = tokio::select! {
                biased;
                _ = ctx.cancelled() => {
                    return Err(ctx.err().unwrap_or(ContextError::Cancelled).into());
                }
                result = self.poller_type.poll(ctx) => result?,
            };

            tracing::debug!("Poll returned {:?}", result.status);
            self.latest_status = Some(result.status);
            self.latest_response = result.response;

            match result.status {
                PollingStatus::Succeeded => return Ok(()),
                PollingStatus::Failed => {
                    return Err(PollerError::Failed(self.failure_message()));
                }
                PollingStatus::Cancelled => {
                    return Err(PollerError::Cancelled(self.failure_message()));
                }
                PollingStatus::InProgress => self.interval = result.poll_interval,
            }
        }
    }

    fn failure_message(&self) -> String {
        let body = match &self.latest_response {
            Some(response) => response.body.as_str(),
            None => return "no details were returned".to_string(),
        };

        let code = extract_json_value(body, "error.code").ok().flatten();
        let message = extract_json_value(body, "error.message").ok().flatten();
        match (code, message) {
            (Some(code), Some(message)) => format!("Code=\"{}\" Message=\"{}\"", code, message),
            (None, Some(message)) => message,
            (Some(code), None) => format!("Code=\"{}\"", code),
            (None, None) => body.to_string(),
        }
    }
}

/// Reads a string field from a JSON body. `path` may be dotted to reach
/// nested objects. A missing or null field is `Ok(None)`; a field holding
/// anything other than a string is an error.
pub fn extract_json_value(body: &str, path: &str) -> Result<Option<String>, PollerError> {
    if body.trim().is_empty() {
        return Ok(None);
    }

    let root: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| PollerError::MalformedBody(format!("decoding body: {}", e)))?;

    let mut current = &root;
    for key in path.split('.') {
        match current.get(key) {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }

    match current {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Ok(Some(s.clone())),
        other => Err(PollerError::MalformedBody(format!(
            "expected {:?} to be a string but got {}",
            path, other
        ))),
    }
}

const POLLING_HEADERS: [&str; 3] = ["Azure-AsyncOperation", "Operation-Location", "Location"];

/// Picks the poller for the initial response of a mutating call.
pub fn poller_from_response(client: &Client, response: Response) -> Result<Poller, PollerError> {
    let status = response.status;
    if !status.is_success() {
        return Err(ApiError::from_body(status.as_u16(), &response.body).into());
    }

    let interval = retry_after(&response.headers).unwrap_or_else(|| client.polling_interval());

    if status == StatusCode::CREATED || status == StatusCode::ACCEPTED {
        let poll_url = POLLING_HEADERS
            .iter()
            .find_map(|name| response.header(name))
            .map(str::to_string);

        if let Some(poll_url) = poll_url {
            tracing::debug!("Tracking long-running operation via {}", poll_url);
            let poller = LongRunningOperationPoller::new(client.clone(), poll_url, interval);
            return Ok(Poller::new(poller, interval));
        }
    }

    if (response.method == Method::PUT || response.method == Method::PATCH)
        && (status == StatusCode::OK || status == StatusCode::CREATED)
    {
        let state = extract_json_value(&response.body, "properties.provisioningState")?;
        if let Some(state) = state.filter(|s| !s.eq_ignore_ascii_case("succeeded")) {
            tracing::debug!("Provisioning state is {:?}, polling {}", state, response.url);
            let poller =
                ProvisioningStatePoller::new(client.clone(), response.url.clone(), interval);
            return Ok(Poller::new(poller, interval));
        }
    }

    Ok(Poller::new(NopPoller::new(Some(response)), interval))
}
