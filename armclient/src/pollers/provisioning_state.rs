use async_trait::async_trait;
use std::time::Duration;

use super::{extract_json_value, PollResult, PollerError, PollerType, PollingStatus};
use crate::client::{retry_after, Client};
use crate::context::Context;

/// Re-reads a resource until `properties.provisioningState` is terminal.
/// Used when a PUT or PATCH answers 200/201 without any polling header.
pub struct ProvisioningStatePoller {
    client: Client,
    resource_url: String,
    default_interval: Duration,
}

impl ProvisioningStatePoller {
    pub fn new(client: Client, resource_url: String, default_interval: Duration) -> Self {
        Self {
            client,
            resource_url,
            default_interval,
        }
    }
}

#[async_trait]
impl PollerType for ProvisioningStatePoller {
    async fn poll(&mut self, _ctx: &Context) -> Result<PollResult, PollerError> {
        let response = self
            .client
            .get_url(&self.resource_url)
            .await?
            .ensure_status(&[200])?;

        let status = match extract_json_value(&response.body, "properties.provisioningState")? {
            Some(state) => PollingStatus::from_api_status(&state)
                .ok_or(PollerError::UnexpectedStatus(state))?,
            None => PollingStatus::Succeeded,
        };

        Ok(PollResult {
            status,
            poll_interval: retry_after(&response.headers).unwrap_or(self.default_interval),
            response: Some(response),
        })
    }
}
