//! Resource groups (`Microsoft.Resources`)

use serde::{Deserialize, Serialize};

use super::then_poll;
use crate::client::Client;
use crate::common::{QueryParams, Tags};
use crate::context::Context;
use crate::error::ApiError;
use crate::pollers::PollerError;
use crate::resourceids::{ResourceGroupId, ResourceId};

pub const API_VERSION: &str = "2022-09-01";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ResourceGroupProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<String>,
}

/// Body for PATCH; only the fields set are changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGroupPatchable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

/// Summary of a resource nested inside a resource group.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenericResourceExpanded {
    #[serde(default)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Clone)]
pub struct ResourceGroupsClient {
    client: Client,
}

impl ResourceGroupsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// GET /subscriptions/{sub}/resourceGroups/{name}
    pub async fn get(&self, id: &ResourceGroupId) -> Result<ResourceGroup, ApiError> {
        self.client
            .get(&id.id(), API_VERSION)
            .await?
            .ensure_status(&[200])?
            .model()
    }

    /// PUT /subscriptions/{sub}/resourceGroups/{name}
    pub async fn create_or_update(
        &self,
        id: &ResourceGroupId,
        input: &ResourceGroup,
    ) -> Result<ResourceGroup, ApiError> {
        self.client
            .put(&id.id(), API_VERSION, input)
            .await?
            .ensure_status(&[200, 201])?
            .model()
    }

    /// PATCH /subscriptions/{sub}/resourceGroups/{name}
    pub async fn update(
        &self,
        id: &ResourceGroupId,
        input: &ResourceGroupPatchable,
    ) -> Result<ResourceGroup, ApiError> {
        self.client
            .patch(&id.id(), API_VERSION, input)
            .await?
            .ensure_status(&[200])?
            .model()
    }

    /// DELETE /subscriptions/{sub}/resourceGroups/{name}, then waits for
    /// Azure to finish removing it.
    pub async fn delete_then_poll(
        &self,
        ctx: &Context,
        id: &ResourceGroupId,
    ) -> Result<(), PollerError> {
        let response = self.client.delete(&id.id(), API_VERSION).await?;
        then_poll(&self.client, ctx, response, &[200, 202]).await
    }

    /// GET /subscriptions/{sub}/resourceGroups/{name}/resources, all pages.
    pub async fn list_resources(
        &self,
        id: &ResourceGroupId,
    ) -> Result<Vec<GenericResourceExpanded>, ApiError> {
        let path = format!("{}/resources", id.id());
        self.client
            .list_all_pages(&path, API_VERSION, &QueryParams::new())
            .await
    }
}
