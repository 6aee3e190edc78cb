//! Azure Managed Lustre file systems (`Microsoft.StorageCache/amlFilesystems`)

use serde::{Deserialize, Serialize};

use super::then_poll;
use crate::client::Client;
use crate::common::{Sku, Tags};
use crate::context::Context;
use crate::error::ApiError;
use crate::pollers::PollerError;
use crate::resourceids::{AmlFilesystemId, ResourceId};

pub const API_VERSION: &str = "2024-03-01";

crate::string_enum! {
    pub enum AmlFilesystemProvisioningStateType {
        Canceled => "Canceled",
        Creating => "Creating",
        Deleting => "Deleting",
        Failed => "Failed",
        Succeeded => "Succeeded",
        Updating => "Updating",
    }
}

crate::string_enum! {
    pub enum AmlFilesystemHealthStateType {
        Available => "Available",
        Degraded => "Degraded",
        Maintenance => "Maintenance",
        Transitioning => "Transitioning",
        Unavailable => "Unavailable",
    }
}

crate::string_enum! {
    pub enum MaintenanceDayOfWeekType {
        Friday => "Friday",
        Monday => "Monday",
        Saturday => "Saturday",
        Sunday => "Sunday",
        Thursday => "Thursday",
        Tuesday => "Tuesday",
        Wednesday => "Wednesday",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmlFilesystem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zones: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AmlFilesystemProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmlFilesystemProperties {
    pub storage_capacity_ti_b: f64,
    pub filesystem_subnet: String,
    pub maintenance_window: AmlFilesystemMaintenanceWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_settings: Option<AmlFilesystemEncryptionSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_info: Option<AmlFilesystemClientInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health: Option<AmlFilesystemHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<AmlFilesystemProvisioningStateType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput_provisioned_m_bps: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmlFilesystemMaintenanceWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<MaintenanceDayOfWeekType>,
    /// `HH:MM` in UTC.
    #[serde(rename = "timeOfDayUTC", skip_serializing_if = "Option::is_none")]
    pub time_of_day_utc: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmlFilesystemEncryptionSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_encryption_key: Option<KeyVaultKeyReference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KeyVaultKeyReference {
    pub key_url: String,
    pub source_vault: KeyVaultKeyReferenceSourceVault,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KeyVaultKeyReferenceSourceVault {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmlFilesystemClientInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lustre_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mgs_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mount_command: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmlFilesystemHealth {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AmlFilesystemHealthStateType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_description: Option<String>,
}

/// Body for PATCH. Only tags, maintenance window and encryption can change
/// in place.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmlFilesystemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<AmlFilesystemUpdateProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AmlFilesystemUpdateProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption_settings: Option<AmlFilesystemEncryptionSettings>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_window: Option<AmlFilesystemMaintenanceWindow>,
}

#[derive(Clone)]
pub struct AmlFilesystemsClient {
    client: Client,
}

impl AmlFilesystemsClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &AmlFilesystemId) -> Result<AmlFilesystem, ApiError> {
        self.client
            .get(&id.id(), API_VERSION)
            .await?
            .ensure_status(&[200])?
            .model()
    }

    pub async fn create_or_update_then_poll(
        &self,
        ctx: &Context,
        id: &AmlFilesystemId,
        input: &AmlFilesystem,
    ) -> Result<(), PollerError> {
        let response = self.client.put(&id.id(), API_VERSION, input).await?;
        then_poll(&self.client, ctx, response, &[200, 201]).await
    }

    pub async fn update_then_poll(
        &self,
        ctx: &Context,
        id: &AmlFilesystemId,
        input: &AmlFilesystemUpdate,
    ) -> Result<(), PollerError> {
        let response = self.client.patch(&id.id(), API_VERSION, input).await?;
        then_poll(&self.client, ctx, response, &[200, 202]).await
    }

    pub async fn delete_then_poll(
        &self,
        ctx: &Context,
        id: &AmlFilesystemId,
    ) -> Result<(), PollerError> {
        let response = self.client.delete(&id.id(), API_VERSION).await?;
        then_poll(&self.client, ctx, response, &[200, 202, 204]).await
    }
}
