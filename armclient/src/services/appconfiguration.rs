//! App Configuration stores (`Microsoft.AppConfiguration`)

use serde::{Deserialize, Serialize};

use super::then_poll;
use crate::client::Client;
use crate::common::{Sku, Tags};
use crate::constants::PublicNetworkAccess;
use crate::context::Context;
use crate::error::ApiError;
use crate::pollers::PollerError;
use crate::resourceids::{
    ConfigurationStoreId, DeletedConfigurationStoreId, ResourceId, SubscriptionId,
};

pub const API_VERSION: &str = "2023-03-01";

pub const CONFIGURATION_STORE_TYPE: &str = "Microsoft.AppConfiguration/configurationStores";

crate::string_enum! {
    pub enum CreateMode {
        Default => "Default",
        Recover => "Recover",
    }
}

crate::string_enum! {
    pub enum ProvisioningState {
        Canceled => "Canceled",
        Creating => "Creating",
        Deleting => "Deleting",
        Failed => "Failed",
        Succeeded => "Succeeded",
        Updating => "Updating",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub location: String,
    pub sku: Sku,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ConfigurationStoreProperties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStoreProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_mode: Option<CreateMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_local_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_purge_protection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<ProvisioningState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<PublicNetworkAccess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_delete_retention_in_days: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStoreUpdateParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ConfigurationStorePropertiesUpdateParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<Sku>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationStorePropertiesUpdateParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disable_local_auth: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_purge_protection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_network_access: Option<PublicNetworkAccess>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeletedConfigurationStore {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<DeletedConfigurationStoreProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeletedConfigurationStoreProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purge_protection_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_purge_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckNameAvailabilityParameters {
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
}

impl CheckNameAvailabilityParameters {
    pub fn configuration_store(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_type: CONFIGURATION_STORE_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NameAvailabilityStatus {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Clone)]
pub struct ConfigurationStoresClient {
    client: Client,
}

impl ConfigurationStoresClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get(&self, id: &ConfigurationStoreId) -> Result<ConfigurationStore, ApiError> {
        self.client
            .get(&id.id(), API_VERSION)
            .await?
            .ensure_status(&[200])?
            .model()
    }

    pub async fn create_then_poll(
        &self,
        ctx: &Context,
        id: &ConfigurationStoreId,
        input: &ConfigurationStore,
    ) -> Result<(), PollerError> {
        let response = self.client.put(&id.id(), API_VERSION, input).await?;
        then_poll(&self.client, ctx, response, &[200, 201]).await
    }

    pub async fn update_then_poll(
        &self,
        ctx: &Context,
        id: &ConfigurationStoreId,
        input: &ConfigurationStoreUpdateParameters,
    ) -> Result<(), PollerError> {
        let response = self.client.patch(&id.id(), API_VERSION, input).await?;
        then_poll(&self.client, ctx, response, &[200, 201]).await
    }

    pub async fn delete_then_poll(
        &self,
        ctx: &Context,
        id: &ConfigurationStoreId,
    ) -> Result<(), PollerError> {
        let response = self.client.delete(&id.id(), API_VERSION).await?;
        then_poll(&self.client, ctx, response, &[200, 202, 204]).await
    }

    /// Store names are global; a purged name is released some time after
    /// the purge itself completes.
    pub async fn check_name_availability(
        &self,
        subscription: &SubscriptionId,
        input: &CheckNameAvailabilityParameters,
    ) -> Result<NameAvailabilityStatus, ApiError> {
        let path = format!(
            "{}/providers/Microsoft.AppConfiguration/checkNameAvailability",
            subscription.id()
        );
        self.client
            .post(&path, API_VERSION, Some(input))
            .await?
            .ensure_status(&[200])?
            .model()
    }
}

#[derive(Clone)]
pub struct DeletedConfigurationStoresClient {
    client: Client,
}

impl DeletedConfigurationStoresClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn get_deleted(
        &self,
        id: &DeletedConfigurationStoreId,
    ) -> Result<DeletedConfigurationStore, ApiError> {
        self.client
            .get(&id.id(), API_VERSION)
            .await?
            .ensure_status(&[200])?
            .model()
    }

    /// POST {id}/purge. Azure answers 200 with nothing to poll on, so
    /// callers watch [`get_deleted`](Self::get_deleted) until it returns 404.
    pub async fn purge_deleted(&self, id: &DeletedConfigurationStoreId) -> Result<(), ApiError> {
        let path = format!("{}/purge", id.id());
        self.client
            .post::<()>(&path, API_VERSION, None)
            .await?
            .ensure_status(&[200, 202])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::create_test_client;
    use mockito::{Matcher, Server};

    const STORE_PATH: &str = "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.AppConfiguration/configurationStores/store1";
    const DELETED_PATH: &str = "/subscriptions/sub/providers/Microsoft.AppConfiguration/locations/westeurope/deletedConfigurationStores/store1";

    #[tokio::test]
    async fn get_decodes_best_effort_constants() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", STORE_PATH)
            .match_query(Matcher::UrlEncoded("api-version".into(), API_VERSION.into()))
            .with_body(
                r#"{"location":"westeurope","sku":{"name":"standard"},"properties":{"endpoint":"https://store1.azconfig.io","publicNetworkAccess":"Enabled","provisioningState":"Succeeded","softDeleteRetentionInDays":7,"enablePurgeProtection":false}}"#,
            )
            .create_async()
            .await;

        let client = ConfigurationStoresClient::new(create_test_client(&server.url()));
        let store = client
            .get(&ConfigurationStoreId::new("sub", "rg1", "store1"))
            .await
            .unwrap();
        let props = store.properties.unwrap();

        assert_eq!(store.sku.name, "standard");
        assert_eq!(props.public_network_access, Some(PublicNetworkAccess::Enabled));
        assert_eq!(props.soft_delete_retention_in_days, Some(7));
        assert_eq!(props.endpoint.as_deref(), Some("https://store1.azconfig.io"));
    }

    #[tokio::test]
    async fn create_sends_recover_mode() {
        let mut server = Server::new_async().await;
        let put = server
            .mock("PUT", STORE_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "properties": {"createMode": "Recover"}
            })))
            .with_status(200)
            .with_body(r#"{"location":"westeurope","sku":{"name":"free"},"properties":{"provisioningState":"Succeeded"}}"#)
            .create_async()
            .await;

        let client = ConfigurationStoresClient::new(create_test_client(&server.url()));
        let input = ConfigurationStore {
            location: "westeurope".to_string(),
            sku: Sku {
                name: "free".to_string(),
                tier: None,
            },
            properties: Some(ConfigurationStoreProperties {
                create_mode: Some(CreateMode::Recover),
                ..Default::default()
            }),
            ..Default::default()
        };

        client
            .create_then_poll(
                &Context::new(),
                &ConfigurationStoreId::new("sub", "rg1", "store1"),
                &input,
            )
            .await
            .unwrap();

        put.assert_async().await;
    }

    #[tokio::test]
    async fn purge_posts_to_deleted_store() {
        let mut server = Server::new_async().await;
        let purge = server
            .mock("POST", format!("{}/purge", DELETED_PATH).as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .create_async()
            .await;

        let client = DeletedConfigurationStoresClient::new(create_test_client(&server.url()));
        client
            .purge_deleted(&DeletedConfigurationStoreId::new(
                "sub",
                "westeurope",
                "store1",
            ))
            .await
            .unwrap();

        purge.assert_async().await;
    }

    #[tokio::test]
    async fn get_deleted_reads_purge_schedule() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", DELETED_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"name":"store1","properties":{"deletionDate":"2024-01-01T00:00:00Z","scheduledPurgeDate":"2024-01-08T00:00:00Z","purgeProtectionEnabled":true}}"#)
            .create_async()
            .await;

        let client = DeletedConfigurationStoresClient::new(create_test_client(&server.url()));
        let deleted = client
            .get_deleted(&DeletedConfigurationStoreId::new(
                "sub",
                "westeurope",
                "store1",
            ))
            .await
            .unwrap();

        let props = deleted.properties.unwrap();
        assert_eq!(props.purge_protection_enabled, Some(true));
        assert_eq!(
            props.scheduled_purge_date.as_deref(),
            Some("2024-01-08T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn check_name_availability_posts_store_type() {
        let mut server = Server::new_async().await;
        let check = server
            .mock(
                "POST",
                "/subscriptions/sub/providers/Microsoft.AppConfiguration/checkNameAvailability",
            )
            .match_query(Matcher::UrlEncoded("api-version".into(), API_VERSION.into()))
            .match_body(Matcher::Json(serde_json::json!({
                "name": "store1",
                "type": "Microsoft.AppConfiguration/configurationStores"
            })))
            .with_body(r#"{"nameAvailable":false,"reason":"AlreadyExists"}"#)
            .create_async()
            .await;

        let client = ConfigurationStoresClient::new(create_test_client(&server.url()));
        let status = client
            .check_name_availability(
                &SubscriptionId::new("sub"),
                &CheckNameAvailabilityParameters::configuration_store("store1"),
            )
            .await
            .unwrap();

        check.assert_async().await;
        assert_eq!(status.name_available, Some(false));
        assert_eq!(status.reason.as_deref(), Some("AlreadyExists"));
    }
}
