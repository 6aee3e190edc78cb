//! Shared clients handed to every resource operation

use armclient::services::appconfiguration::{
    ConfigurationStoresClient, DeletedConfigurationStoresClient,
};
use armclient::services::resources::ResourceGroupsClient;
use armclient::services::storagecache::AmlFilesystemsClient;
use armclient::{Client, Tags};
use std::sync::Arc;

use crate::features::UserFeatures;

/// Everything a resource needs from the configured provider. Built once
/// by [`AzureProvider::configure`](crate::AzureProvider::configure) and
/// shared read-only.
#[derive(Clone)]
pub struct Clients {
    pub subscription_id: String,
    pub features: UserFeatures,
    pub default_tags: Arc<Tags>,

    pub resource_groups: ResourceGroupsClient,
    pub aml_filesystems: AmlFilesystemsClient,
    pub configuration_stores: ConfigurationStoresClient,
    pub deleted_configuration_stores: DeletedConfigurationStoresClient,

    client: Client,
}

impl Clients {
    pub fn new(
        client: Client,
        subscription_id: impl Into<String>,
        features: UserFeatures,
        default_tags: Arc<Tags>,
    ) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            features,
            default_tags,
            resource_groups: ResourceGroupsClient::new(client.clone()),
            aml_filesystems: AmlFilesystemsClient::new(client.clone()),
            configuration_stores: ConfigurationStoresClient::new(client.clone()),
            deleted_configuration_stores: DeletedConfigurationStoresClient::new(client.clone()),
            client,
        }
    }

    /// The underlying Resource Manager client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}
