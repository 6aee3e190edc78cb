//! azurerm_app_configuration

use armclient::constants::PublicNetworkAccess;
use armclient::pollers::{PollResult, Poller, PollerError, PollerType, PollingStatus};
use armclient::resourceids::{
    ConfigurationStoreId, DeletedConfigurationStoreId, ResourceId, SubscriptionId,
};
use armclient::response::error_was_not_found;
use armclient::services::appconfiguration::{
    CheckNameAvailabilityParameters, ConfigurationStore, ConfigurationStoreProperties,
    ConfigurationStorePropertiesUpdateParameters, ConfigurationStoreUpdateParameters,
    ConfigurationStoresClient, CreateMode, DeletedConfigurationStoresClient,
};
use armclient::{Context, Sku};
use async_trait::async_trait;
use std::time::Duration;

use super::{existing_id, required_string};
use crate::clients::Clients;
use crate::error::{ProviderError, Result};
use crate::sdk::{
    ensure_not_exists, remove_if_not_found, AttributeBuilder, AttributeType, Resource,
    ResourceData, ResourceTimeouts, Schema, SchemaBuilder,
};
use crate::tags;
use crate::validate::{self, normalize_location, IntBetween, StringInSlice};

pub const TYPE_NAME: &str = "azurerm_app_configuration";

const SKU_NAMES: [&str; 4] = ["free", "developer", "standard", "premium"];
const DEFAULT_SOFT_DELETE_RETENTION_DAYS: i64 = 7;

pub struct AppConfigurationResource;

#[async_trait]
impl Resource for AppConfigurationResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an Azure App Configuration store")
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .force_new()
                    .validator(validate::ConfigurationStoreName)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("resource_group_name", AttributeType::String)
                    .required()
                    .force_new()
                    .validator(validate::ResourceGroupName)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("location", AttributeType::String)
                    .required()
                    .force_new()
                    .validator(validate::Location)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("sku", AttributeType::String)
                    .optional()
                    .default_value("free")
                    .validator(StringInSlice::new(&SKU_NAMES[..]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("local_auth_enabled", AttributeType::Bool)
                    .optional()
                    .default_value(true)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("public_network_access", AttributeType::String)
                    .optional()
                    .validator(StringInSlice::ignoring_case(
                        PublicNetworkAccess::possible_values().as_slice(),
                    ))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("purge_protection_enabled", AttributeType::Bool)
                    .description("Once enabled, purge protection cannot be disabled")
                    .optional()
                    .default_value(false)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("soft_delete_retention_days", AttributeType::Number)
                    .optional()
                    .force_new()
                    .default_value(DEFAULT_SOFT_DELETE_RETENTION_DAYS)
                    .validator(IntBetween { min: 1, max: 7 })
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(tags::schema())
            .attribute(tags::schema_all())
            .build()
    }

    fn timeouts(&self) -> ResourceTimeouts {
        ResourceTimeouts {
            create: Duration::from_secs(60 * 60),
            update: Duration::from_secs(60 * 60),
            delete: Duration::from_secs(60 * 60),
            ..ResourceTimeouts::default()
        }
    }

    async fn create(
        &self,
        ctx: &Context,
        clients: &Clients,
        data: &mut ResourceData,
    ) -> Result<()> {
        let name = required_string(data, "name")?;
        let id = ConfigurationStoreId::new(
            &clients.subscription_id,
            required_string(data, "resource_group_name")?,
            &name,
        );
        ensure_not_exists(TYPE_NAME, &id, clients.configuration_stores.get(&id).await)?;

        let location = normalize_location(&required_string(data, "location")?);

        let mut recover_soft_deleted = false;
        if clients.features.app_configuration.recover_soft_deleted {
            let deleted_id =
                DeletedConfigurationStoreId::new(&clients.subscription_id, &location, &name);
            match clients.deleted_configuration_stores.get_deleted(&deleted_id).await {
                Ok(_) => {
                    tracing::debug!("Soft deleted {} exists, marked for recover", deleted_id);
                    recover_soft_deleted = true;
                }
                Err(e) if error_was_not_found(&e) => {}
                Err(e) if e.status() == Some(403) => {
                    return Err(ProviderError::Custom(format!(
                        "checking for presence of deleted {}: the caller lacks permission to read soft-deleted \
                         App Configurations (Microsoft.AppConfiguration/locations/deletedConfigurationStores/read). \
                         Grant the permission or disable `recover_soft_deleted` in the provider's `features` block",
                        deleted_id
                    )));
                }
                Err(e) => {
                    return Err(ProviderError::api(
                        format!("checking for presence of deleted {}", deleted_id),
                        e,
                    ))
                }
            }
        }

        let soft_delete_retention = data
            .get_i64("soft_delete_retention_days")
            .filter(|days| *days != DEFAULT_SOFT_DELETE_RETENTION_DAYS);

        let input = ConfigurationStore {
            location,
            sku: Sku {
                name: data.get_string("sku").unwrap_or_else(|| "free".to_string()),
                tier: None,
            },
            properties: Some(ConfigurationStoreProperties {
                create_mode: recover_soft_deleted.then_some(CreateMode::Recover),
                disable_local_auth: Some(!data.get_bool("local_auth_enabled").unwrap_or(true)),
                enable_purge_protection: Some(
                    data.get_bool("purge_protection_enabled").unwrap_or(false),
                ),
                public_network_access: data
                    .get_string("public_network_access")
                    .map(|v| PublicNetworkAccess::parse(&v)),
                soft_delete_retention_in_days: soft_delete_retention,
                ..Default::default()
            }),
            tags: Some(tags::ensure_tags_all_set(data, &clients.default_tags)),
            ..Default::default()
        };

        clients
            .configuration_stores
            .create_then_poll(ctx, &id, &input)
            .await
            .map_err(|e| ProviderError::poller(format!("creating {}", id), e))?;

        data.set_id(id.id());
        self.read(ctx, clients, data).await
    }

    async fn read(&self, _ctx: &Context, clients: &Clients, data: &mut ResourceData) -> Result<()> {
        let id = ConfigurationStoreId::parse(existing_id(data)?)?;

        let store = match clients.configuration_stores.get(&id).await {
            Ok(store) => store,
            Err(e) if remove_if_not_found(data, &id, &e) => return Ok(()),
            Err(e) => return Err(ProviderError::api(format!("retrieving {}", id), e)),
        };

        data.set_string("name", &id.configuration_store_name);
        data.set_string("resource_group_name", &id.resource_group_name);
        data.set_string("location", normalize_location(&store.location));
        data.set_string("sku", &store.sku.name);

        let props = store.properties.unwrap_or_default();
        data.set_optional_string("endpoint", props.endpoint.as_deref());
        data.set_optional_string(
            "public_network_access",
            props.public_network_access.as_ref().map(PublicNetworkAccess::as_str),
        );
        data.set_bool(
            "local_auth_enabled",
            !props.disable_local_auth.unwrap_or(false),
        );
        data.set_bool(
            "purge_protection_enabled",
            props.enable_purge_protection.unwrap_or(false),
        );
        data.set_number(
            "soft_delete_retention_days",
            props.soft_delete_retention_in_days.unwrap_or(0) as f64,
        );

        tags::ensure_tags_all_read_set(data, store.tags.as_ref(), &clients.default_tags);
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        clients: &Clients,
        data: &mut ResourceData,
    ) -> Result<()> {
        let id = ConfigurationStoreId::parse(existing_id(data)?)?;

        let existing = clients
            .configuration_stores
            .get(&id)
            .await
            .map_err(|e| ProviderError::api(format!("retrieving {}", id), e))?;

        let mut update = ConfigurationStoreUpdateParameters::default();
        let mut properties = ConfigurationStorePropertiesUpdateParameters::default();

        if data.has_change("sku") {
            update.sku = data.get_string("sku").map(|name| Sku { name, tier: None });
        }
        if data.has_change("local_auth_enabled") {
            properties.disable_local_auth = Some(!data.get_bool("local_auth_enabled").unwrap_or(true));
        }
        if data.has_change("public_network_access") {
            properties.public_network_access = data
                .get_string("public_network_access")
                .map(|v| PublicNetworkAccess::parse(&v));
        }
        if data.has_change("purge_protection_enabled") {
            let enabled = data.get_bool("purge_protection_enabled").unwrap_or(false);
            let was_enabled = existing
                .properties
                .as_ref()
                .and_then(|p| p.enable_purge_protection)
                .unwrap_or(false);
            if was_enabled && !enabled {
                return Err(ProviderError::Custom(format!(
                    "updating {}: once Purge Protection has been Enabled it's not possible to disable it",
                    id
                )));
            }
            properties.enable_purge_protection = Some(enabled);
        }
        if tags::has_change(data, &clients.default_tags) {
            update.tags = Some(tags::ensure_tags_all_set(data, &clients.default_tags));
        }

        if properties != ConfigurationStorePropertiesUpdateParameters::default() {
            update.properties = Some(properties);
        }

        if update != ConfigurationStoreUpdateParameters::default() {
            clients
                .configuration_stores
                .update_then_poll(ctx, &id, &update)
                .await
                .map_err(|e| ProviderError::poller(format!("updating {}", id), e))?;
        }

        self.read(ctx, clients, data).await
    }

    async fn delete(
        &self,
        ctx: &Context,
        clients: &Clients,
        data: &mut ResourceData,
    ) -> Result<()> {
        let id = ConfigurationStoreId::parse(existing_id(data)?)?;

        let existing = match clients.configuration_stores.get(&id).await {
            Ok(store) => store,
            Err(e) if remove_if_not_found(data, &id, &e) => return Ok(()),
            Err(e) => return Err(ProviderError::api(format!("retrieving {}", id), e)),
        };
        let props = existing.properties.unwrap_or_default();
        let purge_protection_enabled = props.enable_purge_protection.unwrap_or(false);
        let soft_delete_enabled = props.soft_delete_retention_in_days.is_some_and(|d| d > 0);

        clients
            .configuration_stores
            .delete_then_poll(ctx, &id)
            .await
            .map_err(|e| ProviderError::poller(format!("deleting {}", id), e))?;

        if clients.features.app_configuration.purge_soft_delete_on_destroy && soft_delete_enabled {
            let deleted_id = DeletedConfigurationStoreId::new(
                &clients.subscription_id,
                normalize_location(&existing.location),
                &id.configuration_store_name,
            );

            if purge_protection_enabled {
                let deleted = clients
                    .deleted_configuration_stores
                    .get_deleted(&deleted_id)
                    .await
                    .map_err(|e| {
                        ProviderError::api(
                            format!("retrieving the deletion details for {}", id),
                            e,
                        )
                    })?;
                let deleted = deleted.properties.unwrap_or_default();
                match (deleted.deletion_date, deleted.scheduled_purge_date) {
                    (Some(deleted_on), Some(purge_on)) => tracing::debug!(
                        "{} has purge protection enabled and was deleted on {}. Azure will purge it on {}",
                        id.configuration_store_name,
                        deleted_on,
                        purge_on
                    ),
                    _ => tracing::debug!(
                        "{} has purge protection enabled and will be purged automatically by Azure",
                        id.configuration_store_name
                    ),
                }
            } else {
                purge(ctx, clients, &deleted_id).await?;
                wait_for_name_available(ctx, clients, &id).await?;
                tracing::debug!("Purged {}", id.configuration_store_name);
            }
        }

        data.clear_id();
        Ok(())
    }
}

async fn purge(ctx: &Context, clients: &Clients, id: &DeletedConfigurationStoreId) -> Result<()> {
    tracing::debug!("{} marked for purge, executing purge", id);
    clients
        .deleted_configuration_stores
        .purge_deleted(id)
        .await
        .map_err(|e| ProviderError::api(format!("purging {}", id), e))?;

    let interval = clients.client().polling_interval();
    let poller_type = PurgeDeletedPoller {
        client: clients.deleted_configuration_stores.clone(),
        id: id.clone(),
        interval,
    };
    Poller::new(poller_type, interval)
        .poll_until_done(ctx)
        .await
        .map_err(|e| ProviderError::poller(format!("polling after purging {}", id), e))
}

/// The store name stays taken for a while after the purge completes, so a
/// recreate straight after destroy would fail without this wait.
async fn wait_for_name_available(
    ctx: &Context,
    clients: &Clients,
    id: &ConfigurationStoreId,
) -> Result<()> {
    let interval = clients.client().polling_interval();
    let poller_type = NameAvailablePoller {
        client: clients.configuration_stores.clone(),
        subscription: SubscriptionId::new(&id.subscription_id),
        input: CheckNameAvailabilityParameters::configuration_store(&id.configuration_store_name),
        interval,
        consecutive: 0,
    };
    Poller::new(poller_type, interval)
        .poll_until_done(ctx)
        .await
        .map_err(|e| {
            ProviderError::poller(
                format!("waiting for the name from {} to become available", id),
                e,
            )
        })
}

/// Number of available answers in a row before the name counts as released.
const NAME_AVAILABLE_OCCURRENCES: u32 = 2;

struct NameAvailablePoller {
    client: ConfigurationStoresClient,
    subscription: SubscriptionId,
    input: CheckNameAvailabilityParameters,
    interval: Duration,
    consecutive: u32,
}

#[async_trait]
impl PollerType for NameAvailablePoller {
    async fn poll(&mut self, _ctx: &Context) -> std::result::Result<PollResult, PollerError> {
        tracing::debug!("Checking to see if the name {:?} is available", self.input.name);
        let status = self
            .client
            .check_name_availability(&self.subscription, &self.input)
            .await?;

        match status.name_available {
            Some(true) => self.consecutive += 1,
            Some(false) => self.consecutive = 0,
            None => {
                return Err(PollerError::MalformedBody(format!(
                    "nameAvailable missing from the availability check for {:?}",
                    self.input.name
                )))
            }
        }

        let status = if self.consecutive >= NAME_AVAILABLE_OCCURRENCES {
            PollingStatus::Succeeded
        } else {
            PollingStatus::InProgress
        };
        Ok(PollResult {
            status,
            poll_interval: self.interval,
            response: None,
        })
    }
}

/// Purging answers immediately with nothing to poll on, so completion is
/// observed by waiting for the deleted store to disappear: 404 means done
/// and 200 means still purging.
struct PurgeDeletedPoller {
    client: DeletedConfigurationStoresClient,
    id: DeletedConfigurationStoreId,
    interval: Duration,
}

#[async_trait]
impl PollerType for PurgeDeletedPoller {
    async fn poll(&mut self, _ctx: &Context) -> std::result::Result<PollResult, PollerError> {
        let status = match self.client.get_deleted(&self.id).await {
            Ok(_) => PollingStatus::InProgress,
            Err(e) if error_was_not_found(&e) => PollingStatus::Succeeded,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => PollerError::UnexpectedStatus(status.to_string()),
                    None => PollerError::Api(e),
                })
            }
        };

        Ok(PollResult {
            status,
            poll_interval: self.interval,
            response: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::test_helpers::{create_test_clients, create_test_clients_with};
    use crate::features::UserFeatures;
    use crate::sdk::{apply, Operation};
    use armclient::Tags;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const STORE_PATH: &str = "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.AppConfiguration/configurationStores/store1";
    const DELETED_PATH: &str = "/subscriptions/sub/providers/Microsoft.AppConfiguration/locations/westeurope/deletedConfigurationStores/store1";
    const CHECK_NAME_PATH: &str =
        "/subscriptions/sub/providers/Microsoft.AppConfiguration/checkNameAvailability";

    fn config() -> serde_json::Value {
        json!({
            "name": "store1",
            "resource_group_name": "rg1",
            "location": "West Europe",
            "sku": "standard"
        })
    }

    fn store_body(purge_protection: bool, retention: i64) -> String {
        json!({
            "id": STORE_PATH,
            "name": "store1",
            "location": "westeurope",
            "sku": {"name": "standard"},
            "properties": {
                "endpoint": "https://store1.azconfig.io",
                "disableLocalAuth": false,
                "enablePurgeProtection": purge_protection,
                "softDeleteRetentionInDays": retention,
                "publicNetworkAccess": "Enabled",
                "provisioningState": "Succeeded"
            }
        })
        .to_string()
    }

    #[tokio::test]
    async fn create_recovers_soft_deleted_store() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", STORE_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let _deleted = server
            .mock("GET", DELETED_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"name":"store1","properties":{"location":"westeurope"}}"#)
            .create_async()
            .await;
        let put = server
            .mock("PUT", STORE_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "location": "westeurope",
                "sku": {"name": "standard"},
                "properties": {
                    "createMode": "Recover",
                    "disableLocalAuth": false,
                    "enablePurgeProtection": false
                }
            })))
            .with_status(200)
            .with_body(store_body(false, 7))
            .create_async()
            .await;
        let _read = server
            .mock("GET", STORE_PATH)
            .match_query(Matcher::Any)
            .with_body(store_body(false, 7))
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::from_json(config());

        apply(&AppConfigurationResource, Operation::Create, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        put.assert_async().await;
        assert_eq!(
            data.get_string("endpoint").as_deref(),
            Some("https://store1.azconfig.io")
        );
        assert_eq!(data.get_bool("local_auth_enabled"), Some(true));
        assert_eq!(data.get_i64("soft_delete_retention_days"), Some(7));
    }

    #[tokio::test]
    async fn create_skips_recovery_when_disabled() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", STORE_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let deleted = server
            .mock("GET", DELETED_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let _put = server
            .mock("PUT", STORE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(store_body(false, 7))
            .create_async()
            .await;
        let _read = server
            .mock("GET", STORE_PATH)
            .match_query(Matcher::Any)
            .with_body(store_body(false, 7))
            .create_async()
            .await;

        let mut features = UserFeatures::default();
        features.app_configuration.recover_soft_deleted = false;
        let clients = create_test_clients_with(&server.url(), features, Tags::new());
        let mut data = ResourceData::from_json(config());

        apply(&AppConfigurationResource, Operation::Create, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        deleted.assert_async().await;
        assert!(data.id().is_some());
    }

    #[tokio::test]
    async fn delete_purges_and_waits_until_gone() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", STORE_PATH)
            .match_query(Matcher::Any)
            .with_body(store_body(false, 7))
            .create_async()
            .await;
        let _delete = server
            .mock("DELETE", STORE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .create_async()
            .await;
        let purge = server
            .mock("POST", format!("{}/purge", DELETED_PATH).as_str())
            .match_query(Matcher::Any)
            .with_status(200)
            .create_async()
            .await;
        let still_deleted = server
            .mock("GET", DELETED_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"name":"store1"}"#)
            .expect(1)
            .create_async()
            .await;
        let gone = server
            .mock("GET", DELETED_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let name_taken = server
            .mock("POST", CHECK_NAME_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({"name": "store1"})))
            .with_body(r#"{"nameAvailable":false,"reason":"AlreadyExists"}"#)
            .expect(1)
            .create_async()
            .await;
        let name_free = server
            .mock("POST", CHECK_NAME_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"nameAvailable":true}"#)
            .expect(2)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::new().with_id(STORE_PATH);

        apply(&AppConfigurationResource, Operation::Delete, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        purge.assert_async().await;
        still_deleted.assert_async().await;
        gone.assert_async().await;
        name_taken.assert_async().await;
        name_free.assert_async().await;
        assert!(data.id().is_none());
    }

    #[tokio::test]
    async fn delete_leaves_purge_protected_store_to_azure() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", STORE_PATH)
            .match_query(Matcher::Any)
            .with_body(store_body(true, 7))
            .create_async()
            .await;
        let _delete = server
            .mock("DELETE", STORE_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .create_async()
            .await;
        let _deleted = server
            .mock("GET", DELETED_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"properties":{"deletionDate":"2024-01-01T00:00:00Z","scheduledPurgeDate":"2024-01-08T00:00:00Z"}}"#)
            .create_async()
            .await;
        let purge = server
            .mock("POST", format!("{}/purge", DELETED_PATH).as_str())
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::new().with_id(STORE_PATH);

        apply(&AppConfigurationResource, Operation::Delete, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        purge.assert_async().await;
        assert!(data.id().is_none());
    }

    #[tokio::test]
    async fn name_availability_needs_consecutive_answers() {
        let mut server = Server::new_async().await;
        let _free = server
            .mock("POST", CHECK_NAME_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"nameAvailable":true}"#)
            .expect(1)
            .create_async()
            .await;
        let _taken = server
            .mock("POST", CHECK_NAME_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"nameAvailable":false}"#)
            .expect(1)
            .create_async()
            .await;
        let _free_again = server
            .mock("POST", CHECK_NAME_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"nameAvailable":true}"#)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut poller = NameAvailablePoller {
            client: clients.configuration_stores.clone(),
            subscription: SubscriptionId::new("sub"),
            input: CheckNameAvailabilityParameters::configuration_store("store1"),
            interval: Duration::from_millis(1),
            consecutive: 0,
        };
        let ctx = Context::new();

        let statuses = [
            poller.poll(&ctx).await.unwrap().status,
            poller.poll(&ctx).await.unwrap().status,
            poller.poll(&ctx).await.unwrap().status,
            poller.poll(&ctx).await.unwrap().status,
        ];
        assert_eq!(
            statuses,
            [
                PollingStatus::InProgress,
                PollingStatus::InProgress,
                PollingStatus::InProgress,
                PollingStatus::Succeeded,
            ]
        );
    }

    #[tokio::test]
    async fn name_availability_without_answer_is_malformed() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", CHECK_NAME_PATH)
            .match_query(Matcher::Any)
            .with_body("{}")
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut poller = NameAvailablePoller {
            client: clients.configuration_stores.clone(),
            subscription: SubscriptionId::new("sub"),
            input: CheckNameAvailabilityParameters::configuration_store("store1"),
            interval: Duration::from_millis(1),
            consecutive: 0,
        };

        let err = poller.poll(&Context::new()).await.unwrap_err();
        assert!(matches!(err, PollerError::MalformedBody(_)));
    }

    #[tokio::test]
    async fn purge_poller_fails_on_unexpected_status() {
        let mut server = Server::new_async().await;
        let _deleted = server
            .mock("GET", DELETED_PATH)
            .match_query(Matcher::Any)
            .with_status(409)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut poller = PurgeDeletedPoller {
            client: clients.deleted_configuration_stores.clone(),
            id: DeletedConfigurationStoreId::new("sub", "westeurope", "store1"),
            interval: Duration::from_millis(1),
        };

        let err = poller.poll(&Context::new()).await.unwrap_err();
        assert!(matches!(err, PollerError::UnexpectedStatus(ref s) if s == "409"));
    }

    #[tokio::test]
    async fn update_refuses_to_disable_purge_protection() {
        let mut server = Server::new_async().await;
        let _get = server
            .mock("GET", STORE_PATH)
            .match_query(Matcher::Any)
            .with_body(store_body(true, 7))
            .create_async()
            .await;
        let patch = server
            .mock("PATCH", STORE_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut prior = config();
        prior["purge_protection_enabled"] = json!(true);
        let prior = ResourceData::from_json(prior);
        let mut updated = config();
        updated["purge_protection_enabled"] = json!(false);
        let mut data = ResourceData::from_json(updated)
            .with_id(STORE_PATH)
            .with_prior_state(prior.values().clone());

        let err = apply(&AppConfigurationResource, Operation::Update, &Context::new(), &clients, &mut data)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("not possible to disable it"));
        patch.assert_async().await;
    }
}
