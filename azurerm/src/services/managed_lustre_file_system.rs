//! azurerm_managed_lustre_file_system

use armclient::resourceids::{AmlFilesystemId, ResourceId};
use armclient::services::storagecache::{
    AmlFilesystem, AmlFilesystemMaintenanceWindow, AmlFilesystemProperties, AmlFilesystemUpdate,
    AmlFilesystemUpdateProperties, MaintenanceDayOfWeekType,
};
use armclient::{Context, Sku};
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Duration;

use super::{existing_id, required_string};
use crate::clients::Clients;
use crate::error::{ProviderError, Result};
use crate::sdk::{
    ensure_not_exists, remove_if_not_found, AttributeBuilder, AttributeType, Diagnostics,
    Dynamic, Resource, ResourceData, ResourceTimeouts, Schema, SchemaBuilder,
};
use crate::tags;
use crate::validate::{self, cached_regex, normalize_location, StringInSlice, Validator};

pub const TYPE_NAME: &str = "azurerm_managed_lustre_file_system";

const SKU_NAMES: [&str; 4] = [
    "AMLFS-Durable-Premium-40",
    "AMLFS-Durable-Premium-125",
    "AMLFS-Durable-Premium-250",
    "AMLFS-Durable-Premium-500",
];

const DAY_OF_WEEK: &str = "day_of_week";
const TIME_OF_DAY: &str = "time_of_day_in_utc";

/// Checks the `maintenance_window` map: a known weekday and an `HH:MM` time.
struct MaintenanceWindowValidator;

impl Validator for MaintenanceWindowValidator {
    fn validate(&self, value: &Dynamic, attribute_path: &str, diagnostics: &mut Diagnostics) {
        static TIME: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

        let Some(window) = value.as_map() else {
            return;
        };

        match window.get(DAY_OF_WEEK).and_then(Dynamic::as_string) {
            Some(day) => {
                StringInSlice::new(MaintenanceDayOfWeekType::possible_values().as_slice()).validate(
                    &Dynamic::from(day),
                    &format!("{}.{}", attribute_path, DAY_OF_WEEK),
                    diagnostics,
                );
            }
            None => diagnostics.add_attribute_error(
                attribute_path,
                format!("{}.{} is required", attribute_path, DAY_OF_WEEK),
                None,
            ),
        }

        let time = window.get(TIME_OF_DAY).and_then(Dynamic::as_string);
        let valid = match (time, cached_regex(&TIME, r"^([01]\d|2[0-3]):[0-5]\d$")) {
            (Some(time), Ok(pattern)) => pattern.is_match(time),
            (_, Err(e)) => {
                diagnostics.add_error(e, None);
                return;
            }
            (None, _) => false,
        };
        if !valid {
            diagnostics.add_attribute_error(
                attribute_path,
                format!(
                    "{}.{} must be a time in the format HH:MM",
                    attribute_path, TIME_OF_DAY
                ),
                time.map(|t| format!("got {:?}", t)),
            );
        }
    }
}

fn expand_maintenance_window(data: &ResourceData) -> AmlFilesystemMaintenanceWindow {
    let window = data.get_string_map("maintenance_window");
    AmlFilesystemMaintenanceWindow {
        day_of_week: window
            .get(DAY_OF_WEEK)
            .map(|d| MaintenanceDayOfWeekType::parse(d)),
        time_of_day_utc: window.get(TIME_OF_DAY).cloned(),
    }
}

fn flatten_maintenance_window(window: &AmlFilesystemMaintenanceWindow) -> HashMap<String, String> {
    let mut flat = HashMap::new();
    if let Some(day) = &window.day_of_week {
        flat.insert(DAY_OF_WEEK.to_string(), day.to_string());
    }
    if let Some(time) = &window.time_of_day_utc {
        flat.insert(TIME_OF_DAY.to_string(), time.clone());
    }
    flat
}

pub struct ManagedLustreFileSystemResource;

#[async_trait]
impl Resource for ManagedLustreFileSystemResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages an Azure Managed Lustre File System")
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .force_new()
                    .validator(validate::ManagedLustreFileSystemName)
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
                AttributeBuilder::new("sku_name", AttributeType::String)
                    .required()
                    .force_new()
                    .validator(StringInSlice::new(&SKU_NAMES[..]))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("storage_capacity_in_tb", AttributeType::Number)
                    .description("Size of the file system in TiB, in steps that depend on the SKU")
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("subnet_id", AttributeType::String)
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("zones", AttributeType::List(Box::new(AttributeType::String)))
                    .required()
                    .force_new()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "maintenance_window",
                    AttributeType::Map(Box::new(AttributeType::String)),
                )
                .description("`day_of_week` and `time_of_day_in_utc` (HH:MM) of the weekly maintenance window")
                .required()
                .validator(MaintenanceWindowValidator)
                .build(),
            )
            .attribute(
                AttributeBuilder::new("mgs_address", AttributeType::String)
                    .description("IP address of the management service used to mount the file system")
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
        let id = AmlFilesystemId::new(
            &clients.subscription_id,
            required_string(data, "resource_group_name")?,
            required_string(data, "name")?,
        );
        ensure_not_exists(TYPE_NAME, &id, clients.aml_filesystems.get(&id).await)?;

        let storage_capacity = data.get_number("storage_capacity_in_tb").ok_or_else(|| {
            ProviderError::InvalidConfiguration("\"storage_capacity_in_tb\" is required".to_string())
        })?;

        let input = AmlFilesystem {
            location: normalize_location(&required_string(data, "location")?),
            sku: Some(Sku {
                name: required_string(data, "sku_name")?,
                tier: None,
            }),
            zones: Some(data.get_string_list("zones")),
            properties: Some(AmlFilesystemProperties {
                storage_capacity_ti_b: storage_capacity,
                filesystem_subnet: required_string(data, "subnet_id")?,
                maintenance_window: expand_maintenance_window(data),
                ..Default::default()
            }),
            tags: Some(tags::ensure_tags_all_set(data, &clients.default_tags)),
            ..Default::default()
        };

        clients
            .aml_filesystems
            .create_or_update_then_poll(ctx, &id, &input)
            .await
            .map_err(|e| ProviderError::poller(format!("creating {}", id), e))?;

        data.set_id(id.id());
        self.read(ctx, clients, data).await
    }

    async fn read(&self, _ctx: &Context, clients: &Clients, data: &mut ResourceData) -> Result<()> {
        let id = AmlFilesystemId::parse(existing_id(data)?)?;

        let filesystem = match clients.aml_filesystems.get(&id).await {
            Ok(filesystem) => filesystem,
            Err(e) if remove_if_not_found(data, &id, &e) => return Ok(()),
            Err(e) => return Err(ProviderError::api(format!("retrieving {}", id), e)),
        };

        data.set_string("name", &id.aml_filesystem_name);
        data.set_string("resource_group_name", &id.resource_group_name);
        data.set_string("location", normalize_location(&filesystem.location));
        data.set_optional_string(
            "sku_name",
            filesystem.sku.as_ref().map(|sku| sku.name.as_str()),
        );
        data.set_string_list("zones", &filesystem.zones.unwrap_or_default());

        if let Some(props) = &filesystem.properties {
            data.set_number("storage_capacity_in_tb", props.storage_capacity_ti_b);
            data.set_string("subnet_id", &props.filesystem_subnet);
            data.set_string_map(
                "maintenance_window",
                &flatten_maintenance_window(&props.maintenance_window),
            );
            data.set_optional_string(
                "mgs_address",
                props
                    .client_info
                    .as_ref()
                    .and_then(|info| info.mgs_address.as_deref()),
            );
        }

        tags::ensure_tags_all_read_set(data, filesystem.tags.as_ref(), &clients.default_tags);
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        clients: &Clients,
        data: &mut ResourceData,
    ) -> Result<()> {
        let id = AmlFilesystemId::parse(existing_id(data)?)?;

        let mut patch = AmlFilesystemUpdate::default();
        if data.has_change("maintenance_window") {
            patch.properties = Some(AmlFilesystemUpdateProperties {
                maintenance_window: Some(expand_maintenance_window(data)),
                ..Default::default()
            });
        }
        if tags::has_change(data, &clients.default_tags) {
            patch.tags = Some(tags::ensure_tags_all_set(data, &clients.default_tags));
        }

        if patch != AmlFilesystemUpdate::default() {
            clients
                .aml_filesystems
                .update_then_poll(ctx, &id, &patch)
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
        let id = AmlFilesystemId::parse(existing_id(data)?)?;

        clients
            .aml_filesystems
            .delete_then_poll(ctx, &id)
            .await
            .map_err(|e| ProviderError::poller(format!("deleting {}", id), e))?;

        data.clear_id();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::test_helpers::create_test_clients;
    use crate::sdk::{apply, Operation};
    use mockito::{Matcher, Server};
    use serde_json::json;

    const FS_PATH: &str =
        "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.StorageCache/amlFilesystems/fs1";
    const SUBNET: &str =
        "/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/lustre";

    fn config() -> serde_json::Value {
        json!({
            "name": "fs1",
            "resource_group_name": "rg1",
            "location": "East US",
            "sku_name": "AMLFS-Durable-Premium-250",
            "storage_capacity_in_tb": 8,
            "subnet_id": SUBNET,
            "zones": ["1"],
            "maintenance_window": {"day_of_week": "Friday", "time_of_day_in_utc": "22:00"},
            "tags": {"env": "dev"}
        })
    }

    fn read_body() -> String {
        json!({
            "id": FS_PATH,
            "name": "fs1",
            "location": "eastus",
            "sku": {"name": "AMLFS-Durable-Premium-250"},
            "zones": ["1"],
            "properties": {
                "storageCapacityTiB": 8,
                "filesystemSubnet": SUBNET,
                "maintenanceWindow": {"dayOfWeek": "Friday", "timeOfDayUTC": "22:00"},
                "clientInfo": {"mgsAddress": "10.0.0.4"},
                "provisioningState": "Succeeded"
            },
            "tags": {"env": "dev"}
        })
        .to_string()
    }

    #[test]
    fn maintenance_window_validation() {
        let mut diags = Diagnostics::new();
        MaintenanceWindowValidator.validate(
            &Dynamic::from(json!({"day_of_week": "Friday", "time_of_day_in_utc": "22:00"})),
            "maintenance_window",
            &mut diags,
        );
        assert!(diags.is_empty());

        let mut diags = Diagnostics::new();
        MaintenanceWindowValidator.validate(
            &Dynamic::from(json!({"day_of_week": "Someday", "time_of_day_in_utc": "25:00"})),
            "maintenance_window",
            &mut diags,
        );
        assert_eq!(diags.errors().count(), 2);
    }

    #[tokio::test]
    async fn create_polls_async_operation_then_reads() {
        let mut server = Server::new_async().await;
        let operation = format!("{}/operations/op1", server.url());

        let _missing = server
            .mock("GET", FS_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let put = server
            .mock("PUT", FS_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::PartialJson(json!({
                "location": "eastus",
                "sku": {"name": "AMLFS-Durable-Premium-250"},
                "zones": ["1"],
                "properties": {
                    "storageCapacityTiB": 8.0,
                    "filesystemSubnet": SUBNET,
                    "maintenanceWindow": {"dayOfWeek": "Friday", "timeOfDayUTC": "22:00"}
                }
            })))
            .with_status(201)
            .with_header("azure-asyncoperation", &operation)
            .create_async()
            .await;
        let poll = server
            .mock("GET", "/operations/op1")
            .with_body(r#"{"status":"Succeeded"}"#)
            .create_async()
            .await;
        let _read = server
            .mock("GET", FS_PATH)
            .match_query(Matcher::Any)
            .with_body(read_body())
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::from_json(config());

        apply(
            &ManagedLustreFileSystemResource,
            Operation::Create,
            &Context::new(),
            &clients,
            &mut data,
        )
        .await
        .unwrap();

        put.assert_async().await;
        poll.assert_async().await;
        assert_eq!(data.id(), Some(FS_PATH));
        assert_eq!(data.get_string("mgs_address").as_deref(), Some("10.0.0.4"));
        assert_eq!(
            data.get_string_map("maintenance_window").get(TIME_OF_DAY).map(String::as_str),
            Some("22:00")
        );
    }

    #[tokio::test]
    async fn create_surfaces_failed_operation() {
        let mut server = Server::new_async().await;
        let operation = format!("{}/operations/op1", server.url());

        let _missing = server
            .mock("GET", FS_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;
        let _put = server
            .mock("PUT", FS_PATH)
            .match_query(Matcher::Any)
            .with_status(201)
            .with_header("azure-asyncoperation", &operation)
            .create_async()
            .await;
        let _poll = server
            .mock("GET", "/operations/op1")
            .with_body(r#"{"status":"Failed","error":{"code":"SubnetTooSmall","message":"subnet is too small"}}"#)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::from_json(config());

        let err = apply(
            &ManagedLustreFileSystemResource,
            Operation::Create,
            &Context::new(),
            &clients,
            &mut data,
        )
        .await
        .unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("creating Aml Filesystem"), "{}", message);
        assert!(message.contains("SubnetTooSmall"));
        assert!(data.id().is_none());
    }

    #[tokio::test]
    async fn invalid_name_is_rejected_before_any_request() {
        let server = Server::new_async().await;
        let clients = create_test_clients(&server.url());
        let mut config = config();
        config["name"] = json!("_fs");
        let mut data = ResourceData::from_json(config);

        let err = apply(
            &ManagedLustreFileSystemResource,
            Operation::Create,
            &Context::new(),
            &clients,
            &mut data,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[tokio::test]
    async fn update_only_sends_maintenance_window() {
        let mut server = Server::new_async().await;
        let patch = server
            .mock("PATCH", FS_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "properties": {"maintenanceWindow": {"dayOfWeek": "Monday", "timeOfDayUTC": "03:00"}}
            })))
            .with_status(200)
            .with_body(read_body())
            .create_async()
            .await;
        let _read = server
            .mock("GET", FS_PATH)
            .match_query(Matcher::Any)
            .with_body(read_body())
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut prior = config();
        prior["tags_all"] = json!({"env": "dev"});
        let prior = ResourceData::from_json(prior);
        let mut updated = config();
        updated["maintenance_window"] = json!({"day_of_week": "Monday", "time_of_day_in_utc": "03:00"});
        let mut data = ResourceData::from_json(updated)
            .with_id(FS_PATH)
            .with_prior_state(prior.values().clone());

        apply(
            &ManagedLustreFileSystemResource,
            Operation::Update,
            &Context::new(),
            &clients,
            &mut data,
        )
        .await
        .unwrap();

        patch.assert_async().await;
    }

    #[tokio::test]
    async fn delete_waits_for_location_poll() {
        let mut server = Server::new_async().await;
        let location = format!("{}/operationresults/del1", server.url());
        let _delete = server
            .mock("DELETE", FS_PATH)
            .match_query(Matcher::Any)
            .with_status(202)
            .with_header("location", &location)
            .create_async()
            .await;
        let poll = server
            .mock("GET", "/operationresults/del1")
            .with_status(204)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::new().with_id(FS_PATH);

        apply(
            &ManagedLustreFileSystemResource,
            Operation::Delete,
            &Context::new(),
            &clients,
            &mut data,
        )
        .await
        .unwrap();

        poll.assert_async().await;
        assert!(data.id().is_none());
    }
}
