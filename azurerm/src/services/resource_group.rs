//! azurerm_resource_group

use armclient::resourceids::{ResourceGroupId, ResourceId};
use armclient::services::resources::{ResourceGroup, ResourceGroupPatchable};
use armclient::Context;
use async_trait::async_trait;

use super::{existing_id, required_string};
use crate::clients::Clients;
use crate::error::{ProviderError, Result};
use crate::sdk::{
    ensure_not_exists, remove_if_not_found, AttributeBuilder, AttributeType, Resource,
    ResourceData, Schema, SchemaBuilder,
};
use crate::tags;
use crate::validate::{self, normalize_location};

pub const TYPE_NAME: &str = "azurerm_resource_group";

pub struct ResourceGroupResource;

#[async_trait]
impl Resource for ResourceGroupResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a Resource Group")
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("The name of the Resource Group")
                    .required()
                    .force_new()
                    .validator(validate::ResourceGroupName)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("location", AttributeType::String)
                    .description("The Azure Region where the Resource Group should exist")
                    .required()
                    .force_new()
                    .validator(validate::Location)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("managed_by", AttributeType::String)
                    .description("The ID of the resource or application that manages this Resource Group")
                    .optional()
                    .build(),
            )
            .attribute(tags::schema())
            .attribute(tags::schema_all())
            .build()
    }

    async fn create(
        &self,
        ctx: &Context,
        clients: &Clients,
        data: &mut ResourceData,
    ) -> Result<()> {
        let id = ResourceGroupId::new(&clients.subscription_id, required_string(data, "name")?);
        ensure_not_exists(TYPE_NAME, &id, clients.resource_groups.get(&id).await)?;

        let location = normalize_location(&required_string(data, "location")?);
        let group_tags = tags::ensure_tags_all_set(data, &clients.default_tags);
        let input = ResourceGroup {
            location,
            managed_by: data.get_string("managed_by"),
            tags: Some(group_tags),
            ..Default::default()
        };

        clients
            .resource_groups
            .create_or_update(&id, &input)
            .await
            .map_err(|e| ProviderError::api(format!("creating {}", id), e))?;

        data.set_id(id.id());
        self.read(ctx, clients, data).await
    }

    async fn read(&self, _ctx: &Context, clients: &Clients, data: &mut ResourceData) -> Result<()> {
        let id = ResourceGroupId::parse(existing_id(data)?)?;

        let group = match clients.resource_groups.get(&id).await {
            Ok(group) => group,
            Err(e) if remove_if_not_found(data, &id, &e) => return Ok(()),
            Err(e) => return Err(ProviderError::api(format!("retrieving {}", id), e)),
        };

        data.set_string("name", &id.resource_group_name);
        data.set_string("location", normalize_location(&group.location));
        data.set_optional_string("managed_by", group.managed_by.as_deref());
        tags::ensure_tags_all_read_set(data, group.tags.as_ref(), &clients.default_tags);
        Ok(())
    }

    async fn update(
        &self,
        ctx: &Context,
        clients: &Clients,
        data: &mut ResourceData,
    ) -> Result<()> {
        let id = ResourceGroupId::parse(existing_id(data)?)?;

        let mut patch = ResourceGroupPatchable::default();
        if data.has_change("managed_by") {
            patch.managed_by = data.get_string("managed_by");
        }
        if tags::has_change(data, &clients.default_tags) {
            patch.tags = Some(tags::ensure_tags_all_set(data, &clients.default_tags));
        }

        if patch != ResourceGroupPatchable::default() {
            clients
                .resource_groups
                .update(&id, &patch)
                .await
                .map_err(|e| ProviderError::api(format!("updating {}", id), e))?;
        }

        self.read(ctx, clients, data).await
    }

    async fn delete(
        &self,
        ctx: &Context,
        clients: &Clients,
        data: &mut ResourceData,
    ) -> Result<()> {
        let id = ResourceGroupId::parse(existing_id(data)?)?;

        if clients
            .features
            .resource_group
            .prevent_deletion_if_contains_resources
        {
            let nested = clients
                .resource_groups
                .list_resources(&id)
                .await
                .map_err(|e| ProviderError::api(format!("listing resources in {}", id), e))?;

            if !nested.is_empty() {
                let listed: Vec<String> = nested.iter().map(|r| format!("* `{}`", r.id)).collect();
                return Err(ProviderError::Custom(format!(
                    "deleting {}: the Resource Group still contains Resources.\n\n\
                     Terraform is configured to check for Resources within the Resource Group when deleting it, \
                     and has detected that the following Resources still exist:\n\n{}\n\n\
                     Either remove these Resources or disable this check with \
                     `prevent_deletion_if_contains_resources` in the provider's `features` block",
                    id,
                    listed.join("\n")
                )));
            }
        }

        clients
            .resource_groups
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
    use crate::clients::test_helpers::{create_test_clients, create_test_clients_with};
    use crate::features::UserFeatures;
    use crate::sdk::{apply, Operation};
    use armclient::Tags;
    use mockito::{Matcher, Server};
    use serde_json::json;

    const RG_PATH: &str = "/subscriptions/sub/resourceGroups/rg1";
    const RG_ID: &str = "/subscriptions/sub/resourceGroups/rg1";

    #[tokio::test]
    async fn create_merges_default_tags_and_reads_back() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", RG_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error":{"code":"ResourceGroupNotFound","message":"missing"}}"#)
            .expect(1)
            .create_async()
            .await;
        let put = server
            .mock("PUT", RG_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({
                "location": "westeurope",
                "tags": {"env": "prod", "owner": "platform"}
            })))
            .with_status(201)
            .with_body(r#"{"name":"rg1","location":"westeurope"}"#)
            .create_async()
            .await;
        let _read = server
            .mock("GET", RG_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"id":"/subscriptions/sub/resourceGroups/rg1","name":"rg1","location":"westeurope","tags":{"env":"prod","owner":"platform"}}"#)
            .create_async()
            .await;

        let clients = create_test_clients_with(
            &server.url(),
            UserFeatures::default(),
            Tags::from([("owner".to_string(), "platform".to_string())]),
        );
        let mut data = ResourceData::from_json(json!({
            "name": "rg1",
            "location": "West Europe",
            "tags": {"env": "prod"}
        }));

        apply(&ResourceGroupResource, Operation::Create, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        put.assert_async().await;
        assert_eq!(data.id(), Some(RG_ID));
        assert_eq!(data.get_string("location").as_deref(), Some("westeurope"));
        assert_eq!(data.get_string_map("tags").len(), 1);
        assert_eq!(data.get_string_map("tags_all").len(), 2);
    }

    #[tokio::test]
    async fn create_requires_import_when_group_exists() {
        let mut server = Server::new_async().await;
        let _existing = server
            .mock("GET", RG_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"name":"rg1","location":"westeurope"}"#)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::from_json(json!({"name": "rg1", "location": "westeurope"}));

        let err = apply(&ResourceGroupResource, Operation::Create, &Context::new(), &clients, &mut data)
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::RequiresImport { .. }));
        assert!(data.id().is_none());
    }

    #[tokio::test]
    async fn create_rejects_invalid_config_without_calling_azure() {
        let server = Server::new_async().await;
        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::from_json(json!({"name": "bad/name", "location": "westeurope"}));

        let err = apply(&ResourceGroupResource, Operation::Create, &Context::new(), &clients, &mut data)
            .await
            .unwrap_err();

        match err {
            ProviderError::Validation(diags) => {
                assert_eq!(diags.errors().next().unwrap().attribute.as_deref(), Some("name"))
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn read_of_missing_group_removes_it_from_state() {
        let mut server = Server::new_async().await;
        let _missing = server
            .mock("GET", RG_PATH)
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::new().with_id(RG_ID);

        apply(&ResourceGroupResource, Operation::Read, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        assert!(data.id().is_none());
    }

    #[tokio::test]
    async fn update_patches_changed_tags() {
        let mut server = Server::new_async().await;
        let patch = server
            .mock("PATCH", RG_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({"tags": {"env": "test"}})))
            .with_body(r#"{"name":"rg1","location":"westeurope","tags":{"env":"test"}}"#)
            .create_async()
            .await;
        let _read = server
            .mock("GET", RG_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"name":"rg1","location":"westeurope","tags":{"env":"test"}}"#)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let prior = ResourceData::from_json(json!({
            "name": "rg1", "location": "westeurope", "tags": {"env": "dev"}
        }));
        let mut data = ResourceData::from_json(json!({
            "name": "rg1", "location": "westeurope", "tags": {"env": "test"}
        }))
        .with_id(RG_ID)
        .with_prior_state(prior.values().clone());

        apply(&ResourceGroupResource, Operation::Update, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        patch.assert_async().await;
        assert_eq!(data.get_string_map("tags").get("env").map(String::as_str), Some("test"));
    }

    #[tokio::test]
    async fn update_pushes_changed_default_tags() {
        let mut server = Server::new_async().await;
        let patch = server
            .mock("PATCH", RG_PATH)
            .match_query(Matcher::Any)
            .match_body(Matcher::Json(json!({"tags": {"env": "prod", "owner": "b"}})))
            .with_body(r#"{"name":"rg1","location":"westeurope","tags":{"env":"prod","owner":"b"}}"#)
            .create_async()
            .await;
        let _read = server
            .mock("GET", RG_PATH)
            .match_query(Matcher::Any)
            .with_body(r#"{"name":"rg1","location":"westeurope","tags":{"env":"prod","owner":"b"}}"#)
            .create_async()
            .await;

        let clients = create_test_clients_with(
            &server.url(),
            UserFeatures::default(),
            Tags::from([("owner".to_string(), "b".to_string())]),
        );
        let prior = ResourceData::from_json(json!({
            "name": "rg1",
            "location": "westeurope",
            "tags": {"env": "prod"},
            "tags_all": {"env": "prod", "owner": "a"}
        }));
        let mut data = ResourceData::from_json(json!({
            "name": "rg1", "location": "westeurope", "tags": {"env": "prod"}
        }))
        .with_id(RG_ID)
        .with_prior_state(prior.values().clone());

        apply(&ResourceGroupResource, Operation::Update, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        patch.assert_async().await;
        let tags = data.get_string_map("tags");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("env").map(String::as_str), Some("prod"));
        assert_eq!(data.get_string_map("tags_all").len(), 2);
    }

    #[tokio::test]
    async fn delete_refuses_while_resources_remain() {
        let mut server = Server::new_async().await;
        let _list = server
            .mock("GET", "/subscriptions/sub/resourceGroups/rg1/resources")
            .match_query(Matcher::Any)
            .with_body(r#"{"value":[{"id":"/subscriptions/sub/resourceGroups/rg1/providers/Microsoft.Network/virtualNetworks/vnet1"}]}"#)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", RG_PATH)
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let clients = create_test_clients(&server.url());
        let mut data = ResourceData::new().with_id(RG_ID);

        let err = apply(&ResourceGroupResource, Operation::Delete, &Context::new(), &clients, &mut data)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("virtualNetworks/vnet1"));
        assert_eq!(data.id(), Some(RG_ID));
        delete.assert_async().await;
    }

    #[tokio::test]
    async fn delete_skips_listing_when_feature_disabled() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("GET", "/subscriptions/sub/resourceGroups/rg1/resources")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let _delete = server
            .mock("DELETE", RG_PATH)
            .match_query(Matcher::Any)
            .with_status(200)
            .create_async()
            .await;

        let mut features = UserFeatures::default();
        features.resource_group.prevent_deletion_if_contains_resources = false;
        let clients = create_test_clients_with(&server.url(), features, Tags::new());
        let mut data = ResourceData::new().with_id(RG_ID);

        apply(&ResourceGroupResource, Operation::Delete, &Context::new(), &clients, &mut data)
            .await
            .unwrap();

        list.assert_async().await;
        assert!(data.id().is_none());
    }
}
