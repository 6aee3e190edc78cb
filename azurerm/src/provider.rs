//! The configured provider: credentials, features and the resource registry

use armclient::{
    Authorizer, Client, ClientOptions, ClientSecretAuthorizer, Context, Environment,
    StaticTokenAuthorizer, Tags,
};
use std::collections::HashMap;
use std::sync::Arc;

use crate::clients::Clients;
use crate::error::{ProviderError, Result};
use crate::features::{expand_features, UserFeatures};
use crate::sdk::{
    apply, AttributeBuilder, AttributeType, Diagnostics, Dynamic, Operation, Resource,
    ResourceData, Schema, SchemaBuilder,
};
use crate::services::{registered_resources, ResourceFactory};
use crate::tags;
use crate::validate::StringPattern;

pub enum Credentials {
    /// A pre-issued bearer token, from `ARM_ACCESS_TOKEN`.
    AccessToken(String),
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

/// Provider block values after environment fallbacks are applied.
pub struct ProviderConfig {
    pub subscription_id: String,
    pub credentials: Credentials,
    pub environment: Environment,
    pub default_tags: Tags,
    pub features: UserFeatures,
}

impl ProviderConfig {
    /// Reads the provider block, reporting every missing or invalid value
    /// at once.
    pub fn from_values(values: &HashMap<String, Dynamic>) -> std::result::Result<Self, Diagnostics> {
        let mut diags = Diagnostics::new();

        let subscription_id = setting(values, "subscription_id", "ARM_SUBSCRIPTION_ID");
        if subscription_id.is_none() {
            diags.add_attribute_error(
                "subscription_id",
                "subscription_id is required (set in provider config or ARM_SUBSCRIPTION_ID env var)",
                None,
            );
        }

        let environment_name =
            setting(values, "environment", "ARM_ENVIRONMENT").unwrap_or_else(|| "public".to_string());
        let mut environment = match Environment::from_name(&environment_name) {
            Some(environment) => environment,
            None => {
                diags.add_attribute_error(
                    "environment",
                    format!("Unknown Azure environment {:?}", environment_name),
                    Some("expected one of public, usgovernment or china".to_string()),
                );
                Environment::public()
            }
        };
        if let Some(endpoint) = setting(values, "resource_manager_endpoint", "") {
            environment.resource_manager_endpoint = endpoint;
        }

        let credentials = match std::env::var("ARM_ACCESS_TOKEN").ok().filter(|t| !t.is_empty()) {
            Some(token) => Some(Credentials::AccessToken(token)),
            None => {
                let tenant_id = setting(values, "tenant_id", "ARM_TENANT_ID");
                let client_id = setting(values, "client_id", "ARM_CLIENT_ID");
                let client_secret = setting(values, "client_secret", "ARM_CLIENT_SECRET");
                match (tenant_id, client_id, client_secret) {
                    (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                        Some(Credentials::ClientSecret {
                            tenant_id,
                            client_id,
                            client_secret,
                        })
                    }
                    (tenant_id, client_id, client_secret) => {
                        for (name, env, value) in [
                            ("tenant_id", "ARM_TENANT_ID", tenant_id),
                            ("client_id", "ARM_CLIENT_ID", client_id),
                            ("client_secret", "ARM_CLIENT_SECRET", client_secret),
                        ] {
                            if value.is_none() {
                                diags.add_attribute_error(
                                    name,
                                    format!(
                                        "{} is required (set in provider config or {} env var)",
                                        name, env
                                    ),
                                    None,
                                );
                            }
                        }
                        None
                    }
                }
            }
        };

        let default_tags = default_tags(values.get("default_tags"));
        for problem in tags::validate(&default_tags) {
            diags.add_attribute_error("default_tags", "Invalid default tags", Some(problem));
        }

        let features = expand_features(values.get("features"));

        match (subscription_id, credentials) {
            (Some(subscription_id), Some(credentials)) if !diags.has_errors() => Ok(Self {
                subscription_id,
                credentials,
                environment,
                default_tags,
                features,
            }),
            _ => Err(diags),
        }
    }

    fn authorizer(&self) -> Result<Arc<dyn Authorizer>> {
        Ok(match &self.credentials {
            Credentials::AccessToken(token) => Arc::new(StaticTokenAuthorizer::new(token.clone())),
            Credentials::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => Arc::new(
                ClientSecretAuthorizer::new(&self.environment, tenant_id, client_id, client_secret)
                    .map_err(|e| ProviderError::api("building the client secret authorizer", e))?,
            ),
        })
    }
}

/// A config value, falling back to an environment variable. Empty strings
/// count as unset.
fn setting(values: &HashMap<String, Dynamic>, name: &str, env: &str) -> Option<String> {
    values
        .get(name)
        .and_then(Dynamic::as_string)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| {
            if env.is_empty() {
                return None;
            }
            std::env::var(env).ok().filter(|v| !v.is_empty())
        })
}

/// `default_tags { tags = { ... } }`, given as a block or a list holding one.
fn default_tags(value: Option<&Dynamic>) -> Tags {
    let block = match value {
        Some(Dynamic::Map(fields)) => Some(fields),
        Some(Dynamic::List(items)) => items.first().and_then(Dynamic::as_map),
        _ => None,
    };

    block
        .and_then(|b| b.get(tags::TAGS))
        .and_then(Dynamic::as_map)
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_string().map(|v| (k.clone(), v.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

pub struct AzureProvider {
    clients: Option<Arc<Clients>>,
    resources: HashMap<&'static str, ResourceFactory>,
}

impl Default for AzureProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AzureProvider {
    pub fn new() -> Self {
        Self {
            clients: None,
            resources: registered_resources(),
        }
    }

    /// The provider block. Every argument may also come from the
    /// environment, so none is required here.
    pub fn schema() -> Schema {
        let string = || AttributeType::String;
        let block = |fields: &[(&str, AttributeType)]| {
            AttributeType::List(Box::new(AttributeType::Object(
                fields
                    .iter()
                    .map(|(name, r#type)| (name.to_string(), r#type.clone()))
                    .collect(),
            )))
        };

        let mut endpoint = AttributeBuilder::new("resource_manager_endpoint", string())
            .optional()
            .description("Overrides the environment's Resource Manager endpoint");
        if let Ok(pattern) = StringPattern::new("^https?://", "an http(s) URL") {
            endpoint = endpoint.validator(pattern);
        }

        SchemaBuilder::new()
            .description("Azure Resource Manager")
            .attribute(AttributeBuilder::new("subscription_id", string()).optional().build())
            .attribute(AttributeBuilder::new("tenant_id", string()).optional().build())
            .attribute(AttributeBuilder::new("client_id", string()).optional().build())
            .attribute(
                AttributeBuilder::new("client_secret", string())
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(AttributeBuilder::new("environment", string()).optional().build())
            .attribute(endpoint.build())
            .attribute(
                AttributeBuilder::new(
                    "default_tags",
                    block(&[(tags::TAGS, AttributeType::Map(Box::new(string())))]),
                )
                .optional()
                .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "features",
                    block(&[
                        (
                            "resource_group",
                            block(&[("prevent_deletion_if_contains_resources", AttributeType::Bool)]),
                        ),
                        (
                            "app_configuration",
                            block(&[
                                ("purge_soft_delete_on_destroy", AttributeType::Bool),
                                ("recover_soft_deleted", AttributeType::Bool),
                            ]),
                        ),
                    ]),
                )
                .optional()
                .build(),
            )
            .build()
    }

    pub fn configure(&mut self, config: HashMap<String, Dynamic>) -> Diagnostics {
        let diags = Self::schema().validate(&config);
        if diags.has_errors() {
            return diags;
        }

        match ProviderConfig::from_values(&config) {
            Ok(config) => match self.configure_with(config) {
                Ok(()) => Diagnostics::new(),
                Err(e) => e.into_diagnostics("Failed to configure the provider"),
            },
            Err(diags) => diags,
        }
    }

    pub fn configure_with(&mut self, config: ProviderConfig) -> Result<()> {
        let authorizer = config.authorizer()?;
        let client = Client::with_options(
            &config.environment.resource_manager_endpoint,
            authorizer,
            ClientOptions::default(),
        )
        .map_err(|e| ProviderError::api("building the Resource Manager client", e))?;

        tracing::info!(
            "Configured provider for subscription {} in the {} environment",
            config.subscription_id,
            config.environment.name
        );

        self.clients = Some(Arc::new(Clients::new(
            client,
            config.subscription_id,
            config.features,
            Arc::new(config.default_tags),
        )));
        Ok(())
    }

    pub fn clients(&self) -> Result<&Clients> {
        self.clients.as_deref().ok_or(ProviderError::NotConfigured)
    }

    pub fn resource(&self, name: &str) -> Result<Box<dyn Resource>> {
        self.resources
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| ProviderError::UnknownResource(name.to_string()))
    }

    pub fn resource_schemas(&self) -> HashMap<String, Schema> {
        self.resources
            .iter()
            .map(|(name, factory)| (name.to_string(), factory().schema()))
            .collect()
    }

    pub async fn create_resource(
        &self,
        ctx: &Context,
        type_name: &str,
        data: &mut ResourceData,
    ) -> Diagnostics {
        self.run(ctx, Operation::Create, type_name, data).await
    }

    pub async fn read_resource(
        &self,
        ctx: &Context,
        type_name: &str,
        data: &mut ResourceData,
    ) -> Diagnostics {
        self.run(ctx, Operation::Read, type_name, data).await
    }

    pub async fn update_resource(
        &self,
        ctx: &Context,
        type_name: &str,
        data: &mut ResourceData,
    ) -> Diagnostics {
        self.run(ctx, Operation::Update, type_name, data).await
    }

    pub async fn delete_resource(
        &self,
        ctx: &Context,
        type_name: &str,
        data: &mut ResourceData,
    ) -> Diagnostics {
        self.run(ctx, Operation::Delete, type_name, data).await
    }

    async fn run(
        &self,
        ctx: &Context,
        operation: Operation,
        type_name: &str,
        data: &mut ResourceData,
    ) -> Diagnostics {
        let result = async {
            let clients = self.clients()?;
            let resource = self.resource(type_name)?;
            apply(resource.as_ref(), operation, ctx, clients, data).await
        }
        .await;

        match result {
            Ok(()) => Diagnostics::new(),
            Err(e) => {
                tracing::error!("Failed to {} {}: {}", operation, type_name, e);
                e.into_diagnostics(&format!("Error running {} for {}", operation, type_name))
            }
        }
    }
}
