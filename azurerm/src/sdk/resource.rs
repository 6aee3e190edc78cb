//! The resource trait and CRUD dispatch

use armclient::resourceids::ResourceId;
use armclient::response::error_was_not_found;
use armclient::{ApiError, Context};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::resource_data::ResourceData;
use super::schema::Schema;
use crate::clients::Clients;
use crate::error::{ProviderError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        })
    }
}

/// Upper bound on how long each operation may run, including polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceTimeouts {
    pub create: Duration,
    pub read: Duration,
    pub update: Duration,
    pub delete: Duration,
}

impl Default for ResourceTimeouts {
    fn default() -> Self {
        Self {
            create: Duration::from_secs(30 * 60),
            read: Duration::from_secs(5 * 60),
            update: Duration::from_secs(30 * 60),
            delete: Duration::from_secs(30 * 60),
        }
    }
}

impl ResourceTimeouts {
    pub fn for_operation(&self, operation: Operation) -> Duration {
        match operation {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }
}

/// A Terraform resource backed by Azure Resource Manager.
///
/// Implementations receive an already time-bounded context; see [`apply`].
#[async_trait]
pub trait Resource: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> Schema;

    fn timeouts(&self) -> ResourceTimeouts {
        ResourceTimeouts::default()
    }

    async fn create(&self, ctx: &Context, clients: &Clients, data: &mut ResourceData)
        -> Result<()>;

    /// Refreshes `data` from Azure. A resource that no longer exists clears
    /// the id rather than failing.
    async fn read(&self, ctx: &Context, clients: &Clients, data: &mut ResourceData) -> Result<()>;

    async fn update(&self, ctx: &Context, clients: &Clients, data: &mut ResourceData)
        -> Result<()>;

    async fn delete(&self, ctx: &Context, clients: &Clients, data: &mut ResourceData)
        -> Result<()>;
}

/// Runs one operation of `resource` under its timeout.
///
/// Create and update first fill in schema defaults and validate the
/// configuration; validation errors are returned without calling Azure.
pub async fn apply(
    resource: &dyn Resource,
    operation: Operation,
    ctx: &Context,
    clients: &Clients,
    data: &mut ResourceData,
) -> Result<()> {
    if matches!(operation, Operation::Create | Operation::Update) {
        let schema = resource.schema();
        schema.apply_defaults(data.values_mut());

        let config: HashMap<_, _> = data
            .values()
            .iter()
            .filter(|(name, _)| {
                schema
                    .attribute(name)
                    .map_or(true, |attr| !attr.is_computed_only())
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let diagnostics = schema.validate(&config);
        if diagnostics.has_errors() {
            return Err(ProviderError::Validation(diagnostics));
        }
    }

    if matches!(operation, Operation::Read | Operation::Update | Operation::Delete)
        && data.id().is_none()
    {
        return Err(ProviderError::InvalidConfiguration(format!(
            "cannot {} {} without an id",
            operation,
            resource.type_name()
        )));
    }

    let timeout = resource.timeouts().for_operation(operation);
    let ctx = ctx.with_timeout(timeout);
    tracing::info!(
        "Running {} for {} (timeout {:?})",
        operation,
        resource.type_name(),
        timeout
    );

    let result = match operation {
        Operation::Create => resource.create(&ctx, clients, data).await,
        Operation::Read => resource.read(&ctx, clients, data).await,
        Operation::Update => resource.update(&ctx, clients, data).await,
        Operation::Delete => resource.delete(&ctx, clients, data).await,
    };

    if let Err(e) = &result {
        tracing::debug!("{} {} failed: {}", operation, resource.type_name(), e);
    }
    result
}

/// Fails with a requires-import error when `existing` found a resource.
/// A 404 means the name is free.
pub fn ensure_not_exists<T, I>(
    type_name: &str,
    id: &I,
    existing: std::result::Result<T, ApiError>,
) -> Result<()>
where
    I: ResourceId,
{
    match existing {
        Ok(_) => Err(ProviderError::RequiresImport {
            type_name: type_name.to_string(),
            id: id.id(),
        }),
        Err(e) if error_was_not_found(&e) => Ok(()),
        Err(e) => Err(ProviderError::api(
            format!("checking for presence of existing {}", id),
            e,
        )),
    }
}

/// Clears the id when `err` says the resource is gone. Returns whether it
/// did.
pub fn remove_if_not_found(
    data: &mut ResourceData,
    id: &impl fmt::Display,
    err: &ApiError,
) -> bool {
    if error_was_not_found(err) {
        tracing::warn!("{} was not found - removing from state", id);
        data.clear_id();
        true
    } else {
        false
    }
}
