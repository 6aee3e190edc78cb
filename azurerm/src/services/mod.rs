//! Resources registered with the provider

pub mod app_configuration;
pub mod managed_lustre_file_system;
pub mod resource_group;

use std::collections::HashMap;

use crate::error::{ProviderError, Result};
use crate::sdk::{Resource, ResourceData};

pub type ResourceFactory = fn() -> Box<dyn Resource>;

pub fn registered_resources() -> HashMap<&'static str, ResourceFactory> {
    let mut resources: HashMap<&'static str, ResourceFactory> = HashMap::new();
    resources.insert(
        resource_group::TYPE_NAME,
        || Box::new(resource_group::ResourceGroupResource),
    );
    resources.insert(
        managed_lustre_file_system::TYPE_NAME,
        || Box::new(managed_lustre_file_system::ManagedLustreFileSystemResource),
    );
    resources.insert(
        app_configuration::TYPE_NAME,
        || Box::new(app_configuration::AppConfigurationResource),
    );
    resources
}

/// Reads an attribute the schema marks as required.
pub(crate) fn required_string(data: &ResourceData, name: &str) -> Result<String> {
    data.get_string(name).ok_or_else(|| {
        ProviderError::InvalidConfiguration(format!("{:?} is required", name))
    })
}

/// The resource's id, which every operation after create needs.
pub(crate) fn existing_id(data: &ResourceData) -> Result<&str> {
    data.id()
        .ok_or_else(|| ProviderError::InvalidConfiguration("the resource has no id".to_string()))
}
