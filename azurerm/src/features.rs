//! Provider feature flags (`features { ... }` block)

use std::collections::HashMap;

use crate::sdk::Dynamic;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFeatures {
    pub resource_group: ResourceGroupFeatures,
    pub app_configuration: AppConfigurationFeatures,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupFeatures {
    /// Refuse to delete a resource group that still contains resources.
    pub prevent_deletion_if_contains_resources: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfigurationFeatures {
    pub purge_soft_delete_on_destroy: bool,
    pub recover_soft_deleted: bool,
}

impl Default for UserFeatures {
    fn default() -> Self {
        Self {
            resource_group: ResourceGroupFeatures {
                prevent_deletion_if_contains_resources: true,
            },
            app_configuration: AppConfigurationFeatures {
                purge_soft_delete_on_destroy: true,
                recover_soft_deleted: true,
            },
        }
    }
}

/// Nested blocks arrive either as a map or as a single-item list of maps.
fn block(value: Option<&Dynamic>) -> Option<&HashMap<String, Dynamic>> {
    match value? {
        Dynamic::Map(fields) => Some(fields),
        Dynamic::List(items) => items.first().and_then(Dynamic::as_map),
        _ => None,
    }
}

fn flag(block: &HashMap<String, Dynamic>, name: &str, target: &mut bool) {
    if let Some(value) = block.get(name).and_then(Dynamic::as_bool) {
        *target = value;
    }
}

/// Overlays the values set in a `features` block on the defaults.
pub fn expand_features(input: Option<&Dynamic>) -> UserFeatures {
    let mut features = UserFeatures::default();
    let Some(root) = block(input) else {
        return features;
    };

    if let Some(rg) = block(root.get("resource_group")) {
        flag(
            rg,
            "prevent_deletion_if_contains_resources",
            &mut features.resource_group.prevent_deletion_if_contains_resources,
        );
    }

    if let Some(appconf) = block(root.get("app_configuration")) {
        flag(
            appconf,
            "purge_soft_delete_on_destroy",
            &mut features.app_configuration.purge_soft_delete_on_destroy,
        );
        flag(
            appconf,
            "recover_soft_deleted",
            &mut features.app_configuration.recover_soft_deleted,
        );
    }

    features
}
