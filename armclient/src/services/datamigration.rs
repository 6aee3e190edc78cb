//! Database Migration Service (`Microsoft.DataMigration`) models
//!
//! Project tasks are polymorphic: the `taskType` field of a task's
//! properties selects the concrete shape. Task types this crate does not
//! model are kept as [`ProjectTaskProperties::Raw`] so they survive a
//! read-modify-write untouched.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

crate::string_enum! {
    pub enum ServiceProvisioningState {
        Accepted => "Accepted",
        Deleting => "Deleting",
        Deploying => "Deploying",
        Failed => "Failed",
        FailedToStart => "FailedToStart",
        FailedToStop => "FailedToStop",
        Starting => "Starting",
        Stopped => "Stopped",
        Stopping => "Stopping",
        Succeeded => "Succeeded",
    }
}

crate::string_enum! {
    pub enum TaskState {
        Canceled => "Canceled",
        Failed => "Failed",
        FailedInputValidation => "FailedInputValidation",
        Faulted => "Faulted",
        Queued => "Queued",
        Running => "Running",
        Succeeded => "Succeeded",
        Unknown => "Unknown",
    }
}

crate::string_enum! {
    pub enum AuthenticationType {
        ActiveDirectoryIntegrated => "ActiveDirectoryIntegrated",
        ActiveDirectoryPassword => "ActiveDirectoryPassword",
        None => "None",
        SqlAuthentication => "SqlAuthentication",
        WindowsAuthentication => "WindowsAuthentication",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataMigrationService {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<DataMigrationServiceProperties>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataMigrationServiceProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_state: Option<ServiceProvisioningState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_subnet_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTask {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<ProjectTaskProperties>,
}

/// Fields every task type carries.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTaskCommon {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_data: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ODataError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<TaskState>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ODataError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SqlConnectionInfo {
    pub data_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<AuthenticationType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypt_connection: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_server_certificate: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectToSourceSqlServerTaskInput {
    pub source_connection_info: SqlConnectionInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_permissions_group: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectToSourceSqlServerTaskProperties {
    #[serde(flatten)]
    pub common: ProjectTaskCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<ConnectToSourceSqlServerTaskInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrateSqlServerSqlDbDatabaseInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_database_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make_source_db_read_only: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrateSqlServerSqlDbTaskInput {
    pub source_connection_info: SqlConnectionInfo,
    pub target_connection_info: SqlConnectionInfo,
    pub selected_databases: Vec<MigrateSqlServerSqlDbDatabaseInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MigrateSqlServerSqlDbTaskProperties {
    #[serde(flatten)]
    pub common: ProjectTaskCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<MigrateSqlServerSqlDbTaskInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckOciDriverTaskInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckOciDriverTaskProperties {
    #[serde(flatten)]
    pub common: ProjectTaskCommon,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<CheckOciDriverTaskInput>,
}

/// A task type without a dedicated model.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProjectTaskProperties {
    pub task_type: String,
    pub values: serde_json::Value,
}

const TASK_TYPE_FIELD: &str = "taskType";

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectTaskProperties {
    ConnectToSourceSqlServer(ConnectToSourceSqlServerTaskProperties),
    MigrateSqlServerSqlDb(MigrateSqlServerSqlDbTaskProperties),
    CheckOciDriver(CheckOciDriverTaskProperties),
    Raw(RawProjectTaskProperties),
}

impl ProjectTaskProperties {
    pub fn task_type(&self) -> &str {
        match self {
            ProjectTaskProperties::ConnectToSourceSqlServer(_) => "ConnectToSource.SqlServer",
            ProjectTaskProperties::MigrateSqlServerSqlDb(_) => "Migrate.SqlServer.SqlDb",
            ProjectTaskProperties::CheckOciDriver(_) => "Service.Check.OCI",
            ProjectTaskProperties::Raw(raw) => raw.task_type.as_str(),
        }
    }

    /// Decodes a properties object, picking the variant from `taskType`.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let task_type = value
            .get(TASK_TYPE_FIELD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| serde_json::Error::custom("missing `taskType` discriminator"))?
            .to_string();

        let properties = match task_type.as_str() {
            "ConnectToSource.SqlServer" => ProjectTaskProperties::ConnectToSourceSqlServer(
                serde_json::from_value(value)?,
            ),
            "Migrate.SqlServer.SqlDb" => {
                ProjectTaskProperties::MigrateSqlServerSqlDb(serde_json::from_value(value)?)
            }
            "Service.Check.OCI" => {
                ProjectTaskProperties::CheckOciDriver(serde_json::from_value(value)?)
            }
            _ => ProjectTaskProperties::Raw(RawProjectTaskProperties {
                task_type,
                values: value,
            }),
        };
        Ok(properties)
    }

    pub fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        let mut value = match self {
            ProjectTaskProperties::ConnectToSourceSqlServer(p) => serde_json::to_value(p)?,
            ProjectTaskProperties::MigrateSqlServerSqlDb(p) => serde_json::to_value(p)?,
            ProjectTaskProperties::CheckOciDriver(p) => serde_json::to_value(p)?,
            ProjectTaskProperties::Raw(raw) => raw.values.clone(),
        };

        if let Some(object) = value.as_object_mut() {
            object.insert(
                TASK_TYPE_FIELD.to_string(),
                serde_json::Value::String(self.task_type().to_string()),
            );
        }
        Ok(value)
    }
}

impl Serialize for ProjectTaskProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ProjectTaskProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        ProjectTaskProperties::from_value(value).map_err(D::Error::custom)
    }
}
