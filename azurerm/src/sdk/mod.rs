//! Typed glue between Terraform resources and the Azure clients

pub mod resource;
pub mod resource_data;
pub mod schema;
pub mod types;

pub use resource::{
    apply, ensure_not_exists, remove_if_not_found, Operation, Resource, ResourceTimeouts,
};
pub use resource_data::ResourceData;
pub use schema::{Attribute, AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{Diagnostic, DiagnosticSeverity, Diagnostics, Dynamic};
