//! Terraform provider core for Azure Resource Manager: provider
//! configuration, the resource SDK, tag handling, validators and the
//! resources built on them.

pub mod clients;
pub mod error;
pub mod features;
pub mod logging;
pub mod provider;
pub mod sdk;
pub mod services;
pub mod tags;
pub mod validate;

pub use clients::Clients;
pub use error::{ProviderError, Result};
pub use features::UserFeatures;
pub use logging::init_logging;
pub use provider::{AzureProvider, ProviderConfig};
