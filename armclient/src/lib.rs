//! Azure Resource Manager SDK layer: HTTP client, authorizers, long-running
//! operation pollers, resource IDs and per-service models.

pub mod auth;
pub mod client;
pub mod common;
pub mod constants;
pub mod context;
pub mod environment;
pub mod error;
pub mod pollers;
pub mod resourceids;
pub mod response;
pub mod services;

#[cfg(test)]
mod test_helpers;

pub use auth::{AccessToken, Authorizer, ClientSecretAuthorizer, StaticTokenAuthorizer};
pub use client::{Client, ClientOptions, RetryConfig};
pub use common::{NullableTags, QueryParams, Sku, Tags};
pub use context::{Context, ContextError};
pub use environment::Environment;
pub use error::{ApiError, ArmErrorDetails};
pub use pollers::{Poller, PollerError, PollerType, PollingStatus, PollResult};
pub use response::Response;

#[doc(hidden)]
pub use serde as __serde;
