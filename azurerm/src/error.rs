//! Error types for the provider

use armclient::pollers::PollerError;
use armclient::resourceids::ParseError;
use armclient::ApiError;

use crate::sdk::Diagnostics;

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// A Resource Manager call failed while doing `action`.
    #[error("{action}: {source}")]
    Api {
        action: String,
        #[source]
        source: ApiError,
    },

    /// A long-running operation failed or timed out while doing `action`.
    #[error("{action}: {source}")]
    Poller {
        action: String,
        #[source]
        source: PollerError,
    },

    #[error("parsing resource ID: {0}")]
    InvalidId(#[from] ParseError),

    #[error("A resource with the ID {id:?} already exists - to be managed via Terraform this resource needs to be imported into the State. Please see the resource documentation for {type_name:?} for more information")]
    RequiresImport { type_name: String, id: String },

    #[error("Provider not configured")]
    NotConfigured,

    #[error("Resource type not found: {0}")]
    UnknownResource(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Validation failed with {} error(s)", .0.errors().count())]
    Validation(Diagnostics),

    #[error("{0}")]
    Custom(String),
}

impl ProviderError {
    pub fn api(action: impl Into<String>, source: ApiError) -> Self {
        ProviderError::Api {
            action: action.into(),
            source,
        }
    }

    pub fn poller(action: impl Into<String>, source: PollerError) -> Self {
        ProviderError::Poller {
            action: action.into(),
            source,
        }
    }

    /// Turns the error into the diagnostics shown to the user.
    pub fn into_diagnostics(self, summary: &str) -> Diagnostics {
        match self {
            ProviderError::Validation(diagnostics) => diagnostics,
            other => {
                let mut diagnostics = Diagnostics::new();
                diagnostics.add_error(summary, Some(other.to_string()));
                diagnostics
            }
        }
    }
}

impl From<String> for ProviderError {
    fn from(s: String) -> Self {
        ProviderError::Custom(s)
    }
}

impl From<&str> for ProviderError {
    fn from(s: &str) -> Self {
        ProviderError::Custom(s.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_carry_action_context() {
        let err = ProviderError::api(
            "creating Resource Group \"rg1\"",
            ApiError::from_body(409, r#"{"error":{"code":"Conflict","message":"busy"}}"#),
        );
        assert_eq!(
            err.to_string(),
            "creating Resource Group \"rg1\": unexpected status 409 with error: Code=\"Conflict\" Message=\"busy\""
        );
    }

    #[test]
    fn validation_errors_keep_their_diagnostics() {
        let mut diags = Diagnostics::new();
        diags.add_attribute_error("name", "invalid", None);
        diags.add_attribute_error("location", "invalid", None);

        let err = ProviderError::Validation(diags);
        assert_eq!(err.to_string(), "Validation failed with 2 error(s)");
        assert_eq!(err.into_diagnostics("ignored").len(), 2);
    }

    #[test]
    fn other_errors_become_a_single_diagnostic() {
        let diags = ProviderError::NotConfigured.into_diagnostics("Error creating resource");
        let error = diags.errors().next().unwrap();
        assert_eq!(error.summary, "Error creating resource");
        assert_eq!(error.detail.as_deref(), Some("Provider not configured"));
    }
}
