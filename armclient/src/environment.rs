//! Azure cloud environments

/// Endpoints for one Azure cloud.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    pub name: String,
    pub resource_manager_endpoint: String,
    pub login_endpoint: String,
}

impl Environment {
    pub fn public() -> Self {
        Self {
            name: "public".to_string(),
            resource_manager_endpoint: "https://management.azure.com".to_string(),
            login_endpoint: "https://login.microsoftonline.com".to_string(),
        }
    }

    pub fn us_government() -> Self {
        Self {
            name: "usgovernment".to_string(),
            resource_manager_endpoint: "https://management.usgovcloudapi.net".to_string(),
            login_endpoint: "https://login.microsoftonline.us".to_string(),
        }
    }

    pub fn china() -> Self {
        Self {
            name: "china".to_string(),
            resource_manager_endpoint: "https://management.chinacloudapi.cn".to_string(),
            login_endpoint: "https://login.chinacloudapi.cn".to_string(),
        }
    }

    /// Looks up an environment by the names accepted in provider configuration.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "public" | "azurecloud" => Some(Self::public()),
            "usgovernment" | "azureusgovernmentcloud" => Some(Self::us_government()),
            "china" | "azurechinacloud" => Some(Self::china()),
            _ => None,
        }
    }

    /// Scope requested when acquiring Resource Manager tokens.
    pub fn token_scope(&self) -> String {
        format!(
            "{}/.default",
            self.resource_manager_endpoint.trim_end_matches('/')
        )
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::public()
    }
}
