use thiserror::Error;

/// Error envelope returned by Resource Manager: `{"error":{"code":..,"message":..}}`
#[derive(Debug, Clone, Default, serde::Deserialize, Error)]
#[error("Code=\"{code}\" Message=\"{message}\"")]
pub struct ArmErrorDetails {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ArmErrorResponse {
    pub error: ArmErrorDetails,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("unexpected status {status} with error: {details}")]
    ApiError {
        status: u16,
        #[source]
        details: Box<ArmErrorDetails>,
    },

    #[error("unexpected status {status} with response: {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Too many requests, rate limited")]
    RateLimited,

    #[error("Service unavailable (HTTP {0}), retry later")]
    ServiceUnavailable(u16),
}

impl ApiError {
    /// HTTP status of the failed call, when the failure came from Azure itself.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ApiError { status, .. } | ApiError::UnexpectedResponse { status, .. } => {
                Some(*status)
            }
            ApiError::RateLimited => Some(429),
            ApiError::ServiceUnavailable(status) => Some(*status),
            _ => None,
        }
    }

    /// Builds the error for a non-success status from its raw body.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ArmErrorResponse>(body) {
            Ok(envelope) => ApiError::ApiError {
                status,
                details: Box::new(envelope.error),
            },
            Err(_) => ApiError::UnexpectedResponse {
                status,
                body: body.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_body_parses_arm_error_envelope() {
        let err = ApiError::from_body(
            409,
            r#"{"error":{"code":"Conflict","message":"resource is busy"}}"#,
        );

        match &err {
            ApiError::ApiError { status, details } => {
                assert_eq!(*status, 409);
                assert_eq!(details.code, "Conflict");
                assert_eq!(details.message, "resource is busy");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
        assert!(err.to_string().contains("Code=\"Conflict\""));
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn from_body_keeps_raw_text_when_not_an_envelope() {
        let err = ApiError::from_body(400, "bad request");
        assert!(matches!(err, ApiError::UnexpectedResponse { status: 400, .. }));
        assert!(err.to_string().contains("bad request"));
    }
}
