//! Response handling utilities for Resource Manager calls

use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A completed HTTP exchange, kept whole so pollers can inspect headers.
#[derive(Debug, Clone)]
pub struct Response {
    pub method: Method,
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl Response {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Decodes the JSON body into `T`.
    pub fn model<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| {
            tracing::error!("Failed to deserialize response: {}, body: {}", e, self.body);
            ApiError::ParseError(format!("Failed to parse response: {}", e))
        })
    }

    /// Returns the response unchanged when its status is one of `expected`,
    /// otherwise the error Azure sent back.
    pub fn ensure_status(self, expected: &[u16]) -> Result<Self, ApiError> {
        if expected.contains(&self.status.as_u16()) {
            Ok(self)
        } else {
            Err(ApiError::from_body(self.status.as_u16(), &self.body))
        }
    }
}

pub fn was_status_code(status: StatusCode, code: u16) -> bool {
    status.as_u16() == code
}

pub fn was_not_found(status: StatusCode) -> bool {
    status == StatusCode::NOT_FOUND
}

pub fn was_conflict(status: StatusCode) -> bool {
    status == StatusCode::CONFLICT
}

pub fn was_bad_request(status: StatusCode) -> bool {
    status == StatusCode::BAD_REQUEST
}

/// True for errors that mean the resource is already gone.
pub fn error_was_not_found(err: &ApiError) -> bool {
    err.status() == Some(404)
}
