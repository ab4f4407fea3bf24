use async_trait::async_trait;
use thiserror::Error;

pub mod http;
pub mod models;

pub use http::HttpBackend;
pub use models::{
    ApplyAllRequest, AuthLink, CreatedProfile, ErrorDetail, HealthStatus, HistoryItem,
    NewProfile, Profile, TokenRequest, Vacancy,
};

/// Errors that can occur when talking to the console backend.
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP client-level error (connection, timeout, etc.)
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    /// The backend answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, detail: Option<String> },
    /// A JSON endpoint answered with some other content type.
    #[error("Server returned non-JSON response")]
    NonJson,
    /// The body claimed to be JSON but did not match the expected shape.
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Human-readable detail supplied by the backend, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True when the backend answered, as opposed to a transport failure.
    pub fn is_status(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }
}

/// The REST surface of the console backend.
///
/// Every method maps to one endpoint under `/api`. Implementations report
/// failure statuses as [`ApiError::Status`] carrying the backend's detail.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ApiError>;
    async fn create_profile(&self, profile: &NewProfile) -> Result<CreatedProfile, ApiError>;
    async fn activate_profile(&self, profile_id: i64) -> Result<(), ApiError>;
    async fn delete_profile(&self, profile_id: i64) -> Result<(), ApiError>;
    async fn auth_link(&self, profile_id: i64) -> Result<AuthLink, ApiError>;
    async fn exchange_token(&self, request: &TokenRequest) -> Result<(), ApiError>;
    async fn search_vacancies(&self, query: &str) -> Result<Vec<Vacancy>, ApiError>;
    async fn apply_all(&self, request: &ApplyAllRequest) -> Result<(), ApiError>;
    async fn apply(&self, vacancy_id: &str) -> Result<(), ApiError>;
    async fn history(&self) -> Result<Vec<HistoryItem>, ApiError>;
    async fn health(&self) -> Result<HealthStatus, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display_and_detail() {
        let err = ApiError::Status {
            status: 500,
            detail: Some("bad".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        assert_eq!(err.detail(), Some("bad"));
        assert!(err.is_status());
    }

    #[test]
    fn test_non_json_has_no_detail() {
        let err = ApiError::NonJson;
        assert_eq!(err.to_string(), "Server returned non-JSON response");
        assert_eq!(err.detail(), None);
        assert!(!err.is_status());
    }
}
