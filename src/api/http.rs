use crate::api::{
    ApiError, ApplyAllRequest, AuthLink, Backend, CreatedProfile, ErrorDetail, HealthStatus,
    HistoryItem, NewProfile, Profile, TokenRequest, Vacancy,
};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// How a failing endpoint describes its error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorBody {
    /// Plain text body, shown verbatim.
    Text,
    /// JSON `{ "detail": ... }`.
    Json,
}

/// [`Backend`] implementation over HTTP.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Creates a client for the backend rooted at `base_url`
    /// (e.g. `http://localhost:8000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)
            .map_err(|e| ApiError::Config(format!("invalid backend URL {}: {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "backend URL must be http(s): {}",
                base_url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(
        response: Response,
        error_body: ErrorBody,
    ) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(Self::read_error(response, error_body).await);
        }
        Self::require_json(&response)?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn require_json(response: &Response) -> Result<(), ApiError> {
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("application/json"));
        if is_json {
            Ok(())
        } else {
            Err(ApiError::NonJson)
        }
    }

    async fn expect_success(response: Response, error_body: ErrorBody) -> Result<(), ApiError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::read_error(response, error_body).await)
        }
    }

    async fn read_error(response: Response, error_body: ErrorBody) -> ApiError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Backend returned status {}: {}", status, body);
        ApiError::Status {
            status,
            detail: error_detail(&body, error_body),
        }
    }
}

fn error_detail(body: &str, error_body: ErrorBody) -> Option<String> {
    match error_body {
        ErrorBody::Text => (!body.is_empty()).then(|| body.to_string()),
        ErrorBody::Json => serde_json::from_str::<ErrorDetail>(body)
            .ok()
            .and_then(|d| d.message()),
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_profiles(&self) -> Result<Vec<Profile>, ApiError> {
        let response = self.client.get(self.endpoint("/profiles/")).send().await?;
        // The profile list is rejected on content type before its status.
        Self::require_json(&response)?;
        Self::read_json(response, ErrorBody::Json).await
    }

    async fn create_profile(&self, profile: &NewProfile) -> Result<CreatedProfile, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/profiles/"))
            .json(profile)
            .send()
            .await?;
        Self::read_json(response, ErrorBody::Text).await
    }

    async fn activate_profile(&self, profile_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/profiles/{}/activate", profile_id));
        let response = self.client.post(url).send().await?;
        Self::expect_success(response, ErrorBody::Json).await
    }

    async fn delete_profile(&self, profile_id: i64) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/profiles/{}", profile_id));
        let response = self.client.delete(url).send().await?;
        Self::expect_success(response, ErrorBody::Json).await
    }

    async fn auth_link(&self, profile_id: i64) -> Result<AuthLink, ApiError> {
        let url = self.endpoint(&format!("/auth/link/{}", profile_id));
        let response = self.client.get(url).send().await?;
        Self::read_json(response, ErrorBody::Json).await
    }

    async fn exchange_token(&self, request: &TokenRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/auth/token"))
            .json(request)
            .send()
            .await?;
        Self::expect_success(response, ErrorBody::Json).await
    }

    async fn search_vacancies(&self, query: &str) -> Result<Vec<Vacancy>, ApiError> {
        let url = self.endpoint(&format!("/vacancies?query={}", urlencoding::encode(query)));
        let response = self.client.get(url).send().await?;
        Self::read_json(response, ErrorBody::Json).await
    }

    async fn apply_all(&self, request: &ApplyAllRequest) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoint("/apply-all"))
            .json(request)
            .send()
            .await?;
        Self::expect_success(response, ErrorBody::Json).await
    }

    async fn apply(&self, vacancy_id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("/apply/{}", urlencoding::encode(vacancy_id)));
        let response = self.client.post(url).send().await?;
        Self::expect_success(response, ErrorBody::Json).await
    }

    async fn history(&self) -> Result<Vec<HistoryItem>, ApiError> {
        let response = self.client.get(self.endpoint("/history")).send().await?;
        Self::read_json(response, ErrorBody::Json).await
    }

    async fn health(&self) -> Result<HealthStatus, ApiError> {
        let response = self.client.get(self.endpoint("/health")).send().await?;
        Self::read_json(response, ErrorBody::Json).await
    }
}
