use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A saved automation profile as listed by the backend.
///
/// The backend masks `client_secret` and reports only whether an access
/// token is stored (`has_token`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: i64,
    #[serde(deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub resume_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub cover_letter: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub bad_words: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub client_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub client_secret: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub redirect_uri: String,
    pub is_active: bool,
    pub has_token: bool,
}

/// Payload for creating a profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub description: String,
    pub resume_id: String,
    pub bad_words: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub cover_letter: String,
}

impl NewProfile {
    /// Name, client id and client secret are required by the backend.
    pub fn has_required_fields(&self) -> bool {
        !self.name.is_empty() && !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Backend acknowledgement for a created profile.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreatedProfile {
    #[serde(default)]
    pub status: String,
    pub id: Option<i64>,
}

/// A vacancy search result.
///
/// Accepts both the backend's compact shape (`location`, `link`) and the
/// richer shape with `area`, `url`, `salary` and `snippet`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vacancy {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(alias = "location", default)]
    pub area: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(alias = "link", default)]
    pub url: Option<String>,
}

/// One row of the application history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    #[serde(default)]
    pub date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub vacancy_id: String,
    #[serde(default)]
    pub vacancy_title: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub response_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthLink {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRequest {
    pub profile_id: i64,
    pub auth_code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyAllRequest {
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// FastAPI error body. `detail` is a string for `HTTPException` and a list
/// of objects for request validation errors.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub detail: Value,
}

impl ErrorDetail {
    pub fn message(&self) -> Option<String> {
        match &self.detail {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_tolerates_nulls_and_missing_fields() {
        let profile: Profile = serde_json::from_value(json!({
            "id": 3,
            "name": "Main",
            "description": null,
            "is_active": true
        }))
        .unwrap();
        assert_eq!(profile.id, 3);
        assert_eq!(profile.description, "");
        assert_eq!(profile.resume_id, "");
        assert!(profile.is_active);
        assert!(!profile.has_token);
    }

    #[test]
    fn test_vacancy_accepts_backend_shape() {
        let vacancy: Vacancy = serde_json::from_value(json!({
            "id": "9001",
            "title": "Rust developer",
            "company": "Acme",
            "location": "Москва",
            "link": "https://hh.ru/vacancy/9001"
        }))
        .unwrap();
        assert_eq!(vacancy.area.as_deref(), Some("Москва"));
        assert_eq!(vacancy.url.as_deref(), Some("https://hh.ru/vacancy/9001"));
        assert_eq!(vacancy.kind, None);
    }

    #[test]
    fn test_vacancy_numeric_id() {
        let vacancy: Vacancy =
            serde_json::from_value(json!({"id": 42, "title": "t", "company": "c"})).unwrap();
        assert_eq!(vacancy.id, "42");
    }

    #[test]
    fn test_error_detail_message() {
        let plain: ErrorDetail = serde_json::from_str(r#"{"detail":"bad"}"#).unwrap();
        assert_eq!(plain.message().as_deref(), Some("bad"));

        let missing: ErrorDetail = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.message(), None);

        let structured: ErrorDetail =
            serde_json::from_str(r#"{"detail":[{"msg":"field required"}]}"#).unwrap();
        assert!(structured.message().unwrap().contains("field required"));
    }

    #[test]
    fn test_new_profile_required_fields() {
        let mut profile = NewProfile {
            name: "Main".into(),
            client_id: "cid".into(),
            ..NewProfile::default()
        };
        assert!(!profile.has_required_fields());
        profile.client_secret = "secret".into();
        assert!(profile.has_required_fields());
    }
}
