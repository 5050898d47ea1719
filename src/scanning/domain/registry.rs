use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Adapter type used when `--type` is not given
pub const DEFAULT_REGISTRY_TYPE: &str = "docker-registry";

/// Remote registry endpoint used by replication and proxy cache projects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "type")]
    pub registry_type: String,
    #[serde(default)]
    pub insecure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<RegistryCredential>,
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

/// Credential as returned by Harbor; the secret never leaves this process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryCredential {
    #[serde(default, rename = "type")]
    pub credential_type: String,
    #[serde(default)]
    pub access_key: String,
}

/// Body of registry create and ping requests
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct RegistryRequest {
    pub name: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub registry_type: String,
    pub insecure: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<CredentialRequest>,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct CredentialRequest {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub access_key: String,
    pub access_secret: String,
}

impl RegistryRequest {
    pub fn new(name: &str, url: &str, registry_type: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            description: None,
            registry_type: registry_type.to_string(),
            insecure: false,
            credential: None,
        }
    }

    /// Attaches basic credentials; a missing access key leaves the endpoint anonymous
    pub fn with_credential(mut self, access_key: Option<&str>, access_secret: Option<&str>) -> Self {
        self.credential = access_key
            .filter(|key| !key.is_empty())
            .map(|key| CredentialRequest {
                credential_type: "basic".to_string(),
                access_key: key.to_string(),
                access_secret: access_secret.unwrap_or_default().to_string(),
            });
        self
    }
}

impl fmt::Debug for RegistryRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryRequest")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("registry_type", &self.registry_type)
            .field("insecure", &self.insecure)
            .field(
                "access_key",
                &self.credential.as_ref().map(|c| c.access_key.as_str()),
            )
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_with_credential() {
        let request = RegistryRequest::new("hub", "https://hub.docker.com", DEFAULT_REGISTRY_TYPE)
            .with_credential(Some("robot"), Some("s3cret-value"));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["type"], "docker-registry");
        assert_eq!(body["credential"]["type"], "basic");
        assert_eq!(body["credential"]["access_secret"], "s3cret-value");
        assert!(body.get("description").is_none());
        assert!(!format!("{:?}", request).contains("s3cret-value"));
    }

    #[test]
    fn test_request_without_access_key_is_anonymous() {
        let request = RegistryRequest::new("hub", "https://hub.docker.com", DEFAULT_REGISTRY_TYPE)
            .with_credential(None, Some("orphan-secret"));
        assert!(request.credential.is_none());
    }

    #[test]
    fn test_registry_drops_secret_on_output() {
        let registry: Registry = serde_json::from_str(
            r#"{"id": 3, "name": "hub", "url": "https://hub.docker.com", "type": "docker-hub",
                "credential": {"type": "basic", "access_key": "robot", "access_secret": "*****"},
                "status": "healthy", "creation_time": "2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(registry.registry_type, "docker-hub");
        let out = serde_json::to_string(&registry).unwrap();
        assert!(out.contains("robot"));
        assert!(!out.contains("access_secret"));
    }
}
