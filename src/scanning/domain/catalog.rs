use crate::scanning::domain::artifact::null_as_default;
use crate::shared::error::HarborError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Harbor project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub owner_name: String,
    #[serde(default)]
    pub repo_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    /// Harbor stores project settings as string-valued metadata (`"public": "true"`)
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub metadata: BTreeMap<String, String>,
}

impl Project {
    pub fn is_public(&self) -> bool {
        self.metadata
            .get("public")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Body of project create and update requests; unset fields are left out
///
/// Settings travel as string-valued metadata, the same shape Harbor returns
/// on [`Project::metadata`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    /// Bytes; `-1` is unlimited
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_limit: Option<i64>,
    /// Upstream registry endpoint of a proxy cache project
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<i64>,
}

impl ProjectRequest {
    pub fn named(name: &str) -> Self {
        Self {
            project_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    /// Stores a boolean setting as `"true"`/`"false"` metadata
    pub fn set_flag(&mut self, key: &str, enabled: bool) {
        self.metadata.insert(key.to_string(), enabled.to_string());
    }

    /// True when the request would change nothing
    pub fn is_empty(&self) -> bool {
        self.project_name.is_none()
            && self.metadata.is_empty()
            && self.storage_limit.is_none()
            && self.registry_id.is_none()
    }
}

/// Checks Harbor's project naming rules
///
/// Names are 1 to 255 characters of lowercase letters, digits and `._-`,
/// starting with a letter or digit.
pub fn validate_project_name(name: &str) -> Result<(), HarborError> {
    let invalid = |message: &str| HarborError::Validation {
        message: format!("project name '{}' {}", name, message),
    };

    let mut chars = name.chars();
    let first = chars.next().ok_or_else(|| invalid("is empty"))?;
    if name.len() > 255 {
        return Err(invalid("exceeds 255 characters"));
    }
    if !(first.is_ascii_lowercase() || first.is_ascii_digit()) {
        return Err(invalid("must start with a lowercase letter or digit"));
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')) {
        return Err(invalid("may only contain lowercase letters, digits and ._-"));
    }
    Ok(())
}

/// Parses a storage quota such as `10G`, `500M` or `1.5T` into bytes
///
/// Suffixes are binary (K = 1024) and case-insensitive. An empty string or
/// `-1` means unlimited and yields `-1`.
pub fn parse_storage_limit(limit: &str) -> Result<i64, HarborError> {
    let trimmed = limit.trim().to_ascii_uppercase();
    if trimmed.is_empty() || trimmed == "-1" {
        return Ok(-1);
    }

    let (number, multiplier) = match trimmed.chars().last() {
        Some('T') => (&trimmed[..trimmed.len() - 1], 1u64 << 40),
        Some('G') => (&trimmed[..trimmed.len() - 1], 1 << 30),
        Some('M') => (&trimmed[..trimmed.len() - 1], 1 << 20),
        Some('K') => (&trimmed[..trimmed.len() - 1], 1 << 10),
        _ => (trimmed.as_str(), 1),
    };

    let invalid = || HarborError::Validation {
        message: format!("invalid storage limit '{}', expected e.g. 10G, 500M or -1", limit),
    };
    let value: f64 = number.trim().parse().map_err(|_| invalid())?;
    if !value.is_finite() || value < 0.0 {
        return Err(invalid());
    }
    let bytes = value * multiplier as f64;
    if bytes > i64::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as i64)
}

/// Repository under a project; `name` carries the `project/` prefix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub project_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub artifact_count: i64,
    #[serde(default)]
    pub pull_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl Repository {
    /// Repository name without the `project/` prefix
    pub fn short_name(&self, project: &str) -> &str {
        strip_project_prefix(&self.name, project)
    }
}

/// Strips a leading `project/` from a repository name, leaving other names untouched
pub fn strip_project_prefix<'a>(name: &'a str, project: &str) -> &'a str {
    name.strip_prefix(project)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(name)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub harbor_version: String,
    #[serde(default)]
    pub registry_url: String,
    #[serde(default)]
    pub external_url: String,
    #[serde(default)]
    pub auth_mode: String,
    #[serde(default)]
    pub project_creation_restriction: String,
    #[serde(default)]
    pub self_registration: bool,
    #[serde(default)]
    pub has_ca_root: bool,
    #[serde(default)]
    pub registry_storage_provider_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<Vec<StorageInfo>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageInfo {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub free: u64,
}

/// Overall health as reported by `/health`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub components: Vec<ComponentHealth>,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
