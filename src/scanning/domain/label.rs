use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label that can be attached to artifacts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    /// `g` for system-wide labels, `p` for project labels
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub project_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelScope {
    Global,
    Project,
}

impl LabelScope {
    /// Wire value used by the label API
    pub fn as_str(self) -> &'static str {
        match self {
            LabelScope::Global => "g",
            LabelScope::Project => "p",
        }
    }
}

impl FromStr for LabelScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "g" | "global" => Ok(LabelScope::Global),
            "p" | "project" => Ok(LabelScope::Project),
            _ => Err(format!(
                "Invalid label scope: {}. Please specify 'g' (global) or 'p' (project)",
                s
            )),
        }
    }
}

impl fmt::Display for LabelScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of label create and update requests; unset fields are left out
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

impl LabelRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
