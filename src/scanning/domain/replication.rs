use super::registry::Registry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Replication rule copying artifacts between Harbor and a remote registry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationPolicy {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// `None` means the local Harbor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_registry: Option<Registry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_registry: Option<Registry>,
    #[serde(default)]
    pub dest_namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<ReplicationTrigger>,
    /// Resource filters, kept as Harbor sends them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<serde_json::Value>,
    #[serde(default)]
    pub replicate_deletion: bool,
    #[serde(default, rename = "override")]
    pub override_existing: bool,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<DateTime<Utc>>,
}

impl ReplicationPolicy {
    /// Trigger kind plus its cron schedule, e.g. `scheduled (0 0 * * *)`
    pub fn trigger_description(&self) -> String {
        let Some(trigger) = &self.trigger else {
            return "manual".to_string();
        };
        match trigger
            .trigger_settings
            .as_ref()
            .map(|s| s.cron.as_str())
            .filter(|cron| !cron.is_empty())
        {
            Some(cron) => format!("{} ({})", trigger.trigger_type, cron),
            None => trigger.trigger_type.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationTrigger {
    #[serde(default, rename = "type")]
    pub trigger_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_settings: Option<TriggerSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerSettings {
    #[serde(default)]
    pub cron: String,
}

/// One run of a replication policy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplicationExecution {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub policy_id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub trigger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub failed: i64,
    #[serde(default)]
    pub succeed: i64,
    #[serde(default)]
    pub in_progress: i64,
    #[serde(default)]
    pub stopped: i64,
}
