use crate::scanning::domain::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Harbor sends `null` for empty collections; treat it as the default value
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Number of digest characters shown to users (`sha256:` plus six hex digits)
pub const SHORT_DIGEST_LEN: usize = 13;

/// Shortens a digest for display
pub fn short_digest(digest: &str) -> &str {
    match digest.char_indices().nth(SHORT_DIGEST_LEN) {
        Some((idx, _)) => &digest[..idx],
        None => digest,
    }
}

/// Content-addressed artifact stored under a repository
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    #[serde(default)]
    pub id: i64,
    pub digest: String,
    #[serde(default)]
    pub size: i64,
    #[serde(default, rename = "type")]
    pub artifact_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    /// Scan overview keyed by report mime type, one entry per scanner
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub scan_overview: BTreeMap<String, NativeReportSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_attrs: Option<ExtraAttrs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push_time: Option<DateTime<Utc>>,
}

impl Artifact {
    /// Display reference: the first tag name, or the digest for untagged artifacts
    pub fn primary_reference(&self) -> &str {
        self.tags
            .first()
            .map(|t| t.name.as_str())
            .unwrap_or(&self.digest)
    }

    pub fn short_digest(&self) -> &str {
        short_digest(&self.digest)
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    /// Status of the first scanner in the overview, if any scan was recorded
    pub fn first_scan_status(&self) -> Option<&str> {
        self.scan_overview
            .values()
            .next()
            .map(|ov| ov.scan_status.as_str())
    }

    /// True when every scanner attached to the artifact has finished
    ///
    /// An artifact without any overview counts as finished.
    pub fn all_scans_finished(&self) -> bool {
        self.scan_overview.values().all(|ov| ov.is_finished())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub immutable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtraAttrs {
    #[serde(default)]
    pub architecture: String,
    #[serde(default)]
    pub os: String,
}

/// Per-scanner summary attached to an artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NativeReportSummary {
    #[serde(default)]
    pub report_id: String,
    #[serde(default)]
    pub scan_status: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub complete_percent: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: VulnerabilitySummary,
}

impl NativeReportSummary {
    /// Harbor reports either `Success` or `Finished` for completed scans
    pub fn is_finished(&self) -> bool {
        let status = self.scan_status.to_lowercase();
        status == "success" || status == "finished"
    }
}

/// Counts of vulnerabilities found by one scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilitySummary {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub fixable: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: BTreeMap<String, u32>,
}

impl VulnerabilitySummary {
    /// Count for one severity; keys are matched case-insensitively
    pub fn count(&self, severity: Severity) -> u32 {
        let key = severity.summary_key();
        self.summary
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }
}
