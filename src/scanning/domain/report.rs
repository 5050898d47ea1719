use crate::scanning::domain::artifact::{null_as_default, NativeReportSummary, VulnerabilitySummary};
use crate::scanning::domain::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Single finding from a vulnerability scan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityItem {
    #[serde(rename = "id")]
    pub cve_id: String,
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "fix_version")]
    pub fixed_version: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub links: Vec<String>,
}

/// Full vulnerability report of one artifact
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VulnerabilityReport {
    #[serde(default)]
    pub severity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: VulnerabilitySummary,
    #[serde(default, deserialize_with = "null_as_default")]
    pub vulnerabilities: Vec<VulnerabilityItem>,
}

impl VulnerabilityReport {
    const REPORT_FIELDS: [&'static str; 3] = ["vulnerabilities", "summary", "severity"];

    /// Decodes the body of the `additions/vulnerabilities` endpoint
    ///
    /// Harbor wraps the report in an object keyed by the report mime type
    /// (`{"application/vnd.security.vulnerability.report; version=1.1": {...}}`).
    /// A bare report object is accepted as well. Returns `Ok(None)` when the
    /// artifact has no report (`null` or an empty envelope).
    pub fn from_response(body: serde_json::Value) -> Result<Option<Self>, serde_json::Error> {
        let serde_json::Value::Object(map) = body else {
            return match body {
                serde_json::Value::Null => Ok(None),
                other => serde_json::from_value(other).map(Some),
            };
        };

        if Self::REPORT_FIELDS.iter().any(|f| map.contains_key(*f)) {
            return serde_json::from_value(serde_json::Value::Object(map)).map(Some);
        }

        match map.into_iter().map(|(_, v)| v).find(|v| v.is_object()) {
            Some(report) => serde_json::from_value(report).map(Some),
            None => Ok(None),
        }
    }
}

/// SBOM document as returned by the scanner; the content is not interpreted
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SbomDocument(pub serde_json::Value);

impl SbomDocument {
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

/// Report data carried by a [`ReportEntry`], one variant per report kind
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReportPayload {
    Vulnerability(VulnerabilityReport),
    Sbom(SbomDocument),
    Overview(BTreeMap<String, NativeReportSummary>),
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

/// Severity counts used for sorting and summary columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    #[serde(rename = "count", skip_serializing_if = "is_zero")]
    pub vulnerabilities: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub critical: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub high: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub medium: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub low: u32,
    #[serde(skip_serializing_if = "is_zero")]
    pub total: u32,
}

impl SeverityCounts {
    /// Counts from a full vulnerability report
    ///
    /// `total` falls back to the number of listed vulnerabilities when the
    /// summary total is zero, and the vulnerability count falls back to the
    /// summary total when the list is empty (summary-only reports).
    pub fn from_report(report: &VulnerabilityReport) -> Self {
        let listed = u32::try_from(report.vulnerabilities.len()).unwrap_or(u32::MAX);
        let summary = &report.summary;

        Self {
            vulnerabilities: if listed == 0 { summary.total } else { listed },
            critical: summary.count(Severity::Critical),
            high: summary.count(Severity::High),
            medium: summary.count(Severity::Medium),
            low: summary.count(Severity::Low),
            total: if summary.total == 0 { listed } else { summary.total },
        }
    }

    /// Sums the counts of every scanner attached to one artifact, saturating at `u32::MAX`
    pub fn from_overview(overview: &BTreeMap<String, NativeReportSummary>) -> Self {
        let mut counts = overview.values().fold(Self::default(), |mut acc, ov| {
            acc.total = acc.total.saturating_add(ov.summary.total);
            acc.critical = acc.critical.saturating_add(ov.summary.count(Severity::Critical));
            acc.high = acc.high.saturating_add(ov.summary.count(Severity::High));
            acc.medium = acc.medium.saturating_add(ov.summary.count(Severity::Medium));
            acc.low = acc.low.saturating_add(ov.summary.count(Severity::Low));
            acc
        });
        counts.vulnerabilities = counts.total;
        counts
    }
}

/// One row of an aggregated report listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub repository: String,
    pub reference: String,
    #[serde(rename = "report")]
    pub payload: ReportPayload,
    #[serde(flatten)]
    pub counts: SeverityCounts,
}

impl ReportEntry {
    pub fn new(repository: String, reference: String, payload: ReportPayload) -> Self {
        let counts = match &payload {
            ReportPayload::Vulnerability(report) => SeverityCounts::from_report(report),
            ReportPayload::Overview(overview) => SeverityCounts::from_overview(overview),
            ReportPayload::Sbom(_) => SeverityCounts::default(),
        };
        Self {
            repository,
            reference,
            payload,
            counts,
        }
    }
}

/// Kind of per-artifact report to retrieve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportMode {
    #[default]
    Vulnerability,
    Sbom,
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "vulnerability" | "vuln" | "vulnerabilities" => Ok(ReportMode::Vulnerability),
            "sbom" => Ok(ReportMode::Sbom),
            _ => Err(format!(
                "Invalid report type: {}. Please specify 'vulnerability' or 'sbom'",
                s
            )),
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Vulnerability => write!(f, "vulnerability"),
            ReportMode::Sbom => write!(f, "sbom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn summary(total: u32, pairs: &[(&str, u32)]) -> VulnerabilitySummary {
        VulnerabilitySummary {
            total,
            fixable: 0,
            summary: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_from_response_unwraps_mime_envelope() {
        let body = json!({
            "application/vnd.security.vulnerability.report; version=1.1": {
                "severity": "High",
                "summary": {"total": 1, "summary": {"High": 1}},
                "vulnerabilities": [
                    {"id": "CVE-2024-0001", "package": "openssl", "version": "3.0.1",
                     "fix_version": "3.0.2", "severity": "High"}
                ]
            }
        });
        let report = VulnerabilityReport::from_response(body).unwrap().unwrap();
        assert_eq!(report.severity, "High");
        assert_eq!(report.vulnerabilities.len(), 1);
        assert_eq!(report.vulnerabilities[0].cve_id, "CVE-2024-0001");
        assert_eq!(report.vulnerabilities[0].fixed_version, "3.0.2");
    }

    #[test]
    fn test_from_response_accepts_bare_report() {
        let body = json!({"severity": "Low", "vulnerabilities": null});
        let report = VulnerabilityReport::from_response(body).unwrap().unwrap();
        assert_eq!(report.severity, "Low");
        assert!(report.vulnerabilities.is_empty());
    }

    #[test]
    fn test_from_response_empty_means_no_report() {
        assert!(VulnerabilityReport::from_response(json!({})).unwrap().is_none());
        assert!(VulnerabilityReport::from_response(json!(null)).unwrap().is_none());
    }

    #[test]
    fn test_counts_from_report_prefers_summary_total() {
        let report = VulnerabilityReport {
            severity: "Critical".to_string(),
            summary: summary(3, &[("Critical", 1), ("High", 2)]),
            vulnerabilities: vec![],
        };
        let counts = SeverityCounts::from_report(&report);
        assert_eq!(counts.critical, 1);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.total, 3);
        assert_eq!(counts.vulnerabilities, 3);
    }

    #[test]
    fn test_counts_from_report_falls_back_to_list_length() {
        let report = VulnerabilityReport {
            severity: String::new(),
            summary: VulnerabilitySummary::default(),
            vulnerabilities: vec![VulnerabilityItem::default(), VulnerabilityItem::default()],
        };
        let counts = SeverityCounts::from_report(&report);
        assert_eq!(counts.total, 2);
        assert_eq!(counts.vulnerabilities, 2);
    }

    #[test]
    fn test_counts_from_overview_saturates() {
        let mut overview = BTreeMap::new();
        for name in ["clair", "trivy"] {
            overview.insert(
                name.to_string(),
                NativeReportSummary {
                    summary: summary(u32::MAX, &[("Critical", u32::MAX), ("Low", 1)]),
                    ..Default::default()
                },
            );
        }

        let counts = SeverityCounts::from_overview(&overview);
        assert_eq!(counts.total, u32::MAX);
        assert_eq!(counts.vulnerabilities, u32::MAX);
        assert_eq!(counts.critical, u32::MAX);
        assert_eq!(counts.low, 2);
    }

    #[test]
    fn test_counts_from_overview_sums_scanners() {
        let mut overview = BTreeMap::new();
        overview.insert(
            "trivy".to_string(),
            NativeReportSummary {
                summary: summary(3, &[("Critical", 1), ("High", 2)]),
                ..Default::default()
            },
        );
        overview.insert(
            "clair".to_string(),
            NativeReportSummary {
                summary: summary(4, &[("Medium", 3), ("Low", 1)]),
                ..Default::default()
            },
        );

        let counts = SeverityCounts::from_overview(&overview);
        assert_eq!(
            counts,
            SeverityCounts {
                vulnerabilities: 7,
                critical: 1,
                high: 2,
                medium: 3,
                low: 1,
                total: 7,
            }
        );
    }

    #[test]
    fn test_entry_serialization_omits_zero_counts() {
        let entry = ReportEntry::new(
            "app".to_string(),
            "v1".to_string(),
            ReportPayload::Sbom(SbomDocument(json!({"bomFormat": "CycloneDX"}))),
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["repository"], "app");
        assert_eq!(value["reference"], "v1");
        assert_eq!(value["report"]["bomFormat"], "CycloneDX");
        assert!(value.get("critical").is_none());
        assert!(value.get("count").is_none());
    }

    #[test]
    fn test_report_mode_from_str() {
        assert_eq!(ReportMode::from_str("SBOM").unwrap(), ReportMode::Sbom);
        assert_eq!(
            ReportMode::from_str("vulnerability").unwrap(),
            ReportMode::Vulnerability
        );
        assert!(ReportMode::from_str("license").is_err());
        assert_eq!(ReportMode::default(), ReportMode::Vulnerability);
    }

    #[test]
    fn test_sbom_document_is_empty() {
        assert!(SbomDocument(json!({})).is_empty());
        assert!(SbomDocument(serde_json::Value::Null).is_empty());
        assert!(!SbomDocument(json!({"spdxVersion": "SPDX-2.3"})).is_empty());
    }
}
