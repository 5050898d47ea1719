use hrbcli::ports::outbound::{ArtifactListOptions, ArtifactRepository, ReportFetcher};
use hrbcli::scanning::domain::{
    Artifact, NativeReportSummary, ReportMode, SbomDocument, Tag, VulnerabilityReport,
    VulnerabilitySummary,
};
use hrbcli::shared::error::HarborError;
use hrbcli::shared::Result;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Artifact with a digest and tags
#[allow(dead_code)]
pub fn artifact(digest: &str, tags: &[&str]) -> Artifact {
    Artifact {
        digest: digest.to_string(),
        tags: tags
            .iter()
            .map(|name| Tag {
                name: name.to_string(),
                immutable: false,
            })
            .collect(),
        ..Default::default()
    }
}

/// Vulnerability summary from `(severity, count)` pairs
#[allow(dead_code)]
pub fn report(total: u32, counts: &[(&str, u32)]) -> VulnerabilityReport {
    VulnerabilityReport {
        summary: VulnerabilitySummary {
            total,
            summary: counts
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// One-scanner overview with the given status and counts
#[allow(dead_code)]
pub fn overview(status: &str, total: u32, counts: &[(&str, u32)]) -> BTreeMap<String, NativeReportSummary> {
    let mut map = BTreeMap::new();
    map.insert(
        "application/vnd.security.vulnerability.report; version=1.1".to_string(),
        NativeReportSummary {
            scan_status: status.to_string(),
            summary: report(total, counts).summary,
            ..Default::default()
        },
    );
    map
}

/// In-memory Harbor project for use case tests
///
/// Repositories are registered by short name and listed back with the
/// `project/` prefix, as Harbor does. Reports and SBOMs are keyed by the
/// reference the use case asks for (the artifact digest).
#[derive(Default, Clone)]
pub struct MockHarbor {
    project: String,
    repositories: Vec<(String, Vec<Artifact>)>,
    reports: HashMap<String, VulnerabilityReport>,
    sboms: HashMap<String, SbomDocument>,
    failing_reports: HashSet<String>,
    failing_scans: HashSet<String>,
    fail_listing: bool,
    pub scans: Arc<Mutex<Vec<(String, String, Option<ReportMode>)>>>,
    pub listed_options: Arc<Mutex<Vec<ArtifactListOptions>>>,
}

#[allow(dead_code)]
impl MockHarbor {
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            ..Default::default()
        }
    }

    pub fn with_repository(mut self, name: &str, artifacts: Vec<Artifact>) -> Self {
        self.repositories.push((name.to_string(), artifacts));
        self
    }

    pub fn with_report(mut self, digest: &str, report: VulnerabilityReport) -> Self {
        self.reports.insert(digest.to_string(), report);
        self
    }

    pub fn with_sbom(mut self, digest: &str, sbom: serde_json::Value) -> Self {
        self.sboms.insert(digest.to_string(), SbomDocument(sbom));
        self
    }

    pub fn with_failing_report(mut self, digest: &str) -> Self {
        self.failing_reports.insert(digest.to_string());
        self
    }

    pub fn with_failing_scan(mut self, digest: &str) -> Self {
        self.failing_scans.insert(digest.to_string());
        self
    }

    pub fn with_failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn recorded_scans(&self) -> Vec<(String, String, Option<ReportMode>)> {
        self.scans.lock().unwrap().clone()
    }

    fn not_found(what: &str) -> anyhow::Error {
        HarborError::Api {
            status: 404,
            message: format!("{} not found", what),
        }
        .into()
    }

    fn artifacts_of(&self, repository: &str) -> Result<&Vec<Artifact>> {
        self.repositories
            .iter()
            .find(|(name, _)| name == repository)
            .map(|(_, artifacts)| artifacts)
            .ok_or_else(|| Self::not_found(repository))
    }
}

impl ReportFetcher for MockHarbor {
    fn list_repositories(&self, project: &str) -> Result<Vec<String>> {
        if self.fail_listing {
            return Err(HarborError::Api {
                status: 500,
                message: "internal server error".to_string(),
            }
            .into());
        }
        if project != self.project {
            return Err(Self::not_found(project));
        }
        Ok(self
            .repositories
            .iter()
            .map(|(name, _)| format!("{}/{}", project, name))
            .collect())
    }

    fn list_artifacts(
        &self,
        _project: &str,
        repository: &str,
        options: &ArtifactListOptions,
    ) -> Result<Vec<Artifact>> {
        self.listed_options.lock().unwrap().push(*options);
        Ok(self.artifacts_of(repository)?.clone())
    }

    fn get_vulnerability_report(
        &self,
        _project: &str,
        _repository: &str,
        reference: &str,
    ) -> Result<VulnerabilityReport> {
        if self.failing_reports.contains(reference) {
            return Err(HarborError::Api {
                status: 500,
                message: "scanner unavailable".to_string(),
            }
            .into());
        }
        Ok(self.reports.get(reference).cloned().unwrap_or_default())
    }

    fn get_sbom(&self, _project: &str, _repository: &str, reference: &str) -> Result<SbomDocument> {
        if self.failing_reports.contains(reference) {
            return Err(Self::not_found("SBOM"));
        }
        Ok(self.sboms.get(reference).cloned().unwrap_or_default())
    }
}

impl ArtifactRepository for MockHarbor {
    fn get_artifact(
        &self,
        _project: &str,
        repository: &str,
        reference: &str,
        _options: &ArtifactListOptions,
    ) -> Result<Artifact> {
        self.artifacts_of(repository)?
            .iter()
            .find(|a| a.digest == reference || a.tag_names().contains(&reference))
            .cloned()
            .ok_or_else(|| Self::not_found(reference))
    }

    fn scan_artifact(
        &self,
        _project: &str,
        repository: &str,
        reference: &str,
        scan_type: Option<ReportMode>,
    ) -> Result<()> {
        if self.failing_scans.contains(reference) {
            return Err(HarborError::Api {
                status: 412,
                message: "no scanner configured".to_string(),
            }
            .into());
        }
        self.scans.lock().unwrap().push((
            repository.to_string(),
            reference.to_string(),
            scan_type,
        ));
        Ok(())
    }
}
