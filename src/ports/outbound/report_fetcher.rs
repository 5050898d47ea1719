use crate::scanning::domain::{Artifact, SbomDocument, VulnerabilityReport};
use crate::shared::Result;

/// Query flags for artifact listings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactListOptions {
    pub with_tag: bool,
    pub with_scan_overview: bool,
}

impl ArtifactListOptions {
    /// Tags and scan overview, as needed by summaries and running-scan views
    pub fn with_overview() -> Self {
        Self {
            with_tag: true,
            with_scan_overview: true,
        }
    }

    pub fn tags_only() -> Self {
        Self {
            with_tag: true,
            with_scan_overview: false,
        }
    }
}

/// ReportFetcher port for retrieving repositories, artifacts and their reports
///
/// Every call may fail with a transport or remote-status error. Callers
/// decide which failures are fatal.
pub trait ReportFetcher {
    /// Lists the names of every repository under a project
    ///
    /// Names are returned as the server reports them, usually with the
    /// `project/` prefix.
    fn list_repositories(&self, project: &str) -> Result<Vec<String>>;

    /// Lists every artifact in a repository
    ///
    /// # Arguments
    /// * `project` - Project name
    /// * `repository` - Repository name without the project prefix
    /// * `options` - Whether to include tags and scan overviews
    fn list_artifacts(
        &self,
        project: &str,
        repository: &str,
        options: &ArtifactListOptions,
    ) -> Result<Vec<Artifact>>;

    /// Fetches the vulnerability report of one artifact
    ///
    /// An artifact that was never scanned yields an empty report.
    fn get_vulnerability_report(
        &self,
        project: &str,
        repository: &str,
        reference: &str,
    ) -> Result<VulnerabilityReport>;

    /// Fetches the SBOM generated for one artifact
    fn get_sbom(&self, project: &str, repository: &str, reference: &str) -> Result<SbomDocument>;
}
