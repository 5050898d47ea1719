use crate::ports::outbound::ArtifactListOptions;
use crate::scanning::domain::{Artifact, ReportMode};
use crate::shared::Result;

/// ArtifactRepository port for single-artifact lookups and scan triggers
pub trait ArtifactRepository {
    fn get_artifact(
        &self,
        project: &str,
        repository: &str,
        reference: &str,
        options: &ArtifactListOptions,
    ) -> Result<Artifact>;

    /// Asks the server to scan an artifact
    ///
    /// # Arguments
    /// * `scan_type` - Report kind to produce; `None` lets the server pick its default
    fn scan_artifact(
        &self,
        project: &str,
        repository: &str,
        reference: &str,
        scan_type: Option<ReportMode>,
    ) -> Result<()>;
}
