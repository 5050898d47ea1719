use crate::ports::outbound::{ArtifactListOptions, ArtifactRepository, ReportFetcher};
use crate::scanning::domain::{ArtifactReference, NativeReportSummary, Severity, VulnerabilityItem};
use crate::scanning::services::SeverityFilter;
use crate::shared::Result;
use anyhow::Context;
use std::collections::BTreeMap;

/// Outcome of a vulnerability check against one artifact
#[derive(Debug, Clone, PartialEq)]
pub struct VulnerabilityCheckResult {
    /// Items at or above the threshold, in report order
    pub vulnerabilities: Vec<VulnerabilityItem>,
    /// Number of itemized findings before filtering
    pub listed: usize,
    /// Total reported by the scanner summary
    pub summary_total: u32,
    pub threshold: Option<Severity>,
}

impl VulnerabilityCheckResult {
    /// The report carries a total but no itemized findings
    pub fn is_summary_only(&self) -> bool {
        self.listed == 0 && self.summary_total > 0
    }

    /// True when a threshold was given and at least one finding meets it
    ///
    /// Drives exit code 1 for CI gates.
    pub fn threshold_exceeded(&self) -> bool {
        self.threshold.is_some() && !self.vulnerabilities.is_empty()
    }
}

/// CheckVulnerabilitiesUseCase - Fetches and filters one artifact's findings
///
/// # Type Parameters
/// * `R` - Harbor access; report methods need [`ReportFetcher`], the scan
///   overview needs [`ArtifactRepository`]
pub struct CheckVulnerabilitiesUseCase<R> {
    repository: R,
}

impl<R> CheckVulnerabilitiesUseCase<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }
}

impl<R: ReportFetcher> CheckVulnerabilitiesUseCase<R> {
    /// Fetches the vulnerability report and applies the severity filter
    ///
    /// # Errors
    /// Fails with `failed to get vulnerabilities` when the report cannot be fetched
    pub fn check(
        &self,
        reference: &ArtifactReference,
        filter: SeverityFilter,
    ) -> Result<VulnerabilityCheckResult> {
        let report = self
            .repository
            .get_vulnerability_report(
                reference.project(),
                reference.repository(),
                reference.reference(),
            )
            .context("failed to get vulnerabilities")?;

        Ok(VulnerabilityCheckResult {
            listed: report.vulnerabilities.len(),
            vulnerabilities: filter.apply(report.vulnerabilities),
            summary_total: report.summary.total,
            threshold: filter.threshold(),
        })
    }
}

impl<R: ArtifactRepository> CheckVulnerabilitiesUseCase<R> {
    /// Returns the per-scanner overview attached to the artifact
    ///
    /// # Errors
    /// Fails with `failed to get summary` when the artifact cannot be fetched
    pub fn scan_overview(
        &self,
        reference: &ArtifactReference,
    ) -> Result<BTreeMap<String, NativeReportSummary>> {
        let artifact = self
            .repository
            .get_artifact(
                reference.project(),
                reference.repository(),
                reference.reference(),
                &ArtifactListOptions::with_overview(),
            )
            .context("failed to get summary")?;
        Ok(artifact.scan_overview)
    }
}
