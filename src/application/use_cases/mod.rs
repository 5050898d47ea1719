/// Use cases module containing application business logic orchestration
mod aggregate_reports;
mod check_vulnerabilities;
mod list_artifacts;
mod running_scans;
mod scan_artifact;
mod trigger_scans;

pub use aggregate_reports::{resolve_repositories, AggregateReportsUseCase};
pub use check_vulnerabilities::{CheckVulnerabilitiesUseCase, VulnerabilityCheckResult};
pub use list_artifacts::ListArtifactsUseCase;
pub use running_scans::{RunningScan, RunningScansUseCase};
pub use scan_artifact::ScanArtifactUseCase;
pub use trigger_scans::{ScanBatchSummary, TriggerScansUseCase};
