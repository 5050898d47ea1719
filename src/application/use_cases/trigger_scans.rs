use crate::application::use_cases::resolve_repositories;
use crate::ports::outbound::{ArtifactListOptions, ArtifactRepository, ProgressReporter, ReportFetcher};
use crate::scanning::domain::{ProjectRepository, ReportMode};
use crate::shared::Result;
use anyhow::Context;

/// Counts of scan requests sent by [`TriggerScansUseCase`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanBatchSummary {
    pub triggered: usize,
    pub failed: usize,
}

/// TriggerScansUseCase - Requests a scan for every artifact under a selector
///
/// A rejected scan request is reported as a warning and the batch goes on.
pub struct TriggerScansUseCase<R, P> {
    repository: R,
    progress_reporter: P,
}

impl<R, P> TriggerScansUseCase<R, P>
where
    R: ReportFetcher + ArtifactRepository,
    P: ProgressReporter,
{
    pub fn new(repository: R, progress_reporter: P) -> Self {
        Self {
            repository,
            progress_reporter,
        }
    }

    pub fn execute(
        &self,
        selector: &ProjectRepository,
        scan_type: Option<ReportMode>,
    ) -> Result<ScanBatchSummary> {
        let project = selector.project();
        let mut summary = ScanBatchSummary::default();

        for repo in resolve_repositories(&self.repository, selector)? {
            let artifacts = self
                .repository
                .list_artifacts(project, &repo, &ArtifactListOptions::default())
                .with_context(|| format!("failed to list artifacts for {}", repo))?;

            for artifact in artifacts {
                let target = format!("{}/{}@{}", project, repo, artifact.short_digest());
                match self
                    .repository
                    .scan_artifact(project, &repo, &artifact.digest, scan_type)
                {
                    Ok(()) => {
                        summary.triggered += 1;
                        self.progress_reporter
                            .report_completion(&format!("Scan triggered for {}", target));
                    }
                    Err(e) => {
                        summary.failed += 1;
                        self.progress_reporter
                            .report_warning(&format!("Failed to scan {}: {}", target, e));
                    }
                }
            }
        }

        Ok(summary)
    }
}
