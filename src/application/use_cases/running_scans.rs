use crate::application::use_cases::resolve_repositories;
use crate::ports::outbound::{ArtifactListOptions, ReportFetcher};
use crate::scanning::domain::ProjectRepository;
use crate::shared::Result;
use anyhow::Context;
use serde::Serialize;

/// Artifact whose scan has not reached a final status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunningScan {
    pub repository: String,
    pub digest: String,
    pub tags: String,
    pub status: String,
}

/// RunningScansUseCase - Lists artifacts with a scan still in progress
///
/// Only the first scanner of each artifact is inspected. Artifacts never
/// scanned are not listed.
pub struct RunningScansUseCase<F> {
    fetcher: F,
}

impl<F: ReportFetcher> RunningScansUseCase<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn execute(&self, selector: &ProjectRepository) -> Result<Vec<RunningScan>> {
        let project = selector.project();
        let mut running = Vec::new();

        for repo in resolve_repositories(&self.fetcher, selector)? {
            let artifacts = self
                .fetcher
                .list_artifacts(project, &repo, &ArtifactListOptions::with_overview())
                .with_context(|| format!("failed to list artifacts for {}", repo))?;

            for artifact in artifacts {
                let Some(first) = artifact.scan_overview.values().next() else {
                    continue;
                };
                if first.scan_status.is_empty() || first.is_finished() {
                    continue;
                }
                running.push(RunningScan {
                    repository: repo.clone(),
                    digest: artifact.short_digest().to_string(),
                    tags: artifact.tag_names().join(","),
                    status: first.scan_status.clone(),
                });
            }
        }

        Ok(running)
    }
}
