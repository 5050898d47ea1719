use crate::application::use_cases::resolve_repositories;
use crate::ports::outbound::{ArtifactListOptions, ReportFetcher};
use crate::scanning::domain::{Artifact, ProjectRepository};
use crate::shared::Result;
use anyhow::Context;

/// ListArtifactsUseCase - Lists artifacts of a project or one repository
///
/// Returns `(repository, artifact)` pairs in listing order.
pub struct ListArtifactsUseCase<F> {
    fetcher: F,
}

impl<F: ReportFetcher> ListArtifactsUseCase<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }

    pub fn execute(
        &self,
        selector: &ProjectRepository,
        with_scan_overview: bool,
    ) -> Result<Vec<(String, Artifact)>> {
        let options = ArtifactListOptions {
            with_tag: true,
            with_scan_overview,
        };
        let mut listed = Vec::new();

        for repo in resolve_repositories(&self.fetcher, selector)? {
            let artifacts = self
                .fetcher
                .list_artifacts(selector.project(), &repo, &options)
                .with_context(|| format!("failed to list artifacts for {}", repo))?;
            listed.extend(artifacts.into_iter().map(|a| (repo.clone(), a)));
        }

        Ok(listed)
    }
}
