use crate::application::dto::ReportsRequest;
use crate::ports::outbound::{ArtifactListOptions, ProgressReporter, ReportFetcher};
use crate::scanning::domain::{
    short_digest, strip_project_prefix, Artifact, ProjectRepository, ReportEntry, ReportMode,
    ReportPayload,
};
use crate::scanning::services::{ReportSorter, SortKey};
use crate::shared::Result;
use anyhow::Context;

/// Resolves the repositories a command fans out over
///
/// Returns the named repository, or every repository of the project with
/// the `project/` prefix stripped.
///
/// # Errors
/// Fails with `failed to list repositories` when the listing call fails.
pub fn resolve_repositories<F: ReportFetcher>(
    fetcher: &F,
    selector: &ProjectRepository,
) -> Result<Vec<String>> {
    if let Some(repository) = selector.repository() {
        return Ok(vec![repository.to_string()]);
    }

    let project = selector.project();
    let names = fetcher
        .list_repositories(project)
        .context("failed to list repositories")?;

    Ok(names
        .iter()
        .map(|name| strip_project_prefix(name, project).to_string())
        .collect())
}

/// AggregateReportsUseCase - Collects one report entry per artifact
///
/// Fans out over a project's repositories, lists their artifacts and turns
/// each artifact into a [`ReportEntry`]. Listing failures abort the run;
/// a failure to fetch one artifact's report is reported as a warning and
/// that artifact is skipped.
///
/// # Type Parameters
/// * `F` - ReportFetcher implementation
/// * `P` - ProgressReporter implementation
pub struct AggregateReportsUseCase<F, P> {
    fetcher: F,
    progress_reporter: P,
}

impl<F, P> AggregateReportsUseCase<F, P>
where
    F: ReportFetcher,
    P: ProgressReporter,
{
    pub fn new(fetcher: F, progress_reporter: P) -> Self {
        Self {
            fetcher,
            progress_reporter,
        }
    }

    /// Aggregates reports and orders them by the requested sort key
    ///
    /// An unrecognized sort key falls back to the severity order with a warning.
    pub fn execute(&self, request: &ReportsRequest) -> Result<Vec<ReportEntry>> {
        let mut entries = self.aggregate(
            request.selector.project(),
            request.selector.repository(),
            request.mode,
            request.summary,
        )?;

        let (key, recognized) = SortKey::parse_lenient(&request.sort);
        if !recognized {
            self.progress_reporter.report_warning(&format!(
                "Unknown sort key '{}', sorting by {}",
                request.sort, key
            ));
        }
        ReportSorter::sort(&mut entries, key, request.reverse);

        Ok(entries)
    }

    /// Builds the unsorted entry list
    ///
    /// # Arguments
    /// * `project` - Project name
    /// * `repository` - Single repository, or `None` for every repository of the project
    /// * `mode` - Report kind fetched per artifact when `summary` is false
    /// * `summary` - Sum the scan overview counts instead of fetching reports
    ///
    /// # Returns
    /// Entries in aggregation order; an empty list means no reports were found
    pub fn aggregate(
        &self,
        project: &str,
        repository: Option<&str>,
        mode: ReportMode,
        summary: bool,
    ) -> Result<Vec<ReportEntry>> {
        let selector = ProjectRepository::from_parts(project, repository);
        let repositories = resolve_repositories(&self.fetcher, &selector)?;

        let options = if summary {
            ArtifactListOptions::with_overview()
        } else {
            ArtifactListOptions::tags_only()
        };

        let mut entries = Vec::new();
        for (idx, repo) in repositories.iter().enumerate() {
            self.progress_reporter
                .report_progress(idx + 1, repositories.len(), Some(repo));

            let artifacts = self
                .fetcher
                .list_artifacts(project, repo, &options)
                .with_context(|| format!("failed to list artifacts for {}", repo))?;

            for artifact in artifacts {
                let entry = if summary {
                    Some(Self::summary_entry(repo, artifact))
                } else {
                    self.report_entry(project, repo, &artifact, mode)
                };
                entries.extend(entry);
            }
        }

        Ok(entries)
    }

    fn summary_entry(repository: &str, artifact: Artifact) -> ReportEntry {
        let reference = artifact.primary_reference().to_string();
        ReportEntry::new(
            repository.to_string(),
            reference,
            ReportPayload::Overview(artifact.scan_overview),
        )
    }

    /// Fetches the per-artifact report, returning `None` (with a warning) on failure
    fn report_entry(
        &self,
        project: &str,
        repository: &str,
        artifact: &Artifact,
        mode: ReportMode,
    ) -> Option<ReportEntry> {
        let payload = match mode {
            ReportMode::Sbom => self
                .fetcher
                .get_sbom(project, repository, &artifact.digest)
                .map(ReportPayload::Sbom),
            ReportMode::Vulnerability => self
                .fetcher
                .get_vulnerability_report(project, repository, &artifact.digest)
                .map(ReportPayload::Vulnerability),
        };

        match payload {
            Ok(payload) => Some(ReportEntry::new(
                repository.to_string(),
                artifact.primary_reference().to_string(),
                payload,
            )),
            Err(e) => {
                let what = match mode {
                    ReportMode::Sbom => "SBOM",
                    ReportMode::Vulnerability => "vulnerabilities",
                };
                self.progress_reporter.report_warning(&format!(
                    "Failed to get {} for {}/{}@{}: {}",
                    what,
                    project,
                    repository,
                    artifact.short_digest(),
                    e
                ));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanning::domain::{
        NativeReportSummary, SbomDocument, Tag, VulnerabilityReport, VulnerabilitySummary,
    };
    use std::cell::RefCell;
    use std::collections::{BTreeMap, HashMap, HashSet};

    #[derive(Default)]
    struct FakeFetcher {
        repositories: Vec<String>,
        artifacts: HashMap<String, Vec<Artifact>>,
        reports: HashMap<String, VulnerabilityReport>,
        failing_digests: HashSet<String>,
        fail_listing: bool,
    }

    impl ReportFetcher for FakeFetcher {
        fn list_repositories(&self, _project: &str) -> Result<Vec<String>> {
            if self.fail_listing {
                anyhow::bail!("connection refused");
            }
            Ok(self.repositories.clone())
        }

        fn list_artifacts(
            &self,
            _project: &str,
            repository: &str,
            _options: &ArtifactListOptions,
        ) -> Result<Vec<Artifact>> {
            self.artifacts
                .get(repository)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("repository {} not found", repository))
        }

        fn get_vulnerability_report(
            &self,
            _project: &str,
            _repository: &str,
            reference: &str,
        ) -> Result<VulnerabilityReport> {
            if self.failing_digests.contains(reference) {
                anyhow::bail!("Harbor API error (code: 500): internal error");
            }
            Ok(self.reports.get(reference).cloned().unwrap_or_default())
        }

        fn get_sbom(
            &self,
            _project: &str,
            _repository: &str,
            reference: &str,
        ) -> Result<SbomDocument> {
            if self.failing_digests.contains(reference) {
                anyhow::bail!("not found");
            }
            Ok(SbomDocument(serde_json::json!({"bomFormat": "CycloneDX"})))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        warnings: RefCell<Vec<String>>,
        progress: RefCell<Vec<(usize, usize)>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, _message: &str) {}
        fn report_progress(&self, current: usize, total: usize, _message: Option<&str>) {
            self.progress.borrow_mut().push((current, total));
        }
        fn report_warning(&self, message: &str) {
            self.warnings.borrow_mut().push(message.to_string());
        }
        fn report_error(&self, _message: &str) {}
        fn report_completion(&self, _message: &str) {}
    }

    fn artifact(digest: &str, tags: &[&str]) -> Artifact {
        Artifact {
            digest: digest.to_string(),
            tags: tags
                .iter()
                .map(|t| Tag {
                    name: t.to_string(),
                    immutable: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    fn summary(total: u32, pairs: &[(&str, u32)]) -> VulnerabilitySummary {
        VulnerabilitySummary {
            total,
            fixable: 0,
            summary: pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        }
    }

    #[test]
    fn test_single_repository_end_to_end() {
        let mut fetcher = FakeFetcher {
            repositories: vec!["demo/app".to_string()],
            ..Default::default()
        };
        fetcher
            .artifacts
            .insert("app".to_string(), vec![artifact("sha256:aaa", &["v1"])]);
        fetcher.reports.insert(
            "sha256:aaa".to_string(),
            VulnerabilityReport {
                severity: "Critical".to_string(),
                summary: summary(3, &[("Critical", 1), ("High", 2)]),
                vulnerabilities: vec![],
            },
        );

        let use_case = AggregateReportsUseCase::new(fetcher, RecordingReporter::default());
        let entries = use_case
            .aggregate("demo", None, ReportMode::Vulnerability, false)
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].repository, "app");
        assert_eq!(entries[0].reference, "v1");
        assert_eq!(entries[0].counts.critical, 1);
        assert_eq!(entries[0].counts.high, 2);
        assert_eq!(entries[0].counts.total, 3);
    }

    #[test]
    fn test_zero_repositories_is_empty_result() {
        let use_case =
            AggregateReportsUseCase::new(FakeFetcher::default(), RecordingReporter::default());
        let entries = use_case
            .aggregate("empty", None, ReportMode::Vulnerability, false)
            .unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_failed_report_is_skipped_with_warning() {
        let mut fetcher = FakeFetcher::default();
        fetcher.artifacts.insert(
            "app".to_string(),
            vec![
                artifact("sha256:111", &["a"]),
                artifact("sha256:222", &["b"]),
                artifact("sha256:333", &["c"]),
            ],
        );
        fetcher.failing_digests.insert("sha256:222".to_string());

        let use_case = AggregateReportsUseCase::new(fetcher, RecordingReporter::default());
        let entries = use_case
            .aggregate("demo", Some("app"), ReportMode::Vulnerability, false)
            .unwrap();

        let refs: Vec<&str> = entries.iter().map(|e| e.reference.as_str()).collect();
        assert_eq!(refs, vec!["a", "c"]);

        let warnings = use_case.progress_reporter.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("demo/app@sha256:222"));
    }

    #[test]
    fn test_untagged_artifact_uses_digest_reference() {
        let mut fetcher = FakeFetcher::default();
        fetcher
            .artifacts
            .insert("app".to_string(), vec![artifact("sha256:bbb", &[])]);

        let use_case = AggregateReportsUseCase::new(fetcher, RecordingReporter::default());
        let entries = use_case
            .aggregate("demo", Some("app"), ReportMode::Sbom, false)
            .unwrap();

        assert_eq!(entries[0].reference, "sha256:bbb");
        assert!(matches!(entries[0].payload, ReportPayload::Sbom(_)));
        assert_eq!(entries[0].counts.total, 0);
    }

    #[test]
    fn test_summary_mode_sums_overview_counts() {
        let mut overview = BTreeMap::new();
        overview.insert(
            "scanner-a".to_string(),
            NativeReportSummary {
                scan_status: "Success".to_string(),
                summary: summary(2, &[("High", 2)]),
                ..Default::default()
            },
        );
        overview.insert(
            "scanner-b".to_string(),
            NativeReportSummary {
                scan_status: "Success".to_string(),
                summary: summary(1, &[("Critical", 1)]),
                ..Default::default()
            },
        );
        let mut scanned = artifact("sha256:ccc", &["latest"]);
        scanned.scan_overview = overview;

        let mut fetcher = FakeFetcher::default();
        fetcher.artifacts.insert("app".to_string(), vec![scanned]);
        fetcher.failing_digests.insert("sha256:ccc".to_string());

        let use_case = AggregateReportsUseCase::new(fetcher, RecordingReporter::default());
        let entries = use_case
            .aggregate("demo", Some("app"), ReportMode::Vulnerability, true)
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].counts.critical, 1);
        assert_eq!(entries[0].counts.high, 2);
        assert_eq!(entries[0].counts.total, 3);
        assert_eq!(entries[0].counts.vulnerabilities, 3);
        assert!(use_case.progress_reporter.warnings.borrow().is_empty());
    }

    #[test]
    fn test_listing_failures_are_fatal() {
        let fetcher = FakeFetcher {
            fail_listing: true,
            ..Default::default()
        };
        let use_case = AggregateReportsUseCase::new(fetcher, RecordingReporter::default());
        let err = use_case
            .aggregate("demo", None, ReportMode::Vulnerability, false)
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to list repositories");

        let use_case =
            AggregateReportsUseCase::new(FakeFetcher::default(), RecordingReporter::default());
        let err = use_case
            .aggregate("demo", Some("ghost"), ReportMode::Vulnerability, false)
            .unwrap_err();
        assert_eq!(err.to_string(), "failed to list artifacts for ghost");
    }

    #[test]
    fn test_execute_sorts_and_warns_on_unknown_key() {
        let mut fetcher = FakeFetcher::default();
        fetcher.artifacts.insert(
            "app".to_string(),
            vec![artifact("sha256:low", &["low"]), artifact("sha256:hot", &["hot"])],
        );
        fetcher.reports.insert(
            "sha256:hot".to_string(),
            VulnerabilityReport {
                summary: summary(1, &[("Critical", 1)]),
                ..Default::default()
            },
        );

        let use_case = AggregateReportsUseCase::new(fetcher, RecordingReporter::default());
        let request = ReportsRequest::new(
            ProjectRepository::parse("demo/app").unwrap(),
            ReportMode::Vulnerability,
            false,
        )
        .with_sort("critcal", false);

        let entries = use_case.execute(&request).unwrap();
        let refs: Vec<&str> = entries.iter().map(|e| e.reference.as_str()).collect();
        assert_eq!(refs, vec!["hot", "low"]);

        let warnings = use_case.progress_reporter.warnings.borrow();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("critcal"));
    }

    #[test]
    fn test_progress_reported_per_repository() {
        let mut fetcher = FakeFetcher {
            repositories: vec!["demo/a".to_string(), "demo/b".to_string()],
            ..Default::default()
        };
        fetcher.artifacts.insert("a".to_string(), vec![]);
        fetcher.artifacts.insert("b".to_string(), vec![]);

        let use_case = AggregateReportsUseCase::new(fetcher, RecordingReporter::default());
        use_case
            .aggregate("demo", None, ReportMode::Vulnerability, false)
            .unwrap();
        assert_eq!(*use_case.progress_reporter.progress.borrow(), vec![(1, 2), (2, 2)]);
    }
}
