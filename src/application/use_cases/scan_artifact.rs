use crate::ports::outbound::{ArtifactListOptions, ArtifactRepository, ProgressReporter};
use crate::scanning::domain::{Artifact, ArtifactReference, ReportMode};
use crate::shared::wait::{wait_until, WaitPolicy, WaitStatus};
use crate::shared::Result;
use anyhow::Context;

/// ScanArtifactUseCase - Triggers a scan and optionally waits for it
///
/// # Type Parameters
/// * `A` - ArtifactRepository implementation
/// * `P` - ProgressReporter implementation
pub struct ScanArtifactUseCase<A, P> {
    artifacts: A,
    progress_reporter: P,
}

impl<A, P> ScanArtifactUseCase<A, P>
where
    A: ArtifactRepository,
    P: ProgressReporter,
{
    pub fn new(artifacts: A, progress_reporter: P) -> Self {
        Self {
            artifacts,
            progress_reporter,
        }
    }

    pub fn trigger(&self, reference: &ArtifactReference, scan_type: Option<ReportMode>) -> Result<()> {
        self.artifacts
            .scan_artifact(
                reference.project(),
                reference.repository(),
                reference.reference(),
                scan_type,
            )
            .with_context(|| format!("failed to trigger scan for {}", reference))?;
        self.progress_reporter
            .report_completion(&format!("Scan triggered for {}", reference));
        Ok(())
    }

    /// Polls the artifact until every attached scan has finished
    ///
    /// An artifact without any scan overview is still pending: the server
    /// has not registered the scan yet.
    ///
    /// # Errors
    /// - The artifact lookup fails
    /// - A scanner reports the `Error` status
    /// - The policy deadline passes
    pub fn wait(&self, reference: &ArtifactReference, policy: &WaitPolicy) -> Result<Artifact> {
        let what = format!("scan of {}", reference);
        let options = ArtifactListOptions::with_overview();

        let artifact = wait_until(&what, policy, None, |attempt| {
            let artifact = self.artifacts.get_artifact(
                reference.project(),
                reference.repository(),
                reference.reference(),
                &options,
            )?;

            if let Some(failed) = artifact
                .scan_overview
                .values()
                .find(|ov| ov.scan_status.eq_ignore_ascii_case("error"))
            {
                anyhow::bail!("{} failed with status {}", what, failed.scan_status);
            }

            if !artifact.scan_overview.is_empty() && artifact.all_scans_finished() {
                return Ok(WaitStatus::Done(artifact));
            }

            let status = artifact.first_scan_status().unwrap_or("Pending").to_string();
            self.progress_reporter.report_progress(
                attempt as usize,
                0,
                Some(&format!("Waiting for scan of {} ({})", reference, status)),
            );
            Ok(WaitStatus::Pending)
        })?;

        self.progress_reporter
            .report_completion(&format!("Scan completed for {}", reference));
        Ok(artifact)
    }
}
