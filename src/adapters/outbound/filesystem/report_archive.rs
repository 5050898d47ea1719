use crate::adapters::outbound::filesystem::FileSystemWriter;
use crate::application::dto::OutputFormat;
use crate::application::read_models::OutputDocument;
use crate::ports::outbound::{OutputPresenter, ReportFormatter};
use crate::scanning::domain::{ReportEntry, ReportMode};
use crate::shared::security::{prepare_output_directory, sanitize_file_component};
use crate::shared::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// ReportArchive adapter writing one file per report entry
///
/// Files are named `<repo>_<ref>_<kind>.<ext>` where `kind` is `summary`,
/// `sbom` or `vuln`. Only the report payload is written.
pub struct ReportArchive {
    directory: PathBuf,
    extension: &'static str,
    formatter: Box<dyn ReportFormatter>,
}

impl ReportArchive {
    /// Creates the directory if needed
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or is a symbolic link
    pub fn create(
        directory: &Path,
        format: OutputFormat,
        formatter: Box<dyn ReportFormatter>,
    ) -> Result<Self> {
        prepare_output_directory(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
            extension: format.report_file_extension(),
            formatter,
        })
    }

    pub fn file_name(&self, entry: &ReportEntry, summary: bool, mode: ReportMode) -> String {
        let kind = match (summary, mode) {
            (true, _) => "summary",
            (false, ReportMode::Sbom) => "sbom",
            (false, ReportMode::Vulnerability) => "vuln",
        };
        format!(
            "{}_{}_{}.{}",
            sanitize_file_component(&entry.repository),
            sanitize_file_component(&entry.reference),
            kind,
            self.extension
        )
    }

    /// Writes the payload of `entry` and returns the path written
    pub fn store(&self, entry: &ReportEntry, summary: bool, mode: ReportMode) -> Result<PathBuf> {
        let path = self.directory.join(self.file_name(entry, summary, mode));
        let document = OutputDocument::new(&entry.payload, Default::default())?;
        let content = self.formatter.format(&document)?;

        FileSystemWriter::new(path.clone())
            .present(&content)
            .with_context(|| "failed to write report")?;
        Ok(path)
    }
}
