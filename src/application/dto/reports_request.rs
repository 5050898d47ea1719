use crate::scanning::domain::{ProjectRepository, ReportMode};

/// ReportsRequest - Input of the report aggregation use case
#[derive(Debug, Clone)]
pub struct ReportsRequest {
    /// Project, optionally narrowed to one repository
    pub selector: ProjectRepository,
    /// Report kind fetched per artifact when `summary` is false
    pub mode: ReportMode,
    /// Use the artifact scan overview instead of fetching full reports
    pub summary: bool,
    /// Raw `--sort` value; unrecognized keys fall back to the severity order
    pub sort: String,
    pub reverse: bool,
}

impl ReportsRequest {
    pub fn new(selector: ProjectRepository, mode: ReportMode, summary: bool) -> Self {
        Self {
            selector,
            mode,
            summary,
            sort: String::new(),
            reverse: false,
        }
    }

    pub fn with_sort(mut self, sort: impl Into<String>, reverse: bool) -> Self {
        self.sort = sort.into();
        self.reverse = reverse;
        self
    }
}
