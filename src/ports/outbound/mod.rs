/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (Harbor API, file system, console).
pub mod administration_repository;
pub mod artifact_repository;
pub mod catalog_repository;
pub mod formatter;
pub mod output_presenter;
pub mod progress_reporter;
pub mod report_fetcher;

pub use administration_repository::{AdministrationRepository, LabelFilter};
pub use artifact_repository::ArtifactRepository;
pub use catalog_repository::{CatalogRepository, ListQuery};
pub use formatter::ReportFormatter;
pub use output_presenter::OutputPresenter;
pub use progress_reporter::ProgressReporter;
pub use report_fetcher::{ArtifactListOptions, ReportFetcher};
