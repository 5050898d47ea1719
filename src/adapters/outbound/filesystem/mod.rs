/// Filesystem adapters for output files
mod file_writer;
mod report_archive;

pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use report_archive::ReportArchive;
