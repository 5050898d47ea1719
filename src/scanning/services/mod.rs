mod report_sorter;
mod severity_filter;

pub use report_sorter::{ReportSorter, SortKey};
pub use severity_filter::SeverityFilter;
