/// Mock implementations for testing
mod mock_harbor;
mod mock_progress_reporter;

#[allow(unused_imports)]
pub use mock_harbor::{artifact, overview, report, MockHarbor};
pub use mock_progress_reporter::MockProgressReporter;
