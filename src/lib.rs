//! hrbcli - Command-line client for the Harbor container registry
//!
//! This library provides the building blocks of the `hrbcli` binary:
//! Harbor API access, artifact reference parsing, and the aggregation,
//! filtering and sorting of per-artifact scan reports. It follows
//! hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`scanning`): Artifact references, severities, reports and
//!   the filtering and sorting rules applied to them
//! - **Application Layer** (`application`): Use cases, request DTOs and read models
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): CLI command handlers and concrete implementations of ports
//! - **Shared** (`shared`): Common utilities, error types and the wait primitive
//!
//! # Example
//!
//! ```no_run
//! use hrbcli::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let client = HarborClient::new(&ClientOptions {
//!     harbor_url: "https://harbor.example.com".to_string(),
//!     api_version: "v2.0".to_string(),
//!     ..Default::default()
//! })?;
//!
//! let use_case = AggregateReportsUseCase::new(
//!     HarborRepository::new(client),
//!     StderrProgressReporter::new(),
//! );
//!
//! let selector = ProjectRepository::parse("library")?;
//! let request = ReportsRequest::new(selector, ReportMode::Vulnerability, false)
//!     .with_sort("critical", false);
//! for entry in use_case.execute(&request)? {
//!     println!("{}:{} {}", entry.repository, entry.reference, entry.counts.critical);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod ports;
pub mod scanning;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::network::{ClientOptions, HarborClient, HarborRepository};
    pub use crate::application::dto::{OutputFormat, ReportsRequest};
    pub use crate::application::use_cases::{
        AggregateReportsUseCase, CheckVulnerabilitiesUseCase, ScanArtifactUseCase,
    };
    pub use crate::ports::outbound::{
        AdministrationRepository, ArtifactRepository, CatalogRepository, ProgressReporter,
        ReportFetcher, ReportFormatter,
    };
    pub use crate::scanning::domain::{
        ArtifactReference, ProjectRepository, ReportEntry, ReportMode, Severity,
        VulnerabilityReport,
    };
    pub use crate::scanning::services::{ReportSorter, SeverityFilter, SortKey};
    pub use crate::shared::Result;
}
