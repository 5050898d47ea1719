pub mod artifact;
pub mod artifact_reference;
pub mod catalog;
pub mod label;
pub mod registry;
pub mod replication;
pub mod report;
pub mod severity;
pub mod user;

pub use artifact::{
    short_digest, Artifact, ExtraAttrs, NativeReportSummary, Tag, VulnerabilitySummary,
};
pub use artifact_reference::{ArtifactReference, ProjectRepository, DEFAULT_REFERENCE};
pub use catalog::{
    parse_storage_limit, strip_project_prefix, validate_project_name, ComponentHealth,
    HealthStatus, Project, ProjectRequest, Repository, StorageInfo, SystemInfo,
};
pub use label::{Label, LabelRequest, LabelScope};
pub use registry::{Registry, RegistryCredential, RegistryRequest, DEFAULT_REGISTRY_TYPE};
pub use replication::{ReplicationExecution, ReplicationPolicy, ReplicationTrigger};
pub use report::{
    ReportEntry, ReportMode, ReportPayload, SbomDocument, SeverityCounts, VulnerabilityItem,
    VulnerabilityReport,
};
pub use severity::Severity;
pub use user::{find_exact, User, UserRequest};
