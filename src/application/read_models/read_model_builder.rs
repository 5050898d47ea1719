//! Builders turning domain objects into [`OutputDocument`]s
//!
//! Table columns follow Harbor's web console naming; the JSON/YAML data keeps
//! the API field names so output can be piped into other tools.

use super::output_document::{OutputDocument, TableView};
use crate::application::use_cases::RunningScan;
use crate::scanning::domain::{
    Artifact, HealthStatus, Label, NativeReportSummary, Project, Registry, ReplicationExecution,
    ReplicationPolicy, ReportEntry, ReportMode, ReportPayload, Repository, Severity, SystemInfo,
    Tag, User, VulnerabilityItem,
};
use crate::shared::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats a byte count with binary units (`1.5 MiB`)
pub fn format_size(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

fn format_time(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format(TIME_FORMAT).to_string())
        .unwrap_or_default()
}

/// Registry name for policy views; a missing endpoint is the local Harbor
fn endpoint_name(registry: Option<&Registry>) -> String {
    registry
        .map(|r| r.name.clone())
        .unwrap_or_else(|| "local".to_string())
}

#[derive(Serialize)]
struct ArtifactRow<'a> {
    repository: &'a str,
    #[serde(flatten)]
    artifact: &'a Artifact,
}

pub struct ReadModelBuilder;

impl ReadModelBuilder {
    /// Aggregated report listing
    ///
    /// The table shape depends on the mode: one row per scanner for
    /// summaries, an availability column for SBOMs, and the vulnerability
    /// count otherwise.
    pub fn reports(entries: &[ReportEntry], summary: bool, mode: ReportMode) -> Result<OutputDocument> {
        let table = if summary {
            let mut table = TableView::new(&[
                "REPOSITORY", "REFERENCE", "SCANNER", "STATUS", "TOTAL", "CRITICAL", "HIGH",
                "MEDIUM", "LOW",
            ]);
            for entry in entries {
                let ReportPayload::Overview(overview) = &entry.payload else {
                    continue;
                };
                for (name, ov) in overview {
                    let s = &ov.summary;
                    table.push_row(vec![
                        entry.repository.clone(),
                        entry.reference.clone(),
                        name.clone(),
                        ov.scan_status.clone(),
                        s.total.to_string(),
                        s.count(Severity::Critical).to_string(),
                        s.count(Severity::High).to_string(),
                        s.count(Severity::Medium).to_string(),
                        s.count(Severity::Low).to_string(),
                    ]);
                }
            }
            table
        } else if mode == ReportMode::Sbom {
            let mut table = TableView::new(&["REPOSITORY", "REFERENCE", "SBOM"]);
            for entry in entries {
                let status = match &entry.payload {
                    ReportPayload::Sbom(doc) if !doc.is_empty() => "available",
                    _ => "empty",
                };
                table.push_row(vec![
                    entry.repository.clone(),
                    entry.reference.clone(),
                    status.to_string(),
                ]);
            }
            table
        } else {
            let mut table = TableView::new(&[
                "REPOSITORY",
                "REFERENCE",
                "VULNERABILITIES",
                "CRITICAL",
                "HIGH",
                "MEDIUM",
                "LOW",
            ]);
            for entry in entries {
                let c = &entry.counts;
                table.push_row(vec![
                    entry.repository.clone(),
                    entry.reference.clone(),
                    c.vulnerabilities.to_string(),
                    c.critical.to_string(),
                    c.high.to_string(),
                    c.medium.to_string(),
                    c.low.to_string(),
                ]);
            }
            table
        };

        Ok(OutputDocument::new(entries, table)?)
    }

    pub fn vulnerabilities(items: &[VulnerabilityItem]) -> Result<OutputDocument> {
        let mut table = TableView::new(&["SEVERITY", "CVE", "PACKAGE", "VERSION", "FIXED VERSION"]);
        for v in items {
            table.push_row(vec![
                v.severity.clone(),
                v.cve_id.clone(),
                v.package.clone(),
                v.version.clone(),
                v.fixed_version.clone(),
            ]);
        }
        Ok(OutputDocument::new(items, table)?)
    }

    pub fn scan_overview(overview: &BTreeMap<String, NativeReportSummary>) -> Result<OutputDocument> {
        let mut table = TableView::new(&[
            "SCANNER", "STATUS", "SEVERITY", "TOTAL", "CRITICAL", "HIGH", "MEDIUM", "LOW",
        ]);
        for (name, ov) in overview {
            let s = &ov.summary;
            table.push_row(vec![
                name.clone(),
                ov.scan_status.clone(),
                ov.severity.clone(),
                s.total.to_string(),
                s.count(Severity::Critical).to_string(),
                s.count(Severity::High).to_string(),
                s.count(Severity::Medium).to_string(),
                s.count(Severity::Low).to_string(),
            ]);
        }
        Ok(OutputDocument::new(overview, table)?)
    }

    pub fn running_scans(scans: &[RunningScan]) -> Result<OutputDocument> {
        let mut table = TableView::new(&["REPOSITORY", "DIGEST", "TAGS", "STATUS"]);
        for s in scans {
            table.push_row(vec![
                s.repository.clone(),
                s.digest.clone(),
                s.tags.clone(),
                s.status.clone(),
            ]);
        }
        Ok(OutputDocument::new(scans, table)?)
    }

    /// Artifact listing across one or more repositories
    ///
    /// # Arguments
    /// * `artifacts` - `(repository, artifact)` pairs in listing order
    /// * `with_scan_overview` - Adds a scan status column
    pub fn artifacts(artifacts: &[(String, Artifact)], with_scan_overview: bool) -> Result<OutputDocument> {
        let mut headers = vec!["REPOSITORY", "DIGEST", "TAGS", "SIZE", "PUSHED"];
        if with_scan_overview {
            headers.push("SCAN STATUS");
        }
        let mut table = TableView::new(&headers);

        for (repo, a) in artifacts {
            let mut row = vec![
                repo.clone(),
                a.short_digest().to_string(),
                a.tag_names().join(","),
                format_size(a.size),
                format_time(a.push_time),
            ];
            if with_scan_overview {
                row.push(a.first_scan_status().unwrap_or("Not Scanned").to_string());
            }
            table.push_row(row);
        }

        let rows: Vec<ArtifactRow<'_>> = artifacts
            .iter()
            .map(|(repository, artifact)| ArtifactRow {
                repository,
                artifact,
            })
            .collect();
        Ok(OutputDocument::new(&rows, table)?)
    }

    /// Single artifact details
    ///
    /// # Arguments
    /// * `show_tags` - Lists every tag with its immutability flag
    pub fn artifact(artifact: &Artifact, show_tags: bool) -> Result<OutputDocument> {
        let mut pairs = vec![
            ("Digest".to_string(), artifact.digest.clone()),
            ("Type".to_string(), artifact.artifact_type.clone()),
            ("Size".to_string(), format_size(artifact.size)),
            ("Tags".to_string(), artifact.tag_names().join(",")),
        ];
        if let Some(attrs) = &artifact.extra_attrs {
            pairs.push(("Architecture".to_string(), attrs.architecture.clone()));
            pairs.push(("OS".to_string(), attrs.os.clone()));
        }
        if let Some(pushed) = artifact.push_time {
            pairs.push(("Pushed".to_string(), pushed.format(TIME_FORMAT).to_string()));
        }
        for (name, ov) in &artifact.scan_overview {
            pairs.push((
                format!("Scan ({})", name),
                format!("{} / {} vulnerabilities", ov.scan_status, ov.summary.total),
            ));
        }

        let table = if show_tags {
            let mut table = TableView::new(&["TAG", "IMMUTABLE"]);
            for tag in &artifact.tags {
                table.push_row(vec![tag.name.clone(), yes_no(tag.immutable)]);
            }
            table
        } else {
            TableView::key_value(pairs)
        };

        if show_tags {
            Ok(OutputDocument::new(&artifact.tags, table)?)
        } else {
            Ok(OutputDocument::new(artifact, table)?)
        }
    }

    pub fn projects(projects: &[Project]) -> Result<OutputDocument> {
        let mut table = TableView::new(&["NAME", "ID", "PUBLIC", "REPOSITORIES", "OWNER", "CREATED"]);
        for p in projects {
            table.push_row(vec![
                p.name.clone(),
                p.project_id.to_string(),
                p.is_public().to_string(),
                p.repo_count.to_string(),
                p.owner_name.clone(),
                format_time(p.creation_time),
            ]);
        }
        Ok(OutputDocument::new(projects, table)?)
    }

    pub fn project(project: &Project) -> Result<OutputDocument> {
        let mut pairs = vec![
            ("Name".to_string(), project.name.clone()),
            ("ID".to_string(), project.project_id.to_string()),
            ("Public".to_string(), project.is_public().to_string()),
            ("Owner".to_string(), project.owner_name.clone()),
            ("Repositories".to_string(), project.repo_count.to_string()),
        ];
        for (key, value) in &project.metadata {
            if key != "public" {
                pairs.push((key.clone(), value.clone()));
            }
        }
        Ok(OutputDocument::new(project, TableView::key_value(pairs))?)
    }

    /// Repository listing
    ///
    /// # Arguments
    /// * `detail` - Adds update time and description columns
    pub fn repositories(project: &str, repositories: &[Repository], detail: bool) -> Result<OutputDocument> {
        let mut headers = vec!["NAME", "ARTIFACTS", "PULLS"];
        if detail {
            headers.extend(["UPDATED", "DESCRIPTION"]);
        }
        let mut table = TableView::new(&headers);
        for r in repositories {
            let mut row = vec![
                r.short_name(project).to_string(),
                r.artifact_count.to_string(),
                r.pull_count.to_string(),
            ];
            if detail {
                row.push(format_time(r.update_time));
                row.push(r.description.clone());
            }
            table.push_row(row);
        }
        Ok(OutputDocument::new(repositories, table)?)
    }

    pub fn repository(repository: &Repository) -> Result<OutputDocument> {
        let table = TableView::key_value([
            ("Name".to_string(), repository.name.clone()),
            ("ID".to_string(), repository.id.to_string()),
            ("Artifacts".to_string(), repository.artifact_count.to_string()),
            ("Pulls".to_string(), repository.pull_count.to_string()),
            ("Description".to_string(), repository.description.clone()),
        ]);
        Ok(OutputDocument::new(repository, table)?)
    }

    pub fn system_info(info: &SystemInfo) -> Result<OutputDocument> {
        let mut pairs = vec![
            ("Harbor Version".to_string(), info.harbor_version.clone()),
            ("Registry URL".to_string(), info.registry_url.clone()),
            ("External URL".to_string(), info.external_url.clone()),
            ("Auth Mode".to_string(), info.auth_mode.clone()),
            (
                "Project Creation".to_string(),
                info.project_creation_restriction.clone(),
            ),
            ("Self Registration".to_string(), yes_no(info.self_registration)),
            ("Has CA Root".to_string(), yes_no(info.has_ca_root)),
            (
                "Storage Provider".to_string(),
                info.registry_storage_provider_name.clone(),
            ),
        ];
        for (idx, volume) in info.storage.iter().flatten().enumerate() {
            pairs.push((
                format!("Storage {}", idx + 1),
                format!(
                    "{} free of {}",
                    format_size(i64::try_from(volume.free).unwrap_or(i64::MAX)),
                    format_size(i64::try_from(volume.total).unwrap_or(i64::MAX))
                ),
            ));
        }
        Ok(OutputDocument::new(info, TableView::key_value(pairs))?)
    }

    /// Tag listing of a repository
    ///
    /// # Arguments
    /// * `detail` - Adds the immutability column
    pub fn tags(tags: &[Tag], detail: bool) -> Result<OutputDocument> {
        let mut headers = vec!["NAME"];
        if detail {
            headers.push("IMMUTABLE");
        }
        let mut table = TableView::new(&headers);
        for tag in tags {
            let mut row = vec![tag.name.clone()];
            if detail {
                row.push(yes_no(tag.immutable));
            }
            table.push_row(row);
        }
        Ok(OutputDocument::new(tags, table)?)
    }

    pub fn registries(registries: &[Registry]) -> Result<OutputDocument> {
        let mut table = TableView::new(&[
            "ID", "NAME", "TYPE", "URL", "STATUS", "INSECURE", "CREATED",
        ]);
        for r in registries {
            table.push_row(vec![
                r.id.to_string(),
                r.name.clone(),
                r.registry_type.clone(),
                r.url.clone(),
                r.status.clone(),
                r.insecure.to_string(),
                format_time(r.creation_time),
            ]);
        }
        Ok(OutputDocument::new(registries, table)?)
    }

    pub fn registry(registry: &Registry) -> Result<OutputDocument> {
        let mut pairs = vec![
            ("ID".to_string(), registry.id.to_string()),
            ("Name".to_string(), registry.name.clone()),
            ("Type".to_string(), registry.registry_type.clone()),
            ("URL".to_string(), registry.url.clone()),
            ("Status".to_string(), registry.status.clone()),
            ("Insecure".to_string(), registry.insecure.to_string()),
            ("Description".to_string(), registry.description.clone()),
        ];
        if let Some(credential) = &registry.credential {
            pairs.push(("Credential".to_string(), credential.credential_type.clone()));
            pairs.push(("Access Key".to_string(), credential.access_key.clone()));
        }
        pairs.push(("Created".to_string(), format_time(registry.creation_time)));
        pairs.push(("Updated".to_string(), format_time(registry.update_time)));
        Ok(OutputDocument::new(registry, TableView::key_value(pairs))?)
    }

    pub fn replication_policies(policies: &[ReplicationPolicy]) -> Result<OutputDocument> {
        let mut table = TableView::new(&[
            "ID", "NAME", "SOURCE", "DESTINATION", "TRIGGER", "ENABLED",
        ]);
        for p in policies {
            table.push_row(vec![
                p.id.to_string(),
                p.name.clone(),
                endpoint_name(p.src_registry.as_ref()),
                endpoint_name(p.dest_registry.as_ref()),
                p.trigger_description(),
                p.enabled.to_string(),
            ]);
        }
        Ok(OutputDocument::new(policies, table)?)
    }

    pub fn replication_policy(policy: &ReplicationPolicy) -> Result<OutputDocument> {
        let table = TableView::key_value([
            ("ID".to_string(), policy.id.to_string()),
            ("Name".to_string(), policy.name.clone()),
            ("Description".to_string(), policy.description.clone()),
            ("Source".to_string(), endpoint_name(policy.src_registry.as_ref())),
            (
                "Destination".to_string(),
                endpoint_name(policy.dest_registry.as_ref()),
            ),
            ("Namespace".to_string(), policy.dest_namespace.clone()),
            ("Trigger".to_string(), policy.trigger_description()),
            (
                "Replicate Deletion".to_string(),
                yes_no(policy.replicate_deletion),
            ),
            ("Override".to_string(), yes_no(policy.override_existing)),
            ("Enabled".to_string(), policy.enabled.to_string()),
        ]);
        Ok(OutputDocument::new(policy, table)?)
    }

    pub fn replication_executions(executions: &[ReplicationExecution]) -> Result<OutputDocument> {
        let mut table = TableView::new(&["ID", "POLICY", "STATUS", "TRIGGER", "START", "END"]);
        for e in executions {
            table.push_row(vec![
                e.id.to_string(),
                e.policy_id.to_string(),
                e.status.clone(),
                e.trigger.clone(),
                format_time(e.start_time),
                format_time(e.end_time),
            ]);
        }
        Ok(OutputDocument::new(executions, table)?)
    }

    /// Progress of one execution
    pub fn replication_execution(execution: &ReplicationExecution) -> Result<OutputDocument> {
        let mut table = TableView::new(&[
            "ID", "STATUS", "TOTAL", "SUCCEED", "FAILED", "IN_PROGRESS", "STOPPED",
        ]);
        table.push_row(vec![
            execution.id.to_string(),
            execution.status.clone(),
            execution.total.to_string(),
            execution.succeed.to_string(),
            execution.failed.to_string(),
            execution.in_progress.to_string(),
            execution.stopped.to_string(),
        ]);
        Ok(OutputDocument::new(execution, table)?)
    }

    /// User listing
    ///
    /// # Arguments
    /// * `detail` - Adds the real name column
    pub fn users(users: &[User], detail: bool) -> Result<OutputDocument> {
        let mut headers = vec!["ID", "USERNAME", "EMAIL", "ADMIN", "CREATED"];
        if detail {
            headers.push("REALNAME");
        }
        let mut table = TableView::new(&headers);
        for u in users {
            let mut row = vec![
                u.user_id.to_string(),
                u.username.clone(),
                u.email.clone(),
                yes_no(u.sysadmin_flag),
                format_time(u.creation_time),
            ];
            if detail {
                row.push(u.realname.clone());
            }
            table.push_row(row);
        }
        Ok(OutputDocument::new(users, table)?)
    }

    pub fn user(user: &User) -> Result<OutputDocument> {
        let table = TableView::key_value([
            ("ID".to_string(), user.user_id.to_string()),
            ("Username".to_string(), user.username.clone()),
            ("Email".to_string(), user.email.clone()),
            ("Real Name".to_string(), user.realname.clone()),
            ("Admin".to_string(), yes_no(user.sysadmin_flag)),
            ("Created".to_string(), format_time(user.creation_time)),
        ]);
        Ok(OutputDocument::new(user, table)?)
    }

    pub fn labels(labels: &[Label]) -> Result<OutputDocument> {
        let mut table = TableView::new(&["ID", "NAME", "SCOPE", "PROJECT", "COLOR"]);
        for l in labels {
            let project = if l.project_id == 0 {
                String::new()
            } else {
                l.project_id.to_string()
            };
            table.push_row(vec![
                l.id.to_string(),
                l.name.clone(),
                l.scope.clone(),
                project,
                l.color.clone(),
            ]);
        }
        Ok(OutputDocument::new(labels, table)?)
    }

    pub fn label(label: &Label) -> Result<OutputDocument> {
        let mut pairs = vec![
            ("ID".to_string(), label.id.to_string()),
            ("Name".to_string(), label.name.clone()),
            ("Scope".to_string(), label.scope.clone()),
        ];
        if label.project_id != 0 {
            pairs.push(("Project ID".to_string(), label.project_id.to_string()));
        }
        pairs.push(("Description".to_string(), label.description.clone()));
        pairs.push(("Color".to_string(), label.color.clone()));
        Ok(OutputDocument::new(label, TableView::key_value(pairs))?)
    }

    /// Build information of this binary
    pub fn version() -> Result<OutputDocument> {
        #[derive(Serialize)]
        struct VersionInfo {
            version: &'static str,
            platform: String,
        }

        let info = VersionInfo {
            version: env!("CARGO_PKG_VERSION"),
            platform: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
        };
        let table = TableView::key_value([
            ("Version".to_string(), info.version.to_string()),
            ("Platform".to_string(), info.platform.clone()),
        ]);
        Ok(OutputDocument::new(&info, table)?)
    }

    pub fn health(health: &HealthStatus) -> Result<OutputDocument> {
        let mut table = TableView::new(&["COMPONENT", "STATUS", "ERROR"]);
        for c in &health.components {
            table.push_row(vec![
                c.name.clone(),
                c.status.clone(),
                c.error.clone().unwrap_or_default(),
            ]);
        }
        Ok(OutputDocument::new(health, table)?)
    }
}
