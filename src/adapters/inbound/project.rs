use super::CommandContext;
use crate::application::read_models::ReadModelBuilder;
use crate::cli::{ProjectCommand, ProjectCreateArgs, ProjectUpdateArgs};
use crate::ports::outbound::{AdministrationRepository, CatalogRepository, ListQuery, ProgressReporter};
use crate::scanning::domain::{parse_storage_limit, validate_project_name, ProjectRequest, Severity};
use crate::shared::error::{ExitCode, HarborError};
use crate::shared::Result;
use anyhow::Context;

pub fn run(command: ProjectCommand, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        ProjectCommand::List {
            page,
            page_size,
            query,
        } => {
            let projects = ctx
                .harbor()?
                .list_projects(&ListQuery {
                    page,
                    page_size,
                    query,
                })
                .context("failed to list projects")?;
            if projects.is_empty() {
                ctx.reporter().report("No projects found");
                return Ok(ExitCode::Success);
            }
            ctx.emit(&ReadModelBuilder::projects(&projects)?)?;
        }
        ProjectCommand::Get { name } => {
            let project = ctx
                .harbor()?
                .get_project(&name)
                .with_context(|| format!("failed to get project {}", name))?;
            ctx.emit(&ReadModelBuilder::project(&project)?)?;
        }
        ProjectCommand::Create(args) => create(ctx, args)?,
        ProjectCommand::Update(args) => update(ctx, args)?,
        ProjectCommand::Delete { name, yes, force } => {
            if !yes {
                return Err(HarborError::Validation {
                    message: format!("refusing to delete project {} without --yes", name),
                }
                .into());
            }
            let harbor = ctx.harbor()?;
            let project = harbor
                .get_project(&name)
                .with_context(|| format!("failed to get project {}", name))?;
            if project.repo_count > 0 && !force {
                return Err(HarborError::Validation {
                    message: format!(
                        "project {} contains {} repositories; pass --force to delete it anyway",
                        name, project.repo_count
                    ),
                }
                .into());
            }
            harbor
                .delete_project(&name)
                .with_context(|| format!("failed to delete project {}", name))?;
            ctx.reporter()
                .report_completion(&format!("Project {} deleted", name));
        }
        ProjectCommand::Exists { name } => {
            let exists = ctx
                .harbor()?
                .project_exists(&name)
                .context("failed to check project existence")?;
            if !exists {
                ctx.reporter()
                    .report(&format!("Project {} does not exist", name));
                return Ok(ExitCode::NotFound);
            }
            ctx.reporter().report(&format!("Project {} exists", name));
        }
    }
    Ok(ExitCode::Success)
}

/// Harbor stores the prevent-vulnerable threshold in lowercase
fn severity_setting(severity: Severity) -> String {
    severity.summary_key().to_lowercase()
}

/// Builds the create request from the flags; the proxy registry is resolved separately
fn create_request(args: &ProjectCreateArgs) -> Result<ProjectRequest> {
    validate_project_name(&args.name)?;

    let mut request = ProjectRequest::named(&args.name);
    request.set_flag("public", args.public);
    if let Some(limit) = &args.storage_limit {
        request.storage_limit = Some(parse_storage_limit(limit)?);
    }
    if args.enable_content_trust {
        request.set_flag("enable_content_trust", true);
    }
    if args.prevent_vulnerable {
        request.set_flag("prevent_vul", true);
        request
            .metadata
            .insert("severity".to_string(), severity_setting(args.severity));
    }
    if args.auto_scan {
        request.set_flag("auto_scan", true);
    }
    if args.reuse_sys_cve {
        request.set_flag("reuse_sys_cve_allowlist", true);
    }
    if args.proxy_cache {
        request
            .metadata
            .insert("proxy_speed_kb".to_string(), args.proxy_speed.to_string());
    }
    Ok(request)
}

fn create(ctx: &CommandContext, args: ProjectCreateArgs) -> Result<()> {
    let mut request = create_request(&args)?;
    let harbor = ctx.harbor()?;
    if args.proxy_cache {
        let registry_id = match (args.registry_id, args.registry_name.as_deref()) {
            (Some(id), _) => id,
            (None, Some(name)) => harbor
                .list_registries(None)
                .context("failed to list registries")?
                .into_iter()
                .find(|r| r.name == name)
                .map(|r| r.id)
                .ok_or_else(|| anyhow::anyhow!("registry '{}' not found", name))?,
            (None, None) => {
                return Err(HarborError::Validation {
                    message: "--proxy-cache requires --registry-id or --registry-name".to_string(),
                }
                .into())
            }
        };
        request.registry_id = Some(registry_id);
    }

    if harbor
        .project_exists(&args.name)
        .context("failed to check project existence")?
    {
        anyhow::bail!("project '{}' already exists", args.name);
    }
    harbor
        .create_project(&request)
        .with_context(|| format!("failed to create project {}", args.name))?;
    ctx.reporter()
        .report_completion(&format!("Project {} created", args.name));

    let project = harbor
        .get_project(&args.name)
        .with_context(|| format!("failed to get project {}", args.name))?;
    ctx.emit(&ReadModelBuilder::project(&project)?)
}

/// Request carrying only the settings given on the command line
fn update_request(args: &ProjectUpdateArgs) -> Result<ProjectRequest> {
    let mut request = ProjectRequest::default();
    if let Some(limit) = &args.storage_limit {
        request.storage_limit = Some(parse_storage_limit(limit)?);
    }
    let flags = [
        ("public", args.public),
        ("enable_content_trust", args.enable_content_trust),
        ("prevent_vul", args.prevent_vulnerable),
        ("auto_scan", args.auto_scan),
        ("reuse_sys_cve_allowlist", args.reuse_sys_cve),
    ];
    for (key, value) in flags {
        if let Some(enabled) = value {
            request.set_flag(key, enabled);
        }
    }
    if let Some(severity) = args.severity {
        request
            .metadata
            .insert("severity".to_string(), severity_setting(severity));
    }
    Ok(request)
}

fn update(ctx: &CommandContext, args: ProjectUpdateArgs) -> Result<()> {
    let request = update_request(&args)?;
    if request.is_empty() {
        return Err(HarborError::Validation {
            message: format!("no settings given for project {}", args.name),
        }
        .into());
    }

    let harbor = ctx.harbor()?;
    harbor
        .get_project(&args.name)
        .with_context(|| format!("failed to get project {}", args.name))?;
    harbor
        .update_project(&args.name, &request)
        .with_context(|| format!("failed to update project {}", args.name))?;
    ctx.reporter()
        .report_completion(&format!("Project {} updated", args.name));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, Command};
    use clap::Parser;

    fn create_args(extra: &[&str]) -> ProjectCreateArgs {
        let mut argv = vec!["hrbcli", "project", "create"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Project(ProjectCommand::Create(args)) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn update_args(extra: &[&str]) -> ProjectUpdateArgs {
        let mut argv = vec!["hrbcli", "project", "update"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Project(ProjectCommand::Update(args)) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_create_request_maps_security_flags() {
        let request = create_request(&create_args(&[
            "secure",
            "--public",
            "--storage-limit",
            "1G",
            "--prevent-vulnerable",
            "--severity",
            "high",
            "--auto-scan",
        ]))
        .unwrap();
        assert_eq!(request.project_name.as_deref(), Some("secure"));
        assert_eq!(request.storage_limit, Some(1 << 30));
        assert_eq!(request.metadata["public"], "true");
        assert_eq!(request.metadata["prevent_vul"], "true");
        assert_eq!(request.metadata["severity"], "high");
        assert_eq!(request.metadata["auto_scan"], "true");
        assert!(!request.metadata.contains_key("enable_content_trust"));
    }

    #[test]
    fn test_create_request_private_by_default() {
        let request = create_request(&create_args(&["team"])).unwrap();
        assert_eq!(request.metadata["public"], "false");
        assert_eq!(request.storage_limit, None);
    }

    #[test]
    fn test_create_request_rejects_bad_name() {
        let err = create_request(&create_args(&["Team"])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarborError>(),
            Some(HarborError::Validation { .. })
        ));
    }

    #[test]
    fn test_update_request_only_carries_given_flags() {
        let request = update_request(&update_args(&[
            "library",
            "--public",
            "false",
            "--severity",
            "critical",
        ]))
        .unwrap();
        assert_eq!(request.project_name, None);
        assert_eq!(request.metadata.len(), 2);
        assert_eq!(request.metadata["public"], "false");
        assert_eq!(request.metadata["severity"], "critical");

        assert!(update_request(&update_args(&["library"])).unwrap().is_empty());
    }
}
