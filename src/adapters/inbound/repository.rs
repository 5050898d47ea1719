use super::CommandContext;
use crate::application::read_models::ReadModelBuilder;
use crate::cli::RepoCommand;
use crate::ports::outbound::{CatalogRepository, ListQuery, ProgressReporter};
use crate::scanning::domain::{ArtifactReference, ProjectRepository};
use crate::shared::error::{ExitCode, HarborError};
use crate::shared::Result;
use anyhow::Context;

/// Parses `<project>/<repository>`; a bare project is rejected
fn parse_repository(input: &str) -> Result<(String, String)> {
    let selector = ProjectRepository::parse(input)?;
    match selector.repository() {
        Some(repo) => Ok((selector.project().to_string(), repo.to_string())),
        None => Err(HarborError::InvalidReference {
            input: input.to_string(),
            reason: "missing repository".to_string(),
        }
        .into()),
    }
}

/// Harbor query expression for a substring match on the name
fn name_query(filter: Option<String>) -> Option<String> {
    filter
        .filter(|f| !f.is_empty())
        .map(|f| format!("name=~{}", f))
}

/// Tag filter expressed as a Harbor query on the artifact listing
fn tag_query(filter: Option<String>) -> Option<String> {
    filter
        .filter(|f| !f.is_empty())
        .map(|f| format!("tags=~{}", f))
}

/// What `repo delete` removes
#[derive(Debug, PartialEq, Eq)]
enum DeleteTarget {
    Repository { project: String, repository: String },
    Artifact(ArtifactReference),
}

impl DeleteTarget {
    /// A tag or digest after the repository path selects a single artifact
    fn parse(input: &str) -> Result<Self> {
        let has_reference = input
            .split_once('/')
            .is_some_and(|(_, rest)| rest.contains(':') || rest.contains('@'));
        if has_reference {
            return Ok(DeleteTarget::Artifact(ArtifactReference::parse(input)?));
        }
        let (project, repository) = parse_repository(input)?;
        Ok(DeleteTarget::Repository {
            project,
            repository,
        })
    }
}

pub fn run(command: RepoCommand, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        RepoCommand::List {
            project,
            page,
            page_size,
            filter,
            detail,
        } => {
            let query = ListQuery {
                page,
                page_size,
                query: name_query(filter),
            };
            let repositories = ctx
                .harbor()?
                .list_repositories_page(&project, &query)
                .context("failed to list repositories")?;
            if repositories.is_empty() {
                ctx.reporter().report("No repositories found");
                return Ok(ExitCode::Success);
            }
            ctx.emit(&ReadModelBuilder::repositories(&project, &repositories, detail)?)?;
        }
        RepoCommand::Get { name } => {
            let (project, repo) = parse_repository(&name)?;
            let repository = ctx
                .harbor()?
                .get_repository(&project, &repo)
                .with_context(|| format!("failed to get repository {}", name))?;
            ctx.emit(&ReadModelBuilder::repository(&repository)?)?;
        }
        RepoCommand::Tags {
            name,
            detail,
            filter,
            page,
            page_size,
        } => {
            let (project, repo) = parse_repository(&name)?;
            let query = ListQuery {
                page,
                page_size,
                query: tag_query(filter),
            };
            let tags = ctx
                .harbor()?
                .list_tags(&project, &repo, &query)
                .with_context(|| format!("failed to list tags of {}", name))?;
            if tags.is_empty() {
                ctx.reporter().report("No tags found");
                return Ok(ExitCode::Success);
            }
            ctx.emit(&ReadModelBuilder::tags(&tags, detail)?)?;
        }
        RepoCommand::Delete { name, yes } => {
            let target = DeleteTarget::parse(&name)?;
            if !yes {
                return Err(HarborError::Validation {
                    message: format!("refusing to delete {} without --yes", name),
                }
                .into());
            }
            let harbor = ctx.harbor()?;
            match target {
                DeleteTarget::Repository {
                    project,
                    repository,
                } => {
                    harbor
                        .delete_repository(&project, &repository)
                        .with_context(|| format!("failed to delete repository {}", name))?;
                    ctx.reporter()
                        .report_completion(&format!("Repository {} deleted", name));
                }
                DeleteTarget::Artifact(reference) => {
                    harbor
                        .delete_artifact(
                            reference.project(),
                            reference.repository(),
                            reference.reference(),
                        )
                        .with_context(|| format!("failed to delete artifact {}", reference))?;
                    ctx.reporter()
                        .report_completion(&format!("Deleted {}", reference));
                }
            }
        }
    }
    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repository() {
        assert_eq!(
            parse_repository("library/team/app").unwrap(),
            ("library".to_string(), "team/app".to_string())
        );
        assert!(parse_repository("library").is_err());
    }

    #[test]
    fn test_name_query() {
        assert_eq!(name_query(Some("ngx".to_string())).as_deref(), Some("name=~ngx"));
        assert_eq!(name_query(Some(String::new())), None);
        assert_eq!(name_query(None), None);
    }

    #[test]
    fn test_tag_query() {
        assert_eq!(tag_query(Some("1.2".to_string())).as_deref(), Some("tags=~1.2"));
        assert_eq!(tag_query(None), None);
    }

    #[test]
    fn test_delete_target_repository() {
        assert_eq!(
            DeleteTarget::parse("library/team/app").unwrap(),
            DeleteTarget::Repository {
                project: "library".to_string(),
                repository: "team/app".to_string(),
            }
        );
        assert!(DeleteTarget::parse("library").is_err());
    }

    #[test]
    fn test_delete_target_artifact() {
        let DeleteTarget::Artifact(tagged) = DeleteTarget::parse("library/nginx:1.25").unwrap() else {
            panic!("expected an artifact target");
        };
        assert_eq!(tagged.repository(), "nginx");
        assert_eq!(tagged.reference(), "1.25");

        let DeleteTarget::Artifact(pinned) =
            DeleteTarget::parse("library/nginx@sha256:abc123").unwrap()
        else {
            panic!("expected an artifact target");
        };
        assert!(pinned.is_digest());
        assert_eq!(pinned.reference(), "sha256:abc123");
    }
}
