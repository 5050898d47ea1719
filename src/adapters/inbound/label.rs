use super::CommandContext;
use crate::application::read_models::ReadModelBuilder;
use crate::cli::LabelCommand;
use crate::ports::outbound::{AdministrationRepository, LabelFilter, ProgressReporter};
use crate::scanning::domain::{LabelRequest, LabelScope};
use crate::shared::error::{ExitCode, HarborError};
use crate::shared::Result;
use anyhow::Context;

/// Create request; project labels must name their project
fn create_request(
    name: String,
    description: Option<String>,
    color: Option<String>,
    scope: LabelScope,
    project_id: Option<i64>,
) -> Result<LabelRequest> {
    let project_id = match (scope, project_id) {
        (LabelScope::Project, None) => {
            return Err(HarborError::Validation {
                message: "--project-id is required for project labels (--scope p)".to_string(),
            }
            .into())
        }
        (LabelScope::Project, id) => id,
        (LabelScope::Global, _) => None,
    };
    Ok(LabelRequest {
        name: Some(name),
        description,
        color,
        scope: Some(scope.as_str().to_string()),
        project_id,
    })
}

pub fn run(command: LabelCommand, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        LabelCommand::List {
            page,
            page_size,
            name,
            scope,
            project_id,
        } => {
            let filter = LabelFilter {
                page,
                page_size,
                name,
                scope,
                project_id,
            };
            let labels = ctx
                .harbor()?
                .list_labels(&filter)
                .context("failed to list labels")?;
            if labels.is_empty() {
                ctx.reporter().report("No labels found");
                return Ok(ExitCode::Success);
            }
            ctx.emit(&ReadModelBuilder::labels(&labels)?)?;
        }
        LabelCommand::Create {
            name,
            description,
            color,
            scope,
            project_id,
        } => {
            let request = create_request(name.clone(), description, color, scope, project_id)?;
            let label = ctx.harbor()?.create_label(&request).map_err(|e| {
                let conflict = e
                    .downcast_ref::<HarborError>()
                    .is_some_and(HarborError::is_conflict);
                if conflict {
                    e.context(format!("label '{}' already exists", name))
                } else {
                    e.context(format!("failed to create label {}", name))
                }
            })?;
            ctx.reporter().report_completion(&format!(
                "Label '{}' created (ID: {})",
                label.name, label.id
            ));
            ctx.emit(&ReadModelBuilder::label(&label)?)?;
        }
        LabelCommand::Get { id } => {
            let label = ctx
                .harbor()?
                .get_label(id)
                .with_context(|| format!("failed to get label {}", id))?;
            ctx.emit(&ReadModelBuilder::label(&label)?)?;
        }
        LabelCommand::Update {
            id,
            name,
            description,
            color,
        } => {
            let request = LabelRequest {
                name,
                description,
                color,
                ..Default::default()
            };
            if request.is_empty() {
                return Err(HarborError::Validation {
                    message: format!("no changes given for label {}", id),
                }
                .into());
            }
            ctx.harbor()?
                .update_label(id, &request)
                .with_context(|| format!("failed to update label {}", id))?;
            ctx.reporter()
                .report_completion(&format!("Label {} updated", id));
        }
        LabelCommand::Delete { id, yes } => {
            if !yes {
                return Err(HarborError::Validation {
                    message: format!("refusing to delete label {} without --yes", id),
                }
                .into());
            }
            ctx.harbor()?
                .delete_label(id)
                .with_context(|| format!("failed to delete label {}", id))?;
            ctx.reporter()
                .report_completion(&format!("Label {} deleted", id));
        }
    }
    Ok(ExitCode::Success)
}
