use super::CommandContext;
use crate::application::read_models::ReadModelBuilder;
use crate::cli::ReplicationCommand;
use crate::ports::outbound::{AdministrationRepository, ListQuery, ProgressReporter};
use crate::shared::error::ExitCode;
use crate::shared::Result;
use anyhow::Context;

pub fn run(command: ReplicationCommand, ctx: &CommandContext) -> Result<ExitCode> {
    let harbor = ctx.harbor()?;
    match command {
        ReplicationCommand::List => {
            let policies = harbor
                .list_replication_policies()
                .context("failed to list replication policies")?;
            if policies.is_empty() {
                ctx.reporter().report("No replication policies found");
                return Ok(ExitCode::Success);
            }
            ctx.emit(&ReadModelBuilder::replication_policies(&policies)?)?;
        }
        ReplicationCommand::Get { id } => {
            let policy = harbor
                .get_replication_policy(id)
                .with_context(|| format!("failed to get replication policy {}", id))?;
            ctx.emit(&ReadModelBuilder::replication_policy(&policy)?)?;
        }
        ReplicationCommand::Execute { policy_id } => {
            let execution = harbor
                .start_replication(policy_id)
                .with_context(|| format!("failed to start replication policy {}", policy_id))?;
            ctx.reporter()
                .report_completion(&format!("Started execution {}", execution.id));
            ctx.emit(&ReadModelBuilder::replication_execution(&execution)?)?;
        }
        ReplicationCommand::Executions {
            policy_id,
            page,
            page_size,
        } => {
            let query = ListQuery {
                page,
                page_size,
                query: None,
            };
            let executions = harbor
                .list_replication_executions(policy_id, &query)
                .context("failed to list replication executions")?;
            if executions.is_empty() {
                ctx.reporter().report("No replication executions found");
                return Ok(ExitCode::Success);
            }
            ctx.emit(&ReadModelBuilder::replication_executions(&executions)?)?;
        }
        ReplicationCommand::Execution { id } => {
            let execution = harbor
                .get_replication_execution(id)
                .with_context(|| format!("failed to get replication execution {}", id))?;
            ctx.emit(&ReadModelBuilder::replication_execution(&execution)?)?;
        }
    }
    Ok(ExitCode::Success)
}
