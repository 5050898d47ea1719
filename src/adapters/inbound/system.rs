use super::CommandContext;
use crate::application::read_models::ReadModelBuilder;
use crate::cli::SystemCommand;
use crate::ports::outbound::{CatalogRepository, ProgressReporter};
use crate::shared::error::ExitCode;
use crate::shared::Result;
use anyhow::Context;

pub fn run(command: SystemCommand, ctx: &CommandContext) -> Result<ExitCode> {
    let harbor = ctx.harbor()?;
    match command {
        SystemCommand::Info { with_storage } => {
            let info = harbor
                .system_info(with_storage)
                .context("failed to get system info")?;
            ctx.emit(&ReadModelBuilder::system_info(&info)?)?;
        }
        SystemCommand::Health => {
            let health = harbor.health().context("failed to get health status")?;
            ctx.emit(&ReadModelBuilder::health(&health)?)?;
            if !health.is_healthy() {
                ctx.reporter()
                    .report_warning(&format!("Harbor reports status {}", health.status));
            }
        }
    }
    Ok(ExitCode::Success)
}
