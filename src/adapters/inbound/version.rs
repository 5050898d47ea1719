use super::CommandContext;
use crate::application::read_models::ReadModelBuilder;
use crate::shared::error::ExitCode;
use crate::shared::Result;

/// Prints the client version; needs no Harbor connection
pub fn run(ctx: &CommandContext) -> Result<ExitCode> {
    ctx.emit(&ReadModelBuilder::version()?)?;
    Ok(ExitCode::Success)
}
