/// Inbound adapters - Command handlers driving the use cases from the CLI
mod artifact;
mod config;
mod context;
mod label;
mod project;
mod registry;
mod replication;
mod repository;
mod scanner;
mod system;
mod user;
mod version;

pub use context::CommandContext;

use crate::cli::Command;
use crate::shared::error::ExitCode;
use crate::shared::Result;

/// Runs one parsed command and returns the process exit code
///
/// Errors are returned to `main`, which prints them and exits with
/// [`ExitCode::ApplicationError`]; handlers only return a non-zero code
/// directly for the severity threshold and `project exists`.
pub fn dispatch(command: Command, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        Command::Config(cmd) => config::run(cmd, ctx),
        Command::Project(cmd) => project::run(cmd, ctx),
        Command::Repo(cmd) => repository::run(cmd, ctx),
        Command::Artifact(cmd) => artifact::run(cmd, ctx),
        Command::Scanner(cmd) => scanner::run(cmd, ctx),
        Command::System(cmd) => system::run(cmd, ctx),
        Command::Registry(cmd) => registry::run(cmd, ctx),
        Command::Replication(cmd) => replication::run(cmd, ctx),
        Command::User(cmd) => user::run(cmd, ctx),
        Command::Label(cmd) => label::run(cmd, ctx),
        Command::Version => version::run(ctx),
    }
}
