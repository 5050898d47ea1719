use super::CommandContext;
use crate::application::read_models::ReadModelBuilder;
use crate::cli::UserCommand;
use crate::ports::outbound::{AdministrationRepository, ListQuery, ProgressReporter};
use crate::scanning::domain::{find_exact, UserRequest};
use crate::shared::error::{ExitCode, HarborError};
use crate::shared::Result;
use anyhow::Context;

/// Search results fetched when resolving a username to an id
const LOOKUP_PAGE_SIZE: u32 = 100;

pub fn run(command: UserCommand, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        UserCommand::List {
            search,
            page,
            page_size,
            detail,
        } => {
            let users = ctx
                .harbor()?
                .list_users(&ListQuery {
                    page,
                    page_size,
                    query: search,
                })
                .context("failed to list users")?;
            if users.is_empty() {
                ctx.reporter().report("No users found");
                return Ok(ExitCode::Success);
            }
            ctx.emit(&ReadModelBuilder::users(&users, detail)?)?;
        }
        UserCommand::Create {
            username,
            email,
            realname,
            comment,
            user_password,
            admin,
        } => {
            let request = UserRequest {
                username,
                email,
                password: user_password,
                realname,
                comment,
            };
            let harbor = ctx.harbor()?;
            let mut user = harbor
                .create_user(&request)
                .with_context(|| format!("failed to create user {}", request.username))?;
            ctx.reporter().report_completion(&format!(
                "User '{}' created (ID: {})",
                user.username, user.user_id
            ));
            if admin {
                match harbor.set_sysadmin(user.user_id, true) {
                    Ok(()) => user.sysadmin_flag = true,
                    Err(e) => ctx.reporter().report_warning(&format!(
                        "User {} was created but could not be made an administrator: {:#}",
                        user.username, e
                    )),
                }
            }
            ctx.emit(&ReadModelBuilder::user(&user)?)?;
        }
        UserCommand::Delete { username, yes } => {
            if !yes {
                return Err(HarborError::Validation {
                    message: format!("refusing to delete user {} without --yes", username),
                }
                .into());
            }
            let harbor = ctx.harbor()?;
            let candidates = harbor
                .list_users(&ListQuery {
                    page: 1,
                    page_size: LOOKUP_PAGE_SIZE,
                    query: Some(username.clone()),
                })
                .with_context(|| format!("failed to look up user {}", username))?;
            let user = find_exact(&candidates, &username)
                .ok_or_else(|| anyhow::anyhow!("user '{}' not found", username))?;
            harbor
                .delete_user(user.user_id)
                .with_context(|| format!("failed to delete user {}", username))?;
            ctx.reporter()
                .report_completion(&format!("User {} deleted", username));
        }
    }
    Ok(ExitCode::Success)
}
