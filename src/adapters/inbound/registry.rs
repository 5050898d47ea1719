use super::CommandContext;
use crate::application::read_models::ReadModelBuilder;
use crate::cli::{RegistryCommand, RegistryEndpointArgs};
use crate::ports::outbound::{AdministrationRepository, ProgressReporter};
use crate::scanning::domain::RegistryRequest;
use crate::shared::error::{ExitCode, HarborError};
use crate::shared::Result;
use anyhow::Context;

/// Name Harbor requires on ping requests for endpoints that are not saved
const PING_NAME: &str = "ping-test";

fn endpoint_request(name: &str, endpoint: &RegistryEndpointArgs) -> RegistryRequest {
    let mut request = RegistryRequest::new(name, &endpoint.url, &endpoint.registry_type)
        .with_credential(endpoint.access_key.as_deref(), endpoint.access_secret.as_deref());
    request.insecure = endpoint.remote_insecure;
    request
}

pub fn run(command: RegistryCommand, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        RegistryCommand::List { query } => {
            let registries = ctx
                .harbor()?
                .list_registries(query.as_deref())
                .context("failed to list registries")?;
            if registries.is_empty() {
                ctx.reporter().report("No registry endpoints found");
                return Ok(ExitCode::Success);
            }
            ctx.emit(&ReadModelBuilder::registries(&registries)?)?;
        }
        RegistryCommand::Get { id } => {
            let registry = ctx
                .harbor()?
                .get_registry(id)
                .with_context(|| format!("failed to get registry {}", id))?;
            ctx.emit(&ReadModelBuilder::registry(&registry)?)?;
        }
        RegistryCommand::Create {
            name,
            description,
            endpoint,
        } => {
            let mut request = endpoint_request(&name, &endpoint);
            request.description = description;

            let harbor = ctx.harbor()?;
            if let Err(e) = harbor.ping_registry(&request) {
                ctx.reporter()
                    .report_warning(&format!("Registry {} did not answer the ping: {:#}", endpoint.url, e));
            }
            let registry = harbor
                .create_registry(&request)
                .with_context(|| format!("failed to create registry {}", name))?;
            ctx.reporter().report_completion(&format!(
                "Registry '{}' created (ID: {})",
                registry.name, registry.id
            ));
            ctx.emit(&ReadModelBuilder::registry(&registry)?)?;
        }
        RegistryCommand::Delete { id, yes } => {
            if !yes {
                return Err(HarborError::Validation {
                    message: format!("refusing to delete registry {} without --yes", id),
                }
                .into());
            }
            ctx.harbor()?
                .delete_registry(id)
                .with_context(|| format!("failed to delete registry {}", id))?;
            ctx.reporter()
                .report_completion(&format!("Registry {} deleted", id));
        }
        RegistryCommand::Ping { endpoint } => {
            ctx.harbor()?
                .ping_registry(&endpoint_request(PING_NAME, &endpoint))
                .with_context(|| format!("registry {} is not reachable", endpoint.url))?;
            ctx.reporter()
                .report_completion(&format!("Registry {} is reachable", endpoint.url));
        }
    }
    Ok(ExitCode::Success)
}
