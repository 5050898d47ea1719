use super::CommandContext;
use crate::application::factories::{PresenterFactory, PresenterType};
use crate::application::read_models::{OutputDocument, TableView};
use crate::cli::ConfigCommand;
use crate::config::{save_config, ConfigFile, ConfigKey, DEFAULT_API_VERSION};
use crate::ports::outbound::ProgressReporter;
use crate::shared::error::{ExitCode, HarborError};
use crate::shared::Result;
use std::collections::BTreeMap;

pub fn run(command: ConfigCommand, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        ConfigCommand::Init => init(ctx),
        ConfigCommand::View => view(ctx),
        ConfigCommand::Get { key } => get(ctx, key),
        ConfigCommand::Set { key, value } => set(ctx, key, &value),
    }
}

/// Applies the connection flags to `file` for `config init`
fn apply_init_overrides(file: &mut ConfigFile, ctx: &CommandContext) -> Result<()> {
    let overrides = ctx.overrides();
    let url = overrides
        .harbor_url
        .clone()
        .filter(|u| !u.is_empty())
        .ok_or_else(|| HarborError::Validation {
            message: "config init requires --harbor-url (or HARBOR_URL)".to_string(),
        })?;

    file.set(ConfigKey::HarborUrl, &url)?;
    if let Some(username) = &overrides.username {
        file.set(ConfigKey::Username, username)?;
    }
    let api_version = overrides
        .api_version
        .clone()
        .or_else(|| file.api_version.clone())
        .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
    file.set(ConfigKey::ApiVersion, &api_version)?;
    if overrides.insecure {
        file.insecure = Some(true);
    }
    if let Some(format) = overrides.output {
        file.set(ConfigKey::OutputFormat, &format.to_string())?;
    }
    Ok(())
}

fn init(ctx: &CommandContext) -> Result<ExitCode> {
    let path = ctx.config_path()?;
    let mut file = ctx.config_file().clone();
    apply_init_overrides(&mut file, ctx)?;
    save_config(path, &file)?;

    let reporter = ctx.reporter();
    reporter.report_completion(&format!("Configuration saved to {}", path.display()));
    if ctx.overrides().password.is_some() {
        reporter.report_warning(
            "The password is not saved; set HARBOR_PASSWORD or pass --password on each call",
        );
    }
    Ok(ExitCode::Success)
}

fn view(ctx: &CommandContext) -> Result<ExitCode> {
    let entries = ctx.config_file().entries();
    let data: BTreeMap<&str, &str> = entries
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    ctx.emit(&OutputDocument::new(&data, TableView::key_value(entries.clone()))?)?;
    Ok(ExitCode::Success)
}

fn get(ctx: &CommandContext, key: ConfigKey) -> Result<ExitCode> {
    let value = ctx
        .config_file()
        .get(key)
        .ok_or_else(|| HarborError::InvalidConfig {
            message: format!("{} is not set", key),
        })?;
    PresenterFactory::create(PresenterType::Stdout).present(&format!("{}\n", value))?;
    Ok(ExitCode::Success)
}

fn set(ctx: &CommandContext, key: ConfigKey, value: &str) -> Result<ExitCode> {
    let path = ctx.config_path()?;
    let mut file = ctx.config_file().clone();
    file.set(key, value)?;
    save_config(path, &file)?;

    ctx.reporter()
        .report_completion(&format!("Set {} = {}", key, value));
    Ok(ExitCode::Success)
}
