use crate::adapters::outbound::console::StderrProgressReporter;
use crate::adapters::outbound::network::{HarborClient, HarborRepository};
use crate::application::dto::OutputSettings;
use crate::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use crate::application::read_models::OutputDocument;
use crate::config::{ConfigFile, ConfigOverrides, ResolvedConfig};
use crate::ports::outbound::ReportFormatter;
use crate::shared::error::HarborError;
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// Per-invocation state shared by every command handler
///
/// Built once in `main` from the parsed arguments and the config file. The
/// Harbor client is created lazily so commands that fail argument checks
/// never touch the network or require a URL.
pub struct CommandContext {
    settings: ResolvedConfig,
    config_file: ConfigFile,
    config_path: Option<PathBuf>,
    overrides: ConfigOverrides,
}

impl CommandContext {
    pub fn new(
        settings: ResolvedConfig,
        config_file: ConfigFile,
        config_path: Option<PathBuf>,
        overrides: ConfigOverrides,
    ) -> Self {
        Self {
            settings,
            config_file,
            config_path,
            overrides,
        }
    }

    pub fn output(&self) -> OutputSettings {
        self.settings.output
    }

    pub fn config_file(&self) -> &ConfigFile {
        &self.config_file
    }

    pub fn overrides(&self) -> &ConfigOverrides {
        &self.overrides
    }

    /// Location of the config file read at startup
    pub fn config_path(&self) -> Result<&Path> {
        self.config_path.as_deref().ok_or_else(|| {
            HarborError::InvalidConfig {
                message: "cannot determine the home directory; pass --config <FILE>".to_string(),
            }
            .into()
        })
    }

    pub fn reporter(&self) -> StderrProgressReporter {
        StderrProgressReporter::with_color(!self.settings.output.no_color)
    }

    /// Builds the Harbor adapter from the resolved connection settings
    ///
    /// # Errors
    /// `ConfigMissing` when no Harbor URL is configured
    pub fn harbor(&self) -> Result<HarborRepository> {
        let client = HarborClient::new(&self.settings.client_options()?)?;
        tracing::debug!(base_url = client.base_url(), "using Harbor API");
        Ok(HarborRepository::new(client))
    }

    /// Renders `document` in the configured format to stdout
    pub fn emit(&self, document: &OutputDocument) -> Result<()> {
        self.emit_with(FormatterFactory::create(self.output().format), document)
    }

    pub fn emit_with(
        &self,
        formatter: Box<dyn ReportFormatter>,
        document: &OutputDocument,
    ) -> Result<()> {
        let content = formatter.format(document)?;
        PresenterFactory::create(PresenterType::Stdout).present(&content)
    }
}
