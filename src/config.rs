//! Configuration file support for hrbcli.
//!
//! Provides YAML-based configuration through `~/.hrbcli.yaml` (or `--config`),
//! including the file schema, loading, saving, validation and the merge of
//! file values with command-line flags and environment variables.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::adapters::outbound::network::ClientOptions;
use crate::application::dto::{OutputFormat, OutputSettings};
use crate::shared::error::HarborError;
use crate::shared::security::validate_not_symlink;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = ".hrbcli.yaml";
pub const DEFAULT_API_VERSION: &str = "v2.0";
const PASSWORD_MASK: &str = "********";

/// Default config location, `~/.hrbcli.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_FILENAME))
}

/// Top-level configuration file schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub harbor_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Read for compatibility, never written back
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_color: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
    /// Captures unknown fields for warnings; kept on rewrite.
    #[serde(flatten)]
    pub unknown_fields: BTreeMap<String, serde_yaml_ng::Value>,
}

/// Keys accepted by `config get` and `config set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    HarborUrl,
    Username,
    Password,
    ApiVersion,
    Insecure,
    OutputFormat,
    NoColor,
    Debug,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 8] = [
        ConfigKey::HarborUrl,
        ConfigKey::Username,
        ConfigKey::Password,
        ConfigKey::ApiVersion,
        ConfigKey::Insecure,
        ConfigKey::OutputFormat,
        ConfigKey::NoColor,
        ConfigKey::Debug,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::HarborUrl => "harbor_url",
            ConfigKey::Username => "username",
            ConfigKey::Password => "password",
            ConfigKey::ApiVersion => "api_version",
            ConfigKey::Insecure => "insecure",
            ConfigKey::OutputFormat => "output_format",
            ConfigKey::NoColor => "no_color",
            ConfigKey::Debug => "debug",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = HarborError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| HarborError::Validation {
                message: format!(
                    "Unknown configuration key '{}'. Available keys: {}",
                    s,
                    ConfigKey::ALL.map(ConfigKey::as_str).join(", ")
                ),
            })
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn parse_bool(key: ConfigKey, value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(HarborError::InvalidConfig {
            message: format!("{} must be 'true' or 'false', got '{}'", key, value),
        }
        .into()),
    }
}

impl ConfigFile {
    /// Returns the stored value for display; the password is masked
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::HarborUrl => self.harbor_url.clone(),
            ConfigKey::Username => self.username.clone(),
            ConfigKey::Password => self
                .password
                .as_ref()
                .filter(|p| !p.is_empty())
                .map(|_| PASSWORD_MASK.to_string()),
            ConfigKey::ApiVersion => self.api_version.clone(),
            ConfigKey::Insecure => self.insecure.map(|v| v.to_string()),
            ConfigKey::OutputFormat => self.output_format.clone(),
            ConfigKey::NoColor => self.no_color.map(|v| v.to_string()),
            ConfigKey::Debug => self.debug.map(|v| v.to_string()),
        }
    }

    /// Sets one key from its textual form and validates the result
    ///
    /// # Errors
    /// - The password key, which is never stored on disk
    /// - Booleans other than `true`/`false`
    /// - Values rejected by [`validate_config`]
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        match key {
            ConfigKey::HarborUrl => self.harbor_url = Some(value.to_string()),
            ConfigKey::Username => self.username = Some(value.to_string()),
            ConfigKey::Password => {
                return Err(HarborError::InvalidConfig {
                    message: "the password is not stored in the config file; use HARBOR_PASSWORD or --password".to_string(),
                }
                .into())
            }
            ConfigKey::ApiVersion => self.api_version = Some(value.to_string()),
            ConfigKey::Insecure => self.insecure = Some(parse_bool(key, value)?),
            ConfigKey::OutputFormat => self.output_format = Some(value.to_string()),
            ConfigKey::NoColor => self.no_color = Some(parse_bool(key, value)?),
            ConfigKey::Debug => self.debug = Some(parse_bool(key, value)?),
        }
        validate_config(self)
    }

    /// Every known key with its display value, `""` when unset
    pub fn entries(&self) -> Vec<(String, String)> {
        ConfigKey::ALL
            .into_iter()
            .map(|key| (key.to_string(), self.get(key).unwrap_or_default()))
            .collect()
    }

    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.unknown_fields.keys().map(String::as_str)
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Loads the config file if present
///
/// A missing file at the default location yields defaults; a missing file
/// named with `--config` is an error.
pub fn load_config(path: &Path, explicit: bool) -> Result<ConfigFile> {
    if !explicit && !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ConfigFile::default());
    }
    load_config_from_path(path)
}

/// Writes the config file, readable by the owner only on Unix
pub fn save_config(path: &Path, config: &ConfigFile) -> Result<()> {
    validate_config(config)?;
    if std::fs::symlink_metadata(path).is_ok() {
        validate_not_symlink(path, "write")?;
    }

    let content = serde_yaml_ng::to_string(config).context("failed to serialize configuration")?;
    write_private(path, &content).map_err(|e| HarborError::FileWriteError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "configuration saved");
    Ok(())
}

#[cfg(unix)]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    use std::io::Write;
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(content.as_bytes())?;
    // mode() only applies on creation
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    std::fs::write(path, content)
}

fn validate_harbor_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        return Err(HarborError::InvalidConfig {
            message: "harbor_url must not be empty".to_string(),
        }
        .into());
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(HarborError::InvalidConfig {
            message: format!("harbor_url must start with http:// or https://, got '{}'", url),
        }
        .into());
    }
    Ok(())
}

/// Validate the loaded configuration.
pub fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(url) = &config.harbor_url {
        validate_harbor_url(url)?;
    }
    if let Some(format) = &config.output_format {
        format
            .parse::<OutputFormat>()
            .map_err(|message| HarborError::InvalidConfig { message })?;
    }
    Ok(())
}

/// Values given on the command line or through `HARBOR_*` variables
///
/// Clap has already applied flag-over-environment precedence.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub harbor_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_version: Option<String>,
    pub insecure: bool,
    pub output: Option<OutputFormat>,
    pub no_color: bool,
    pub debug: bool,
}

/// Effective settings of one invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub harbor_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_version: String,
    pub insecure: bool,
    pub output: OutputSettings,
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

impl ResolvedConfig {
    /// Merges overrides over file values over defaults
    pub fn resolve(file: &ConfigFile, overrides: &ConfigOverrides) -> Result<Self> {
        let format = match overrides.output {
            Some(format) => format,
            None => match &file.output_format {
                Some(raw) => raw
                    .parse()
                    .map_err(|message| HarborError::InvalidConfig { message })?,
                None => OutputFormat::default(),
            },
        };

        Ok(Self {
            harbor_url: non_empty(overrides.harbor_url.as_ref())
                .or_else(|| non_empty(file.harbor_url.as_ref())),
            username: non_empty(overrides.username.as_ref())
                .or_else(|| non_empty(file.username.as_ref())),
            password: non_empty(overrides.password.as_ref())
                .or_else(|| non_empty(file.password.as_ref())),
            api_version: non_empty(overrides.api_version.as_ref())
                .or_else(|| non_empty(file.api_version.as_ref()))
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            insecure: overrides.insecure || file.insecure.unwrap_or(false),
            output: OutputSettings::new(
                format,
                overrides.no_color || file.no_color.unwrap_or(false),
                overrides.debug || file.debug.unwrap_or(false),
            ),
        })
    }

    /// Connection settings for the HTTP client
    ///
    /// # Errors
    /// `ConfigMissing` when no Harbor URL is configured anywhere, or
    /// `InvalidConfig` for a URL without an http(s) scheme.
    pub fn client_options(&self) -> Result<ClientOptions> {
        let harbor_url = self.harbor_url.clone().ok_or_else(|| HarborError::ConfigMissing {
            key: "Harbor URL".to_string(),
            hint: "Run `hrbcli config init --harbor-url <URL>` or set HARBOR_URL".to_string(),
        })?;
        validate_harbor_url(&harbor_url)?;

        Ok(ClientOptions {
            harbor_url,
            api_version: self.api_version.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            insecure: self.insecure,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_valid_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(
            &config_path,
            r#"
harbor_url: https://harbor.example.com
username: admin
password: secret
api_version: v2.0
insecure: true
output_format: json
"#,
        )
        .unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.harbor_url.as_deref(), Some("https://harbor.example.com"));
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.insecure, Some(true));
        assert_eq!(config.output_format.as_deref(), Some("json"));
        assert!(config.unknown_fields.is_empty());
    }

    #[test]
    fn test_unknown_fields_are_collected() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "harbor_url: http://h\ndefault_project: library\n").unwrap();

        let config = load_config_from_path(&config_path).unwrap();
        assert_eq!(config.unknown_keys().collect::<Vec<_>>(), vec!["default_project"]);
    }

    #[test]
    fn test_invalid_yaml_fails() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "harbor_url: [unclosed").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_invalid_output_format_rejected() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yaml");
        fs::write(&config_path, "output_format: xml\n").unwrap();

        let err = load_config_from_path(&config_path).unwrap_err();
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_invalid_url_scheme_rejected() {
        let config = ConfigFile {
            harbor_url: Some("harbor.example.com".to_string()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_missing_default_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        assert_eq!(load_config(&path, false).unwrap(), ConfigFile::default());
        assert!(load_config(&path, true).is_err());
    }

    #[test]
    fn test_empty_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "\n").unwrap();
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_save_never_writes_password() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        let config = ConfigFile {
            harbor_url: Some("https://harbor.example.com".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        };
        save_config(&path, &config).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("harbor_url"));
        assert!(!written.contains("secret"));
        assert!(!written.contains("password"));
    }

    #[cfg(unix)]
    #[test]
    fn test_save_uses_owner_only_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        save_config(&path, &ConfigFile::default()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "default_project: library\n").unwrap();

        let mut config = load_config(&path, true).unwrap();
        config.set(ConfigKey::Username, "admin").unwrap();
        save_config(&path, &config).unwrap();

        let reloaded = load_config(&path, true).unwrap();
        assert_eq!(reloaded.username.as_deref(), Some("admin"));
        assert!(reloaded.unknown_fields.contains_key("default_project"));
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();
        config.set(ConfigKey::Insecure, "true").unwrap();
        assert_eq!(config.get(ConfigKey::Insecure).as_deref(), Some("true"));

        assert!(config.set(ConfigKey::Debug, "yes").is_err());
        assert!(config.set(ConfigKey::OutputFormat, "xml").is_err());
        assert!(config.set(ConfigKey::Password, "secret").is_err());
    }

    #[test]
    fn test_password_is_masked() {
        let config = ConfigFile {
            password: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.get(ConfigKey::Password).as_deref(), Some(PASSWORD_MASK));
        let entries = config.entries();
        assert_eq!(entries.len(), ConfigKey::ALL.len());
        assert!(entries.iter().all(|(_, v)| v != "secret"));
    }

    #[test]
    fn test_config_key_parse() {
        assert_eq!("harbor_url".parse::<ConfigKey>().unwrap(), ConfigKey::HarborUrl);
        let err = "colour".parse::<ConfigKey>().unwrap_err();
        assert!(err.to_string().contains("Unknown configuration key 'colour'"));
    }

    #[test]
    fn test_resolve_precedence() {
        let file = ConfigFile {
            harbor_url: Some("https://file.example.com".to_string()),
            username: Some("file-user".to_string()),
            output_format: Some("yaml".to_string()),
            ..Default::default()
        };

        let resolved = ResolvedConfig::resolve(&file, &ConfigOverrides::default()).unwrap();
        assert_eq!(resolved.harbor_url.as_deref(), Some("https://file.example.com"));
        assert_eq!(resolved.api_version, DEFAULT_API_VERSION);
        assert_eq!(resolved.output.format, OutputFormat::Yaml);

        let overrides = ConfigOverrides {
            harbor_url: Some("https://flag.example.com".to_string()),
            output: Some(OutputFormat::Json),
            ..Default::default()
        };
        let resolved = ResolvedConfig::resolve(&file, &overrides).unwrap();
        assert_eq!(resolved.harbor_url.as_deref(), Some("https://flag.example.com"));
        assert_eq!(resolved.username.as_deref(), Some("file-user"));
        assert_eq!(resolved.output.format, OutputFormat::Json);
    }

    #[test]
    fn test_client_options_require_url() {
        let resolved =
            ResolvedConfig::resolve(&ConfigFile::default(), &ConfigOverrides::default()).unwrap();
        let err = resolved.client_options().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HarborError>(),
            Some(HarborError::ConfigMissing { .. })
        ));
    }
}
