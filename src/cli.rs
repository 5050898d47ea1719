use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::application::dto::OutputFormat;
use crate::config::{ConfigKey, ConfigOverrides};
use crate::scanning::domain::{LabelScope, ReportMode, Severity, DEFAULT_REGISTRY_TYPE};

/// Command-line client for the Harbor container registry
#[derive(Parser, Debug)]
#[command(name = "hrbcli")]
#[command(version)]
#[command(
    about = "Command-line client for the Harbor container registry",
    long_about = None
)]
pub struct Args {
    /// Config file (default: ~/.hrbcli.yaml)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Harbor server URL
    #[arg(long, global = true, env = "HARBOR_URL", value_name = "URL")]
    pub harbor_url: Option<String>,

    /// Harbor username
    #[arg(long, global = true, env = "HARBOR_USERNAME")]
    pub username: Option<String>,

    /// Harbor password
    #[arg(long, global = true, env = "HARBOR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Harbor API version (default: v2.0)
    #[arg(long, global = true, env = "HARBOR_API_VERSION")]
    pub api_version: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true, env = "HARBOR_INSECURE")]
    pub insecure: bool,

    /// Output format: table, json or yaml
    #[arg(short, long, global = true, value_name = "FORMAT")]
    pub output: Option<OutputFormat>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Flag and environment values layered over the config file
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            harbor_url: self.harbor_url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            api_version: self.api_version.clone(),
            insecure: self.insecure,
            output: self.output,
            no_color: self.no_color,
            debug: self.debug,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage hrbcli configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),

    /// Manage repositories
    #[command(subcommand, alias = "repository")]
    Repo(RepoCommand),

    /// Manage artifacts
    #[command(subcommand)]
    Artifact(ArtifactCommand),

    /// Scan artifacts and collect scan reports
    #[command(subcommand)]
    Scanner(ScannerCommand),

    /// Harbor system information
    #[command(subcommand)]
    System(SystemCommand),

    /// Manage registry endpoints
    #[command(subcommand)]
    Registry(RegistryCommand),

    /// Manage replication policies and executions
    #[command(subcommand)]
    Replication(ReplicationCommand),

    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Manage labels
    #[command(subcommand)]
    Label(LabelCommand),

    /// Print version information
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Write a config file from --harbor-url, --username, --api-version, --insecure and -o
    Init,

    /// Show every configuration value
    #[command(alias = "list")]
    View,

    /// Show one configuration value
    Get {
        /// harbor_url, username, password, api_version, insecure, output_format, no_color or debug
        key: ConfigKey,
    },

    /// Set one configuration value
    Set { key: ConfigKey, value: String },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// List projects
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        /// Harbor query, e.g. name=~library
        #[arg(long)]
        query: Option<String>,
    },

    /// Show project details
    Get { name: String },

    /// Create a project
    Create(ProjectCreateArgs),

    /// Change project settings; only the given flags are sent
    Update(ProjectUpdateArgs),

    /// Delete a project
    Delete {
        name: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
        /// Delete even when the project still has repositories
        #[arg(long)]
        force: bool,
    },

    /// Exit 0 when the project exists, 1 when it does not
    Exists { name: String },
}

#[derive(ClapArgs, Debug)]
pub struct ProjectCreateArgs {
    pub name: String,
    /// Make the project public
    #[arg(long)]
    pub public: bool,
    /// Storage quota, e.g. 10G or 500M; -1 is unlimited
    #[arg(long, value_name = "SIZE", allow_hyphen_values = true)]
    pub storage_limit: Option<String>,
    /// Only allow signed images
    #[arg(long)]
    pub enable_content_trust: bool,
    /// Block pulls of images with vulnerabilities at or above --severity
    #[arg(long)]
    pub prevent_vulnerable: bool,
    /// Threshold for --prevent-vulnerable
    #[arg(long, default_value = "low")]
    pub severity: Severity,
    /// Scan images on push
    #[arg(long)]
    pub auto_scan: bool,
    /// Use the system CVE allowlist
    #[arg(long)]
    pub reuse_sys_cve: bool,
    /// Create a proxy cache of a registry endpoint
    #[arg(long)]
    pub proxy_cache: bool,
    /// Registry endpoint for --proxy-cache
    #[arg(long, conflicts_with = "registry_name")]
    pub registry_id: Option<i64>,
    /// Registry endpoint for --proxy-cache, looked up by name
    #[arg(long)]
    pub registry_name: Option<String>,
    /// Proxy bandwidth limit in KB/s; -1 is unlimited
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub proxy_speed: i64,
}

#[derive(ClapArgs, Debug)]
pub struct ProjectUpdateArgs {
    pub name: String,
    #[arg(long, value_name = "BOOL")]
    pub public: Option<bool>,
    /// Storage quota, e.g. 10G or 500M; -1 is unlimited
    #[arg(long, value_name = "SIZE", allow_hyphen_values = true)]
    pub storage_limit: Option<String>,
    #[arg(long, value_name = "BOOL")]
    pub enable_content_trust: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub prevent_vulnerable: Option<bool>,
    #[arg(long)]
    pub severity: Option<Severity>,
    #[arg(long, value_name = "BOOL")]
    pub auto_scan: Option<bool>,
    #[arg(long, value_name = "BOOL")]
    pub reuse_sys_cve: Option<bool>,
}

#[derive(Subcommand, Debug)]
pub enum RepoCommand {
    /// List repositories in a project
    #[command(alias = "ls")]
    List {
        project: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
        /// Keep repositories whose name contains this text
        #[arg(long)]
        filter: Option<String>,
        /// Show pull counts and timestamps
        #[arg(long)]
        detail: bool,
    },

    /// Show repository details
    Get {
        /// <project>/<repository>
        name: String,
    },

    /// List tags of a repository
    Tags {
        /// <project>/<repository>
        name: String,
        /// Show the immutable flag
        #[arg(long)]
        detail: bool,
        /// Keep tags whose name contains this text
        #[arg(long)]
        filter: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
    },

    /// Delete a repository, or a single artifact when a tag or digest is given
    Delete {
        /// <project>/<repository>[:tag|@digest]
        name: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ArtifactCommand {
    /// List artifacts of a project or repository
    #[command(alias = "ls")]
    List {
        /// <project>[/<repository>]
        target: String,
        #[arg(long)]
        with_scan_overview: bool,
    },

    /// Show artifact details
    Get {
        /// <project>/<repository>[:tag|@digest]
        reference: String,
        /// Include the tag list
        #[arg(long)]
        tags: bool,
    },

    /// Trigger a scan of an artifact
    Scan {
        /// <project>/<repository>[:tag|@digest]
        reference: String,
        /// vulnerability or sbom
        #[arg(long, value_name = "TYPE")]
        scan_type: Option<ReportMode>,
        /// Wait for the scan to finish
        #[arg(long)]
        wait: bool,
        /// Seconds to wait with --wait; 0 waits indefinitely
        #[arg(long, default_value_t = 300, value_name = "SECS")]
        timeout: u64,
    },

    /// Show vulnerabilities of an artifact
    #[command(alias = "vulns")]
    Vulnerabilities {
        /// <project>/<repository>[:tag|@digest]
        reference: String,
        /// Only show findings at or above this severity; exits 1 if any remain
        #[arg(long)]
        severity: Option<Severity>,
        /// Show the per-scanner overview instead of individual findings
        #[arg(long)]
        summary: bool,
    },

    /// Show the SBOM of an artifact
    Sbom {
        /// <project>/<repository>[:tag|@digest]
        reference: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScannerCommand {
    /// List artifacts with a scan in progress
    Running {
        /// <project>[/<repository>]
        target: String,
    },

    /// Trigger scans for every artifact of a project or repository
    Scan {
        /// <project>[/<repository>]
        target: String,
        /// vulnerability or sbom
        #[arg(long, value_name = "TYPE")]
        scan_type: Option<ReportMode>,
    },

    /// Collect scan reports across a project or repository
    Reports {
        /// <project>[/<repository>]
        target: String,
        /// Report type: vulnerability or sbom
        #[arg(long = "type", default_value = "vulnerability", value_name = "TYPE")]
        report_type: ReportMode,
        /// Use the scan overview instead of full reports
        #[arg(long)]
        summary: bool,
        /// severity, repository, reference, critical, high, medium, low, total or vuln_count
        #[arg(long, default_value = "", hide_default_value = true, value_name = "KEY")]
        sort: String,
        /// Reverse the sort order
        #[arg(long)]
        reverse: bool,
        /// Write one file per report into this directory instead of printing
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SystemCommand {
    /// Show Harbor system information
    Info {
        /// Include registry storage usage
        #[arg(long)]
        with_storage: bool,
    },

    /// Show component health
    Health,
}

#[derive(Subcommand, Debug)]
pub enum RegistryCommand {
    /// List registry endpoints
    #[command(alias = "ls")]
    List {
        /// Harbor query, e.g. name=~docker
        #[arg(long)]
        query: Option<String>,
    },

    /// Show a registry endpoint
    Get { id: i64 },

    /// Create a registry endpoint after checking that it is reachable
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[command(flatten)]
        endpoint: RegistryEndpointArgs,
    },

    /// Delete a registry endpoint
    Delete {
        id: i64,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Check that Harbor can reach a registry endpoint
    Ping {
        #[command(flatten)]
        endpoint: RegistryEndpointArgs,
    },
}

/// Connection settings of a remote registry
#[derive(ClapArgs, Debug)]
pub struct RegistryEndpointArgs {
    /// Registry URL
    #[arg(long)]
    pub url: String,
    /// Adapter type, e.g. docker-registry, docker-hub or harbor
    #[arg(long = "type", default_value = DEFAULT_REGISTRY_TYPE, value_name = "TYPE")]
    pub registry_type: String,
    /// Skip TLS verification when Harbor talks to the registry
    #[arg(long)]
    pub remote_insecure: bool,
    /// Username or access key for the registry
    #[arg(long)]
    pub access_key: Option<String>,
    /// Password or secret for --access-key
    #[arg(long, env = "HARBOR_REGISTRY_SECRET", hide_env_values = true)]
    pub access_secret: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ReplicationCommand {
    /// List replication policies
    #[command(alias = "ls")]
    List,

    /// Show a replication policy
    Get { id: i64 },

    /// Start a manual run of a policy
    Execute { policy_id: i64 },

    /// List executions, optionally of one policy
    Executions {
        policy_id: Option<i64>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        page_size: u32,
    },

    /// Show the progress of one execution
    Execution { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// List users
    #[command(alias = "ls")]
    List {
        /// Search by username
        #[arg(long)]
        search: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        /// Show the real name
        #[arg(long)]
        detail: bool,
    },

    /// Create a local user
    Create {
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        realname: Option<String>,
        #[arg(long)]
        comment: Option<String>,
        /// Password of the new user
        #[arg(long, env = "HARBOR_NEW_USER_PASSWORD", hide_env_values = true)]
        user_password: String,
        /// Grant system administrator rights
        #[arg(long)]
        admin: bool,
    },

    /// Delete a user by name
    Delete {
        username: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum LabelCommand {
    /// List labels
    #[command(alias = "ls")]
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 20)]
        page_size: u32,
        /// Filter by name
        #[arg(long)]
        name: Option<String>,
        /// g (global) or p (project)
        #[arg(long)]
        scope: Option<LabelScope>,
        /// Project of project-scoped labels
        #[arg(long)]
        project_id: Option<i64>,
    },

    /// Create a label
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Display color, e.g. #0065AB
        #[arg(long)]
        color: Option<String>,
        /// g (global) or p (project)
        #[arg(long, default_value = "g")]
        scope: LabelScope,
        /// Required with --scope p
        #[arg(long)]
        project_id: Option<i64>,
    },

    /// Show a label
    Get { id: i64 },

    /// Change a label; only the given flags are sent
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },

    /// Delete a label
    Delete {
        id: i64,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("hrbcli").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&[
            "scanner",
            "reports",
            "library",
            "-o",
            "json",
            "--harbor-url",
            "https://harbor.example.com",
        ])
        .unwrap();
        assert_eq!(args.output, Some(OutputFormat::Json));
        assert_eq!(
            args.harbor_url.as_deref(),
            Some("https://harbor.example.com")
        );
    }

    #[test]
    fn test_reports_defaults() {
        let args = parse(&["scanner", "reports", "library/app"]).unwrap();
        match args.command {
            Command::Scanner(ScannerCommand::Reports {
                target,
                report_type,
                summary,
                sort,
                reverse,
                output_dir,
            }) => {
                assert_eq!(target, "library/app");
                assert_eq!(report_type, ReportMode::Vulnerability);
                assert!(!summary);
                assert_eq!(sort, "");
                assert!(!reverse);
                assert!(output_dir.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_reports_type_and_sort() {
        let args = parse(&[
            "scanner", "reports", "library", "--type", "sbom", "--sort", "critical", "--reverse",
        ])
        .unwrap();
        match args.command {
            Command::Scanner(ScannerCommand::Reports {
                report_type,
                sort,
                reverse,
                ..
            }) => {
                assert_eq!(report_type, ReportMode::Sbom);
                assert_eq!(sort, "critical");
                assert!(reverse);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let err = parse(&["artifact", "vulnerabilities", "library/nginx", "--severity", "urgent"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_severity_is_case_insensitive() {
        let args = parse(&["artifact", "vulns", "library/nginx", "--severity", "HIGH"]).unwrap();
        match args.command {
            Command::Artifact(ArtifactCommand::Vulnerabilities { severity, .. }) => {
                assert_eq!(severity, Some(Severity::High));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_output_format_is_rejected() {
        assert!(parse(&["system", "health", "-o", "xml"]).is_err());
    }

    #[test]
    fn test_config_set_rejects_unknown_key() {
        assert!(parse(&["config", "set", "colour", "red"]).is_err());
        let args = parse(&["config", "set", "output_format", "json"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Config(ConfigCommand::Set {
                key: ConfigKey::OutputFormat,
                ..
            })
        ));
    }

    #[test]
    fn test_scan_timeout_default() {
        let args = parse(&["artifact", "scan", "library/nginx:1.25", "--wait"]).unwrap();
        match args.command {
            Command::Artifact(ArtifactCommand::Scan { wait, timeout, .. }) => {
                assert!(wait);
                assert_eq!(timeout, 300);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_repository_alias() {
        let args = parse(&["repository", "get", "library/nginx"]).unwrap();
        assert!(matches!(args.command, Command::Repo(RepoCommand::Get { .. })));
    }

    #[test]
    fn test_config_list_is_view() {
        let args = parse(&["config", "list"]).unwrap();
        assert!(matches!(args.command, Command::Config(ConfigCommand::View)));
    }

    #[test]
    fn test_project_update_tristate_flags() {
        let args = parse(&[
            "project", "update", "library", "--public", "false", "--auto-scan=true",
        ])
        .unwrap();
        match args.command {
            Command::Project(ProjectCommand::Update(update)) => {
                assert_eq!(update.public, Some(false));
                assert_eq!(update.auto_scan, Some(true));
                assert_eq!(update.enable_content_trust, None);
                assert_eq!(update.severity, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_project_create_defaults() {
        let args = parse(&["project", "create", "team", "--storage-limit", "-1"]).unwrap();
        match args.command {
            Command::Project(ProjectCommand::Create(create)) => {
                assert_eq!(create.storage_limit.as_deref(), Some("-1"));
                assert_eq!(create.severity, Severity::Low);
                assert_eq!(create.proxy_speed, -1);
                assert!(!create.public);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(parse(&[
            "project", "create", "cache", "--proxy-cache", "--registry-id", "1",
            "--registry-name", "hub",
        ])
        .is_err());
    }

    #[test]
    fn test_registry_endpoint_flags_do_not_clash_with_globals() {
        let args = parse(&[
            "--insecure",
            "registry",
            "create",
            "hub",
            "--url",
            "https://registry-1.docker.io",
            "--remote-insecure",
            "--access-key",
            "robot",
        ])
        .unwrap();
        assert!(args.insecure);
        match args.command {
            Command::Registry(RegistryCommand::Create { name, endpoint, .. }) => {
                assert_eq!(name, "hub");
                assert!(endpoint.remote_insecure);
                assert_eq!(endpoint.registry_type, DEFAULT_REGISTRY_TYPE);
                assert_eq!(endpoint.access_key.as_deref(), Some("robot"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_registry_ping_requires_url() {
        assert!(parse(&["registry", "ping"]).is_err());
    }

    #[test]
    fn test_ids_must_be_numeric() {
        let err = parse(&["registry", "get", "hub"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(parse(&["replication", "execution", "x1"]).is_err());
        assert!(parse(&["label", "delete", "one", "--yes"]).is_err());
    }

    #[test]
    fn test_replication_executions_policy_is_optional() {
        let args = parse(&["replication", "executions"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Replication(ReplicationCommand::Executions { policy_id: None, .. })
        ));
        let args = parse(&["replication", "executions", "3"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Replication(ReplicationCommand::Executions {
                policy_id: Some(3),
                ..
            })
        ));
    }

    #[test]
    fn test_user_create_requires_password() {
        let missing = parse(&["user", "create", "dev", "--email", "dev@example.com"]);
        if std::env::var_os("HARBOR_NEW_USER_PASSWORD").is_none() {
            assert!(missing.is_err());
        }
        let args = parse(&[
            "user", "create", "dev", "--email", "dev@example.com", "--user-password", "Harbor12345",
            "--admin",
        ])
        .unwrap();
        match args.command {
            Command::User(UserCommand::Create {
                user_password,
                admin,
                ..
            }) => {
                assert_eq!(user_password, "Harbor12345");
                assert!(admin);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_label_scope_values() {
        let args = parse(&["label", "create", "release"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Label(LabelCommand::Create {
                scope: LabelScope::Global,
                ..
            })
        ));
        assert!(parse(&["label", "list", "--scope", "team"]).is_err());
    }

    #[test]
    fn test_version_subcommand() {
        assert!(matches!(parse(&["version"]).unwrap().command, Command::Version));
    }

    #[test]
    fn test_overrides_carry_flags() {
        let args = parse(&["--insecure", "--no-color", "system", "info"]).unwrap();
        let overrides = args.overrides();
        assert!(overrides.insecure);
        assert!(overrides.no_color);
        assert!(!overrides.debug);
    }
}
