use hrbcli::adapters::inbound::{dispatch, CommandContext};
use hrbcli::cli::{Args, Command};
use hrbcli::config::{default_config_path, load_config, ConfigFile, ResolvedConfig};
use hrbcli::ports::outbound::ProgressReporter;
use hrbcli::shared::error::{ExitCode, HarborError};
use hrbcli::shared::Result;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    // Clap exits with code 2 on usage errors and 0 for --help/--version
    let args = Args::parse_args();

    match run(args) {
        Ok(code) => process::exit(code.as_i32()),
        Err(e) => {
            eprintln!("\n❌ An error occurred:\n");
            eprintln!("{}", e);

            for cause in e.chain().skip(1) {
                eprintln!("\nCaused by: {}", cause);
            }

            if let Some(hint) = api_hint(&e) {
                eprintln!("\n💡 Hint: {}", hint);
            }

            eprintln!();
            process::exit(exit_code_for(&e).as_i32());
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let explicit = args.config.is_some();
    let config_path = args.config.clone().or_else(default_config_path);

    // `config init` and `config set` may create the file named by --config
    let must_exist = explicit && !matches!(args.command, Command::Config(_));
    let config_file = match &config_path {
        Some(path) => load_config(path, must_exist)?,
        None => ConfigFile::default(),
    };

    let overrides = args.overrides();
    let settings = ResolvedConfig::resolve(&config_file, &overrides)?;
    init_tracing(settings.output.debug);

    let ctx = CommandContext::new(settings, config_file, config_path, overrides);
    let reporter = ctx.reporter();
    for key in ctx.config_file().unknown_keys() {
        reporter.report_warning(&format!("Unknown config field '{}' will be ignored", key));
    }

    dispatch(args.command, &ctx)
}

/// Logs go to stderr; `--debug` enables this crate's debug output,
/// otherwise `RUST_LOG` or `warn` applies.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("hrbcli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn exit_code_for(error: &anyhow::Error) -> ExitCode {
    let validation = error.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<HarborError>(),
            Some(HarborError::Validation { .. })
        )
    });
    if validation {
        ExitCode::InvalidArguments
    } else {
        ExitCode::ApplicationError
    }
}

/// Extra guidance for remote status codes users can act on
fn api_hint(error: &anyhow::Error) -> Option<&'static str> {
    let api = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<HarborError>())?;
    if api.is_unauthorized() {
        Some("Check --username and --password (or HARBOR_USERNAME / HARBOR_PASSWORD)")
    } else if api.is_not_found() {
        Some("Check the project, repository and tag or digest names")
    } else {
        None
    }
}
