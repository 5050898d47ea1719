use super::CommandContext;
use crate::adapters::outbound::filesystem::ReportArchive;
use crate::application::dto::ReportsRequest;
use crate::application::factories::FormatterFactory;
use crate::application::read_models::ReadModelBuilder;
use crate::application::use_cases::{
    AggregateReportsUseCase, RunningScansUseCase, TriggerScansUseCase,
};
use crate::cli::ScannerCommand;
use crate::ports::outbound::ProgressReporter;
use crate::scanning::domain::{ProjectRepository, ReportMode};
use crate::shared::error::ExitCode;
use crate::shared::Result;
use std::path::Path;

pub fn run(command: ScannerCommand, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        ScannerCommand::Running { target } => running(ctx, &target),
        ScannerCommand::Scan { target, scan_type } => scan(ctx, &target, scan_type),
        ScannerCommand::Reports {
            target,
            report_type,
            summary,
            sort,
            reverse,
            output_dir,
        } => {
            let selector = ProjectRepository::parse(&target)?;
            let request =
                ReportsRequest::new(selector, report_type, summary).with_sort(sort, reverse);
            reports(ctx, &request, output_dir.as_deref())
        }
    }
}

fn running(ctx: &CommandContext, target: &str) -> Result<ExitCode> {
    let selector = ProjectRepository::parse(target)?;
    let scans = RunningScansUseCase::new(ctx.harbor()?).execute(&selector)?;

    if scans.is_empty() {
        ctx.reporter().report("No running scans");
        return Ok(ExitCode::Success);
    }
    ctx.emit(&ReadModelBuilder::running_scans(&scans)?)?;
    Ok(ExitCode::Success)
}

fn scan(ctx: &CommandContext, target: &str, scan_type: Option<ReportMode>) -> Result<ExitCode> {
    let selector = ProjectRepository::parse(target)?;
    let reporter = ctx.reporter();
    let summary = TriggerScansUseCase::new(ctx.harbor()?, ctx.reporter())
        .execute(&selector, scan_type)?;

    match (summary.triggered, summary.failed) {
        (0, 0) => reporter.report("No artifacts found"),
        (triggered, 0) => reporter.report_completion(&format!("Triggered {} scans", triggered)),
        (triggered, failed) => reporter.report_warning(&format!(
            "Triggered {} scans, {} failed",
            triggered, failed
        )),
    }
    Ok(ExitCode::Success)
}

fn reports(
    ctx: &CommandContext,
    request: &ReportsRequest,
    output_dir: Option<&Path>,
) -> Result<ExitCode> {
    let reporter = ctx.reporter();
    let entries = AggregateReportsUseCase::new(ctx.harbor()?, ctx.reporter()).execute(request)?;

    if let Some(dir) = output_dir {
        let format = ctx.output().format;
        let archive = ReportArchive::create(dir, format, FormatterFactory::create_for_files(format))?;
        for entry in &entries {
            let path = archive.store(entry, request.summary, request.mode)?;
            tracing::debug!(path = %path.display(), "report written");
        }
        reporter.report_completion(&format!(
            "Wrote {} reports to {}",
            entries.len(),
            dir.display()
        ));
        return Ok(ExitCode::Success);
    }

    if entries.is_empty() {
        reporter.report("No reports found");
        return Ok(ExitCode::Success);
    }
    ctx.emit(&ReadModelBuilder::reports(
        &entries,
        request.summary,
        request.mode,
    )?)?;
    Ok(ExitCode::Success)
}
