use super::CommandContext;
use crate::application::factories::FormatterFactory;
use crate::application::read_models::{OutputDocument, ReadModelBuilder, TableView};
use crate::application::use_cases::{
    CheckVulnerabilitiesUseCase, ListArtifactsUseCase, ScanArtifactUseCase,
};
use crate::cli::ArtifactCommand;
use crate::ports::outbound::{ArtifactListOptions, ArtifactRepository, ProgressReporter, ReportFetcher};
use crate::scanning::domain::{ArtifactReference, ProjectRepository, ReportMode, Severity};
use crate::scanning::services::SeverityFilter;
use crate::shared::error::ExitCode;
use crate::shared::wait::WaitPolicy;
use crate::shared::Result;
use anyhow::Context;
use std::time::Duration;

pub fn run(command: ArtifactCommand, ctx: &CommandContext) -> Result<ExitCode> {
    match command {
        ArtifactCommand::List {
            target,
            with_scan_overview,
        } => list(ctx, &target, with_scan_overview),
        ArtifactCommand::Get { reference, tags } => get(ctx, &reference, tags),
        ArtifactCommand::Scan {
            reference,
            scan_type,
            wait,
            timeout,
        } => scan(ctx, &reference, scan_type, wait, timeout),
        ArtifactCommand::Vulnerabilities {
            reference,
            severity,
            summary,
        } => vulnerabilities(ctx, &reference, severity, summary),
        ArtifactCommand::Sbom { reference } => sbom(ctx, &reference),
    }
}

fn list(ctx: &CommandContext, target: &str, with_scan_overview: bool) -> Result<ExitCode> {
    let selector = ProjectRepository::parse(target)?;
    let artifacts = ListArtifactsUseCase::new(ctx.harbor()?).execute(&selector, with_scan_overview)?;

    if artifacts.is_empty() {
        ctx.reporter().report("No artifacts found");
        return Ok(ExitCode::Success);
    }
    ctx.emit(&ReadModelBuilder::artifacts(&artifacts, with_scan_overview)?)?;
    Ok(ExitCode::Success)
}

fn get(ctx: &CommandContext, reference: &str, tags: bool) -> Result<ExitCode> {
    let reference = ArtifactReference::parse(reference)?;
    let artifact = ctx
        .harbor()?
        .get_artifact(
            reference.project(),
            reference.repository(),
            reference.reference(),
            &ArtifactListOptions::with_overview(),
        )
        .context("failed to get artifact")?;

    ctx.emit(&ReadModelBuilder::artifact(&artifact, tags)?)?;
    Ok(ExitCode::Success)
}

fn scan(
    ctx: &CommandContext,
    reference: &str,
    scan_type: Option<ReportMode>,
    wait: bool,
    timeout: u64,
) -> Result<ExitCode> {
    let reference = ArtifactReference::parse(reference)?;
    let use_case = ScanArtifactUseCase::new(ctx.harbor()?, ctx.reporter());
    use_case.trigger(&reference, scan_type)?;

    if wait {
        let deadline = (timeout > 0).then(|| Duration::from_secs(timeout));
        let policy = WaitPolicy::default().with_timeout(deadline);
        let artifact = use_case.wait(&reference, &policy)?;
        ctx.emit(&ReadModelBuilder::scan_overview(&artifact.scan_overview)?)?;
    }
    Ok(ExitCode::Success)
}

fn vulnerabilities(
    ctx: &CommandContext,
    reference: &str,
    severity: Option<Severity>,
    summary: bool,
) -> Result<ExitCode> {
    let reference = ArtifactReference::parse(reference)?;
    let reporter = ctx.reporter();
    let use_case = CheckVulnerabilitiesUseCase::new(ctx.harbor()?);

    if summary {
        let overview = use_case.scan_overview(&reference)?;
        if overview.is_empty() {
            reporter.report("No scan overview available");
            return Ok(ExitCode::Success);
        }
        ctx.emit(&ReadModelBuilder::scan_overview(&overview)?)?;
        return Ok(ExitCode::Success);
    }

    let result = use_case.check(&reference, SeverityFilter::new(severity))?;
    if result.is_summary_only() {
        reporter.report(&format!(
            "Report lists {} vulnerabilities without details; use --summary for the scanner overview",
            result.summary_total
        ));
        return Ok(ExitCode::Success);
    }
    if result.vulnerabilities.is_empty() {
        reporter.report("No vulnerabilities found");
        return Ok(ExitCode::Success);
    }

    ctx.emit(&ReadModelBuilder::vulnerabilities(&result.vulnerabilities)?)?;

    match result.threshold {
        Some(threshold) if result.threshold_exceeded() => {
            reporter.report_error(&format!(
                "vulnerabilities with severity >= {} found",
                threshold
            ));
            Ok(ExitCode::VulnerabilitiesDetected)
        }
        _ => Ok(ExitCode::Success),
    }
}

fn sbom(ctx: &CommandContext, reference: &str) -> Result<ExitCode> {
    let reference = ArtifactReference::parse(reference)?;
    let document = ctx
        .harbor()?
        .get_sbom(
            reference.project(),
            reference.repository(),
            reference.reference(),
        )
        .context("failed to get SBOM")?;

    if document.is_empty() {
        ctx.reporter().report("No SBOM data found");
        return Ok(ExitCode::Success);
    }

    // An SBOM has no tabular form
    let output = OutputDocument::new(&document, TableView::default())?;
    ctx.emit_with(FormatterFactory::create_for_files(ctx.output().format), &output)?;
    Ok(ExitCode::Success)
}
