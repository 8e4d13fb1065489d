use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::Args;

use crate::infra::{build_service, CannedNpiRegistry};
use passport_ai::error::AppError;
use passport_ai::workflows::credentialing::quality::{generate_quality_report, QualityReport};
use passport_ai::workflows::credentialing::sample::sample_passport;
use passport_ai::workflows::credentialing::{
    generate_requirements_checklist, DestinationType, RequirementsChecklist,
};

#[derive(Args, Debug)]
pub(crate) struct PassportReportArgs {
    /// Destination type the checklist is evaluated for
    #[arg(long, default_value = "group", value_parser = crate::infra::parse_destination)]
    pub(crate) destination_type: DestinationType,
    /// Destination identifier used in the rendered checklist
    #[arg(long, default_value = "dest-demo")]
    pub(crate) destination_id: String,
    /// Evaluation date for the quality report (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Payer to submit enrollment to; omitted, the payer task is skipped
    #[arg(long)]
    pub(crate) payer: Option<String>,
    /// Destination type for the demo workflow
    #[arg(long, default_value = "group", value_parser = crate::infra::parse_destination)]
    pub(crate) destination_type: Option<DestinationType>,
    /// Stop after the checklist and quality report, before the run
    #[arg(long)]
    pub(crate) skip_run: bool,
}

pub(crate) fn run_passport_report(args: PassportReportArgs) -> Result<(), AppError> {
    let PassportReportArgs {
        destination_type,
        destination_id,
        today,
    } = args;

    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let passport = sample_passport();

    println!("Credentialing passport report");
    println!(
        "Clinician: {} ({})",
        passport.identity.legal_name, passport.clinician_id
    );

    let checklist =
        generate_requirements_checklist(&destination_id, destination_type, &passport);
    render_checklist(&checklist);

    let report = generate_quality_report(&passport, today);
    render_quality(&report, today);

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        payer,
        destination_type,
        skip_run,
    } = args;
    let destination_type = destination_type.unwrap_or(DestinationType::Group);
    let today = Local::now().date_naive();

    println!("Credentialing workflow demo (in-memory stores, canned registry)");

    let service = build_service(Arc::new(CannedNpiRegistry));
    let passport = service.seed_demo_passport()?;
    println!(
        "- Seeded passport {} for {}",
        passport.clinician_id, passport.identity.legal_name
    );

    let checklist = service.requirements(
        &passport.clinician_id,
        "dest-demo",
        destination_type,
    )?;
    render_checklist(&checklist);

    let report = service.quality_report(&passport.clinician_id)?;
    render_quality(&report, today);

    if skip_run {
        return Ok(());
    }

    let workflow = service.authorize_destination(
        &passport.clinician_id,
        "dest-demo".to_string(),
        destination_type,
    )?;
    println!(
        "\nAuthorized workflow {} against {} destination",
        workflow.workflow_id,
        destination_type.label()
    );

    let finished = service
        .run_workflow(&workflow.workflow_id, payer.as_deref())
        .await?;

    println!("\nTask runs");
    for run in service.task_runs(&finished.workflow_id)? {
        let window = match (run.started_at, run.completed_at) {
            (Some(started), Some(completed)) => {
                format!(" ({} -> {})", started.format("%H:%M:%S%.3f"), completed.format("%H:%M:%S%.3f"))
            }
            _ => String::new(),
        };
        println!(
            "- {} | {} | {}{}",
            run.task_id,
            run.agent_name,
            run.status.label(),
            window
        );
    }

    if finished.exceptions.is_empty() {
        println!("\nExceptions: none");
    } else {
        println!("\nExceptions");
        for exception in &finished.exceptions {
            println!("- {exception}");
        }
    }

    println!("\nWorkflow status: {}", finished.status.label());

    if let Some(evidence) = &finished.evidence_bundle {
        println!(
            "Evidence bundle: {} requirements, {} quality issues, {} verification(s), {} submission(s)",
            evidence.requirements.requirements.len(),
            evidence.quality.issues.len(),
            evidence.verifications.len(),
            evidence.submissions.len()
        );
        for receipt in &evidence.submissions {
            println!(
                "- Submission {} to {} at {}",
                receipt.submission_id, receipt.payer_name, receipt.submitted_at
            );
        }
        println!("Citations:");
        for citation in &evidence.citations {
            println!("- {}: {}", citation.label, citation.url);
        }
    }

    println!("\nAudit trail");
    for event in service.audit_events(&finished.workflow_id)? {
        println!(
            "- {} | {} | {}",
            event.created_at.format("%H:%M:%S%.3f"),
            event.actor,
            event.action
        );
    }

    Ok(())
}

fn render_checklist(checklist: &RequirementsChecklist) {
    println!(
        "\nRequirements checklist ({} destination)",
        checklist.destination_type.label()
    );
    for requirement in &checklist.requirements {
        println!(
            "- [{}] {} ({}): {}",
            match requirement.status.label() {
                "complete" => "x",
                _ => " ",
            },
            requirement.description,
            requirement.category,
            requirement.status.label()
        );
    }
    let open = checklist.pending().count();
    if open == 0 {
        println!("All requirements satisfied");
    } else {
        println!("{open} requirement(s) still pending");
    }
}

fn render_quality(report: &QualityReport, today: NaiveDate) {
    println!(
        "\nQuality report (evaluated {today}) - completeness {:.0}%",
        report.completeness_score * 100.0
    );
    if report.issues.is_empty() {
        println!("No data-quality issues found");
        return;
    }
    for issue in &report.issues {
        let fix = issue
            .suggested_fix
            .map(|fix| format!(" | fix: {fix}"))
            .unwrap_or_default();
        println!(
            "- [{}/{}] {}: {}{}",
            issue.severity.label(),
            issue.kind.label(),
            issue.field_name,
            issue.description,
            fix
        );
    }
}
