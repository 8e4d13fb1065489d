use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tokio::task::JoinSet;
use tracing::{info, warn};

use super::audit::{
    new_task_id, AuditEvent, LedgerError, RunLedger, TaskRun, AUDIT_TRAIL_ACTOR,
    ORCHESTRATOR_ACTOR,
};
use super::evidence::{build_evidence_bundle, EvidenceBundle};
use super::passport::Passport;
use super::quality::generate_quality_report;
use super::requirements::generate_requirements_checklist;
use super::tasks::{
    run_billing_guardrails, run_document_ingestion, run_payer_submission,
    run_primary_source_verification, run_quality_check, AgentKind, TaskOutcome, TaskOutput,
};
use super::verification::NpiRegistry;
use super::workflow::{Workflow, WorkflowStatus};

/// Error raised by the orchestrator itself. Task failures never surface
/// here; they are recorded as data on the task runs and the workflow.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Fans the fixed agent set out over the runtime for one workflow/passport
/// pair and converges to a terminal workflow status.
///
/// There is deliberately no dependency graph, retry, or timeout handling
/// here: the five tasks are independent, each reads only the passport and
/// the payer name, and a hung lookup occupies its own join slot without
/// affecting the rest. Repeated runs append fresh task-run and audit rows;
/// prior runs are kept as history.
pub struct WorkflowOrchestrator<L, N> {
    ledger: Arc<L>,
    registry: Arc<N>,
}

impl<L, N> WorkflowOrchestrator<L, N>
where
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    pub fn new(ledger: Arc<L>, registry: Arc<N>) -> Self {
        Self { ledger, registry }
    }

    /// Execute every agent task concurrently, blocking until all resolve,
    /// then fold the outcomes into the workflow: exception list, terminal
    /// status, and a freshly built evidence bundle. The caller persists the
    /// returned workflow.
    pub async fn run(
        &self,
        mut workflow: Workflow,
        passport: &Passport,
        payer_name: Option<&str>,
    ) -> Result<Workflow, OrchestratorError> {
        workflow.status = WorkflowStatus::InProgress;
        workflow.updated_at = Utc::now();

        self.ledger.append_event(
            AuditEvent::new(
                workflow.workflow_id.clone(),
                workflow.clinician_id.clone(),
                ORCHESTRATOR_ACTOR,
                "workflow.started",
            )
            .from_system()
            .with_details(json!({
                "destination_id": workflow.destination_id,
                "destination_type": workflow.destination_type.label(),
            })),
        )?;

        let passport_snapshot = Arc::new(passport.clone());
        let payer = payer_name.map(str::to_string);

        let mut join_set = JoinSet::new();
        let mut inflight: HashMap<tokio::task::Id, TaskRun> = HashMap::new();

        for agent in AgentKind::ALL {
            let mut run = TaskRun::pending(
                new_task_id(agent),
                workflow.workflow_id.clone(),
                workflow.clinician_id.clone(),
                agent,
            );
            self.ledger.record_task_run(run.clone())?;

            run.mark_running(Utc::now());
            self.ledger.update_task_run(run.clone())?;
            self.ledger.append_event(
                AuditEvent::new(
                    workflow.workflow_id.clone(),
                    workflow.clinician_id.clone(),
                    agent.actor(),
                    "agent.started",
                )
                .from_system()
                .with_details(json!({ "task_run_id": run.task_id })),
            )?;

            let handle = join_set.spawn(execute_agent(
                agent,
                passport_snapshot.clone(),
                payer.clone(),
                self.registry.clone(),
            ));
            inflight.insert(handle.id(), run);
        }

        let mut exceptions = Vec::new();
        let mut resolved: Vec<(AgentKind, TaskOutcome)> = Vec::new();

        while let Some(joined) = join_set.join_next_with_id().await {
            let (join_id, outcome) = match joined {
                Ok((join_id, outcome)) => (join_id, outcome),
                Err(join_error) => {
                    warn!(%join_error, "agent task aborted before returning an outcome");
                    (
                        join_error.id(),
                        TaskOutcome::Failed {
                            error: join_error.to_string(),
                        },
                    )
                }
            };

            let Some(mut run) = inflight.remove(&join_id) else {
                continue;
            };
            let agent = run.agent;

            if let Some(message) = outcome.exception_message() {
                exceptions.push(format!("{}: {}", agent.agent_name(), message));
            }

            run.resolve(outcome.clone(), Utc::now());
            let terminal_status = run.status;
            let task_id = run.task_id.clone();
            self.ledger.update_task_run(run)?;

            self.ledger.append_event(
                AuditEvent::new(
                    workflow.workflow_id.clone(),
                    workflow.clinician_id.clone(),
                    agent.actor(),
                    "agent.completed",
                )
                .from_system()
                .with_details(json!({
                    "task_run_id": task_id,
                    "status": terminal_status.label(),
                })),
            )?;

            resolved.push((agent, outcome));
        }

        let evidence = self.assemble_evidence(&workflow, passport, &resolved);

        workflow.exceptions = exceptions;
        workflow.status = if workflow.exceptions.is_empty() {
            WorkflowStatus::Completed
        } else {
            WorkflowStatus::PendingReview
        };
        workflow.updated_at = Utc::now();

        self.ledger.append_event(
            AuditEvent::new(
                workflow.workflow_id.clone(),
                workflow.clinician_id.clone(),
                AUDIT_TRAIL_ACTOR,
                "evidence_bundle.created",
            )
            .from_system()
            .with_details(json!({ "sections": EvidenceBundle::section_names() })),
        )?;

        self.ledger.append_event(
            AuditEvent::new(
                workflow.workflow_id.clone(),
                workflow.clinician_id.clone(),
                ORCHESTRATOR_ACTOR,
                "workflow.completed",
            )
            .from_system()
            .with_details(json!({
                "status": workflow.status.label(),
                "exception_count": workflow.exceptions.len(),
            })),
        )?;

        info!(
            workflow_id = %workflow.workflow_id,
            status = workflow.status.label(),
            exceptions = workflow.exceptions.len(),
            "credentialing run finished"
        );

        workflow.evidence_bundle = Some(evidence);
        Ok(workflow)
    }

    fn assemble_evidence(
        &self,
        workflow: &Workflow,
        passport: &Passport,
        resolved: &[(AgentKind, TaskOutcome)],
    ) -> EvidenceBundle {
        let requirements = generate_requirements_checklist(
            &workflow.destination_id,
            workflow.destination_type,
            passport,
        );
        let quality = generate_quality_report(passport, Utc::now().date_naive());

        let verifications = resolved
            .iter()
            .filter(|(agent, _)| *agent == AgentKind::PrimarySourceVerification)
            .map(|(_, outcome)| outcome.clone())
            .collect();

        let submissions = resolved
            .iter()
            .filter_map(|(agent, outcome)| match (agent, outcome) {
                (
                    AgentKind::PayerEnrollment,
                    TaskOutcome::Ok {
                        output: TaskOutput::Submission(receipt),
                    },
                ) => Some(receipt.clone()),
                _ => None,
            })
            .collect();

        build_evidence_bundle(passport, requirements, quality, verifications, submissions)
    }
}

/// Run one agent task to completion. Every branch returns an outcome; no
/// error escapes to cancel the sibling tasks.
async fn execute_agent<N: NpiRegistry + ?Sized>(
    agent: AgentKind,
    passport: Arc<Passport>,
    payer_name: Option<String>,
    registry: Arc<N>,
) -> TaskOutcome {
    match agent {
        AgentKind::DataQuality => run_quality_check(&passport, Utc::now().date_naive()),
        AgentKind::PrimarySourceVerification => {
            run_primary_source_verification(registry.as_ref(), &passport).await
        }
        AgentKind::DocumentIngestion => run_document_ingestion(&passport),
        AgentKind::PayerEnrollment => run_payer_submission(payer_name.as_deref(), Utc::now()),
        AgentKind::BillingGuardrails => run_billing_guardrails(Utc::now().date_naive()),
    }
}
