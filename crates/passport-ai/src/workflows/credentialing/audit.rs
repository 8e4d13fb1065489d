use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::passport::ClinicianId;
use super::tasks::{AgentKind, TaskOutcome};
use super::workflow::WorkflowId;

/// Actor recorded for orchestrator-level audit events.
pub const ORCHESTRATOR_ACTOR: &str = "agent:Workflow Orchestrator Agent";
/// Actor recorded for evidence-bundle audit events.
pub const AUDIT_TRAIL_ACTOR: &str = "agent:Audit Trail Agent";

pub fn new_event_id() -> String {
    format!("evt-{}", &Uuid::new_v4().simple().to_string()[..12])
}

pub fn new_task_id(agent: AgentKind) -> String {
    format!(
        "task-{}-{}",
        agent.slug(),
        &Uuid::new_v4().simple().to_string()[..8]
    )
}

pub fn new_workflow_id() -> WorkflowId {
    WorkflowId(format!("wf-{}", &Uuid::new_v4().simple().to_string()[..12]))
}

pub fn new_document_id() -> String {
    format!("doc-{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// Append-only audit record. Events are never mutated or deleted.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub event_id: String,
    pub workflow_id: WorkflowId,
    pub clinician_id: ClinicianId,
    pub actor: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        workflow_id: WorkflowId,
        clinician_id: ClinicianId,
        actor: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            event_id: new_event_id(),
            workflow_id,
            clinician_id,
            actor: actor.into(),
            action: action.into(),
            source: None,
            details: None,
            created_at: Utc::now(),
        }
    }

    pub fn from_system(mut self) -> Self {
        self.source = Some("system".to_string());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskRunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Exception,
}

impl TaskRunStatus {
    pub const fn label(self) -> &'static str {
        match self {
            TaskRunStatus::Pending => "pending",
            TaskRunStatus::Running => "running",
            TaskRunStatus::Completed => "completed",
            TaskRunStatus::Failed => "failed",
            TaskRunStatus::Exception => "exception",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskRunStatus::Completed | TaskRunStatus::Failed | TaskRunStatus::Exception
        )
    }
}

/// One execution record of a single agent task within one workflow run.
/// Created pending before dispatch and updated exactly twice: running, then
/// terminal with the outcome attached.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRun {
    pub task_id: String,
    pub workflow_id: WorkflowId,
    pub clinician_id: ClinicianId,
    pub agent: AgentKind,
    pub agent_name: &'static str,
    pub status: TaskRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<TaskOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TaskRun {
    pub fn pending(
        task_id: String,
        workflow_id: WorkflowId,
        clinician_id: ClinicianId,
        agent: AgentKind,
    ) -> Self {
        Self {
            task_id,
            workflow_id,
            clinician_id,
            agent,
            agent_name: agent.agent_name(),
            status: TaskRunStatus::Pending,
            started_at: None,
            completed_at: None,
            outcome: None,
            exception: None,
            created_at: Utc::now(),
        }
    }

    pub fn mark_running(&mut self, now: DateTime<Utc>) {
        self.status = TaskRunStatus::Running;
        self.started_at = Some(now);
    }

    pub fn resolve(&mut self, outcome: TaskOutcome, now: DateTime<Utc>) {
        self.status = match &outcome {
            TaskOutcome::Ok { .. } | TaskOutcome::Skipped => TaskRunStatus::Completed,
            TaskOutcome::Failed { .. } => TaskRunStatus::Failed,
            TaskOutcome::Exception { .. } => TaskRunStatus::Exception,
        };
        self.exception = outcome.exception_message().map(str::to_string);
        self.completed_at = Some(now);
        self.outcome = Some(outcome);
    }
}

/// Error raised by the run ledger.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("unknown task run {0}")]
    UnknownTaskRun(String),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for per-run bookkeeping: task-run rows and the append-only
/// audit trail. Implementations serialize writes internally; rows are only
/// ever added, never superseded, so repeated runs accumulate history.
pub trait RunLedger: Send + Sync {
    fn record_task_run(&self, run: TaskRun) -> Result<(), LedgerError>;
    fn update_task_run(&self, run: TaskRun) -> Result<(), LedgerError>;
    fn task_runs(&self, workflow_id: &WorkflowId) -> Result<Vec<TaskRun>, LedgerError>;
    fn append_event(&self, event: AuditEvent) -> Result<(), LedgerError>;
    fn events(&self, workflow_id: &WorkflowId) -> Result<Vec<AuditEvent>, LedgerError>;
}

/// Error raised while rendering the audit-trail CSV export.
#[derive(Debug, thiserror::Error)]
pub enum CsvExportError {
    #[error("csv encoding failed: {0}")]
    Encode(#[from] csv::Error),
    #[error("csv buffer error: {0}")]
    Buffer(#[from] std::io::Error),
    #[error("csv output was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Serialize)]
struct AuditCsvRow<'a> {
    event_id: &'a str,
    workflow_id: &'a str,
    clinician_id: &'a str,
    actor: &'a str,
    action: &'a str,
    source: &'a str,
    details: String,
    created_at: String,
}

/// Render audit events as CSV for export, one row per event in the order
/// given.
pub fn render_events_csv(events: &[AuditEvent]) -> Result<String, CsvExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for event in events {
        writer.serialize(AuditCsvRow {
            event_id: &event.event_id,
            workflow_id: &event.workflow_id.0,
            clinician_id: &event.clinician_id.0,
            actor: &event.actor,
            action: &event.action,
            source: event.source.as_deref().unwrap_or(""),
            details: event
                .details
                .as_ref()
                .map(Value::to_string)
                .unwrap_or_default(),
            created_at: event.created_at.to_rfc3339(),
        })?;
    }

    let bytes = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_generators_use_expected_prefixes() {
        assert!(new_event_id().starts_with("evt-"));
        assert!(new_task_id(AgentKind::DataQuality).starts_with("task-data-quality-"));
        assert!(new_workflow_id().0.starts_with("wf-"));
        assert_eq!(new_event_id().len(), "evt-".len() + 12);
    }

    #[test]
    fn resolve_maps_outcomes_onto_terminal_statuses() {
        let mut run = TaskRun::pending(
            new_task_id(AgentKind::PayerEnrollment),
            WorkflowId("wf-1".to_string()),
            ClinicianId("clinician-001".to_string()),
            AgentKind::PayerEnrollment,
        );
        run.mark_running(Utc::now());
        assert_eq!(run.status, TaskRunStatus::Running);

        run.resolve(TaskOutcome::Skipped, Utc::now());
        assert_eq!(run.status, TaskRunStatus::Completed);
        assert!(run.exception.is_none());

        let mut failed = TaskRun::pending(
            new_task_id(AgentKind::PrimarySourceVerification),
            WorkflowId("wf-1".to_string()),
            ClinicianId("clinician-001".to_string()),
            AgentKind::PrimarySourceVerification,
        );
        failed.resolve(
            TaskOutcome::Failed {
                error: "lookup timed out".to_string(),
            },
            Utc::now(),
        );
        assert_eq!(failed.status, TaskRunStatus::Failed);
        assert_eq!(failed.exception.as_deref(), Some("lookup timed out"));
    }

    #[test]
    fn csv_export_renders_one_row_per_event() {
        let events = vec![
            AuditEvent::new(
                WorkflowId("wf-1".to_string()),
                ClinicianId("clinician-001".to_string()),
                ORCHESTRATOR_ACTOR,
                "workflow.started",
            )
            .from_system()
            .with_details(json!({"destination_id": "dest-001"})),
            AuditEvent::new(
                WorkflowId("wf-1".to_string()),
                ClinicianId("clinician-001".to_string()),
                AgentKind::DataQuality.actor(),
                "agent.started",
            ),
        ];

        let csv = render_events_csv(&events).expect("csv renders");
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("event_id,"));
        assert!(lines[1].contains("workflow.started"));
        assert!(lines[2].contains("agent.started"));
    }
}
