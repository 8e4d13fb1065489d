use std::sync::Arc;

use chrono::Utc;

use super::audit::{
    new_document_id, new_workflow_id, AuditEvent, CsvExportError, LedgerError, RunLedger, TaskRun,
};
use super::orchestrator::{OrchestratorError, WorkflowOrchestrator};
use super::passport::{ClinicianId, Passport, PassportDocument};
use super::quality::{generate_quality_report, QualityReport};
use super::repository::{PassportRepository, RepositoryError, WorkflowRepository};
use super::requirements::{generate_requirements_checklist, RequirementsChecklist};
use super::sample::sample_passport;
use super::tasks::{new_submission_receipt, AgentKind, SubmissionReceipt};
use super::verification::NpiRegistry;
use super::workflow::{DestinationType, Workflow, WorkflowId};

/// Error raised by the credentialing service facade.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    CsvExport(#[from] CsvExportError),
}

impl From<OrchestratorError> for ServiceError {
    fn from(value: OrchestratorError) -> Self {
        match value {
            OrchestratorError::Ledger(err) => ServiceError::Ledger(err),
        }
    }
}

/// Fields accepted for a document upload. File bytes are not retained;
/// extraction is stubbed downstream.
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub document_type: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub source_artifact: String,
}

/// Service composing the passport and workflow stores, the run ledger, and
/// the orchestrator behind one facade for the router, CLI, and tests.
pub struct CredentialingService<P, W, L, N> {
    passports: Arc<P>,
    workflows: Arc<W>,
    ledger: Arc<L>,
    orchestrator: WorkflowOrchestrator<L, N>,
}

impl<P, W, L, N> CredentialingService<P, W, L, N>
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    pub fn new(passports: Arc<P>, workflows: Arc<W>, ledger: Arc<L>, registry: Arc<N>) -> Self {
        let orchestrator = WorkflowOrchestrator::new(ledger.clone(), registry);
        Self {
            passports,
            workflows,
            ledger,
            orchestrator,
        }
    }

    /// Store a new passport, stamping creation and update times.
    pub fn register_passport(&self, mut passport: Passport) -> Result<Passport, ServiceError> {
        let now = Utc::now();
        passport.created_at = now;
        passport.updated_at = now;
        Ok(self.passports.insert(passport)?)
    }

    pub fn passport(&self, clinician_id: &ClinicianId) -> Result<Passport, ServiceError> {
        Ok(self
            .passports
            .fetch(clinician_id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn passports(&self, skip: usize, limit: usize) -> Result<Vec<Passport>, ServiceError> {
        Ok(self.passports.list(skip, limit)?)
    }

    pub fn quality_report(&self, clinician_id: &ClinicianId) -> Result<QualityReport, ServiceError> {
        let passport = self.passport(clinician_id)?;
        Ok(generate_quality_report(&passport, Utc::now().date_naive()))
    }

    pub fn requirements(
        &self,
        clinician_id: &ClinicianId,
        destination_id: &str,
        destination_type: DestinationType,
    ) -> Result<RequirementsChecklist, ServiceError> {
        let passport = self.passport(clinician_id)?;
        Ok(generate_requirements_checklist(
            destination_id,
            destination_type,
            &passport,
        ))
    }

    /// Attach document metadata to a passport and return the stored record.
    pub fn attach_document(
        &self,
        clinician_id: &ClinicianId,
        upload: NewDocument,
    ) -> Result<PassportDocument, ServiceError> {
        let mut passport = self.passport(clinician_id)?;
        let document = PassportDocument {
            document_id: new_document_id(),
            document_type: upload.document_type,
            file_name: upload.file_name,
            content_type: upload.content_type,
            upload_date: Utc::now(),
            source_artifact: upload.source_artifact,
            extracted_fields: Default::default(),
        };
        passport.documents.push(document.clone());
        passport.updated_at = Utc::now();
        self.passports.update(passport)?;
        Ok(document)
    }

    /// Create a workflow for the clinician against a destination, seeding
    /// the credentialing step plan.
    pub fn authorize_destination(
        &self,
        clinician_id: &ClinicianId,
        destination_id: String,
        destination_type: DestinationType,
    ) -> Result<Workflow, ServiceError> {
        let passport = self.passport(clinician_id)?;
        let workflow = Workflow::authorize(
            new_workflow_id(),
            passport.clinician_id,
            destination_id,
            destination_type,
            Utc::now(),
        );
        Ok(self.workflows.insert(workflow)?)
    }

    /// Run the orchestrator on a workflow and persist the updated record.
    pub async fn run_workflow(
        &self,
        workflow_id: &WorkflowId,
        payer_name: Option<&str>,
    ) -> Result<Workflow, ServiceError> {
        let workflow = self
            .workflows
            .fetch(workflow_id)?
            .ok_or(RepositoryError::NotFound)?;
        let passport = self.passport(&workflow.clinician_id)?;

        let updated = self
            .orchestrator
            .run(workflow, &passport, payer_name)
            .await?;
        self.workflows.update(updated.clone())?;
        Ok(updated)
    }

    pub fn workflow(&self, workflow_id: &WorkflowId) -> Result<Workflow, ServiceError> {
        Ok(self
            .workflows
            .fetch(workflow_id)?
            .ok_or(RepositoryError::NotFound)?)
    }

    pub fn workflows(
        &self,
        clinician_id: Option<&ClinicianId>,
    ) -> Result<Vec<Workflow>, ServiceError> {
        Ok(self.workflows.list(clinician_id)?)
    }

    pub fn task_runs(&self, workflow_id: &WorkflowId) -> Result<Vec<TaskRun>, ServiceError> {
        self.workflow(workflow_id)?;
        Ok(self.ledger.task_runs(workflow_id)?)
    }

    pub fn audit_events(&self, workflow_id: &WorkflowId) -> Result<Vec<AuditEvent>, ServiceError> {
        self.workflow(workflow_id)?;
        Ok(self.ledger.events(workflow_id)?)
    }

    /// Render the workflow's audit trail as CSV.
    pub fn audit_csv(&self, workflow_id: &WorkflowId) -> Result<String, ServiceError> {
        let events = self.audit_events(workflow_id)?;
        Ok(super::audit::render_events_csv(&events)?)
    }

    /// Submit the clinician to a payer outside an orchestrator run. The stub
    /// receipt is audited against the workflow.
    pub fn submit_enrollment(
        &self,
        workflow_id: &WorkflowId,
        payer_name: &str,
    ) -> Result<SubmissionReceipt, ServiceError> {
        let workflow = self.workflow(workflow_id)?;
        let receipt = new_submission_receipt(payer_name, Utc::now());

        self.ledger.append_event(
            AuditEvent::new(
                workflow.workflow_id,
                workflow.clinician_id,
                AgentKind::PayerEnrollment.actor(),
                "enrollment.submitted",
            )
            .from_system()
            .with_details(serde_json::json!({
                "submission_id": receipt.submission_id,
                "payer_name": receipt.payer_name,
            })),
        )?;

        Ok(receipt)
    }

    /// Seed the bundled sample passport. Returns the existing record when
    /// already seeded.
    pub fn seed_demo_passport(&self) -> Result<Passport, ServiceError> {
        let sample = sample_passport();
        match self.passports.insert(sample.clone()) {
            Ok(stored) => Ok(stored),
            Err(RepositoryError::Conflict) => self.passport(&sample.clinician_id),
            Err(other) => Err(other.into()),
        }
    }
}
