pub mod audit;
pub mod evidence;
pub mod orchestrator;
pub mod passport;
pub mod quality;
pub mod repository;
pub mod requirements;
mod router;
pub mod sample;
mod service;
pub mod tasks;
pub mod verification;
pub mod workflow;

pub use audit::{AuditEvent, LedgerError, RunLedger, TaskRun, TaskRunStatus};
pub use orchestrator::{OrchestratorError, WorkflowOrchestrator};
pub use passport::{ClinicianId, Passport};
pub use quality::{generate_quality_report, QualityReport};
pub use repository::{PassportRepository, RepositoryError, WorkflowRepository};
pub use requirements::{generate_requirements_checklist, RequirementsChecklist};
pub use router::{
    credentialing_router, AuthorizeRequest, EnrollmentRequest, PassportResponse,
    PassportSummaryView, RunWorkflowRequest, WorkflowStatusResponse,
};
pub use service::{CredentialingService, NewDocument, ServiceError};
pub use tasks::{AgentKind, SubmissionReceipt, TaskOutcome, TaskOutput};
pub use verification::{NpiRegistry, NppesClient, RegistryError};
pub use workflow::{DestinationType, Workflow, WorkflowId, WorkflowStatus};
