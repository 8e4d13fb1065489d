use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::audit::{AuditEvent, RunLedger, TaskRun};
use super::passport::{ClinicianId, Passport};
use super::quality::QualityReport;
use super::repository::{PassportRepository, RepositoryError, WorkflowRepository};
use super::service::{CredentialingService, ServiceError};
use super::verification::NpiRegistry;
use super::workflow::{DestinationType, Workflow, WorkflowId};

/// Router builder exposing the credentialing HTTP surface.
pub fn credentialing_router<P, W, L, N>(
    service: Arc<CredentialingService<P, W, L, N>>,
) -> Router
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    Router::new()
        .route(
            "/api/v1/passports",
            post(create_passport_handler::<P, W, L, N>).get(list_passports_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/passports/:clinician_id",
            get(fetch_passport_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/passports/:clinician_id/quality",
            get(quality_report_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/passports/:clinician_id/authorize",
            post(authorize_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/passports/:clinician_id/workflows",
            get(clinician_workflows_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/workflows",
            get(list_workflows_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/workflows/:workflow_id",
            get(workflow_status_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/workflows/:workflow_id/run",
            post(run_workflow_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/workflows/:workflow_id/enrollment",
            post(submit_enrollment_handler::<P, W, L, N>),
        )
        .route(
            "/api/v1/workflows/:workflow_id/audit.csv",
            get(audit_csv_handler::<P, W, L, N>),
        )
        .route("/api/v1/demo/seed", post(seed_demo_handler::<P, W, L, N>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeRequest {
    pub destination_id: String,
    pub destination_type: DestinationType,
}

#[derive(Debug, Default, Deserialize)]
pub struct RunWorkflowRequest {
    #[serde(default)]
    pub payer_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EnrollmentRequest {
    pub payer_name: String,
}

/// Passport payload paired with a freshly computed quality report.
#[derive(Debug, Serialize)]
pub struct PassportResponse {
    pub passport: Passport,
    pub quality_report: QualityReport,
}

/// Compact listing entry for the passport index.
#[derive(Debug, Serialize)]
pub struct PassportSummaryView {
    pub clinician_id: ClinicianId,
    pub legal_name: String,
    pub specialties: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Passport> for PassportSummaryView {
    fn from(passport: &Passport) -> Self {
        Self {
            clinician_id: passport.clinician_id.clone(),
            legal_name: passport.identity.legal_name.clone(),
            specialties: passport.enrollment.specialties.clone(),
            updated_at: passport.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TimelineEntry {
    pub at: DateTime<Utc>,
    pub actor: String,
    pub action: String,
}

/// Full status view for one workflow: record, audit timeline, task progress.
#[derive(Debug, Serialize)]
pub struct WorkflowStatusResponse {
    pub workflow: Workflow,
    pub timeline: Vec<TimelineEntry>,
    pub progress_percentage: f32,
    pub task_runs: Vec<TaskRun>,
    pub audit_events: Vec<AuditEvent>,
}

fn build_status_response(
    workflow: Workflow,
    task_runs: Vec<TaskRun>,
    audit_events: Vec<AuditEvent>,
) -> WorkflowStatusResponse {
    let timeline = audit_events
        .iter()
        .map(|event| TimelineEntry {
            at: event.created_at,
            actor: event.actor.clone(),
            action: event.action.clone(),
        })
        .collect();

    let terminal = task_runs
        .iter()
        .filter(|run| run.status.is_terminal())
        .count();
    let progress_percentage = if task_runs.is_empty() {
        0.0
    } else {
        terminal as f32 / task_runs.len() as f32 * 100.0
    };

    WorkflowStatusResponse {
        workflow,
        timeline,
        progress_percentage,
        task_runs,
        audit_events,
    }
}

fn error_response(error: ServiceError) -> Response {
    let status = match &error {
        ServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ServiceError::Repository(RepositoryError::Unavailable(_))
        | ServiceError::Ledger(_)
        | ServiceError::CsvExport(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

pub(crate) async fn create_passport_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Json(passport): Json<Passport>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.register_passport(passport) {
        Ok(stored) => (StatusCode::CREATED, Json(stored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_passports_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.passports(0, 100) {
        Ok(passports) => {
            let views: Vec<PassportSummaryView> =
                passports.iter().map(PassportSummaryView::from).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_passport_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(clinician_id): Path<String>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    let id = ClinicianId(clinician_id);
    let passport = match service.passport(&id) {
        Ok(passport) => passport,
        Err(error) => return error_response(error),
    };
    match service.quality_report(&id) {
        Ok(quality_report) => (
            StatusCode::OK,
            Json(PassportResponse {
                passport,
                quality_report,
            }),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn quality_report_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(clinician_id): Path<String>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.quality_report(&ClinicianId(clinician_id)) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn authorize_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(clinician_id): Path<String>,
    Json(request): Json<AuthorizeRequest>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.authorize_destination(
        &ClinicianId(clinician_id),
        request.destination_id,
        request.destination_type,
    ) {
        Ok(workflow) => (StatusCode::CREATED, Json(workflow)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn clinician_workflows_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(clinician_id): Path<String>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.workflows(Some(&ClinicianId(clinician_id))) {
        Ok(workflows) => (StatusCode::OK, Json(workflows)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn list_workflows_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.workflows(None) {
        Ok(workflows) => (StatusCode::OK, Json(workflows)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn workflow_status_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(workflow_id): Path<String>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    let id = WorkflowId(workflow_id);
    let workflow = match service.workflow(&id) {
        Ok(workflow) => workflow,
        Err(error) => return error_response(error),
    };
    let task_runs = match service.task_runs(&id) {
        Ok(runs) => runs,
        Err(error) => return error_response(error),
    };
    match service.audit_events(&id) {
        Ok(events) => (
            StatusCode::OK,
            Json(build_status_response(workflow, task_runs, events)),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn run_workflow_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(workflow_id): Path<String>,
    Json(request): Json<RunWorkflowRequest>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service
        .run_workflow(&WorkflowId(workflow_id), request.payer_name.as_deref())
        .await
    {
        Ok(workflow) => (StatusCode::OK, Json(workflow)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_enrollment_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(workflow_id): Path<String>,
    Json(request): Json<EnrollmentRequest>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.submit_enrollment(&WorkflowId(workflow_id), &request.payer_name) {
        Ok(receipt) => (StatusCode::ACCEPTED, Json(receipt)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn audit_csv_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(workflow_id): Path<String>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.audit_csv(&WorkflowId(workflow_id)) {
        Ok(csv) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
            csv,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn seed_demo_handler<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    match service.seed_demo_passport() {
        Ok(passport) => (StatusCode::CREATED, Json(passport)).into_response(),
        Err(error) => error_response(error),
    }
}
