use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::infra::{guess_content_type, AppState};
use passport_ai::workflows::credentialing::audit::RunLedger;
use passport_ai::workflows::credentialing::{
    credentialing_router, ClinicianId, CredentialingService, NewDocument, NpiRegistry,
    PassportRepository, RepositoryError, ServiceError, WorkflowRepository,
};
use passport_ai::workflows::radiology::radiology_router;

/// Full HTTP surface: credentialing routes, the radiology demo, operational
/// endpoints, and the document-upload route that needs MIME guessing.
pub(crate) fn api_router<P, W, L, N>(service: Arc<CredentialingService<P, W, L, N>>) -> Router
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    let documents = Router::new()
        .route(
            "/api/v1/passports/:clinician_id/documents",
            post(upload_document_endpoint::<P, W, L, N>),
        )
        .with_state(service.clone());

    credentialing_router(service)
        .merge(radiology_router())
        .merge(documents)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentUploadRequest {
    pub(crate) document_type: String,
    pub(crate) file_name: String,
    /// Base64 file body. Accepted and discarded: extraction is stubbed and
    /// only metadata is retained.
    #[serde(default)]
    pub(crate) file_data: Option<String>,
}

pub(crate) async fn upload_document_endpoint<P, W, L, N>(
    State(service): State<Arc<CredentialingService<P, W, L, N>>>,
    Path(clinician_id): Path<String>,
    Json(request): Json<DocumentUploadRequest>,
) -> Response
where
    P: PassportRepository + 'static,
    W: WorkflowRepository + 'static,
    L: RunLedger + 'static,
    N: NpiRegistry + 'static,
{
    let content_type = guess_content_type(&request.file_name);
    let received_bytes = request.file_data.as_ref().map(String::len).unwrap_or(0);

    let upload = NewDocument {
        document_type: request.document_type,
        file_name: request.file_name,
        content_type,
        source_artifact: "api-upload".to_string(),
    };

    match service.attach_document(&ClinicianId(clinician_id), upload) {
        Ok(document) => (
            StatusCode::CREATED,
            Json(json!({
                "document": document,
                "received_bytes": received_bytes,
            })),
        )
            .into_response(),
        Err(ServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({ "error": "passport not found" });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}
