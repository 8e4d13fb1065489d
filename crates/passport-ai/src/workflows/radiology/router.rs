use std::time::Instant;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use super::agents::{
    generate_drafting_hints, generate_guideline_recs, generate_longitudinal,
    interpret_voice_command,
};
use super::domain::{CasePacket, TimingInfo, VoiceCommand};
use super::fixtures::{studies, CURRENT_CASE_ID};

/// Stateless router for the radiology demo surface.
pub fn radiology_router() -> Router {
    Router::new()
        .route("/api/ping", get(ping_handler))
        .route("/api/case", get(case_handler))
        .route("/api/voice", post(voice_handler))
}

async fn ping_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Aggregate the stub studies and run each rule-based generator once.
async fn case_handler() -> Json<CasePacket> {
    let started = Instant::now();
    let studies = studies();
    let data_collected = Instant::now();

    let longitudinal = generate_longitudinal(&studies);
    let guideline_recs = generate_guideline_recs(&studies);
    let drafting_hints = generate_drafting_hints(&studies);
    let agents_done = Instant::now();

    Json(CasePacket {
        case_id: CURRENT_CASE_ID,
        studies,
        longitudinal,
        guideline_recs,
        drafting_hints,
        timing: TimingInfo {
            data_collection_ms: data_collected.duration_since(started).as_millis() as u64,
            agent_processing_ms: agents_done.duration_since(data_collected).as_millis() as u64,
            generated_at: Utc::now(),
        },
    })
}

async fn voice_handler(Json(command): Json<VoiceCommand>) -> Response {
    if command.transcript.trim().is_empty() {
        let payload = json!({ "error": "Transcript required" });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    }

    let response = interpret_voice_command(&command, &studies());
    (StatusCode::OK, Json(response)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn case_packet_carries_every_section() {
        let Json(packet) = case_handler().await;
        assert_eq!(packet.case_id, CURRENT_CASE_ID);
        assert_eq!(packet.studies.len(), 2);
        assert!(!packet.longitudinal.is_empty());
        assert!(!packet.guideline_recs.is_empty());
        assert!(!packet.drafting_hints.is_empty());
    }
}
