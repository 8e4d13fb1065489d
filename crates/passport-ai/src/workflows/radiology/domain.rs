use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One tracked measurement of a lesion within a study.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LesionMeasurement {
    pub lesion: &'static str,
    pub location: &'static str,
    pub long_axis_mm: f32,
}

/// A fixture imaging study with its tracked lesions.
#[derive(Debug, Clone, Serialize)]
pub struct ImagingStudy {
    pub study_id: &'static str,
    pub modality: &'static str,
    pub description: &'static str,
    pub performed_on: NaiveDate,
    pub lesions: Vec<LesionMeasurement>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LesionTrend {
    Enlarging,
    Stable,
    Shrinking,
}

impl LesionTrend {
    pub const fn label(self) -> &'static str {
        match self {
            LesionTrend::Enlarging => "enlarging",
            LesionTrend::Stable => "stable",
            LesionTrend::Shrinking => "shrinking",
        }
    }
}

/// Change narrative for one lesion across the two most recent studies.
#[derive(Debug, Clone, Serialize)]
pub struct LongitudinalSummary {
    pub lesion: String,
    pub prior_mm: f32,
    pub current_mm: f32,
    pub delta_mm: f32,
    pub trend: LesionTrend,
    pub narrative: String,
}

/// A follow-up recommendation keyed to a published guideline.
#[derive(Debug, Clone, Serialize)]
pub struct GuidelineRecommendation {
    pub guideline: &'static str,
    pub finding: String,
    pub recommendation: String,
}

/// Suggested report phrasing for the drafting surface.
#[derive(Debug, Clone, Serialize)]
pub struct DraftingHint {
    pub section: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimingInfo {
    pub data_collection_ms: u64,
    pub agent_processing_ms: u64,
    pub generated_at: DateTime<Utc>,
}

/// The full canned payload served for the demo case.
#[derive(Debug, Clone, Serialize)]
pub struct CasePacket {
    pub case_id: &'static str,
    pub studies: Vec<ImagingStudy>,
    pub longitudinal: Vec<LongitudinalSummary>,
    pub guideline_recs: Vec<GuidelineRecommendation>,
    pub drafting_hints: Vec<DraftingHint>,
    pub timing: TimingInfo,
}

#[derive(Debug, Deserialize)]
pub struct VoiceCommand {
    pub transcript: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceAction {
    pub action: &'static str,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceResponse {
    pub narration: String,
    pub actions: Vec<VoiceAction>,
}
