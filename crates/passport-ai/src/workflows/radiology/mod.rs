pub mod agents;
pub mod domain;
pub mod fixtures;
mod router;

pub use domain::{
    CasePacket, DraftingHint, GuidelineRecommendation, ImagingStudy, LesionTrend,
    LongitudinalSummary, VoiceCommand, VoiceResponse,
};
pub use router::radiology_router;
