//! Rule-based generators over the fixture studies. Each runs once per
//! request; none keeps state.

use super::domain::{
    DraftingHint, GuidelineRecommendation, ImagingStudy, LesionTrend, LongitudinalSummary,
    VoiceAction, VoiceCommand, VoiceResponse,
};

/// Growth below this magnitude reads as measurement noise.
const STABLE_DELTA_MM: f32 = 1.0;

/// Compare each lesion across the two most recent studies, largest change
/// first.
pub fn generate_longitudinal(studies: &[ImagingStudy]) -> Vec<LongitudinalSummary> {
    let mut ordered: Vec<&ImagingStudy> = studies.iter().collect();
    ordered.sort_by_key(|study| study.performed_on);

    let (Some(current), Some(prior)) = (ordered.last(), ordered.len().checked_sub(2).and_then(|i| ordered.get(i)))
    else {
        return Vec::new();
    };

    let mut summaries: Vec<LongitudinalSummary> = current
        .lesions
        .iter()
        .filter_map(|lesion| {
            let previous = prior
                .lesions
                .iter()
                .find(|candidate| candidate.lesion == lesion.lesion)?;
            let delta = lesion.long_axis_mm - previous.long_axis_mm;
            let trend = if delta > STABLE_DELTA_MM {
                LesionTrend::Enlarging
            } else if delta < -STABLE_DELTA_MM {
                LesionTrend::Shrinking
            } else {
                LesionTrend::Stable
            };

            let narrative = format!(
                "The {} measures {:.1} mm, previously {:.1} mm on {} ({} by {:.1} mm).",
                lesion.lesion,
                lesion.long_axis_mm,
                previous.long_axis_mm,
                prior.performed_on,
                trend.label(),
                delta.abs()
            );

            Some(LongitudinalSummary {
                lesion: lesion.lesion.to_string(),
                prior_mm: previous.long_axis_mm,
                current_mm: lesion.long_axis_mm,
                delta_mm: delta,
                trend,
                narrative,
            })
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.delta_mm
            .abs()
            .partial_cmp(&a.delta_mm.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    summaries
}

/// Map tracked findings onto canned guideline follow-up rules.
pub fn generate_guideline_recs(studies: &[ImagingStudy]) -> Vec<GuidelineRecommendation> {
    let mut recommendations = Vec::new();

    for summary in generate_longitudinal(studies) {
        if summary.lesion.contains("nodule") && summary.trend == LesionTrend::Enlarging {
            let recommendation = if summary.current_mm >= 8.0 {
                "consider CT follow-up in 3 months, PET-CT, or tissue sampling.".to_string()
            } else {
                "CT follow-up in 6-12 months is recommended.".to_string()
            };
            recommendations.push(GuidelineRecommendation {
                guideline: "Fleischner Society 2017",
                finding: format!(
                    "{} enlarging from {:.1} mm to {:.1} mm",
                    summary.lesion, summary.prior_mm, summary.current_mm
                ),
                recommendation,
            });
        }

        if summary.lesion.contains("adrenal") && summary.trend == LesionTrend::Stable {
            recommendations.push(GuidelineRecommendation {
                guideline: "ACR Incidental Findings (adrenal)",
                finding: format!("{} stable at {:.1} mm", summary.lesion, summary.current_mm),
                recommendation:
                    "Stable over one year; no further adrenal imaging workup required.".to_string(),
            });
        }
    }

    recommendations
}

/// Impression phrasing assembled from the longitudinal summaries.
pub fn generate_drafting_hints(studies: &[ImagingStudy]) -> Vec<DraftingHint> {
    let mut hints = Vec::new();

    for summary in generate_longitudinal(studies) {
        hints.push(DraftingHint {
            section: "impression",
            text: summary.narrative.clone(),
        });
    }

    if let Some(latest) = studies.iter().max_by_key(|study| study.performed_on) {
        hints.push(DraftingHint {
            section: "comparison",
            text: format!(
                "Comparison: prior {} studies through {}.",
                latest.modality, latest.performed_on
            ),
        });
    }

    hints
}

/// Keyword interpreter for the demo voice surface. Matches the few intents
/// the demo supports and narrates everything else away.
pub fn interpret_voice_command(command: &VoiceCommand, studies: &[ImagingStudy]) -> VoiceResponse {
    let transcript = command.transcript.trim().to_lowercase();

    let mut actions: Vec<VoiceAction> = Vec::new();
    let mut narration_parts: Vec<String> = Vec::new();

    if transcript.contains("open") || transcript.contains("show") {
        actions.push(VoiceAction {
            action: "open_study",
            target: "ct-chest-2024".to_string(),
            message: "Opening the most recent CT chest study.".to_string(),
        });
        narration_parts.push("Opening the latest CT chest in the primary viewport.".to_string());
    }

    if transcript.contains("summarize") || transcript.contains("comparison") {
        if let Some(trending) = generate_longitudinal(studies).into_iter().next() {
            narration_parts.push(trending.narrative.clone());
            actions.push(VoiceAction {
                action: "summarize",
                target: trending.lesion,
                message: trending.narrative,
            });
        }
    }

    if transcript.contains("guideline") || transcript.contains("follow-up") {
        if let Some(rec) = generate_guideline_recs(studies).into_iter().next() {
            narration_parts.push(format!(
                "According to {}, {}",
                rec.guideline, rec.recommendation
            ));
            actions.push(VoiceAction {
                action: "highlight",
                target: rec.guideline.to_string(),
                message: rec.recommendation,
            });
        }
    }

    if actions.is_empty() {
        narration_parts.push(
            "I heard you, but this demo can only open studies, summarize changes, or recall guidelines."
                .to_string(),
        );
    }

    VoiceResponse {
        narration: narration_parts.join(" "),
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::radiology::fixtures::studies;

    #[test]
    fn longitudinal_ranks_largest_change_first() {
        let summaries = generate_longitudinal(&studies());
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].lesion, "right upper lobe nodule");
        assert_eq!(summaries[0].trend, LesionTrend::Enlarging);
        assert!((summaries[0].delta_mm - 2.5).abs() < 0.01);
    }

    #[test]
    fn adrenal_nodule_reads_stable() {
        let summaries = generate_longitudinal(&studies());
        let adrenal = summaries
            .iter()
            .find(|summary| summary.lesion.contains("adrenal"))
            .expect("adrenal summary present");
        assert_eq!(adrenal.trend, LesionTrend::Stable);
    }

    #[test]
    fn enlarging_nodule_triggers_fleischner_rec() {
        let recs = generate_guideline_recs(&studies());
        let fleischner = recs
            .iter()
            .find(|rec| rec.guideline.contains("Fleischner"))
            .expect("fleischner recommendation present");
        assert!(fleischner.recommendation.contains("3 months"));
    }

    #[test]
    fn voice_command_without_known_intent_falls_back() {
        let response = interpret_voice_command(
            &VoiceCommand {
                transcript: "play some music".to_string(),
            },
            &studies(),
        );
        assert!(response.actions.is_empty());
        assert!(response.narration.contains("demo"));
    }

    #[test]
    fn voice_command_can_chain_open_and_summarize() {
        let response = interpret_voice_command(
            &VoiceCommand {
                transcript: "Open the study and summarize the comparison".to_string(),
            },
            &studies(),
        );
        let kinds: Vec<&str> = response.actions.iter().map(|action| action.action).collect();
        assert_eq!(kinds, vec!["open_study", "summarize"]);
    }
}
