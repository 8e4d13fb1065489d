use chrono::{DateTime, Utc};
use serde::Serialize;

use super::passport::Passport;
use super::quality::QualityReport;
use super::requirements::RequirementsChecklist;
use super::tasks::{SubmissionReceipt, TaskOutcome};
use super::verification::NPI_REGISTRY_CITATION_URL;

/// A primary source backing the evidence bundle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Citation {
    pub label: &'static str,
    pub url: &'static str,
}

/// The fixed citation list attached to every bundle.
pub fn standard_citations() -> Vec<Citation> {
    vec![
        Citation {
            label: "NPPES NPI Registry API",
            url: NPI_REGISTRY_CITATION_URL,
        },
        Citation {
            label: "CMS Medicare Provider Enrollment",
            url: "https://www.cms.gov/medicare/enrollment-renewal/providers-suppliers",
        },
        Citation {
            label: "OIG List of Excluded Individuals and Entities",
            url: "https://oig.hhs.gov/exclusions/",
        },
    ]
}

/// Audit-ready snapshot folded into the workflow after a run. Derived and
/// non-authoritative: regenerated in full on every orchestrator run and
/// persisted only inside the owning workflow record.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceBundle {
    pub passport: Passport,
    pub requirements: RequirementsChecklist,
    pub quality: QualityReport,
    pub verifications: Vec<TaskOutcome>,
    pub submissions: Vec<SubmissionReceipt>,
    pub citations: Vec<Citation>,
    pub generated_at: DateTime<Utc>,
}

impl EvidenceBundle {
    /// Section names, used for audit-event detail payloads.
    pub fn section_names() -> [&'static str; 6] {
        [
            "passport",
            "requirements",
            "quality",
            "verifications",
            "submissions",
            "citations",
        ]
    }
}

pub fn build_evidence_bundle(
    passport: &Passport,
    requirements: RequirementsChecklist,
    quality: QualityReport,
    verifications: Vec<TaskOutcome>,
    submissions: Vec<SubmissionReceipt>,
) -> EvidenceBundle {
    EvidenceBundle {
        passport: passport.clone(),
        requirements,
        quality,
        verifications,
        submissions,
        citations: standard_citations(),
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citations_always_include_the_registry() {
        let citations = standard_citations();
        assert!(citations
            .iter()
            .any(|citation| citation.url == NPI_REGISTRY_CITATION_URL));
        assert_eq!(citations.len(), 3);
    }
}
