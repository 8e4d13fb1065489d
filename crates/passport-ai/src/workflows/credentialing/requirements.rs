use chrono::{DateTime, Utc};
use serde::Serialize;

use super::passport::Passport;
use super::workflow::DestinationType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    Complete,
    Pending,
}

impl RequirementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequirementStatus::Complete => "complete",
            RequirementStatus::Pending => "pending",
        }
    }

    fn from_check(satisfied: bool) -> Self {
        if satisfied {
            RequirementStatus::Complete
        } else {
            RequirementStatus::Pending
        }
    }
}

/// One destination requirement and whether the passport currently satisfies it.
#[derive(Debug, Clone, Serialize)]
pub struct Requirement {
    pub requirement_id: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub status: RequirementStatus,
}

/// The full requirements pack for a destination, evaluated against a passport.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementsChecklist {
    pub destination_id: String,
    pub destination_type: DestinationType,
    pub requirements: Vec<Requirement>,
    pub generated_at: DateTime<Utc>,
}

impl RequirementsChecklist {
    pub fn pending(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements
            .iter()
            .filter(|requirement| requirement.status == RequirementStatus::Pending)
    }
}

/// Build the requirements pack for a destination. Each entry is a pure
/// field-presence check against the passport; facility destinations
/// (hospital, group) add education, DEA, and board-certification items, and
/// payer-enrolling destinations (telehealth, group) add NPI and W9 items.
pub fn generate_requirements_checklist(
    destination_id: &str,
    destination_type: DestinationType,
    passport: &Passport,
) -> RequirementsChecklist {
    let mut requirements = Vec::new();

    let mut push = |requirement_id, category, description, satisfied: bool| {
        requirements.push(Requirement {
            requirement_id,
            category,
            description,
            required: true,
            status: RequirementStatus::from_check(satisfied),
        });
    };

    push(
        "identity-legal-name",
        "Identity",
        "Legal name verification",
        !passport.identity.legal_name.is_empty(),
    );

    if destination_type.requires_facility_credentials() {
        push(
            "education-medical-school",
            "Education",
            "Medical school diploma",
            !passport.education.is_empty(),
        );
        push(
            "training-residency",
            "Training",
            "Residency completion certificate",
            passport.has_residency_training(),
        );
    }

    push(
        "license-state-active",
        "Licensing",
        "Active state license in destination state",
        passport.has_active_state_license(),
    );

    if destination_type.requires_facility_credentials() {
        push(
            "license-dea",
            "Licensing",
            "DEA registration",
            passport.licenses.dea_number.is_some(),
        );
        push(
            "board-certification",
            "Certification",
            "Board certification in specialty",
            !passport.board_certifications.is_empty(),
        );
    }

    push(
        "malpractice-coverage",
        "Malpractice",
        "Current malpractice insurance",
        passport.malpractice.is_some(),
    );

    push(
        "references-peer",
        "References",
        "2-3 peer references",
        passport.references.len() >= 2,
    );

    push(
        "work-history-5-years",
        "Work History",
        "5-10 years work history",
        !passport.work_history.is_empty(),
    );

    push(
        "disclosures-complete",
        "Disclosures",
        "Sanctions, discipline, criminal disclosures",
        !passport.disclosures.is_empty(),
    );

    if destination_type.requires_payer_enrollment() {
        push(
            "enrollment-npi",
            "Enrollment",
            "NPI number",
            passport.primary_npi().is_some(),
        );
        push(
            "enrollment-w9",
            "Enrollment",
            "W9 form",
            passport.enrollment.w9_on_file,
        );
    }

    RequirementsChecklist {
        destination_id: destination_id.to_string(),
        destination_type,
        requirements,
        generated_at: Utc::now(),
    }
}
