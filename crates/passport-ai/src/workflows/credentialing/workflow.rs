use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::evidence::EvidenceBundle;
use super::passport::ClinicianId;
use super::tasks::AgentKind;

/// Identifier wrapper for credentialing workflows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkflowId(pub String);

impl std::fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of destination the clinician is being credentialed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestinationType {
    Hospital,
    Group,
    StaffingFirm,
    Telehealth,
}

impl DestinationType {
    pub const fn label(self) -> &'static str {
        match self {
            DestinationType::Hospital => "hospital",
            DestinationType::Group => "group",
            DestinationType::StaffingFirm => "staffing_firm",
            DestinationType::Telehealth => "telehealth",
        }
    }

    /// Destinations that require facility-grade credentials (DEA, board
    /// certification, residency proof).
    pub const fn requires_facility_credentials(self) -> bool {
        matches!(self, DestinationType::Hospital | DestinationType::Group)
    }

    /// Destinations that enroll the clinician directly with payers.
    pub const fn requires_payer_enrollment(self) -> bool {
        matches!(self, DestinationType::Telehealth | DestinationType::Group)
    }
}

impl std::str::FromStr for DestinationType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "hospital" => Ok(DestinationType::Hospital),
            "group" => Ok(DestinationType::Group),
            "staffing_firm" | "staffing-firm" => Ok(DestinationType::StaffingFirm),
            "telehealth" => Ok(DestinationType::Telehealth),
            other => Err(format!(
                "unknown destination type '{other}' (expected hospital, group, staffing_firm, or telehealth)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Draft,
    InProgress,
    PendingReview,
    Approved,
    Rejected,
    Completed,
}

impl WorkflowStatus {
    pub const fn label(self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "draft",
            WorkflowStatus::InProgress => "in_progress",
            WorkflowStatus::PendingReview => "pending_review",
            WorkflowStatus::Approved => "approved",
            WorkflowStatus::Rejected => "rejected",
            WorkflowStatus::Completed => "completed",
        }
    }
}

/// One entry of the credentialing plan seeded at authorization. Execution
/// state lives on task runs, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowStep {
    pub step_id: &'static str,
    pub agent_name: &'static str,
}

/// One credentialing effort for a passport against a specific destination.
#[derive(Debug, Clone, Serialize)]
pub struct Workflow {
    pub workflow_id: WorkflowId,
    pub clinician_id: ClinicianId,
    pub destination_id: String,
    pub destination_type: DestinationType,
    pub status: WorkflowStatus,
    pub steps: Vec<WorkflowStep>,
    pub exceptions: Vec<String>,
    pub evidence_bundle: Option<EvidenceBundle>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn authorize(
        workflow_id: WorkflowId,
        clinician_id: ClinicianId,
        destination_id: String,
        destination_type: DestinationType,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            workflow_id,
            clinician_id,
            destination_id,
            destination_type,
            status: WorkflowStatus::Draft,
            steps: plan_steps(destination_type),
            exceptions: Vec::new(),
            evidence_bundle: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// The ordered credentialing plan for a destination. Payer enrollment only
/// applies where the destination enrolls with payers directly.
fn plan_steps(destination_type: DestinationType) -> Vec<WorkflowStep> {
    let mut steps = vec![
        WorkflowStep {
            step_id: "requirements-generation",
            agent_name: "Requirements & Checklist Agent",
        },
        WorkflowStep {
            step_id: "quality-check",
            agent_name: AgentKind::DataQuality.agent_name(),
        },
        WorkflowStep {
            step_id: "verification",
            agent_name: AgentKind::PrimarySourceVerification.agent_name(),
        },
        WorkflowStep {
            step_id: "document-prep",
            agent_name: AgentKind::DocumentIngestion.agent_name(),
        },
    ];

    if destination_type.requires_payer_enrollment() {
        steps.push(WorkflowStep {
            step_id: "payer-enrollment",
            agent_name: AgentKind::PayerEnrollment.agent_name(),
        });
    }

    steps.push(WorkflowStep {
        step_id: "guardrails",
        agent_name: AgentKind::BillingGuardrails.agent_name(),
    });
    steps.push(WorkflowStep {
        step_id: "audit-trail",
        agent_name: "Audit Trail Agent",
    });

    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hospital_plan_omits_payer_enrollment() {
        let steps = plan_steps(DestinationType::Hospital);
        assert!(steps.iter().all(|step| step.step_id != "payer-enrollment"));
        assert_eq!(steps.last().map(|step| step.step_id), Some("audit-trail"));
    }

    #[test]
    fn telehealth_plan_includes_payer_enrollment() {
        let steps = plan_steps(DestinationType::Telehealth);
        assert!(steps.iter().any(|step| step.step_id == "payer-enrollment"));
    }

    #[test]
    fn destination_type_parses_both_separator_styles() {
        assert_eq!(
            "staffing-firm".parse::<DestinationType>(),
            Ok(DestinationType::StaffingFirm)
        );
        assert_eq!(
            "Telehealth".parse::<DestinationType>(),
            Ok(DestinationType::Telehealth)
        );
        assert!("clinic".parse::<DestinationType>().is_err());
    }
}
