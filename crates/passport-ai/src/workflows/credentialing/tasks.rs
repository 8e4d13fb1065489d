use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::passport::Passport;
use super::quality::QualityReport;
use super::verification::{NpiRegistry, NPI_REGISTRY_CITATION_URL};

/// The fixed set of agents the orchestrator fans out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    DataQuality,
    PrimarySourceVerification,
    DocumentIngestion,
    PayerEnrollment,
    BillingGuardrails,
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::DataQuality,
        AgentKind::PrimarySourceVerification,
        AgentKind::DocumentIngestion,
        AgentKind::PayerEnrollment,
        AgentKind::BillingGuardrails,
    ];

    pub const fn agent_name(self) -> &'static str {
        match self {
            AgentKind::DataQuality => "Data Quality & Consistency Agent",
            AgentKind::PrimarySourceVerification => "Primary Source Verification Agent",
            AgentKind::DocumentIngestion => "Document Ingestion & Data Extraction Agent",
            AgentKind::PayerEnrollment => "Payer Enrollment Submission Agent",
            AgentKind::BillingGuardrails => "Billing & Scheduling Guardrail Agent",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            AgentKind::DataQuality => "data-quality",
            AgentKind::PrimarySourceVerification => "primary-source-verification",
            AgentKind::DocumentIngestion => "document-ingestion",
            AgentKind::PayerEnrollment => "payer-enrollment",
            AgentKind::BillingGuardrails => "billing-guardrails",
        }
    }

    /// Audit-log actor string for this agent.
    pub fn actor(self) -> String {
        format!("agent:{}", self.agent_name())
    }
}

/// Raw registry evidence captured by a successful primary-source lookup.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationEvidence {
    pub npi: String,
    pub registry: Value,
    pub citation_url: &'static str,
}

/// Minimal extraction envelope produced for an uploaded document. Field
/// extraction itself is stubbed; the envelope records provenance only.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionEnvelope {
    pub document_type: String,
    pub file_name: String,
    pub fields: BTreeMap<String, String>,
    pub provenance: String,
}

/// Synthetic receipt returned by the payer-submission stub.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub submission_id: String,
    pub payer_name: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GuardrailRule {
    pub rule_id: &'static str,
    pub description: &'static str,
}

/// Static billing/scheduling guardrails plus the computed safe start date.
#[derive(Debug, Clone, Serialize)]
pub struct GuardrailAdvice {
    pub rules: Vec<GuardrailRule>,
    pub earliest_safe_start: NaiveDate,
}

/// Typed payload carried by a successful task.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TaskOutput {
    Quality(QualityReport),
    Verification(VerificationEvidence),
    Documents(Vec<ExtractionEnvelope>),
    Submission(SubmissionReceipt),
    Guardrails(GuardrailAdvice),
}

/// Outcome of one agent task. `Failed` covers execution errors (the lookup
/// raised); `Exception` covers domain preconditions the task could not meet.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Ok { output: TaskOutput },
    Skipped,
    Failed { error: String },
    Exception { reason: String },
}

impl TaskOutcome {
    pub fn ok(output: TaskOutput) -> Self {
        TaskOutcome::Ok { output }
    }

    /// The message this outcome contributes to the workflow exception list,
    /// if any.
    pub fn exception_message(&self) -> Option<&str> {
        match self {
            TaskOutcome::Failed { error } => Some(error),
            TaskOutcome::Exception { reason } => Some(reason),
            TaskOutcome::Ok { .. } | TaskOutcome::Skipped => None,
        }
    }

    pub fn is_terminal_success(&self) -> bool {
        matches!(self, TaskOutcome::Ok { .. } | TaskOutcome::Skipped)
    }
}

/// Recompute the quality report for the passport.
pub fn run_quality_check(passport: &Passport, today: NaiveDate) -> TaskOutcome {
    TaskOutcome::ok(TaskOutput::Quality(
        super::quality::generate_quality_report(passport, today),
    ))
}

/// Look the clinician up in the NPI registry. Missing NPI is a domain
/// exception; a lookup error is an execution failure isolated to this task.
pub async fn run_primary_source_verification<N: NpiRegistry + ?Sized>(
    registry: &N,
    passport: &Passport,
) -> TaskOutcome {
    let Some(npi) = passport.primary_npi() else {
        return TaskOutcome::Exception {
            reason: "No NPI present on passport enrollment practice locations".to_string(),
        };
    };

    match registry.lookup(npi).await {
        Ok(payload) => TaskOutcome::ok(TaskOutput::Verification(VerificationEvidence {
            npi: npi.to_string(),
            registry: payload,
            citation_url: NPI_REGISTRY_CITATION_URL,
        })),
        Err(err) => TaskOutcome::Failed {
            error: err.to_string(),
        },
    }
}

/// Emit an extraction envelope per known passport document.
pub fn run_document_ingestion(passport: &Passport) -> TaskOutcome {
    let extractions = passport
        .documents
        .iter()
        .map(|document| ExtractionEnvelope {
            document_type: document.document_type.clone(),
            file_name: document.file_name.clone(),
            fields: BTreeMap::new(),
            provenance: format!("upload:{}", document.source_artifact),
        })
        .collect();

    TaskOutcome::ok(TaskOutput::Documents(extractions))
}

/// Submit the clinician to a payer. Without a payer name this is a no-op.
pub fn run_payer_submission(payer_name: Option<&str>, now: DateTime<Utc>) -> TaskOutcome {
    match payer_name {
        None => TaskOutcome::Skipped,
        Some(payer) => TaskOutcome::ok(TaskOutput::Submission(new_submission_receipt(payer, now))),
    }
}

pub fn new_submission_receipt(payer_name: &str, now: DateTime<Utc>) -> SubmissionReceipt {
    SubmissionReceipt {
        submission_id: format!("sub-{}", &Uuid::new_v4().simple().to_string()[..12]),
        payer_name: payer_name.to_string(),
        submitted_at: now,
    }
}

/// Static guardrail rules plus the earliest safe start date (30 days out).
pub fn run_billing_guardrails(today: NaiveDate) -> TaskOutcome {
    TaskOutcome::ok(TaskOutput::Guardrails(GuardrailAdvice {
        rules: vec![
            GuardrailRule {
                rule_id: "no-encounters-before-effective-date",
                description:
                    "Do not schedule patient encounters before payer effective dates are confirmed.",
            },
            GuardrailRule {
                rule_id: "hold-claims-until-enrollment-approved",
                description:
                    "Hold claims for services rendered prior to enrollment approval to avoid denials.",
            },
            GuardrailRule {
                rule_id: "confirm-location-npi-mapping",
                description:
                    "Verify location-level NPI and taxonomy mapping before opening the schedule.",
            },
        ],
        earliest_safe_start: today + Duration::days(30),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::credentialing::sample::sample_passport;

    #[test]
    fn payer_submission_without_payer_is_skipped() {
        let outcome = run_payer_submission(None, Utc::now());
        assert!(matches!(outcome, TaskOutcome::Skipped));
        assert!(outcome.exception_message().is_none());
    }

    #[test]
    fn payer_submission_issues_a_receipt() {
        let now = Utc::now();
        match run_payer_submission(Some("Acme Health"), now) {
            TaskOutcome::Ok {
                output: TaskOutput::Submission(receipt),
            } => {
                assert!(receipt.submission_id.starts_with("sub-"));
                assert_eq!(receipt.payer_name, "Acme Health");
                assert_eq!(receipt.submitted_at, now);
            }
            other => panic!("expected submission receipt, got {other:?}"),
        }
    }

    #[test]
    fn guardrails_compute_thirty_day_start() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date");
        match run_billing_guardrails(today) {
            TaskOutcome::Ok {
                output: TaskOutput::Guardrails(advice),
            } => {
                assert_eq!(
                    advice.earliest_safe_start,
                    chrono::NaiveDate::from_ymd_opt(2025, 3, 31).expect("valid date")
                );
                assert_eq!(advice.rules.len(), 3);
            }
            other => panic!("expected guardrail advice, got {other:?}"),
        }
    }

    #[test]
    fn document_ingestion_produces_one_envelope_per_document() {
        let mut passport = sample_passport();
        passport.documents.push(
            crate::workflows::credentialing::passport::PassportDocument {
                document_id: "doc-abc123".to_string(),
                document_type: "medical_license".to_string(),
                file_name: "ma-license.pdf".to_string(),
                content_type: Some("application/pdf".to_string()),
                upload_date: Utc::now(),
                source_artifact: "manual-upload".to_string(),
                extracted_fields: BTreeMap::new(),
            },
        );

        match run_document_ingestion(&passport) {
            TaskOutcome::Ok {
                output: TaskOutput::Documents(envelopes),
            } => {
                assert_eq!(envelopes.len(), 1);
                assert_eq!(envelopes[0].file_name, "ma-license.pdf");
                assert!(envelopes[0].fields.is_empty());
                assert_eq!(envelopes[0].provenance, "upload:manual-upload");
            }
            other => panic!("expected extraction envelopes, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn verification_without_npi_is_a_domain_exception() {
        struct NeverRegistry;

        #[async_trait::async_trait]
        impl NpiRegistry for NeverRegistry {
            async fn lookup(
                &self,
                _npi: &str,
            ) -> Result<Value, crate::workflows::credentialing::verification::RegistryError>
            {
                panic!("lookup must not be called without an NPI");
            }
        }

        let mut passport = sample_passport();
        for location in &mut passport.enrollment.practice_locations {
            location.npi = None;
        }

        let outcome = run_primary_source_verification(&NeverRegistry, &passport).await;
        match outcome {
            TaskOutcome::Exception { reason } => assert!(reason.contains("No NPI")),
            other => panic!("expected exception, got {other:?}"),
        }
    }
}
