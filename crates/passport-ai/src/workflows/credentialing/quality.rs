use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::passport::{ClinicianId, Passport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    Missing,
    Inconsistent,
    Expired,
}

impl IssueKind {
    pub const fn label(self) -> &'static str {
        match self {
            IssueKind::Missing => "missing",
            IssueKind::Inconsistent => "inconsistent",
            IssueKind::Expired => "expired",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl IssueSeverity {
    pub const fn label(self) -> &'static str {
        match self {
            IssueSeverity::Low => "low",
            IssueSeverity::Medium => "medium",
            IssueSeverity::High => "high",
            IssueSeverity::Critical => "critical",
        }
    }
}

/// A single data-quality finding, pointing at the offending field path.
#[derive(Debug, Clone, Serialize)]
pub struct QualityIssue {
    pub field_name: String,
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<&'static str>,
}

/// Completeness and consistency findings for one passport.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub clinician_id: ClinicianId,
    pub issues: Vec<QualityIssue>,
    pub completeness_score: f32,
    pub generated_at: DateTime<Utc>,
}

impl QualityReport {
    pub fn worst_severity(&self) -> Option<IssueSeverity> {
        self.issues.iter().map(|issue| issue.severity).max()
    }
}

/// Scan the passport for gaps, date conflicts, and expirations relative to
/// `today`. Findings are ordered by the section they were scanned from.
pub fn generate_quality_report(passport: &Passport, today: NaiveDate) -> QualityReport {
    let mut issues = Vec::new();

    if passport.identity.legal_name.is_empty() {
        issues.push(QualityIssue {
            field_name: "identity.legal_name".to_string(),
            kind: IssueKind::Missing,
            severity: IssueSeverity::Critical,
            description: "Legal name is required".to_string(),
            suggested_fix: None,
        });
    }

    for license in &passport.licenses.state_licenses {
        if license.expiration_date < today {
            issues.push(QualityIssue {
                field_name: format!("licenses.state_licenses.{}", license.state),
                kind: IssueKind::Expired,
                severity: IssueSeverity::Critical,
                description: format!(
                    "License in {} expired on {}",
                    license.state, license.expiration_date
                ),
                suggested_fix: Some("Renew license or update expiration date"),
            });
        }
    }

    if let Some(dea_expiration) = passport.licenses.dea_expiration {
        if dea_expiration < today {
            issues.push(QualityIssue {
                field_name: "licenses.dea_expiration".to_string(),
                kind: IssueKind::Expired,
                severity: IssueSeverity::Critical,
                description: format!("DEA registration expired on {dea_expiration}"),
                suggested_fix: Some("Renew DEA registration"),
            });
        }
    }

    for certification in &passport.board_certifications {
        if let Some(expiration) = certification.expiration_date {
            if expiration < today {
                issues.push(QualityIssue {
                    field_name: format!("board_certifications.{}", certification.board_name),
                    kind: IssueKind::Expired,
                    severity: IssueSeverity::High,
                    description: format!(
                        "Board certification {} expired on {}",
                        certification.specialty, expiration
                    ),
                    suggested_fix: Some("Renew board certification or update status"),
                });
            }
        }
    }

    if let Some(malpractice) = &passport.malpractice {
        if malpractice.expiration_date < today {
            issues.push(QualityIssue {
                field_name: "malpractice.expiration_date".to_string(),
                kind: IssueKind::Expired,
                severity: IssueSeverity::Critical,
                description: format!(
                    "Malpractice insurance expired on {}",
                    malpractice.expiration_date
                ),
                suggested_fix: Some("Renew malpractice insurance"),
            });
        }
    }

    for (index, work) in passport.work_history.iter().enumerate() {
        if let Some(end_date) = work.end_date {
            if work.start_date > end_date {
                issues.push(QualityIssue {
                    field_name: format!("work_history[{index}]"),
                    kind: IssueKind::Inconsistent,
                    severity: IssueSeverity::High,
                    description: format!(
                        "Start date {} is after end date {}",
                        work.start_date, end_date
                    ),
                    suggested_fix: Some("Correct the date range"),
                });
            }
        }
    }

    for (index, window) in passport.identity.address_history.windows(2).enumerate() {
        let (current, next) = (&window[0], &window[1]);
        if let Some(end_date) = current.end_date {
            if end_date > next.start_date {
                issues.push(QualityIssue {
                    field_name: format!("identity.address_history[{index}]"),
                    kind: IssueKind::Inconsistent,
                    severity: IssueSeverity::Medium,
                    description: "Address date ranges overlap".to_string(),
                    suggested_fix: Some("Correct address date ranges"),
                });
            }
        }
    }

    if passport.references.len() < 2 {
        issues.push(QualityIssue {
            field_name: "references".to_string(),
            kind: IssueKind::Missing,
            severity: IssueSeverity::High,
            description: "At least 2 peer references required".to_string(),
            suggested_fix: Some("Add additional peer references"),
        });
    }

    QualityReport {
        clinician_id: passport.clinician_id.clone(),
        issues,
        completeness_score: completeness_score(passport),
        generated_at: Utc::now(),
    }
}

/// Fraction of the 10 top-level passport sections that carry data.
fn completeness_score(passport: &Passport) -> f32 {
    let sections = [
        !passport.identity.legal_name.is_empty(),
        !passport.education.is_empty(),
        !passport.training.is_empty(),
        !passport.work_history.is_empty(),
        !passport.licenses.state_licenses.is_empty(),
        !passport.board_certifications.is_empty(),
        passport.malpractice.is_some(),
        !passport.references.is_empty(),
        !passport.enrollment.practice_locations.is_empty(),
        !passport.disclosures.is_empty(),
    ];

    let completed = sections.iter().filter(|present| **present).count();
    completed as f32 / sections.len() as f32
}
