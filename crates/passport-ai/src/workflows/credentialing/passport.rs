use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for clinicians, the primary key of a passport.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClinicianId(pub String);

impl std::fmt::Display for ClinicianId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a state medical license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    Active,
    Inactive,
    Expired,
    Suspended,
    Revoked,
}

impl LicenseStatus {
    pub const fn label(self) -> &'static str {
        match self {
            LicenseStatus::Active => "active",
            LicenseStatus::Inactive => "inactive",
            LicenseStatus::Expired => "expired",
            LicenseStatus::Suspended => "suspended",
            LicenseStatus::Revoked => "revoked",
        }
    }
}

/// A dated residential or practice address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    #[serde(default = "default_country")]
    pub country: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

fn default_country() -> String {
    "USA".to_string()
}

/// Identity and demographics block of the passport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub legal_name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub address_history: Vec<Address>,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub graduation_date: Option<NaiveDate>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingProgram {
    Residency,
    Fellowship,
    Internship,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Training {
    pub program_name: String,
    pub institution: String,
    pub specialty: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub program_type: TrainingProgram,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHistory {
    pub employer: String,
    pub position: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    pub location: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalAffiliation {
    pub hospital_name: String,
    pub appointment_type: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub privileges: Vec<String>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateLicense {
    pub state: String,
    pub license_number: String,
    pub license_type: String,
    pub issue_date: NaiveDate,
    pub expiration_date: NaiveDate,
    pub status: LicenseStatus,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub verification_date: Option<DateTime<Utc>>,
}

/// Licensure block: state boards plus federal registrations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Licenses {
    #[serde(default)]
    pub state_licenses: Vec<StateLicense>,
    #[serde(default)]
    pub dea_number: Option<String>,
    #[serde(default)]
    pub dea_expiration: Option<NaiveDate>,
    #[serde(default)]
    pub cds_registrations: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationStatus {
    Active,
    Expired,
    Lapsed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCertification {
    pub board_name: String,
    pub specialty: String,
    pub certification_number: String,
    pub issue_date: NaiveDate,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    pub status: CertificationStatus,
    #[serde(default)]
    pub moc_status: Option<String>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MalpracticeClaim {
    pub claim_number: String,
    pub date_of_incident: NaiveDate,
    #[serde(default)]
    pub date_closed: Option<NaiveDate>,
    #[serde(default)]
    pub amount_paid: Option<f64>,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Malpractice {
    pub carrier: String,
    pub policy_number: String,
    pub coverage_amount: f64,
    pub effective_date: NaiveDate,
    pub expiration_date: NaiveDate,
    #[serde(default)]
    pub claims_history: Vec<MalpracticeClaim>,
    #[serde(default)]
    pub loss_runs_available: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisclosureKind {
    Sanction,
    DisciplinaryAction,
    Criminal,
    DeaAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Disclosure {
    pub kind: DisclosureKind,
    pub description: String,
    pub date: NaiveDate,
    pub jurisdiction: String,
    pub status: String,
    #[serde(default)]
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: String,
    pub title: String,
    pub organization: String,
    pub email: String,
    pub phone: String,
    pub relationship: String,
    #[serde(default)]
    pub contact_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeLocation {
    pub name: String,
    pub address: Address,
    #[serde(default)]
    pub npi: Option<String>,
    #[serde(default)]
    pub taxonomy_codes: Vec<String>,
}

/// Payer-enrollment block of the passport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    #[serde(default)]
    pub practice_locations: Vec<PracticeLocation>,
    #[serde(default)]
    pub ein: Option<String>,
    #[serde(default)]
    pub w9_on_file: bool,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default)]
    pub taxonomies: Vec<String>,
}

/// Metadata for a document attached to the passport. File contents are not
/// retained; extraction is a stub that fills `extracted_fields` lazily.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassportDocument {
    pub document_id: String,
    pub document_type: String,
    pub file_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub upload_date: DateTime<Utc>,
    pub source_artifact: String,
    #[serde(default)]
    pub extracted_fields: BTreeMap<String, String>,
}

/// The aggregate credentialing record for one clinician.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passport {
    pub clinician_id: ClinicianId,
    pub identity: Identity,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub training: Vec<Training>,
    #[serde(default)]
    pub work_history: Vec<WorkHistory>,
    #[serde(default)]
    pub hospital_affiliations: Vec<HospitalAffiliation>,
    #[serde(default)]
    pub licenses: Licenses,
    #[serde(default)]
    pub board_certifications: Vec<BoardCertification>,
    #[serde(default)]
    pub malpractice: Option<Malpractice>,
    #[serde(default)]
    pub disclosures: Vec<Disclosure>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub enrollment: Enrollment,
    #[serde(default)]
    pub documents: Vec<PassportDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Passport {
    /// First NPI found across practice locations, if any.
    pub fn primary_npi(&self) -> Option<&str> {
        self.enrollment
            .practice_locations
            .iter()
            .find_map(|location| location.npi.as_deref())
    }

    pub fn has_active_state_license(&self) -> bool {
        self.licenses
            .state_licenses
            .iter()
            .any(|license| license.status == LicenseStatus::Active)
    }

    pub fn has_residency_training(&self) -> bool {
        self.training
            .iter()
            .any(|training| training.program_type == TrainingProgram::Residency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(npi: Option<&str>) -> PracticeLocation {
        PracticeLocation {
            name: "Main Office".to_string(),
            address: Address {
                street: "1 Care Way".to_string(),
                city: "Boston".to_string(),
                state: "MA".to_string(),
                zip_code: "02115".to_string(),
                country: "USA".to_string(),
                start_date: NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid date"),
                end_date: None,
            },
            npi: npi.map(str::to_string),
            taxonomy_codes: Vec::new(),
        }
    }

    #[test]
    fn primary_npi_skips_locations_without_one() {
        let enrollment = Enrollment {
            practice_locations: vec![location(None), location(Some("1234567890"))],
            ..Enrollment::default()
        };

        let npi = enrollment
            .practice_locations
            .iter()
            .find_map(|loc| loc.npi.as_deref());
        assert_eq!(npi, Some("1234567890"));
    }
}
