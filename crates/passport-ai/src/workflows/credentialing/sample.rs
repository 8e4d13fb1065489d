//! Bundled demonstration passport used by the seed route, the CLI demo, and
//! tests.

use chrono::{NaiveDate, TimeZone, Utc};

use super::passport::{
    Address, BoardCertification, CertificationStatus, ClinicianId, Education, Enrollment, Identity,
    LicenseStatus, Licenses, Malpractice, Passport, PracticeLocation, Reference, StateLicense,
    Training, TrainingProgram, WorkHistory,
};

pub const SAMPLE_CLINICIAN_ID: &str = "clinician-001";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// A cardiologist passport with every section populated and no data-quality
/// findings as of the fixture dates.
pub fn sample_passport() -> Passport {
    let identity = Identity {
        legal_name: "Dr. Sarah Johnson".to_string(),
        aliases: vec!["Sarah J. Johnson".to_string(), "S. Johnson".to_string()],
        date_of_birth: date(1985, 3, 15),
        address_history: vec![
            Address {
                street: "123 Medical Center Dr".to_string(),
                city: "Boston".to_string(),
                state: "MA".to_string(),
                zip_code: "02115".to_string(),
                country: "USA".to_string(),
                start_date: date(2020, 1, 1),
                end_date: None,
            },
            Address {
                street: "456 Health Ave".to_string(),
                city: "Cambridge".to_string(),
                state: "MA".to_string(),
                zip_code: "02139".to_string(),
                country: "USA".to_string(),
                start_date: date(2015, 6, 1),
                end_date: Some(date(2019, 12, 31)),
            },
        ],
        email: "sarah.johnson@example.com".to_string(),
        phone: "555-123-4567".to_string(),
    };

    let education = vec![Education {
        institution: "Harvard Medical School".to_string(),
        degree: "MD".to_string(),
        field_of_study: "Medicine".to_string(),
        start_date: date(2007, 9, 1),
        end_date: date(2011, 5, 31),
        graduation_date: Some(date(2011, 5, 31)),
        verified: true,
    }];

    let training = vec![
        Training {
            program_name: "Internal Medicine Residency".to_string(),
            institution: "Massachusetts General Hospital".to_string(),
            specialty: "Internal Medicine".to_string(),
            start_date: date(2011, 7, 1),
            end_date: date(2014, 6, 30),
            program_type: TrainingProgram::Residency,
        },
        Training {
            program_name: "Cardiology Fellowship".to_string(),
            institution: "Brigham and Women's Hospital".to_string(),
            specialty: "Cardiology".to_string(),
            start_date: date(2014, 7, 1),
            end_date: date(2017, 6, 30),
            program_type: TrainingProgram::Fellowship,
        },
    ];

    let work_history = vec![
        WorkHistory {
            employer: "Boston Cardiology Associates".to_string(),
            position: "Attending Cardiologist".to_string(),
            start_date: date(2017, 7, 1),
            end_date: None,
            location: "Boston, MA".to_string(),
            verified: true,
        },
        WorkHistory {
            employer: "Massachusetts General Hospital".to_string(),
            position: "Cardiology Fellow".to_string(),
            start_date: date(2014, 7, 1),
            end_date: Some(date(2017, 6, 30)),
            location: "Boston, MA".to_string(),
            verified: true,
        },
    ];

    let licenses = Licenses {
        state_licenses: vec![
            StateLicense {
                state: "MA".to_string(),
                license_number: "MD123456".to_string(),
                license_type: "Medical Doctor".to_string(),
                issue_date: date(2011, 6, 1),
                expiration_date: date(2030, 12, 31),
                status: LicenseStatus::Active,
                verified: true,
                verification_date: Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).single().expect("valid fixture timestamp")),
            },
            StateLicense {
                state: "NY".to_string(),
                license_number: "MD789012".to_string(),
                license_type: "Medical Doctor".to_string(),
                issue_date: date(2012, 3, 1),
                expiration_date: date(2029, 12, 31),
                status: LicenseStatus::Active,
                verified: true,
                verification_date: Some(Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).single().expect("valid fixture timestamp")),
            },
        ],
        dea_number: Some("BJ1234567".to_string()),
        dea_expiration: Some(date(2030, 6, 30)),
        cds_registrations: vec!["MA".to_string()],
    };

    let board_certifications = vec![
        BoardCertification {
            board_name: "American Board of Internal Medicine".to_string(),
            specialty: "Internal Medicine".to_string(),
            certification_number: "ABIM-123456".to_string(),
            issue_date: date(2014, 9, 1),
            expiration_date: Some(date(2030, 12, 31)),
            status: CertificationStatus::Active,
            moc_status: Some("Current".to_string()),
            verified: true,
        },
        BoardCertification {
            board_name: "American Board of Internal Medicine".to_string(),
            specialty: "Cardiovascular Disease".to_string(),
            certification_number: "ABIM-CV-123456".to_string(),
            issue_date: date(2017, 9, 1),
            expiration_date: Some(date(2031, 12, 31)),
            status: CertificationStatus::Active,
            moc_status: Some("Current".to_string()),
            verified: true,
        },
    ];

    let malpractice = Malpractice {
        carrier: "Medical Protective Company".to_string(),
        policy_number: "MP-123456789".to_string(),
        coverage_amount: 1_000_000.0,
        effective_date: date(2024, 1, 1),
        expiration_date: date(2030, 1, 1),
        claims_history: Vec::new(),
        loss_runs_available: true,
    };

    let references = vec![
        Reference {
            name: "Dr. Michael Chen".to_string(),
            title: "Chief of Cardiology".to_string(),
            organization: "Massachusetts General Hospital".to_string(),
            email: "mchen@mgh.example.org".to_string(),
            phone: "555-234-5678".to_string(),
            relationship: "Former Program Director".to_string(),
            contact_date: None,
            verified: false,
        },
        Reference {
            name: "Dr. Emily Rodriguez".to_string(),
            title: "Attending Cardiologist".to_string(),
            organization: "Boston Cardiology Associates".to_string(),
            email: "erodriguez@bostoncardio.example.com".to_string(),
            phone: "555-345-6789".to_string(),
            relationship: "Colleague".to_string(),
            contact_date: None,
            verified: false,
        },
    ];

    let enrollment = Enrollment {
        practice_locations: vec![PracticeLocation {
            name: "Boston Cardiology Associates - Main Office".to_string(),
            address: Address {
                street: "123 Medical Center Dr".to_string(),
                city: "Boston".to_string(),
                state: "MA".to_string(),
                zip_code: "02115".to_string(),
                country: "USA".to_string(),
                start_date: date(2020, 1, 1),
                end_date: None,
            },
            npi: Some("1234567890".to_string()),
            taxonomy_codes: vec!["207RC0000X".to_string(), "207RI0001X".to_string()],
        }],
        ein: Some("12-3456789".to_string()),
        w9_on_file: true,
        specialties: vec!["Cardiology".to_string(), "Internal Medicine".to_string()],
        taxonomies: vec!["207RC0000X".to_string(), "207RI0001X".to_string()],
    };

    Passport {
        clinician_id: ClinicianId(SAMPLE_CLINICIAN_ID.to_string()),
        identity,
        education,
        training,
        work_history,
        hospital_affiliations: Vec::new(),
        licenses,
        board_certifications,
        malpractice: Some(malpractice),
        disclosures: Vec::new(),
        references,
        enrollment,
        documents: Vec::new(),
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid fixture timestamp"),
        updated_at: Utc::now(),
    }
}

/// Canned NPPES payload for offline demos and tests, shaped like a real
/// single-result registry response.
pub fn sample_registry_payload() -> serde_json::Value {
    serde_json::json!({
        "result_count": 1,
        "results": [{
            "number": "1234567890",
            "enumeration_type": "NPI-1",
            "basic": {
                "first_name": "SARAH",
                "last_name": "JOHNSON",
                "credential": "MD",
                "status": "A"
            },
            "taxonomies": [{
                "code": "207RC0000X",
                "desc": "Internal Medicine, Cardiovascular Disease",
                "primary": true,
                "state": "MA"
            }]
        }]
    })
}
