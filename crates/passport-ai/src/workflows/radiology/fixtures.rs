//! Static study fixtures backing the radiology demo. Nothing here is read
//! from a PACS; the case is canned end to end.

use chrono::NaiveDate;

use super::domain::{ImagingStudy, LesionMeasurement};

pub const CURRENT_CASE_ID: &str = "case-ct-chest-001";

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Two chest CTs a year apart with the same tracked lesions, newest last.
pub fn studies() -> Vec<ImagingStudy> {
    vec![
        ImagingStudy {
            study_id: "ct-chest-2023",
            modality: "CT",
            description: "CT chest with contrast",
            performed_on: date(2023, 11, 2),
            lesions: vec![
                LesionMeasurement {
                    lesion: "right upper lobe nodule",
                    location: "right upper lobe",
                    long_axis_mm: 6.0,
                },
                LesionMeasurement {
                    lesion: "left adrenal nodule",
                    location: "left adrenal gland",
                    long_axis_mm: 12.0,
                },
                LesionMeasurement {
                    lesion: "mediastinal lymph node",
                    location: "station 4R",
                    long_axis_mm: 9.0,
                },
            ],
        },
        ImagingStudy {
            study_id: "ct-chest-2024",
            modality: "CT",
            description: "CT chest with contrast",
            performed_on: date(2024, 11, 8),
            lesions: vec![
                LesionMeasurement {
                    lesion: "right upper lobe nodule",
                    location: "right upper lobe",
                    long_axis_mm: 8.5,
                },
                LesionMeasurement {
                    lesion: "left adrenal nodule",
                    location: "left adrenal gland",
                    long_axis_mm: 12.3,
                },
                LesionMeasurement {
                    lesion: "mediastinal lymph node",
                    location: "station 4R",
                    long_axis_mm: 7.1,
                },
            ],
        },
    ]
}
