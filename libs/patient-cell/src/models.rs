use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Column order of the patient table file.
pub const PATIENT_COLUMNS: [&str; 9] = [
    "patientid",
    "Name",
    "DOB",
    "Email",
    "Location",
    "doctorid",
    "InsuranceCarrier",
    "MemberID",
    "Group",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_id: Option<String>,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub location: String,
    pub doctor_id: Option<String>,
    /// Insurance fields are captured later in the wizard; the literal
    /// string "NA" is accepted as-is.
    pub insurance_carrier: Option<String>,
    pub member_id: Option<String>,
    pub group: Option<String>,
}

/// Whether the submitted identifier matched an existing record.
/// Determines how many consecutive slots a booking needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientStatus {
    New,
    Returning,
}

impl PatientStatus {
    pub fn required_slots(&self) -> usize {
        match self {
            PatientStatus::New => 2,
            PatientStatus::Returning => 1,
        }
    }
}

impl fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatientStatus::New => write!(f, "new"),
            PatientStatus::Returning => write!(f, "returning"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PatientError {
    #[error("Invalid date of birth: {0}")]
    InvalidDateOfBirth(String),

    #[error("Patient table error: {0}")]
    TableError(String),
}
