use anyhow::Result;
use chrono::NaiveDate;
use tracing::debug;

use shared_config::AppConfig;
use shared_store::{Table, TableFile};

use crate::models::{PatientError, PatientRecord, PatientStatus, PATIENT_COLUMNS};

const DOB_FORMAT: &str = "%Y-%m-%d";

/// Lookup and upsert over the patient table file. The whole file is
/// read on every call and rewritten on every change, guarded by the
/// store's revision check.
pub struct PatientRegistry {
    file: TableFile,
}

impl PatientRegistry {
    pub fn new(config: &AppConfig) -> Self {
        Self::from_path(&config.patient_db_path)
    }

    pub fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            file: TableFile::new(path.into()),
        }
    }

    /// Classify the submitted identifier. An empty or missing id, or an
    /// id with no matching row, means a new patient, never an error.
    pub fn lookup(&self, patient_id: Option<&str>) -> Result<(PatientStatus, Option<PatientRecord>)> {
        let id = match normalize(patient_id) {
            Some(id) => id,
            None => return Ok((PatientStatus::New, None)),
        };

        debug!("Looking up patient: {}", id);

        let (table, _) = self.file.load()?;
        match table.find_row("patientid", &id) {
            Some(row) => {
                let record = row_to_record(&table, row)?;
                Ok((PatientStatus::Returning, Some(record)))
            }
            None => Ok((PatientStatus::New, None)),
        }
    }

    /// Overwrite the matching row in place, or append one new row when
    /// the identifier is missing or unknown. Fields the caller left as
    /// `None` are preserved on an existing row.
    pub fn upsert(&self, record: &PatientRecord) -> Result<PatientRecord> {
        let (mut table, revision) = self.file.load()?;
        if table.headers().is_empty() {
            table = Table::new(PATIENT_COLUMNS.iter().map(|c| c.to_string()).collect());
        }

        let existing = normalize(record.patient_id.as_deref())
            .and_then(|id| table.find_row("patientid", &id));

        match existing {
            Some(row) => {
                debug!("Updating patient row {} in place", row);
                overwrite_row(&mut table, row, record)?;
            }
            None => {
                debug!("Appending new patient row for: {}", record.name);
                table.push_row(record_to_row(record));
            }
        }

        self.file.save(&table, &revision)?;

        let row = existing.unwrap_or(table.row_count() - 1);
        row_to_record(&table, row)
    }
}

fn normalize(id: Option<&str>) -> Option<String> {
    let id = id?.trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

fn column(table: &Table, name: &str) -> Result<usize, PatientError> {
    table
        .column_index(name)
        .ok_or_else(|| PatientError::TableError(format!("missing column: {}", name)))
}

fn record_to_row(record: &PatientRecord) -> Vec<String> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    vec![
        opt(&record.patient_id),
        record.name.clone(),
        record.date_of_birth.format(DOB_FORMAT).to_string(),
        record.email.clone(),
        record.location.clone(),
        opt(&record.doctor_id),
        opt(&record.insurance_carrier),
        opt(&record.member_id),
        opt(&record.group),
    ]
}

fn overwrite_row(table: &mut Table, row: usize, record: &PatientRecord) -> Result<()> {
    let name_col = column(table, "Name")?;
    let dob_col = column(table, "DOB")?;
    let email_col = column(table, "Email")?;
    let location_col = column(table, "Location")?;
    table.set_cell(row, name_col, record.name.clone());
    table.set_cell(row, dob_col, record.date_of_birth.format(DOB_FORMAT).to_string());
    table.set_cell(row, email_col, record.email.clone());
    table.set_cell(row, location_col, record.location.clone());

    // Optional fields only overwrite when supplied.
    let optional = [
        ("doctorid", &record.doctor_id),
        ("InsuranceCarrier", &record.insurance_carrier),
        ("MemberID", &record.member_id),
        ("Group", &record.group),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            let col = column(table, name)?;
            table.set_cell(row, col, value.clone());
        }
    }

    Ok(())
}

fn row_to_record(table: &Table, row: usize) -> Result<PatientRecord> {
    let cell = |name: &str| -> Result<String, PatientError> {
        Ok(table.cell(row, column(table, name)?).to_string())
    };
    let optional = |name: &str| -> Result<Option<String>, PatientError> {
        let value = cell(name)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    };

    let dob = cell("DOB")?;
    let date_of_birth = NaiveDate::parse_from_str(&dob, DOB_FORMAT)
        .map_err(|_| PatientError::InvalidDateOfBirth(dob))?;

    Ok(PatientRecord {
        patient_id: optional("patientid")?,
        name: cell("Name")?,
        date_of_birth,
        email: cell("Email")?,
        location: cell("Location")?,
        doctor_id: optional("doctorid")?,
        insurance_carrier: optional("InsuranceCarrier")?,
        member_id: optional("MemberID")?,
        group: optional("Group")?,
    })
}
