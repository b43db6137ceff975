use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_store::Table;

/// Key column of the schedule file, one row per doctor.
pub const DOCTOR_ID_COLUMN: &str = "doctorid";

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule table has no 'doctorid' column")]
    MissingDoctorColumn,

    #[error("doctor not found in schedule: {0}")]
    UnknownDoctor(String),

    #[error("unknown slot: {0}")]
    UnknownSlot(String),
}

/// A doctor schedule table: one row per doctor, one column per time
/// slot. Slot columns are the ones whose name encodes a time range
/// (contains '-', e.g. "09:00-09:30"), taken in declaration order and
/// treated as chronological. An empty cell is a free slot; otherwise
/// the cell holds the booked patient's display name.
#[derive(Debug, Clone)]
pub struct DoctorSchedule {
    table: Table,
}

impl DoctorSchedule {
    pub fn from_table(table: Table) -> Result<Self, ScheduleError> {
        if table.column_index(DOCTOR_ID_COLUMN).is_none() {
            return Err(ScheduleError::MissingDoctorColumn);
        }
        Ok(Self { table })
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn into_table(self) -> Table {
        self.table
    }

    /// Slot column names in declaration order.
    pub fn slot_names(&self) -> Vec<&str> {
        self.table
            .headers()
            .iter()
            .filter(|h| h.contains('-'))
            .map(String::as_str)
            .collect()
    }

    /// Header indices of the slot columns, in declaration order.
    pub(crate) fn slot_columns(&self) -> Vec<usize> {
        self.table
            .headers()
            .iter()
            .enumerate()
            .filter(|(_, h)| h.contains('-'))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn doctor_ids(&self) -> Vec<&str> {
        let col = match self.table.column_index(DOCTOR_ID_COLUMN) {
            Some(col) => col,
            None => return Vec::new(),
        };
        (0..self.table.row_count())
            .map(|row| self.table.cell(row, col))
            .collect()
    }

    pub(crate) fn doctor_row(&self, doctor_id: &str) -> Option<usize> {
        self.table.find_row(DOCTOR_ID_COLUMN, doctor_id)
    }

    pub(crate) fn cell(&self, row: usize, column: usize) -> &str {
        self.table.cell(row, column)
    }

    pub(crate) fn set_cell(&mut self, row: usize, column: usize, value: String) {
        self.table.set_cell(row, column, value);
    }

    pub(crate) fn column_index(&self, name: &str) -> Option<usize> {
        self.table.column_index(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub doctor_id: String,
    pub required_slots: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookSlotsRequest {
    pub doctor_id: String,
    pub slots: Vec<String>,
    pub patient_name: String,
}
