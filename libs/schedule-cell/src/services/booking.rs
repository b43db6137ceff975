use anyhow::Result;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_store::{Revision, TableFile};

use crate::models::DoctorSchedule;
use crate::services::slots;

/// Loads the schedule file, runs the slot search, and persists
/// bookings through the store's revision check.
pub struct ScheduleService {
    file: TableFile,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self::from_path(&config.doctor_schedule_path)
    }

    pub fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            file: TableFile::new(path.into()),
        }
    }

    pub fn load(&self) -> Result<(DoctorSchedule, Revision)> {
        let (table, revision) = self.file.load()?;
        let schedule = DoctorSchedule::from_table(table)?;
        Ok((schedule, revision))
    }

    /// First run of `required_count` consecutive free slots for the
    /// doctor, or empty when there is none.
    pub fn availability(&self, doctor_id: &str, required_count: usize) -> Result<Vec<String>> {
        let (schedule, _) = self.load()?;
        Ok(slots::find_consecutive_free(&schedule, doctor_id, required_count))
    }

    /// Book an explicit set of slots, as returned by a prior search.
    pub fn book(&self, doctor_id: &str, slot_names: &[String], patient_name: &str) -> Result<()> {
        let (mut schedule, revision) = self.load()?;
        slots::book(&mut schedule, doctor_id, slot_names, patient_name)?;
        self.file.save(schedule.table(), &revision)?;
        Ok(())
    }

    /// Search and book in one load/save cycle, the way the wizard books:
    /// the run is re-derived at booking time rather than trusted from an
    /// earlier availability view. Returns the booked slot names, empty
    /// when the doctor has no fitting run.
    pub fn book_first_available(
        &self,
        doctor_id: &str,
        required_count: usize,
        patient_name: &str,
    ) -> Result<Vec<String>> {
        let (mut schedule, revision) = self.load()?;

        let run = slots::find_consecutive_free(&schedule, doctor_id, required_count);
        if run.is_empty() {
            warn!("No available slots for doctor: {}", doctor_id);
            return Ok(Vec::new());
        }

        slots::book(&mut schedule, doctor_id, &run, patient_name)?;
        self.file.save(schedule.table(), &revision)?;

        debug!("Booked {:?} for doctor {}", run, doctor_id);
        Ok(run)
    }
}
