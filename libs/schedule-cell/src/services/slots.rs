use tracing::debug;

use crate::models::{DoctorSchedule, ScheduleError};

/// Return the names of the first run of `required_count` consecutive
/// free slots in the doctor's row, in slot declaration order. The
/// result is empty when the count is zero or exceeds the slot count,
/// when the doctor has no row, or when no uninterrupted run exists.
/// A booked slot anywhere inside a window breaks the run. Pure read.
pub fn find_consecutive_free(
    schedule: &DoctorSchedule,
    doctor_id: &str,
    required_count: usize,
) -> Vec<String> {
    let slot_columns = schedule.slot_columns();
    if required_count == 0 || required_count > slot_columns.len() {
        return Vec::new();
    }

    let row = match schedule.doctor_row(doctor_id) {
        Some(row) => row,
        None => {
            // Indistinguishable from "fully booked" at the API surface;
            // the trace is the only place the difference shows.
            debug!("No schedule row for doctor: {}", doctor_id);
            return Vec::new();
        }
    };

    let free: Vec<usize> = (0..slot_columns.len())
        .filter(|&i| schedule.cell(row, slot_columns[i]).is_empty())
        .collect();
    if free.len() < required_count {
        return Vec::new();
    }

    let names = schedule.slot_names();
    for i in 0..=(free.len() - required_count) {
        if (0..required_count).all(|j| free[i + j] == free[i] + j) {
            return (0..required_count)
                .map(|j| names[free[i] + j].to_string())
                .collect();
        }
    }

    Vec::new()
}

/// Write the patient's name into each named slot of the doctor's row.
/// The slots are expected to come from a prior search for the same
/// doctor; occupancy is not re-checked here, the store's revision
/// check at save time is what catches a cross-session race.
pub fn book(
    schedule: &mut DoctorSchedule,
    doctor_id: &str,
    slot_names: &[String],
    patient_name: &str,
) -> Result<(), ScheduleError> {
    let row = schedule
        .doctor_row(doctor_id)
        .ok_or_else(|| ScheduleError::UnknownDoctor(doctor_id.to_string()))?;

    for slot in slot_names {
        let column = schedule
            .column_index(slot)
            .ok_or_else(|| ScheduleError::UnknownSlot(slot.clone()))?;
        schedule.set_cell(row, column, patient_name.to_string());
    }

    debug!(
        "Booked {} slot(s) for doctor {} under '{}'",
        slot_names.len(),
        doctor_id,
        patient_name
    );

    Ok(())
}
