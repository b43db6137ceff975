use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Map, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_store::StoreError;

use crate::models::{AvailabilityQuery, BookSlotsRequest, ScheduleError};
use crate::services::ScheduleService;

pub(crate) fn map_store_err(e: anyhow::Error) -> AppError {
    match e.downcast_ref::<StoreError>() {
        Some(StoreError::RevisionMismatch) => {
            AppError::Conflict("schedule changed while this request was in flight".to_string())
        }
        _ => match e.downcast_ref::<ScheduleError>() {
            Some(ScheduleError::UnknownDoctor(_)) => AppError::NotFound(e.to_string()),
            Some(ScheduleError::UnknownSlot(_)) => AppError::BadRequest(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        },
    }
}

/// The whole schedule table, one object per doctor row, for the
/// wizard's schedule view.
#[axum::debug_handler]
pub async fn get_schedule(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);
    let (schedule, _) = service.load().map_err(map_store_err)?;

    let table = schedule.table();
    let doctors: Vec<Value> = (0..table.row_count())
        .map(|row| {
            let mut object = Map::new();
            for (col, header) in table.headers().iter().enumerate() {
                object.insert(header.clone(), json!(table.cell(row, col)));
            }
            Value::Object(object)
        })
        .collect();

    Ok(Json(json!({
        "slots": schedule.slot_names(),
        "doctors": doctors
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);

    let slots = service
        .availability(&query.doctor_id, query.required_slots)
        .map_err(map_store_err)?;

    // No-availability is a warning payload, not an error.
    let warning = slots
        .is_empty()
        .then(|| "No available slots for this doctor.");

    Ok(Json(json!({
        "doctor_id": query.doctor_id,
        "slots": slots,
        "warning": warning
    })))
}

#[axum::debug_handler]
pub async fn book_slots(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<BookSlotsRequest>,
) -> Result<Json<Value>, AppError> {
    if request.slots.is_empty() {
        return Err(AppError::ValidationError("no slots named".to_string()));
    }

    let service = ScheduleService::new(&config);
    service
        .book(&request.doctor_id, &request.slots, &request.patient_name)
        .map_err(map_store_err)?;

    Ok(Json(json!({
        "doctor_id": request.doctor_id,
        "booked": request.slots
    })))
}
