use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_store::StoreError;

use crate::models::PatientRecord;
use crate::services::PatientRegistry;

pub(crate) fn map_store_err(e: anyhow::Error) -> AppError {
    match e.downcast_ref::<StoreError>() {
        Some(StoreError::RevisionMismatch) => {
            AppError::Conflict("patient table changed while this request was in flight".to_string())
        }
        _ => AppError::Internal(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn get_patient(
    State(config): State<Arc<AppConfig>>,
    Path(patient_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let registry = PatientRegistry::new(&config);

    let (status, patient) = registry
        .lookup(Some(&patient_id))
        .map_err(map_store_err)?;

    Ok(Json(json!({
        "status": status,
        "patient": patient
    })))
}

#[axum::debug_handler]
pub async fn upsert_patient(
    State(config): State<Arc<AppConfig>>,
    Json(record): Json<PatientRecord>,
) -> Result<Json<Value>, AppError> {
    let registry = PatientRegistry::new(&config);

    let patient = registry.upsert(&record).map_err(map_store_err)?;

    Ok(Json(json!(patient)))
}
