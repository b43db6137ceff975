use std::path::Path as FilePath;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::warn;
use uuid::Uuid;

use notification_cell::models::EmailMessage;
use notification_cell::services::reminder;
use patient_cell::models::{PatientRecord, PatientStatus};
use patient_cell::services::PatientRegistry;
use schedule_cell::services::ScheduleService;
use shared_models::error::AppError;
use shared_store::StoreError;

use crate::models::*;
use crate::services::WizardState;

fn map_store_err(e: anyhow::Error) -> AppError {
    match e.downcast_ref::<StoreError>() {
        Some(StoreError::RevisionMismatch) => {
            AppError::Conflict("the clinic files changed while this request was in flight".to_string())
        }
        _ => AppError::Internal(e.to_string()),
    }
}

#[axum::debug_handler]
pub async fn create_session(State(state): State<WizardState>) -> Json<Value> {
    let session = state.sessions.create().await;

    Json(json!({
        "session_id": session.id,
        "step": session.step,
        "prompt": GREETING_PROMPT
    }))
}

/// The greeting gate: exactly the word "hello" (any case) moves the
/// wizard to intake, anything else re-prompts.
#[axum::debug_handler]
pub async fn greet(
    State(state): State<WizardState>,
    Path(id): Path<Uuid>,
    Json(request): Json<GreetRequest>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.sessions.expect(id, WizardStep::Greet).await?;

    session.say(ChatRole::User, request.message.clone());

    let reply = if request.message.trim().eq_ignore_ascii_case("hello") {
        session.step = WizardStep::Intake;
        GREETING
    } else {
        GREETING_RETRY
    };
    session.say(ChatRole::Agent, reply);

    let response = json!({
        "session_id": session.id,
        "step": session.step,
        "reply": reply,
        "chat": session.chat
    });
    state.sessions.put(session).await;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn intake(
    State(state): State<WizardState>,
    Path(id): Path<Uuid>,
    Json(request): Json<IntakeRequest>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.sessions.expect(id, WizardStep::Intake).await?;

    let registry = PatientRegistry::new(&state.config);
    let (status, _) = registry
        .lookup(request.patient_id.as_deref())
        .map_err(map_store_err)?;

    // First-time patients get an identifier here so the booking and
    // insurance steps update the same row instead of appending again.
    let patient_id = request
        .patient_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .or_else(|| Some(Uuid::new_v4().to_string()));

    let record = PatientRecord {
        patient_id,
        name: request.name.clone(),
        date_of_birth: request.date_of_birth,
        email: request.email.clone(),
        location: request.location.clone(),
        doctor_id: request.doctor_id.clone(),
        insurance_carrier: None,
        member_id: None,
        group: None,
    };
    let saved = registry.upsert(&record).map_err(map_store_err)?;

    session.status = Some(status);
    session.patient = Some(saved);
    session.step = WizardStep::Schedule;

    let message = match status {
        PatientStatus::New => "New patient. Proceed to scheduling.",
        PatientStatus::Returning => "Returning patient. Proceed to scheduling.",
    };
    let response = json!({
        "session_id": session.id,
        "step": session.step,
        "status": status,
        "patient_id": session.patient.as_ref().and_then(|p| p.patient_id.clone()),
        "required_slots": status.required_slots(),
        "message": message
    });
    state.sessions.put(session).await;

    Ok(Json(response))
}

fn resolve_doctor(session_doctor: Option<&str>, requested: Option<&str>) -> Result<String, AppError> {
    let non_empty = |d: &&str| !d.trim().is_empty();
    requested
        .filter(non_empty)
        .or_else(|| session_doctor.filter(non_empty))
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest("a doctor id is required to schedule".to_string()))
}

/// Peek at the doctor's open run without advancing the wizard.
#[axum::debug_handler]
pub async fn availability(
    State(state): State<WizardState>,
    Path(id): Path<Uuid>,
    Query(query): Query<WizardAvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let session = state.sessions.expect(id, WizardStep::Schedule).await?;

    let patient_doctor = session.patient.as_ref().and_then(|p| p.doctor_id.clone());
    let doctor_id = resolve_doctor(patient_doctor.as_deref(), query.doctor_id.as_deref())?;
    let required = session
        .status
        .ok_or_else(|| AppError::Internal("session reached scheduling without intake".to_string()))?
        .required_slots();

    let service = ScheduleService::new(&state.config);
    let slots = service
        .availability(&doctor_id, required)
        .map_err(map_store_err)?;

    let warning = slots
        .is_empty()
        .then(|| "No available slots for this doctor.");

    Ok(Json(json!({
        "session_id": session.id,
        "step": session.step,
        "doctor_id": doctor_id,
        "required_slots": required,
        "slots": slots,
        "warning": warning
    })))
}

#[axum::debug_handler]
pub async fn book(
    State(state): State<WizardState>,
    Path(id): Path<Uuid>,
    Json(request): Json<BookRequest>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.sessions.expect(id, WizardStep::Schedule).await?;

    let mut patient = session
        .patient
        .clone()
        .ok_or_else(|| AppError::Internal("session reached scheduling without intake".to_string()))?;
    let doctor_id = resolve_doctor(patient.doctor_id.as_deref(), request.doctor_id.as_deref())?;
    let required = session
        .status
        .ok_or_else(|| AppError::Internal("session reached scheduling without intake".to_string()))?
        .required_slots();

    // The run is re-derived here; an availability view gone stale
    // cannot book slots someone else took in the meantime.
    let service = ScheduleService::new(&state.config);
    let booked = service
        .book_first_available(&doctor_id, required, &patient.name)
        .map_err(map_store_err)?;

    if booked.is_empty() {
        return Ok(Json(json!({
            "session_id": session.id,
            "step": session.step,
            "slots": [],
            "warning": "No available slots for this doctor."
        })));
    }

    // Record the doctor assignment on the patient row.
    patient.doctor_id = Some(doctor_id.clone());
    let registry = PatientRegistry::new(&state.config);
    let saved = registry.upsert(&patient).map_err(map_store_err)?;

    session.patient = Some(saved);
    session.booked_slots = booked.clone();
    session.step = WizardStep::Insurance;

    let response = json!({
        "session_id": session.id,
        "step": session.step,
        "doctor_id": doctor_id,
        "slots": booked,
        "message": "Appointment booked!"
    });
    state.sessions.put(session).await;

    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn insurance(
    State(state): State<WizardState>,
    Path(id): Path<Uuid>,
    Json(request): Json<InsuranceRequest>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.sessions.expect(id, WizardStep::Insurance).await?;

    let mut patient = session
        .patient
        .clone()
        .ok_or_else(|| AppError::Internal("session reached insurance without intake".to_string()))?;

    // Stored as submitted; "NA" and blanks are accepted.
    patient.insurance_carrier = Some(request.carrier);
    patient.member_id = Some(request.member_id);
    patient.group = Some(request.group);

    let registry = PatientRegistry::new(&state.config);
    let saved = registry.upsert(&patient).map_err(map_store_err)?;

    session.patient = Some(saved);
    session.step = WizardStep::Confirm;

    let response = json!({
        "session_id": session.id,
        "step": session.step,
        "message": "Insurance info saved."
    });
    state.sessions.put(session).await;

    Ok(Json(response))
}

/// Sends the confirmation email with the intake form attached. A relay
/// failure is reported as a warning in the response; the wizard moves
/// on either way.
#[axum::debug_handler]
pub async fn confirm(
    State(state): State<WizardState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.sessions.expect(id, WizardStep::Confirm).await?;

    let patient = session
        .patient
        .clone()
        .ok_or_else(|| AppError::Internal("session reached confirmation without intake".to_string()))?;

    let email = EmailMessage::confirmation(
        &patient.email,
        FilePath::new(&state.config.intake_form_path),
    );
    let warning = match state.mailer.send(&email).await {
        Ok(()) => None,
        Err(e) => {
            warn!("Email failed: {}", e);
            Some(format!("Email failed: {}", e))
        }
    };

    session.step = WizardStep::Remind;

    let response = json!({
        "session_id": session.id,
        "step": session.step,
        "message": "Appointment confirmed! Patient intake form will be emailed.",
        "email_sent": warning.is_none(),
        "warning": warning
    });
    state.sessions.put(session).await;

    Ok(Json(response))
}

/// The reminder sequence: a form-fill reminder and question, then an
/// attendance question with an optional cancellation reason.
#[axum::debug_handler]
pub async fn remind(
    State(state): State<WizardState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReminderRequest>,
) -> Result<Json<Value>, AppError> {
    let mut session = state.sessions.expect(id, WizardStep::Remind).await?;

    let patient = session
        .patient
        .clone()
        .ok_or_else(|| AppError::Internal("session reached reminders without intake".to_string()))?;

    let response = match session.reminder_stage {
        ReminderStage::FormCheck => {
            reminder::send_reminder(&patient.email, reminder::FORM_REMINDER);
            match request.filled {
                None => json!({
                    "session_id": session.id,
                    "step": session.step,
                    "reminder": reminder::FORM_REMINDER,
                    "question": reminder::FORM_QUESTION
                }),
                Some(_) => {
                    session.reminder_stage = ReminderStage::AttendanceCheck;
                    json!({
                        "session_id": session.id,
                        "step": session.step,
                        "question": reminder::ATTENDANCE_QUESTION
                    })
                }
            }
        }
        ReminderStage::AttendanceCheck => match request.attending {
            None => json!({
                "session_id": session.id,
                "step": session.step,
                "question": reminder::ATTENDANCE_QUESTION
            }),
            Some(true) => {
                session.step = WizardStep::Done;
                json!({
                    "session_id": session.id,
                    "step": session.step,
                    "message": reminder::ATTENDANCE_THANKS
                })
            }
            Some(false) => {
                let reason = request.reason.unwrap_or_default();
                session.step = WizardStep::Done;
                json!({
                    "session_id": session.id,
                    "step": session.step,
                    "message": reminder::cancellation_logged(&reason)
                })
            }
        },
    };

    state.sessions.put(session).await;
    Ok(Json(response))
}
