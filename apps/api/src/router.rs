use std::sync::Arc;

use axum::{routing::get, Router};

use intake_cell::router::wizard_routes;
use intake_cell::services::WizardState;
use patient_cell::router::patient_routes;
use schedule_cell::router::schedule_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    let wizard_state = WizardState::new(state.clone());

    Router::new()
        .route("/", get(|| async { "Clinic Intake API is running!" }))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/schedule", schedule_routes(state.clone()))
        .nest("/wizard", wizard_routes(wizard_state))
}
