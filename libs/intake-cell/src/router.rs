use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::*;
use crate::services::WizardState;

pub fn wizard_routes(state: WizardState) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}/greet", post(greet))
        .route("/sessions/{id}/intake", post(intake))
        .route("/sessions/{id}/availability", get(availability))
        .route("/sessions/{id}/book", post(book))
        .route("/sessions/{id}/insurance", post(insurance))
        .route("/sessions/{id}/confirm", post(confirm))
        .route("/sessions/{id}/remind", post(remind))
        .with_state(state)
}
