use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;

use crate::handlers::*;

pub fn schedule_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(get_schedule))
        .route("/availability", get(get_availability))
        .route("/book", post(book_slots))
        .with_state(config)
}
