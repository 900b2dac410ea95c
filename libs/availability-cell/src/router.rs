use std::sync::Arc;

use axum::{routing::get, Router};

use shared_config::AppConfig;

use crate::handlers;

pub fn availability_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/doctors", get(handlers::list_doctors))
        .route("/doctor/{doctor_id}", get(handlers::get_doctor_details))
        .route(
            "/doctor/{doctor_id}/available-slots",
            get(handlers::get_available_slots),
        )
        .route("/availability", get(handlers::get_availability))
        .with_state(state)
}
