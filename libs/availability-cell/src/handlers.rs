use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AvailabilityResponse, DayAvailability};
use crate::services::availability::AvailabilityService;

// Query parameters for the availability endpoints
#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub specialty_id: Option<String>,
}

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::from_config(&state)?;
    let doctors = service.list_doctors().await?;
    let total = doctors.len();

    Ok(Json(json!({
        "doctors": doctors,
        "total": total
    })))
}

#[axum::debug_handler]
pub async fn get_doctor_details(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::from_config(&state)?;
    let details = service.doctor_details(doctor_id).await?;

    Ok(Json(json!(details)))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(state): State<Arc<AppConfig>>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<DayAvailability>, AppError> {
    let date = query
        .date
        .ok_or_else(|| AppError::BadRequest("date query parameter is required".to_string()))?;

    // One clock read per request; every cutoff below sees the same instant.
    let now = Utc::now();

    let service = AvailabilityService::from_config(&state)?;
    let availability = service.available_slots(doctor_id, &date, now).await?;

    Ok(Json(availability))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let now = Utc::now();

    let service = AvailabilityService::from_config(&state)?;
    let overview = service
        .availability_overview(query.specialty_id.as_deref(), now)
        .await?;

    Ok(Json(overview))
}
