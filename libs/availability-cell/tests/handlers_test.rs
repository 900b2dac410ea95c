// Endpoint handlers driven directly against a mocked PostgREST backend.

use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Path, Query, State};
use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::America::Sao_Paulo;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use availability_cell::handlers::{
    get_availability, get_available_slots, get_doctor_details, AvailabilityQuery, SlotsQuery,
};
use availability_cell::models::DayOfWeek;
use shared_config::AppConfig;
use shared_models::error::AppError;

fn test_state(server: &MockServer) -> State<Arc<AppConfig>> {
    State(Arc::new(AppConfig {
        supabase_url: server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        clinic_timezone: "America/Sao_Paulo".to_string(),
        slot_duration_minutes: 30,
        availability_lookahead_days: 14,
    }))
}

/// A clinic-zone civil date far enough ahead that the today cutoff stays inert.
fn future_date() -> NaiveDate {
    (Utc::now() + Duration::days(30))
        .with_timezone(&Sao_Paulo)
        .date_naive()
}

fn day_name(date: NaiveDate) -> String {
    DayOfWeek::from(date.weekday()).to_string()
}

async fn mock_doctor(server: &MockServer, doctor_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": doctor_id,
            "full_name": "Dr. Teste",
            "crm": "12345",
            "biography": null,
            "profile_photo": null,
            "specialties": []
        }])))
        .mount(server)
        .await;
}

async fn mock_working_days(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_working_days"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

async fn mock_appointments(server: &MockServer, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

#[tokio::test]
async fn available_slots_endpoint_returns_open_slots() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let date = future_date();

    // 08:30 at the clinic is already booked that day.
    let booked = Sao_Paulo
        .from_local_datetime(&date.and_hms_opt(8, 30, 0).unwrap())
        .single()
        .unwrap()
        .with_timezone(&Utc);

    mock_doctor(&server, doctor_id).await;
    mock_working_days(
        &server,
        json!([{ "day_of_week": day_name(date), "start_time": "08:00:00", "end_time": "10:00:00" }]),
    )
    .await;
    mock_appointments(&server, json!([{ "starts_at": booked.to_rfc3339() }])).await;

    let result = get_available_slots(
        test_state(&server),
        Path(doctor_id),
        Query(SlotsQuery {
            date: Some(date.to_string()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(result.0.date, date);
    assert_eq!(result.0.slots, vec!["08:00", "09:00", "09:30"]);
}

#[tokio::test]
async fn available_slots_endpoint_requires_a_date() {
    let server = MockServer::start().await;

    let result = get_available_slots(
        test_state(&server),
        Path(Uuid::new_v4()),
        Query(SlotsQuery { date: None }),
    )
    .await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn available_slots_endpoint_rejects_malformed_dates() {
    let server = MockServer::start().await;

    let result = get_available_slots(
        test_state(&server),
        Path(Uuid::new_v4()),
        Query(SlotsQuery {
            date: Some("19/02/2026".to_string()),
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::BadRequest(_)));
}

#[tokio::test]
async fn available_slots_endpoint_maps_unknown_doctors_to_404() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    mock_appointments(&server, json!([])).await;

    let result = get_available_slots(
        test_state(&server),
        Path(Uuid::new_v4()),
        Query(SlotsQuery {
            date: Some(future_date().to_string()),
        }),
    )
    .await;

    assert_matches!(result, Err(AppError::NotFound(_)));
}

#[tokio::test]
async fn doctor_details_endpoint_includes_working_days() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    mock_doctor(&server, doctor_id).await;
    mock_working_days(
        &server,
        json!([{ "day_of_week": "MONDAY", "start_time": "08:00:00", "end_time": "12:00:00" }]),
    )
    .await;

    let result = get_doctor_details(test_state(&server), Path(doctor_id))
        .await
        .unwrap();

    assert_eq!(result.0["full_name"], "Dr. Teste");
    assert_eq!(result.0["working_days"].as_array().unwrap().len(), 1);
    assert_eq!(result.0["working_days"][0]["day_of_week"], "MONDAY");
}

#[tokio::test]
async fn availability_endpoint_summarizes_each_doctor() {
    let server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();

    // Work only on tomorrow's weekday so no slot is behind the today cutoff.
    let tomorrow = Utc::now().with_timezone(&Sao_Paulo).date_naive() + Duration::days(1);

    mock_doctor(&server, doctor_id).await;
    mock_working_days(
        &server,
        json!([{ "day_of_week": day_name(tomorrow), "start_time": "08:00:00", "end_time": "17:00:00" }]),
    )
    .await;
    mock_appointments(&server, json!([])).await;

    let result = get_availability(
        test_state(&server),
        Query(AvailabilityQuery { specialty_id: None }),
    )
    .await
    .unwrap();

    assert_eq!(result.0.window.timezone, "America/Sao_Paulo");
    assert_eq!(
        result.0.slot_template,
        vec!["08:00", "09:00", "10:00", "11:00", "14:00", "15:00", "16:00"]
    );

    assert_eq!(result.0.data.len(), 1);
    let summary = &result.0.data[0];
    assert_eq!(summary.doctor_id, doctor_id);
    assert_eq!(summary.working_days, vec![DayOfWeek::from(tomorrow.weekday())]);
    // The weekday lands twice inside the 14-day window, template fully open.
    assert_eq!(summary.available_slots.len(), 14);
}

#[tokio::test]
async fn availability_endpoint_with_no_matching_doctors_is_empty() {
    let server = MockServer::start().await;

    let specialty_id = Uuid::new_v4().to_string();

    // Only the directory is mocked; a booking lookup would 404 and fail.
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param(
            "doctor_specialties.specialty_id",
            format!("eq.{}", specialty_id),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = get_availability(
        test_state(&server),
        Query(AvailabilityQuery {
            specialty_id: Some(specialty_id),
        }),
    )
    .await
    .unwrap();

    assert!(result.0.data.is_empty());
}
