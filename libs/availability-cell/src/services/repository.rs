//! Collaborator seams for the availability engine, plus the Supabase-backed
//! implementations used in production.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, SecondsFormat, Utc};
use reqwest::Method;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_database::supabase::SupabaseClient;

use crate::models::{
    AppointmentStatus, AvailabilityError, DayOfWeek, DoctorProfile, DoctorSpecialty,
    WeeklySchedule, WorkingWindow,
};

#[async_trait]
pub trait WorkingHoursRepository: Send + Sync {
    /// The doctor's recurring weekly windows. An unknown doctor is an error,
    /// an empty schedule is not.
    async fn weekly_schedule(&self, doctor_id: Uuid) -> Result<WeeklySchedule, AvailabilityError>;
}

#[async_trait]
pub trait AppointmentLedger: Send + Sync {
    /// Start instants of every non-cancelled appointment for the doctor whose
    /// civil date falls within `[from, to]` in the clinic zone.
    async fn booked_instants(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashSet<DateTime<Utc>>, AvailabilityError>;
}

#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<DoctorProfile, AvailabilityError>;

    async fn list_doctors(
        &self,
        specialty_id: Option<&str>,
    ) -> Result<Vec<DoctorProfile>, AvailabilityError>;
}

// ==============================================================================
// SUPABASE IMPLEMENTATIONS
// ==============================================================================

const DOCTOR_SELECT: &str =
    "id,full_name,crm,biography,profile_photo,specialties:doctor_specialties(is_primary,specialty:specialties(name))";

#[derive(Debug, Deserialize)]
struct WorkingDayRow {
    day_of_week: DayOfWeek,
    start_time: String,
    end_time: String,
}

impl WorkingDayRow {
    fn into_window(self) -> Result<WorkingWindow, AvailabilityError> {
        let start = parse_row_time(&self.start_time)?;
        let end = parse_row_time(&self.end_time)?;

        WorkingWindow::new(self.day_of_week, start, end)
            .map_err(|err| AvailabilityError::Upstream(anyhow!("stored working window rejected: {}", err)))
    }
}

fn parse_row_time(raw: &str) -> Result<NaiveTime, AvailabilityError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| AvailabilityError::Upstream(anyhow!("unreadable working time '{}'", raw)))
}

#[derive(Debug, Deserialize)]
struct AppointmentRow {
    starts_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct DoctorRow {
    id: Uuid,
    full_name: String,
    crm: String,
    biography: Option<String>,
    profile_photo: Option<String>,
    #[serde(default)]
    specialties: Vec<SpecialtyRow>,
}

#[derive(Debug, Deserialize)]
struct SpecialtyRow {
    is_primary: bool,
    specialty: SpecialtyNameRow,
}

#[derive(Debug, Deserialize)]
struct SpecialtyNameRow {
    name: String,
}

impl DoctorRow {
    fn into_profile(self) -> DoctorProfile {
        DoctorProfile {
            id: self.id,
            full_name: self.full_name,
            crm: self.crm,
            biography: self.biography,
            profile_photo: self.profile_photo,
            specialties: self
                .specialties
                .into_iter()
                .map(|row| DoctorSpecialty {
                    name: row.specialty.name,
                    is_primary: row.is_primary,
                })
                .collect(),
        }
    }
}

pub struct SupabaseWorkingHours {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseWorkingHours {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl WorkingHoursRepository for SupabaseWorkingHours {
    async fn weekly_schedule(&self, doctor_id: Uuid) -> Result<WeeklySchedule, AvailabilityError> {
        let doctor_path = format!("/rest/v1/doctors?id=eq.{}&select=id", doctor_id);
        let doctors: Vec<Value> = self.supabase.request(Method::GET, &doctor_path, None).await?;

        if doctors.is_empty() {
            return Err(AvailabilityError::NotFound(format!(
                "Doctor {} not found",
                doctor_id
            )));
        }

        let path = format!(
            "/rest/v1/doctor_working_days?doctor_profile_id=eq.{}&select=day_of_week,start_time,end_time&order=day_of_week.asc",
            doctor_id
        );
        let rows: Vec<WorkingDayRow> = self.supabase.request(Method::GET, &path, None).await?;
        debug!("Doctor {} has {} working day rows", doctor_id, rows.len());

        let windows = rows
            .into_iter()
            .map(WorkingDayRow::into_window)
            .collect::<Result<Vec<_>, _>>()?;

        WeeklySchedule::from_windows(windows)
    }
}

pub struct SupabaseAppointmentLedger {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseAppointmentLedger {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl AppointmentLedger for SupabaseAppointmentLedger {
    async fn booked_instants(
        &self,
        doctor_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<HashSet<DateTime<Utc>>, AvailabilityError> {
        // Query bounds widened a day each way so any clinic-zone offset stays
        // covered; exclusion is by exact instant, extra rows are inert.
        let lower = from.and_time(NaiveTime::MIN).and_utc() - Duration::days(1);
        let upper = to.and_time(NaiveTime::MIN).and_utc() + Duration::days(2);

        let path = format!(
            "/rest/v1/appointments?doctor_profile_id=eq.{}&starts_at=gte.{}&starts_at=lt.{}&status=neq.{}&select=starts_at",
            doctor_id,
            lower.to_rfc3339_opts(SecondsFormat::Secs, true),
            upper.to_rfc3339_opts(SecondsFormat::Secs, true),
            AppointmentStatus::Cancelled,
        );

        let rows: Vec<AppointmentRow> = self.supabase.request(Method::GET, &path, None).await?;
        debug!(
            "Doctor {} has {} booked instants between {} and {}",
            doctor_id,
            rows.len(),
            from,
            to
        );

        Ok(rows.into_iter().map(|row| row.starts_at).collect())
    }
}

pub struct SupabaseDoctorDirectory {
    supabase: Arc<SupabaseClient>,
}

impl SupabaseDoctorDirectory {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }
}

#[async_trait]
impl DoctorDirectory for SupabaseDoctorDirectory {
    async fn get_doctor(&self, doctor_id: Uuid) -> Result<DoctorProfile, AvailabilityError> {
        let path = format!("/rest/v1/doctors?id=eq.{}&select={}", doctor_id, DOCTOR_SELECT);
        let mut rows: Vec<DoctorRow> = self.supabase.request(Method::GET, &path, None).await?;

        if rows.is_empty() {
            return Err(AvailabilityError::NotFound(format!(
                "Doctor {} not found",
                doctor_id
            )));
        }

        Ok(rows.remove(0).into_profile())
    }

    async fn list_doctors(
        &self,
        specialty_id: Option<&str>,
    ) -> Result<Vec<DoctorProfile>, AvailabilityError> {
        let path = match specialty_id {
            Some(specialty_id) => format!(
                "/rest/v1/doctors?select={},doctor_specialties!inner(specialty_id)&doctor_specialties.specialty_id=eq.{}&order=full_name.asc",
                DOCTOR_SELECT, specialty_id
            ),
            None => format!("/rest/v1/doctors?select={}&order=full_name.asc", DOCTOR_SELECT),
        };

        let rows: Vec<DoctorRow> = self.supabase.request(Method::GET, &path, None).await?;
        debug!("Doctor directory returned {} doctors", rows.len());

        Ok(rows.into_iter().map(DoctorRow::into_profile).collect())
    }
}
