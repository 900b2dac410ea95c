use std::collections::HashMap;
use std::fmt;

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_models::error::AppError;

// ==============================================================================
// SCHEDULING MODELS
// ==============================================================================

/// Weekday as stored in the working-days table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Sunday => "SUNDAY",
            DayOfWeek::Monday => "MONDAY",
            DayOfWeek::Tuesday => "TUESDAY",
            DayOfWeek::Wednesday => "WEDNESDAY",
            DayOfWeek::Thursday => "THURSDAY",
            DayOfWeek::Friday => "FRIDAY",
            DayOfWeek::Saturday => "SATURDAY",
        };
        f.write_str(name)
    }
}

/// A recurring working block on one weekday, in clinic wall-clock time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingWindow {
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl WorkingWindow {
    pub fn new(
        day_of_week: DayOfWeek,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, AvailabilityError> {
        if start_time >= end_time {
            return Err(AvailabilityError::InvalidInput(format!(
                "working window must start before it ends ({} >= {})",
                start_time, end_time
            )));
        }

        Ok(Self {
            day_of_week,
            start_time,
            end_time,
        })
    }
}

/// A doctor's recurring week, at most one window per weekday.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeeklySchedule {
    windows: HashMap<DayOfWeek, WorkingWindow>,
}

impl WeeklySchedule {
    /// Builds the schedule from repository rows. Two rows for the same weekday
    /// means the stored schedule is corrupt, not that the client erred.
    pub fn from_windows(windows: Vec<WorkingWindow>) -> Result<Self, AvailabilityError> {
        let mut map = HashMap::with_capacity(windows.len());
        for window in windows {
            let day = window.day_of_week;
            if map.insert(day, window).is_some() {
                return Err(AvailabilityError::Upstream(anyhow!(
                    "duplicate working window for {}",
                    day
                )));
            }
        }
        Ok(Self { windows: map })
    }

    pub fn window_for(&self, day: DayOfWeek) -> Option<&WorkingWindow> {
        self.windows.get(&day)
    }

    pub fn working_days(&self) -> Vec<DayOfWeek> {
        let mut days: Vec<DayOfWeek> = self.windows.keys().copied().collect();
        days.sort();
        days
    }

    pub fn into_windows(self) -> Vec<WorkingWindow> {
        let mut windows: Vec<WorkingWindow> = self.windows.into_values().collect();
        windows.sort_by_key(|window| window.day_of_week);
        windows
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

/// Start of a bookable appointment on the absolute timeline. The implied
/// duration is the clinic's slot granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slot(DateTime<Utc>);

impl Slot {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Scheduled => write!(f, "SCHEDULED"),
            AppointmentStatus::Completed => write!(f, "COMPLETED"),
            AppointmentStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

// ==============================================================================
// DOCTOR DIRECTORY MODELS
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub full_name: String,
    pub crm: String,
    pub biography: Option<String>,
    pub profile_photo: Option<String>,
    pub specialties: Vec<DoctorSpecialty>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorSpecialty {
    pub name: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DoctorDetails {
    #[serde(flatten)]
    pub profile: DoctorProfile,
    pub working_days: Vec<WorkingWindow>,
}

// ==============================================================================
// RESPONSE SHAPES
// ==============================================================================

/// Slots still open for one doctor on one civil date, formatted for display
/// in the clinic timezone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayAvailability {
    pub date: NaiveDate,
    pub slots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DoctorAvailabilitySummary {
    pub doctor_id: Uuid,
    pub working_days: Vec<DayOfWeek>,
    pub available_slots: Vec<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvailabilityResponse {
    pub window: AvailabilityWindow,
    pub slot_template: Vec<String>,
    pub data: Vec<DoctorAvailabilitySummary>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Error, Debug)]
pub enum AvailabilityError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] anyhow::Error),
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::InvalidInput(msg) | AvailabilityError::InvalidDate(msg) => {
                AppError::BadRequest(msg)
            }
            AvailabilityError::NotFound(msg) => AppError::NotFound(msg),
            AvailabilityError::Upstream(err) => AppError::Internal(err.to_string()),
        }
    }
}
