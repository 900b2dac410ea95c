use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use super::repository::{
    AppointmentLedger, DoctorDirectory, SupabaseAppointmentLedger, SupabaseDoctorDirectory,
    SupabaseWorkingHours, WorkingHoursRepository,
};
use super::{slots, timezone};
use crate::models::{
    AvailabilityError, AvailabilityResponse, AvailabilityWindow, DayAvailability, DayOfWeek,
    DoctorAvailabilitySummary, DoctorDetails, DoctorProfile,
};

/// Clinic-wide scheduling parameters. The template mirrors the front desk's
/// standard day: hourly slots over a morning and an afternoon block.
#[derive(Debug, Clone)]
pub struct ClinicSettings {
    pub timezone: Tz,
    pub slot_duration: Duration,
    pub lookahead_days: i64,
    pub template_slot_duration: Duration,
    pub template_windows: Vec<(NaiveTime, NaiveTime)>,
}

impl ClinicSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, AvailabilityError> {
        let timezone = config.clinic_timezone.parse::<Tz>().map_err(|_| {
            AvailabilityError::Upstream(anyhow!(
                "unknown clinic timezone '{}'",
                config.clinic_timezone
            ))
        })?;

        Ok(Self {
            timezone,
            slot_duration: Duration::minutes(config.slot_duration_minutes),
            lookahead_days: config.availability_lookahead_days,
            template_slot_duration: Duration::minutes(60),
            template_windows: vec![
                (
                    NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
                ),
                (
                    NaiveTime::from_hms_opt(14, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                ),
            ],
        })
    }
}

pub struct AvailabilityService {
    settings: ClinicSettings,
    working_hours: Arc<dyn WorkingHoursRepository>,
    appointments: Arc<dyn AppointmentLedger>,
    directory: Arc<dyn DoctorDirectory>,
}

impl AvailabilityService {
    pub fn new(
        settings: ClinicSettings,
        working_hours: Arc<dyn WorkingHoursRepository>,
        appointments: Arc<dyn AppointmentLedger>,
        directory: Arc<dyn DoctorDirectory>,
    ) -> Self {
        Self {
            settings,
            working_hours,
            appointments,
            directory,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AvailabilityError> {
        let settings = ClinicSettings::from_config(config)?;
        let supabase = Arc::new(SupabaseClient::new(config));

        Ok(Self::new(
            settings,
            Arc::new(SupabaseWorkingHours::new(supabase.clone())),
            Arc::new(SupabaseAppointmentLedger::new(supabase.clone())),
            Arc::new(SupabaseDoctorDirectory::new(supabase)),
        ))
    }

    pub async fn list_doctors(&self) -> Result<Vec<DoctorProfile>, AvailabilityError> {
        self.directory.list_doctors(None).await
    }

    pub async fn doctor_details(&self, doctor_id: Uuid) -> Result<DoctorDetails, AvailabilityError> {
        let (profile, schedule) = tokio::try_join!(
            self.directory.get_doctor(doctor_id),
            self.working_hours.weekly_schedule(doctor_id),
        )?;

        Ok(DoctorDetails {
            profile,
            working_days: schedule.into_windows(),
        })
    }

    /// Open slots for one doctor on one civil date, formatted "HH:MM" in the
    /// clinic zone. `now` is captured once by the caller and never re-read.
    pub async fn available_slots(
        &self,
        doctor_id: Uuid,
        date: &str,
        now: DateTime<Utc>,
    ) -> Result<DayAvailability, AvailabilityError> {
        let date = timezone::parse_civil_date(date).map_err(|err| match err {
            AvailabilityError::InvalidDate(msg) => AvailabilityError::InvalidInput(msg),
            other => other,
        })?;

        debug!("Computing available slots for doctor {} on {}", doctor_id, date);

        // Independent reads, issued together.
        let (schedule, booked) = tokio::try_join!(
            self.working_hours.weekly_schedule(doctor_id),
            self.appointments.booked_instants(doctor_id, date, date),
        )?;

        let tz = self.settings.timezone;
        let candidates = slots::day_candidates(tz, date, &schedule, self.settings.slot_duration);
        let open = slots::drop_elapsed(slots::without_booked(candidates, &booked), date, now, tz);

        let formatted = open
            .map(|slot| {
                timezone::instant_to_civil(tz, slot.instant())
                    .format("%H:%M")
                    .to_string()
            })
            .collect();

        Ok(DayAvailability {
            date,
            slots: formatted,
        })
    }

    /// Availability across every doctor (optionally narrowed by specialty)
    /// over the clinic's lookahead window, using the front-desk slot template
    /// on each doctor's working days.
    pub async fn availability_overview(
        &self,
        specialty_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AvailabilityResponse, AvailabilityError> {
        let tz = self.settings.timezone;
        let start = timezone::civil_date_of(tz, now);
        let end = start + Duration::days(self.settings.lookahead_days - 1);

        let window = AvailabilityWindow {
            start,
            end,
            timezone: tz.name().to_string(),
        };
        let slot_template = self.slot_template();

        let doctors = self.directory.list_doctors(specialty_id).await?;
        if doctors.is_empty() {
            debug!("No doctors matched the availability query");
            return Ok(AvailabilityResponse {
                window,
                slot_template,
                data: vec![],
            });
        }

        let mut data = Vec::with_capacity(doctors.len());
        for doctor in doctors {
            let (schedule, booked) = tokio::try_join!(
                self.working_hours.weekly_schedule(doctor.id),
                self.appointments.booked_instants(doctor.id, start, end),
            )?;

            let mut available_slots = Vec::new();
            for date in start.iter_days().take_while(|date| *date <= end) {
                if schedule
                    .window_for(DayOfWeek::from(date.weekday()))
                    .is_none()
                {
                    continue;
                }

                let candidates = self.settings.template_windows.iter().copied().flat_map(
                    |(window_start, window_end)| {
                        slots::candidate_slots(
                            tz,
                            date,
                            window_start,
                            window_end,
                            self.settings.template_slot_duration,
                        )
                    },
                );
                let open =
                    slots::drop_elapsed(slots::without_booked(candidates, &booked), date, now, tz);
                available_slots.extend(open.map(|slot| slot.instant()));
            }

            data.push(DoctorAvailabilitySummary {
                doctor_id: doctor.id,
                working_days: schedule.working_days(),
                available_slots,
            });
        }

        Ok(AvailabilityResponse {
            window,
            slot_template,
            data,
        })
    }

    fn slot_template(&self) -> Vec<String> {
        let step = self.settings.template_slot_duration;

        self.settings
            .template_windows
            .iter()
            .copied()
            .flat_map(|(start, end)| {
                std::iter::successors(Some(start), move |current| Some(*current + step))
                    .take_while(move |time| *time < end)
                    .map(|time| time.format("%H:%M").to_string())
            })
            .collect()
    }
}
