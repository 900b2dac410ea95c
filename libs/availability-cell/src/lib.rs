pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

// Re-export the models and the service entry points for external use
pub use models::*;
pub use services::availability::{AvailabilityService, ClinicSettings};
pub use services::repository::{AppointmentLedger, DoctorDirectory, WorkingHoursRepository};
