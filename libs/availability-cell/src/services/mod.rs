pub mod availability;
pub mod repository;
pub mod slots;
pub mod timezone;

pub use availability::{AvailabilityService, ClinicSettings};
