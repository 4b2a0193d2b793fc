//! Appointment lifecycle: booking against a reserved slot, admin review, completion,
//! cancellation, and the reminder sweep for upcoming ceremonies.

pub mod domain;
pub mod reminders;
pub mod router;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantId, Appointment, AppointmentId, AppointmentRequest, AppointmentStatus, Gender,
    IllegalTransition, LifecycleAction, NewAppointment, PersonName, WitnessInfo,
};
pub use reminders::ReminderSweep;
pub use router::appointment_router;
pub use service::{AppointmentLifecycleService, LifecycleError, Missing, DISPLAY_FORMAT};
pub use validation::ValidationError;
pub use views::{AppointmentCreatedView, AppointmentView};
