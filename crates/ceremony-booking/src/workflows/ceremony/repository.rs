//! Store contracts for slots and appointments.
//!
//! Every operation that touches an appointment and its slot together (`book`,
//! `commit_transition`) is a single commit from the caller's point of view: an
//! implementation must either apply both halves or neither.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::appointments::domain::{
    ApplicantId, Appointment, AppointmentId, AppointmentStatus, NewAppointment,
};
use super::calendar::{NewSlot, SlotId, TimeSlot, YearMonth};
use crate::error::ErrorKind;

/// An appointment joined with the slot it references.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledAppointment {
    pub appointment: Appointment,
    pub slot: TimeSlot,
}

pub trait SlotStore: Send + Sync {
    fn slot_start_times(&self, month: YearMonth) -> Result<BTreeSet<NaiveDateTime>, RepositoryError>;

    /// Insert every slot as available, or none if any start time is already taken.
    fn insert_slots(&self, slots: Vec<NewSlot>) -> Result<Vec<TimeSlot>, RepositoryError>;

    fn fetch_slot(&self, id: SlotId) -> Result<Option<TimeSlot>, RepositoryError>;

    /// Free slots of `month`, ascending by start time.
    fn available_slots(&self, month: YearMonth) -> Result<Vec<TimeSlot>, RepositoryError>;
}

/// Requested status change, applied only if the stored status still equals the expected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: AppointmentStatus,
    pub rejection_reason: Option<String>,
    pub release_slot: bool,
}

pub trait AppointmentStore: Send + Sync {
    fn fetch(&self, id: AppointmentId) -> Result<Option<ScheduledAppointment>, RepositoryError>;

    fn has_active(&self, applicant: ApplicantId) -> Result<bool, RepositoryError>;

    /// Newest first.
    fn by_applicant(&self, applicant: ApplicantId)
        -> Result<Vec<ScheduledAppointment>, RepositoryError>;

    /// Oldest first.
    fn by_status(&self, status: AppointmentStatus)
        -> Result<Vec<ScheduledAppointment>, RepositoryError>;

    /// Appointments whose slot starts on a day in `from..=to`, ascending by slot start.
    fn with_slot_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScheduledAppointment>, RepositoryError>;

    /// Approved, not yet reminded, slot start in `(after, until]`.
    fn due_for_reminder(
        &self,
        after: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<ScheduledAppointment>, RepositoryError>;

    /// Flip `reminder_sent` to true in one commit, only while the appointment is still
    /// `Approved` and not yet reminded. Returns false (and changes nothing) otherwise.
    fn mark_reminder_sent(&self, id: AppointmentId) -> Result<bool, RepositoryError>;

    /// Reserve the draft's slot and persist it as a pending appointment in one commit.
    ///
    /// Fails with `ActiveAppointmentExists` if the applicant gained an active appointment
    /// meanwhile and with `SlotUnavailable` if the slot is missing or already reserved.
    fn book(&self, draft: NewAppointment) -> Result<ScheduledAppointment, RepositoryError>;

    /// Apply `update` (and the slot release it asks for) if the status is still `expected`.
    fn commit_transition(
        &self,
        id: AppointmentId,
        expected: AppointmentStatus,
        update: StatusUpdate,
    ) -> Result<ScheduledAppointment, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("applicant already holds an active appointment")]
    ActiveAppointmentExists,
    #[error("time slot is not available or does not exist")]
    SlotUnavailable,
    #[error("a time slot starting at {0} already exists")]
    DuplicateSlot(NaiveDateTime),
    #[error("appointment status changed concurrently to {current}")]
    StatusChanged { current: AppointmentStatus },
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::ActiveAppointmentExists
            | RepositoryError::SlotUnavailable
            | RepositoryError::DuplicateSlot(_) => ErrorKind::Conflict,
            RepositoryError::StatusChanged { .. } => ErrorKind::IllegalStateTransition,
            RepositoryError::NotFound => ErrorKind::NotFound,
            RepositoryError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}
