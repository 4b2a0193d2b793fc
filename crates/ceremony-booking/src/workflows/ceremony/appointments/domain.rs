use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::ceremony::calendar::SlotId;

/// Identifier wrapper for appointments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(pub u64);

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an applicant account in the external identity system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicantId(pub u64);

impl fmt::Display for ApplicantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

/// Witness as submitted with a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessInfo {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
}

/// Booking request submitted by an applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub slot_id: SlotId,
    pub spouse_first_name: String,
    pub spouse_last_name: String,
    pub witnesses: Vec<WitnessInfo>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Reference to a document already placed in external storage.
    #[serde(default)]
    pub document_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first_name: String,
    pub last_name: String,
}

impl PersonName {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Pending and approved appointments hold their slot and block new bookings.
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    pub const fn is_terminal(self) -> bool {
        !self.is_active()
    }

    /// The status reached by applying `action`, or the illegal transition.
    pub fn apply(self, action: LifecycleAction) -> Result<Self, IllegalTransition> {
        let next = match (self, action) {
            (Self::Pending, LifecycleAction::Approve) => Self::Approved,
            (Self::Pending, LifecycleAction::Reject) => Self::Rejected,
            (Self::Pending | Self::Approved, LifecycleAction::Cancel) => Self::Cancelled,
            (Self::Approved, LifecycleAction::Complete) => Self::Completed,
            (from, action) => return Err(IllegalTransition { from, action }),
        };
        Ok(next)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decisions that move an appointment through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleAction {
    Approve,
    Reject,
    Cancel,
    Complete,
}

impl LifecycleAction {
    pub const fn verb(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::Complete => "complete",
        }
    }

    /// Rejection and cancellation hand the slot back to the calendar.
    pub const fn releases_slot(self) -> bool {
        matches!(self, Self::Reject | Self::Cancel)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot {} appointment that is {from}", .action.verb())]
pub struct IllegalTransition {
    pub from: AppointmentStatus,
    pub action: LifecycleAction,
}

/// Persisted appointment. Applicant and slot are referenced by id only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub applicant_id: ApplicantId,
    pub slot_id: SlotId,
    pub groom: PersonName,
    pub bride: PersonName,
    pub witnesses: Vec<PersonName>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub reminder_sent: bool,
    pub document_path: Option<String>,
    pub rejection_reason: Option<String>,
}

/// Validated appointment awaiting its id and slot reservation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub applicant_id: ApplicantId,
    pub slot_id: SlotId,
    pub groom: PersonName,
    pub bride: PersonName,
    pub witnesses: Vec<PersonName>,
    pub notes: Option<String>,
    pub document_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewAppointment {
    /// Materialize as a pending appointment under the id assigned by the store.
    pub fn into_pending(self, id: AppointmentId) -> Appointment {
        Appointment {
            id,
            applicant_id: self.applicant_id,
            slot_id: self.slot_id,
            groom: self.groom,
            bride: self.bride,
            witnesses: self.witnesses,
            notes: self.notes,
            status: AppointmentStatus::Pending,
            created_at: self.created_at,
            reminder_sent: false,
            document_path: self.document_path,
            rejection_reason: None,
        }
    }
}
