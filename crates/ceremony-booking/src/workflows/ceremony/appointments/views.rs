use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use super::domain::{AppointmentId, AppointmentStatus, PersonName};
use crate::workflows::ceremony::calendar::SlotId;
use crate::workflows::ceremony::repository::ScheduledAppointment;

/// Response shape for appointment listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentView {
    pub id: AppointmentId,
    pub status: AppointmentStatus,
    pub slot_id: SlotId,
    pub slot_start: NaiveDateTime,
    pub slot_end: NaiveDateTime,
    pub applicant_phone: Option<String>,
    pub groom: PersonName,
    pub bride: PersonName,
    pub witnesses: Vec<PersonName>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub document_path: Option<String>,
    pub rejection_reason: Option<String>,
    /// Size of the listing this view belongs to.
    pub history_count: usize,
}

impl AppointmentView {
    pub fn from_scheduled(
        scheduled: ScheduledAppointment,
        applicant_phone: Option<String>,
        history_count: usize,
    ) -> Self {
        let ScheduledAppointment { appointment, slot } = scheduled;
        Self {
            id: appointment.id,
            status: appointment.status,
            slot_id: slot.id,
            slot_start: slot.start_time,
            slot_end: slot.end_time,
            applicant_phone,
            groom: appointment.groom,
            bride: appointment.bride,
            witnesses: appointment.witnesses,
            notes: appointment.notes,
            created_at: appointment.created_at,
            document_path: appointment.document_path,
            rejection_reason: appointment.rejection_reason,
            history_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppointmentCreatedView {
    pub id: AppointmentId,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&ScheduledAppointment> for AppointmentCreatedView {
    fn from(scheduled: &ScheduledAppointment) -> Self {
        Self {
            id: scheduled.appointment.id,
            status: scheduled.appointment.status,
            created_at: scheduled.appointment.created_at,
        }
    }
}
