use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{
    ApplicantId, AppointmentId, AppointmentRequest, AppointmentStatus, Gender, IllegalTransition,
    LifecycleAction, NewAppointment, PersonName,
};
use super::views::AppointmentView;
use super::validation::{
    normalize_name, validate_name, validate_notes, validate_reason, validate_witness_fields,
    witnesses_are_valid, ValidationError,
};
use crate::error::ErrorKind;
use crate::workflows::ceremony::calendar::SlotId;
use crate::workflows::ceremony::directory::{ApplicantDirectory, ApplicantProfile, DirectoryError};
use crate::workflows::ceremony::notifications::{Notification, NotificationSink};
use crate::workflows::ceremony::repository::{
    AppointmentStore, RepositoryError, ScheduledAppointment, StatusUpdate,
};

/// How ceremony times appear in notifications, reports and console output.
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Drives appointments through their lifecycle. Every slot reservation or release
/// happens inside the store commit that changes the appointment's status.
pub struct AppointmentLifecycleService<S, D, N> {
    store: Arc<S>,
    directory: Arc<D>,
    notifications: Arc<N>,
}

impl<S, D, N> AppointmentLifecycleService<S, D, N>
where
    S: AppointmentStore + 'static,
    D: ApplicantDirectory + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, notifications: Arc<N>) -> Self {
        Self {
            store,
            directory,
            notifications,
        }
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    /// Book the requested slot for an applicant as a pending appointment.
    pub fn create(
        &self,
        applicant_id: ApplicantId,
        request: AppointmentRequest,
    ) -> Result<ScheduledAppointment, LifecycleError> {
        self.create_at(applicant_id, request, Utc::now())
    }

    pub(crate) fn create_at(
        &self,
        applicant_id: ApplicantId,
        request: AppointmentRequest,
        created_at: DateTime<Utc>,
    ) -> Result<ScheduledAppointment, LifecycleError> {
        validate_name("spouse first name", &request.spouse_first_name)?;
        validate_name("spouse last name", &request.spouse_last_name)?;
        validate_notes(request.notes.as_deref())?;
        validate_witness_fields(&request.witnesses)?;

        if self.store.has_active(applicant_id)? {
            return Err(LifecycleError::ExistingActiveAppointment);
        }
        if !witnesses_are_valid(&request.witnesses) {
            return Err(LifecycleError::InvalidWitnessComposition);
        }

        let profile = self
            .directory
            .lookup(applicant_id)?
            .ok_or(LifecycleError::NotFound(Missing::Applicant(applicant_id)))?;
        let (groom, bride) = couple(&profile, &request)?;

        let slot_id = request.slot_id;
        let draft = NewAppointment {
            applicant_id,
            slot_id,
            groom,
            bride,
            witnesses: request
                .witnesses
                .iter()
                .map(|witness| {
                    PersonName::new(
                        normalize_name(&witness.first_name),
                        normalize_name(&witness.last_name),
                    )
                })
                .collect(),
            notes: request.notes.filter(|notes| !notes.trim().is_empty()),
            document_path: request.document_path,
            created_at,
        };

        let booked = self.store.book(draft).map_err(|err| match err {
            RepositoryError::ActiveAppointmentExists => LifecycleError::ExistingActiveAppointment,
            RepositoryError::SlotUnavailable => LifecycleError::SlotUnavailable(slot_id),
            other => LifecycleError::Repository(other),
        })?;

        let appointment = &booked.appointment;
        let when = booked.slot.start_time.format(DISPLAY_FORMAT);
        info!(
            appointment_id = %appointment.id,
            applicant_id = %applicant_id,
            slot_id = %slot_id,
            "appointment requested"
        );
        self.notifications.submit(Notification::to_applicant(
            applicant_id,
            format!("Your appointment request for {when} was received and is pending review."),
        ));
        self.notifications.submit(Notification::to_admins(format!(
            "New appointment request #{} from {} and {} for {when}.",
            appointment.id, appointment.groom, appointment.bride
        )));

        Ok(booked)
    }

    pub fn approve(&self, id: AppointmentId) -> Result<ScheduledAppointment, LifecycleError> {
        let approved = self.transition(id, LifecycleAction::Approve, None)?;
        self.notifications.submit(Notification::to_applicant(
            approved.appointment.applicant_id,
            format!(
                "Your appointment on {} has been approved.",
                approved.slot.start_time.format(DISPLAY_FORMAT)
            ),
        ));
        Ok(approved)
    }

    pub fn reject(
        &self,
        id: AppointmentId,
        reason: &str,
    ) -> Result<ScheduledAppointment, LifecycleError> {
        let reason = validate_reason("rejection reason", reason)?;
        let rejected = self.transition(id, LifecycleAction::Reject, Some(reason.clone()))?;
        self.notifications.submit(Notification::to_applicant(
            rejected.appointment.applicant_id,
            format!(
                "Your appointment on {} has been rejected. Reason: {reason}",
                rejected.slot.start_time.format(DISPLAY_FORMAT)
            ),
        ));
        Ok(rejected)
    }

    pub fn complete(&self, id: AppointmentId) -> Result<ScheduledAppointment, LifecycleError> {
        self.transition(id, LifecycleAction::Complete, None)
    }

    /// Cancel on behalf of staff; the slot goes back to the calendar.
    pub fn cancel(
        &self,
        id: AppointmentId,
        reason: Option<&str>,
    ) -> Result<ScheduledAppointment, LifecycleError> {
        let reason = reason
            .map(|raw| validate_reason("cancellation reason", raw))
            .transpose()?;
        let cancelled = self.transition(id, LifecycleAction::Cancel, None)?;

        let mut message = format!(
            "Appointment #{} for {} was cancelled.",
            cancelled.appointment.id,
            cancelled.slot.start_time.format(DISPLAY_FORMAT)
        );
        if let Some(reason) = reason {
            message.push_str(&format!(" Reason: {reason}"));
        }
        self.notifications.submit(Notification::to_admins(message));
        Ok(cancelled)
    }

    /// Cancel an applicant's own appointment. Appointments owned by someone else read as missing.
    pub fn cancel_for_applicant(
        &self,
        applicant_id: ApplicantId,
        id: AppointmentId,
        reason: Option<&str>,
    ) -> Result<ScheduledAppointment, LifecycleError> {
        let owned = self
            .store
            .fetch(id)?
            .is_some_and(|scheduled| scheduled.appointment.applicant_id == applicant_id);
        if !owned {
            return Err(LifecycleError::NotFound(Missing::Appointment(id)));
        }
        self.cancel(id, reason)
    }

    /// Newest first.
    pub fn appointments_for_applicant(
        &self,
        applicant_id: ApplicantId,
    ) -> Result<Vec<ScheduledAppointment>, LifecycleError> {
        Ok(self.store.by_applicant(applicant_id)?)
    }

    /// Oldest first, so the review queue is worked in arrival order.
    pub fn appointments_by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<ScheduledAppointment>, LifecycleError> {
        Ok(self.store.by_status(status)?)
    }

    /// Attach applicant phone numbers and the listing size to each appointment.
    pub fn present(
        &self,
        appointments: Vec<ScheduledAppointment>,
    ) -> Result<Vec<AppointmentView>, LifecycleError> {
        let history_count = appointments.len();
        appointments
            .into_iter()
            .map(|scheduled| -> Result<AppointmentView, LifecycleError> {
                let phone = self
                    .directory
                    .lookup(scheduled.appointment.applicant_id)?
                    .map(|profile| profile.phone_number);
                Ok(AppointmentView::from_scheduled(scheduled, phone, history_count))
            })
            .collect()
    }

    pub fn document_path(&self, id: AppointmentId) -> Result<String, LifecycleError> {
        let scheduled = self
            .store
            .fetch(id)?
            .ok_or(LifecycleError::NotFound(Missing::Appointment(id)))?;
        scheduled
            .appointment
            .document_path
            .filter(|path| !path.trim().is_empty())
            .ok_or(LifecycleError::NotFound(Missing::Document(id)))
    }

    fn transition(
        &self,
        id: AppointmentId,
        action: LifecycleAction,
        rejection_reason: Option<String>,
    ) -> Result<ScheduledAppointment, LifecycleError> {
        let current = self
            .store
            .fetch(id)?
            .ok_or(LifecycleError::NotFound(Missing::Appointment(id)))?;
        let from = current.appointment.status;
        let to = from.apply(action)?;

        let update = StatusUpdate {
            status: to,
            rejection_reason,
            release_slot: action.releases_slot(),
        };
        let committed = match self.store.commit_transition(id, from, update) {
            Ok(committed) => committed,
            Err(RepositoryError::StatusChanged { current }) => {
                warn!(appointment_id = %id, %current, action = action.verb(), "lost transition race");
                return Err(IllegalTransition {
                    from: current,
                    action,
                }
                .into());
            }
            Err(RepositoryError::NotFound) => {
                return Err(LifecycleError::NotFound(Missing::Appointment(id)))
            }
            Err(err) => return Err(err.into()),
        };

        info!(
            appointment_id = %id,
            %from,
            %to,
            slot_released = action.releases_slot(),
            "appointment status changed"
        );
        Ok(committed)
    }
}

/// Place the applicant and the submitted spouse as groom and bride by the applicant's gender.
fn couple(
    profile: &ApplicantProfile,
    request: &AppointmentRequest,
) -> Result<(PersonName, PersonName), LifecycleError> {
    let (Some(first_name), Some(last_name), Some(gender)) = (
        profile.first_name.as_ref(),
        profile.last_name.as_ref(),
        profile.gender,
    ) else {
        return Err(LifecycleError::IncompleteProfile);
    };

    let applicant = PersonName::new(first_name.clone(), last_name.clone());
    let spouse = PersonName::new(
        normalize_name(&request.spouse_first_name),
        normalize_name(&request.spouse_last_name),
    );
    Ok(match gender {
        Gender::Male => (applicant, spouse),
        Gender::Female => (spouse, applicant),
    })
}

/// What a `NotFound` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Appointment(AppointmentId),
    Applicant(ApplicantId),
    Document(AppointmentId),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Appointment(id) => write!(f, "appointment not found with id {id}"),
            Missing::Applicant(id) => write!(f, "applicant not found with id {id}"),
            Missing::Document(id) => write!(f, "no document attached to appointment {id}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("{0}")]
    NotFound(Missing),
    #[error("you already have an appointment; wait for it to be processed or cancel it before booking a new one")]
    ExistingActiveAppointment,
    #[error("time slot {0} is not available or does not exist")]
    SlotUnavailable(SlotId),
    #[error("witness requirements not met: must be 2 males, or 1 male and 2 females")]
    InvalidWitnessComposition,
    #[error("applicant's first name, last name or gender not provided")]
    IncompleteProfile,
    #[error(transparent)]
    InvalidInput(#[from] ValidationError),
    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl LifecycleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LifecycleError::NotFound(_) => ErrorKind::NotFound,
            LifecycleError::ExistingActiveAppointment | LifecycleError::SlotUnavailable(_) => {
                ErrorKind::Conflict
            }
            LifecycleError::InvalidWitnessComposition
            | LifecycleError::IncompleteProfile
            | LifecycleError::InvalidInput(_) => ErrorKind::InvalidInput,
            LifecycleError::IllegalTransition(_) => ErrorKind::IllegalStateTransition,
            LifecycleError::Repository(err) => err.kind(),
            LifecycleError::Directory(err) => err.kind(),
        }
    }
}
