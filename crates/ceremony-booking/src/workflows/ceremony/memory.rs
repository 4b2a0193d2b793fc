use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};

use super::appointments::domain::{
    ApplicantId, Appointment, AppointmentId, AppointmentStatus, NewAppointment,
};
use super::calendar::{NewSlot, SlotId, TimeSlot, YearMonth};
use super::repository::{
    AppointmentStore, RepositoryError, ScheduledAppointment, SlotStore, StatusUpdate,
};

/// Process-local store for slots and appointments.
///
/// A single mutex guards both tables, so `book` and `commit_transition` observe and
/// change an appointment together with its slot.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBookingStore {
    state: Arc<Mutex<BookingState>>,
}

#[derive(Debug, Default)]
struct BookingState {
    slots: BTreeMap<SlotId, TimeSlot>,
    slot_index: BTreeMap<NaiveDateTime, SlotId>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    last_slot: u64,
    last_appointment: u64,
}

impl BookingState {
    fn schedule(&self, appointment: &Appointment) -> Result<ScheduledAppointment, RepositoryError> {
        let slot = self.slots.get(&appointment.slot_id).cloned().ok_or_else(|| {
            RepositoryError::Unavailable(format!(
                "appointment {} references missing slot {}",
                appointment.id, appointment.slot_id
            ))
        })?;
        Ok(ScheduledAppointment {
            appointment: appointment.clone(),
            slot,
        })
    }

    fn schedule_where<F>(&self, mut keep: F) -> Result<Vec<ScheduledAppointment>, RepositoryError>
    where
        F: FnMut(&Appointment) -> bool,
    {
        self.appointments
            .values()
            .filter(|appointment| keep(*appointment))
            .map(|appointment| self.schedule(appointment))
            .collect()
    }
}

impl InMemoryBookingStore {
    fn lock(&self) -> Result<MutexGuard<'_, BookingState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("booking store mutex poisoned".to_string()))
    }

    /// Number of persisted slots across all months.
    pub fn slot_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.slots.len())
    }
}

impl SlotStore for InMemoryBookingStore {
    fn slot_start_times(&self, month: YearMonth) -> Result<BTreeSet<NaiveDateTime>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .slot_index
            .keys()
            .filter(|start| month.contains(start.date()))
            .copied()
            .collect())
    }

    fn insert_slots(&self, slots: Vec<NewSlot>) -> Result<Vec<TimeSlot>, RepositoryError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let mut seen = BTreeSet::new();
        for slot in &slots {
            if state.slot_index.contains_key(&slot.start_time) || !seen.insert(slot.start_time) {
                return Err(RepositoryError::DuplicateSlot(slot.start_time));
            }
        }

        let mut stored = Vec::with_capacity(slots.len());
        for slot in slots {
            state.last_slot += 1;
            let record = TimeSlot {
                id: SlotId(state.last_slot),
                start_time: slot.start_time,
                end_time: slot.end_time,
                available: true,
            };
            state.slot_index.insert(record.start_time, record.id);
            state.slots.insert(record.id, record.clone());
            stored.push(record);
        }
        Ok(stored)
    }

    fn fetch_slot(&self, id: SlotId) -> Result<Option<TimeSlot>, RepositoryError> {
        Ok(self.lock()?.slots.get(&id).cloned())
    }

    fn available_slots(&self, month: YearMonth) -> Result<Vec<TimeSlot>, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .slot_index
            .iter()
            .filter(|(start, _)| month.contains(start.date()))
            .filter_map(|(_, id)| state.slots.get(id))
            .filter(|slot| slot.available)
            .cloned()
            .collect())
    }
}

impl AppointmentStore for InMemoryBookingStore {
    fn fetch(&self, id: AppointmentId) -> Result<Option<ScheduledAppointment>, RepositoryError> {
        let state = self.lock()?;
        state
            .appointments
            .get(&id)
            .map(|appointment| state.schedule(appointment))
            .transpose()
    }

    fn has_active(&self, applicant: ApplicantId) -> Result<bool, RepositoryError> {
        let state = self.lock()?;
        Ok(state
            .appointments
            .values()
            .any(|appointment| appointment.applicant_id == applicant && appointment.status.is_active()))
    }

    fn by_applicant(
        &self,
        applicant: ApplicantId,
    ) -> Result<Vec<ScheduledAppointment>, RepositoryError> {
        let state = self.lock()?;
        let mut found = state.schedule_where(|appointment| appointment.applicant_id == applicant)?;
        found.sort_by(|a, b| {
            b.appointment
                .created_at
                .cmp(&a.appointment.created_at)
                .then(b.appointment.id.cmp(&a.appointment.id))
        });
        Ok(found)
    }

    fn by_status(
        &self,
        status: AppointmentStatus,
    ) -> Result<Vec<ScheduledAppointment>, RepositoryError> {
        let state = self.lock()?;
        let mut found = state.schedule_where(|appointment| appointment.status == status)?;
        found.sort_by(|a, b| {
            a.appointment
                .created_at
                .cmp(&b.appointment.created_at)
                .then(a.appointment.id.cmp(&b.appointment.id))
        });
        Ok(found)
    }

    fn with_slot_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScheduledAppointment>, RepositoryError> {
        let state = self.lock()?;
        let mut found = state.schedule_where(|_| true)?;
        found.retain(|scheduled| {
            let day = scheduled.slot.start_time.date();
            day >= from && day <= to
        });
        found.sort_by(|a, b| {
            a.slot
                .start_time
                .cmp(&b.slot.start_time)
                .then(a.appointment.id.cmp(&b.appointment.id))
        });
        Ok(found)
    }

    fn due_for_reminder(
        &self,
        after: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<ScheduledAppointment>, RepositoryError> {
        let state = self.lock()?;
        let mut found = state.schedule_where(|appointment| {
            appointment.status == AppointmentStatus::Approved && !appointment.reminder_sent
        })?;
        found.retain(|scheduled| {
            scheduled.slot.start_time > after && scheduled.slot.start_time <= until
        });
        found.sort_by_key(|scheduled| scheduled.slot.start_time);
        Ok(found)
    }

    fn mark_reminder_sent(&self, id: AppointmentId) -> Result<bool, RepositoryError> {
        let mut state = self.lock()?;
        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        if appointment.status != AppointmentStatus::Approved || appointment.reminder_sent {
            return Ok(false);
        }
        appointment.reminder_sent = true;
        Ok(true)
    }

    fn book(&self, draft: NewAppointment) -> Result<ScheduledAppointment, RepositoryError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let already_active = state.appointments.values().any(|appointment| {
            appointment.applicant_id == draft.applicant_id && appointment.status.is_active()
        });
        if already_active {
            return Err(RepositoryError::ActiveAppointmentExists);
        }

        let slot = match state.slots.get_mut(&draft.slot_id) {
            Some(slot) if slot.available => slot,
            _ => return Err(RepositoryError::SlotUnavailable),
        };
        slot.available = false;
        let slot = slot.clone();

        state.last_appointment += 1;
        let appointment = draft.into_pending(AppointmentId(state.last_appointment));
        state.appointments.insert(appointment.id, appointment.clone());

        Ok(ScheduledAppointment { appointment, slot })
    }

    fn commit_transition(
        &self,
        id: AppointmentId,
        expected: AppointmentStatus,
        update: StatusUpdate,
    ) -> Result<ScheduledAppointment, RepositoryError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        if appointment.status != expected {
            return Err(RepositoryError::StatusChanged {
                current: appointment.status,
            });
        }

        appointment.status = update.status;
        if update.rejection_reason.is_some() {
            appointment.rejection_reason = update.rejection_reason;
        }
        let slot_id = appointment.slot_id;

        if update.release_slot {
            if let Some(slot) = state.slots.get_mut(&slot_id) {
                slot.available = true;
            }
        }

        let appointment = state.appointments.get(&id).ok_or(RepositoryError::NotFound)?;
        state.schedule(appointment)
    }
}
