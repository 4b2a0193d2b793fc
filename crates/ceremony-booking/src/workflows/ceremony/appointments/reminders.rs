use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};

use super::service::DISPLAY_FORMAT;
use crate::workflows::ceremony::notifications::{Notification, NotificationSink};
use crate::workflows::ceremony::repository::{AppointmentStore, RepositoryError};

/// Look-ahead window for reminders.
pub const REMINDER_HORIZON_HOURS: i64 = 24;

/// Reminds applicants of approved ceremonies starting within the next day.
pub struct ReminderSweep<S, N> {
    store: Arc<S>,
    notifications: Arc<N>,
    facility_address: String,
}

impl<S, N> ReminderSweep<S, N>
where
    S: AppointmentStore + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(store: Arc<S>, notifications: Arc<N>, facility_address: impl Into<String>) -> Self {
        Self {
            store,
            notifications,
            facility_address: facility_address.into(),
        }
    }

    /// Send one reminder per due appointment and return how many went out.
    ///
    /// The flag is flipped before the notice is submitted, so overlapping sweeps never
    /// notify the same appointment twice.
    pub fn run(&self, now: NaiveDateTime) -> Result<usize, RepositoryError> {
        let until = now + Duration::hours(REMINDER_HORIZON_HOURS);
        let due = self.store.due_for_reminder(now, until)?;

        let mut sent = 0;
        for scheduled in due {
            if !self.store.mark_reminder_sent(scheduled.appointment.id)? {
                debug!(appointment_id = %scheduled.appointment.id, "reminder already sent");
                continue;
            }
            let message = format!(
                "Reminder: Your engagement will take place on {} at the address {}",
                scheduled.slot.start_time.format(DISPLAY_FORMAT),
                self.facility_address
            );
            self.notifications.submit(Notification::to_applicant(
                scheduled.appointment.applicant_id,
                message,
            ));
            sent += 1;
        }

        info!(sent, %now, "reminder sweep finished");
        Ok(sent)
    }
}
