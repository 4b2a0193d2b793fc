use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use super::{DeliveryError, Notification, NotificationDelivery, NotificationSink, Recipient};
use crate::workflows::ceremony::appointments::domain::ApplicantId;
use crate::workflows::ceremony::directory::ApplicantDirectory;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxEntry {
    pub id: u64,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct InboxState {
    entries: BTreeMap<ApplicantId, Vec<InboxEntry>>,
    last_id: u64,
}

/// Stored notifications per account. Admin notices are copied to every admin.
pub struct NotificationInbox<D> {
    directory: Arc<D>,
    state: Mutex<InboxState>,
}

impl<D> NotificationInbox<D>
where
    D: ApplicantDirectory + 'static,
{
    pub fn new(directory: Arc<D>) -> Self {
        Self {
            directory,
            state: Mutex::new(InboxState::default()),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, InboxState>, DeliveryError> {
        self.state
            .lock()
            .map_err(|_| DeliveryError::Unavailable("inbox mutex poisoned".to_string()))
    }

    fn recipients(&self, recipient: Recipient) -> Result<Vec<ApplicantId>, DeliveryError> {
        match recipient {
            Recipient::Applicant(id) => Ok(vec![id]),
            Recipient::Admins => Ok(self
                .directory
                .admins()?
                .into_iter()
                .map(|profile| profile.id)
                .collect()),
        }
    }

    /// Newest first.
    pub fn list(&self, account: ApplicantId) -> Result<Vec<InboxEntry>, DeliveryError> {
        let state = self.lock()?;
        Ok(state
            .entries
            .get(&account)
            .map(|entries| entries.iter().rev().cloned().collect())
            .unwrap_or_default())
    }

    /// Mark every unread entry as read; returns how many changed.
    pub fn mark_all_read(&self, account: ApplicantId) -> Result<usize, DeliveryError> {
        let mut state = self.lock()?;
        let Some(entries) = state.entries.get_mut(&account) else {
            return Ok(0);
        };
        let mut changed = 0;
        for entry in entries.iter_mut().filter(|entry| !entry.read) {
            entry.read = true;
            changed += 1;
        }
        Ok(changed)
    }
}

impl<D> NotificationDelivery for NotificationInbox<D>
where
    D: ApplicantDirectory + 'static,
{
    fn deliver(&self, notification: Notification) -> Result<(), DeliveryError> {
        let accounts = self.recipients(notification.recipient)?;
        let created_at = Utc::now();
        let mut state = self.lock()?;
        for account in &accounts {
            state.last_id += 1;
            let entry = InboxEntry {
                id: state.last_id,
                message: notification.message.clone(),
                read: false,
                created_at,
            };
            state.entries.entry(*account).or_default().push(entry);
        }
        info!(recipients = accounts.len(), "notification stored");
        Ok(())
    }
}

/// Synchronous sink for callers without a runtime; failures are logged and dropped.
impl<D> NotificationSink for NotificationInbox<D>
where
    D: ApplicantDirectory + 'static,
{
    fn submit(&self, notification: Notification) {
        if let Err(err) = self.deliver(notification) {
            warn!(error = %err, "notification dropped");
        }
    }
}
