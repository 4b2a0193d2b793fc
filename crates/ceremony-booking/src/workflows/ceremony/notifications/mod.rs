//! Outbound notices. The lifecycle engine submits to a [`NotificationSink`] and moves
//! on; delivery happens later through a [`NotificationDelivery`] implementation.

mod inbox;
mod queue;

pub use inbox::{InboxEntry, NotificationInbox};
pub use queue::NotificationQueue;

use serde::Serialize;

use super::appointments::domain::ApplicantId;
use super::directory::DirectoryError;
use crate::error::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "applicant_id", rename_all = "snake_case")]
pub enum Recipient {
    Applicant(ApplicantId),
    /// Fan out to every account holding the admin role.
    Admins,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub recipient: Recipient,
    pub message: String,
}

impl Notification {
    pub fn to_applicant(applicant: ApplicantId, message: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Applicant(applicant),
            message: message.into(),
        }
    }

    pub fn to_admins(message: impl Into<String>) -> Self {
        Self {
            recipient: Recipient::Admins,
            message: message.into(),
        }
    }
}

/// Best-effort hand-off. Implementations must not block on delivery and never report failure.
pub trait NotificationSink: Send + Sync {
    fn submit(&self, notification: Notification);
}

/// Performs the actual delivery (inbox write, SMS, push).
pub trait NotificationDelivery: Send + Sync {
    fn deliver(&self, notification: Notification) -> Result<(), DeliveryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("could not resolve recipients: {0}")]
    Recipients(#[from] DirectoryError),
    #[error("notification channel unavailable: {0}")]
    Unavailable(String),
}

impl DeliveryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeliveryError::Recipients(err) => err.kind(),
            DeliveryError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}
