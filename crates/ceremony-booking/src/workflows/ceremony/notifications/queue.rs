use std::sync::Arc;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Notification, NotificationDelivery, NotificationSink};

/// Sink backed by an unbounded tokio channel and a single delivery worker.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    sender: UnboundedSender<Notification>,
}

impl NotificationQueue {
    /// Start the delivery worker on the current tokio runtime.
    ///
    /// The worker exits once every clone of the returned queue has been dropped and the
    /// backlog is drained.
    pub fn spawn<D>(delivery: Arc<D>) -> (Self, JoinHandle<()>)
    where
        D: NotificationDelivery + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(drain(receiver, delivery));
        (Self { sender }, worker)
    }
}

async fn drain<D>(mut receiver: UnboundedReceiver<Notification>, delivery: Arc<D>)
where
    D: NotificationDelivery + 'static,
{
    while let Some(notification) = receiver.recv().await {
        let recipient = notification.recipient;
        match delivery.deliver(notification) {
            Ok(()) => debug!(?recipient, "notification delivered"),
            Err(err) => warn!(?recipient, error = %err, "notification delivery failed"),
        }
    }
    debug!("notification queue closed");
}

impl NotificationSink for NotificationQueue {
    fn submit(&self, notification: Notification) {
        if let Err(err) = self.sender.send(notification) {
            warn!(recipient = ?err.0.recipient, "notification queue closed; dropping notice");
        }
    }
}
