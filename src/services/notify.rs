use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Messages the engine emits. Delivery belongs to whatever sits behind the
/// [`Notifier`]; the engine only describes what happened.
#[derive(Debug, Clone)]
pub enum Notification {
    TicketConfirmation {
        recipient: String,
        event_title: String,
        ticket_number: String,
        scan_code: String,
        start_time: DateTime<Utc>,
    },
    TicketCancelled {
        user_id: Uuid,
        event_title: String,
        ticket_number: String,
    },
    EventPublished {
        event_id: Uuid,
        title: String,
    },
    EventCancelled {
        event_id: Uuid,
        title: String,
    },
}

impl Notification {
    pub fn label(&self) -> &'static str {
        match self {
            Notification::TicketConfirmation { .. } => "ticket_confirmation",
            Notification::TicketCancelled { .. } => "ticket_cancelled",
            Notification::EventPublished { .. } => "event_published",
            Notification::EventCancelled { .. } => "event_cancelled",
        }
    }
}

#[derive(Debug, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// Default notifier: writes the message to the log and succeeds. Stands in
/// for the mail gateway in development and tests.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifyError> {
        match &notification {
            Notification::TicketConfirmation {
                recipient,
                event_title,
                ticket_number,
                ..
            } => {
                tracing::info!(%recipient, %event_title, %ticket_number, "ticket confirmation");
            }
            Notification::TicketCancelled {
                user_id,
                event_title,
                ticket_number,
            } => {
                tracing::info!(%user_id, %event_title, %ticket_number, "ticket cancelled");
            }
            Notification::EventPublished { event_id, title } => {
                tracing::info!(%event_id, %title, "event published");
            }
            Notification::EventCancelled { event_id, title } => {
                tracing::info!(%event_id, %title, "event cancelled");
            }
        }

        Ok(())
    }
}

/// Hands notifications to the notifier on a detached task. The outcome of
/// the operation that emitted the message never depends on delivery; a
/// failed delivery is logged and dropped.
#[derive(Clone)]
pub struct NotifierBridge {
    notifier: Arc<dyn Notifier>,
}

impl NotifierBridge {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn dispatch(&self, notification: Notification) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            let label = notification.label();
            if let Err(err) = notifier.deliver(notification).await {
                tracing::warn!(error = %err, notification = label, "notification delivery failed");
            }
        });
    }
}
