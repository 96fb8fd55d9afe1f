use crate::config::NotificationConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

/// A toast. `duration` of zero disables auto-dismiss.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub duration: Duration,
}

/// Observable queue of active toasts.
///
/// Toasts auto-dismiss after their duration when a tokio runtime is
/// around to run the timer; otherwise they stay until dismissed.
#[derive(Debug)]
pub struct NotificationCenter {
    tx: Arc<watch::Sender<Vec<Notification>>>,
    default_duration: Duration,
}

impl NotificationCenter {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(Vec::new())),
            default_duration: Duration::from_millis(config.default_duration_ms),
        }
    }

    pub fn show_success(&self, title: &str, message: Option<&str>) {
        self.show(NotificationKind::Success, title, message, None);
    }

    pub fn show_error(&self, title: &str, message: Option<&str>) {
        self.show(NotificationKind::Error, title, message, None);
    }

    pub fn show_warning(&self, title: &str, message: Option<&str>) {
        self.show(NotificationKind::Warning, title, message, None);
    }

    pub fn show_info(&self, title: &str, message: Option<&str>) {
        self.show(NotificationKind::Info, title, message, None);
    }

    pub fn show(
        &self,
        kind: NotificationKind,
        title: &str,
        message: Option<&str>,
        duration: Option<Duration>,
    ) {
        let notification = Notification {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            message: message.map(str::to_string),
            duration: duration.unwrap_or(self.default_duration),
        };

        tracing::debug!(kind = ?notification.kind, title = %notification.title, "notification shown");

        let id = notification.id;
        let duration = notification.duration;
        self.tx.send_modify(|active| active.push(notification));

        if !duration.is_zero() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                let tx = Arc::clone(&self.tx);
                handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    tx.send_modify(|active| active.retain(|n| n.id != id));
                });
            }
        }
    }

    pub fn dismiss(&self, id: Uuid) {
        self.tx.send_modify(|active| active.retain(|n| n.id != id));
    }

    pub fn clear_all(&self) {
        self.tx.send_replace(Vec::new());
    }

    pub fn current(&self) -> Vec<Notification> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.tx.subscribe()
    }
}
