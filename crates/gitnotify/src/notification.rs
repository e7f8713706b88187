use std::fmt;

use tracing::info;

use crate::events::{EventKind, InboundEvent};

/// A formatted notification for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: EventKind,
    pub action: String,
    pub repo_name: String,
    message: String,
}

impl Notification {
    pub fn for_event(event: &InboundEvent) -> Self {
        Self {
            kind: event.kind,
            action: event.action.clone(),
            repo_name: event.repo_name.clone(),
            message: format!(
                "{}: #{} - {} by {}",
                headline(event),
                event.subject_number,
                event.subject_title,
                event.actor_login
            ),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn headline(event: &InboundEvent) -> String {
    let label = event.kind.label();
    match (event.kind, event.action.as_str()) {
        (_, "opened") => format!("New {label} Opened"),
        (EventKind::PullRequest, "closed") if event.merged == Some(true) => {
            format!("{label} Merged")
        }
        (_, "closed") => format!("{label} Closed"),
        (_, "reopened") => format!("{label} Reopened"),
        (_, action) => format!("{label} {action}"),
    }
}

/// Where notifications go.
pub trait Notify: Send + Sync {
    fn notify(&self, notification: &Notification);
}

/// Emits each notification as an `info` event on the
/// `gitnotify::notification` target.
pub struct LogNotifier;

impl Notify for LogNotifier {
    fn notify(&self, notification: &Notification) {
        info!(
            target: "gitnotify::notification",
            event = notification.kind.event_type(),
            action = %notification.action,
            repo = %notification.repo_name,
            "{}",
            notification.message()
        );
    }
}
