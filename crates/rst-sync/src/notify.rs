//! User-visible notifications.

use std::fmt;

/// Severity of a notification; decides icon and colour in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

/// Fire-and-forget notification output supplied by the tab host.
pub trait NotificationSink {
    fn notify(&mut self, message: &str, severity: Severity);
}

impl<N: NotificationSink + ?Sized> NotificationSink for &mut N {
    fn notify(&mut self, message: &str, severity: Severity) {
        (**self).notify(message, severity);
    }
}

/// Sink that keeps every notification, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    notifications: Vec<Notification>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Number of notifications with the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.notifications
            .iter()
            .filter(|n| n.severity == severity)
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&mut self, message: &str, severity: Severity) {
        self.notifications.push(Notification {
            message: message.to_string(),
            severity,
        });
    }
}
