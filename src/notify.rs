//! User-facing notification boundary
//!
//! Fire-and-forget: the core never depends on delivery succeeding.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Notification severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast-style message for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Receiver of notifications
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, n: Notification) {
        match n.severity {
            Severity::Error | Severity::Warning => log::warn!("{}: {}", n.title, n.message),
            Severity::Info | Severity::Success => log::info!("{}: {}", n.title, n.message),
        }
    }
}

/// Keeps every notification it receives (shared between clones)
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    received: Rc<RefCell<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<Notification> {
        self.received.borrow().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.received.borrow_mut().push(notification);
    }
}
