//! UiHost seam: how the core talks back to the user

use chrono::{DateTime, Local};

use crate::error::WorkbenchError;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A non-fatal message shown as a dialog
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub at: DateTime<Local>,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
            at: Local::now(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, message)
    }

    /// Duplicate requests and reserved features are warnings, the rest errors
    pub fn from_error(err: &WorkbenchError) -> Self {
        let severity = match err.root() {
            WorkbenchError::AlreadyComputed { .. }
            | WorkbenchError::NotImplemented(_)
            | WorkbenchError::MissingDependency { .. } => Severity::Warning,
            _ => Severity::Error,
        };
        Self::new(severity, err.title(), err.to_string())
    }
}

/// What the core needs from the GUI
pub trait UiHost {
    /// Show a non-fatal notice
    fn notify(&mut self, notice: Notice);

    /// Ask a yes/no question; `false` unless the user explicitly agrees
    fn confirm(&mut self, title: &str, question: &str) -> bool;

    /// Report an error at the engine boundary
    fn report(&mut self, err: &WorkbenchError) {
        tracing::warn!("{}", err);
        self.notify(Notice::from_error(err));
    }
}
